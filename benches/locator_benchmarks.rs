use criterion::{black_box, criterion_group, criterion_main, Criterion};
use service_locator::{ContractPolicy, Service, ServiceKey, ServiceLocator};
use std::sync::Arc;

trait Greeter: Send + Sync {
    fn greet(&self) -> usize;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> usize {
        5
    }
}

fn populated_locator(services: usize) -> ServiceLocator {
    let locator = ServiceLocator::new();
    for i in 0..services {
        locator
            .register(format!("service-{i}"), Service::instance(i))
            .expect("token registration outside contract mode");
    }
    locator
}

fn benchmark_registry_lookup(c: &mut Criterion) {
    let locator = populated_locator(256);
    let key = ServiceKey::token("service-128");
    c.bench_function("registry_lookup", |b| {
        b.iter(|| locator.lookup(black_box(&key)))
    });
}

fn benchmark_contract_registration(c: &mut Criterion) {
    let locator = ServiceLocator::with_policy(ContractPolicy::enforced());
    let key = ServiceKey::of::<dyn Greeter>();
    c.bench_function("contract_registration", |b| {
        b.iter(|| {
            locator.register(
                key.clone(),
                Service::implementing::<dyn Greeter>(Arc::new(English)),
            )
        })
    });
}

fn benchmark_proxy_first_resolution(c: &mut Criterion) {
    let locator = ServiceLocator::new();
    locator
        .register(
            ServiceKey::of::<dyn Greeter>(),
            Service::factory(|| Ok(Box::new(English) as Box<dyn Greeter>)),
        )
        .expect("factory registration");
    c.bench_function("proxy_first_resolution", |b| {
        b.iter(|| {
            let proxy =
                locator.make_proxy::<Box<dyn Greeter>>(ServiceKey::of::<dyn Greeter>(), "bench");
            proxy.with(|g| g.greet())
        })
    });
}

fn benchmark_proxy_cached_access(c: &mut Criterion) {
    let locator = populated_locator(1);
    let proxy = locator.make_proxy::<usize>("service-0", "bench");
    proxy.get().expect("registered above");
    c.bench_function("proxy_cached_access", |b| {
        b.iter(|| proxy.with(|value| black_box(*value)))
    });
}

criterion_group!(
    benches,
    benchmark_registry_lookup,
    benchmark_contract_registration,
    benchmark_proxy_first_resolution,
    benchmark_proxy_cached_access
);
criterion_main!(benches);
