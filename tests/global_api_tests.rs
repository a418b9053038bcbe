//! Process-wide façade. Everything runs in one test because the locator is
//! shared by the whole test binary and contract mode is global state.

mod common;

use common::*;
use service_locator::locator;
use service_locator::{
    ContractPolicy, LocatorError, Service, ServiceKey, ServiceLocator,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_process_wide_api() {
    let installed = locator::install(ServiceLocator::new()).unwrap();
    assert!(std::ptr::eq(installed, locator::global()));
    assert!(matches!(
        locator::install(ServiceLocator::new()),
        Err(LocatorError::AlreadyInstalled)
    ));

    // Consumers bind before anything is registered
    let logger = locator::make_proxy::<Arc<dyn Logger>>("logger", "global::consumer");
    let shape = locator::make_proxy::<Arc<dyn AbstractShape>>(
        ServiceKey::of::<dyn AbstractShape>(),
        "global::consumer",
    );
    assert_eq!(locator::unbound_bindings().len(), 2);
    assert!(locator::validate().is_err());

    let recorder = Arc::new(RecordingLogger::default());
    let as_logger: Arc<dyn Logger> = recorder.clone();
    locator::register("logger", Service::instance(as_logger)).unwrap();
    assert!(locator::has(&ServiceKey::token("logger")));

    // Contract mode applies to later registrations only
    locator::configure(true);
    assert!(locator::register("loose", Service::instance(1_u8))
        .unwrap_err()
        .is_contract_violation());
    locator::register(ServiceKey::of::<dyn AbstractShape>(), circle_instance()).unwrap();

    locator::configure_with(ContractPolicy::enforced().factories_only());
    assert!(
        locator::register(ServiceKey::of::<dyn AbstractShape>(), circle_instance())
            .unwrap_err()
            .is_contract_violation()
    );
    locator::configure(false);

    assert!(locator::validate().is_ok());
    logger.with(|l| l.info("hello")).unwrap();
    assert_eq!(shape.with(|s| s.sides()).unwrap(), 0);
    assert_eq!(recorder.lines.lock().as_slice(), ["INFO hello".to_string()]);

    let built = Arc::new(AtomicUsize::new(0));
    locator::register("label", counting_factory(Arc::clone(&built))).unwrap();
    let label = locator::resolve_as::<String>(&ServiceKey::token("label")).unwrap();
    assert_eq!(label.as_str(), "unlabelled");
    assert_eq!(built.load(Ordering::SeqCst), 1);

    let keys = locator::list_keys();
    assert!(keys.contains(&ServiceKey::token("logger")));
    assert!(keys.contains(&ServiceKey::of::<dyn AbstractShape>()));
    assert!(!keys.contains(&ServiceKey::token("loose")));

    assert!(locator::lookup(&ServiceKey::token("missing"))
        .unwrap_err()
        .is_not_found());
}
