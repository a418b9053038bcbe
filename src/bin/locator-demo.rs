//! # Locator Demo
//!
//! Wires a small logger / dioculator / frombulator application through the
//! process-wide locator. Consumers declare their proxies before anything is
//! registered; startup then registers implementations, runs the binding audit,
//! and exits with status 1 if any requested service is missing.
//!
//! ```text
//! locator-demo                      # runs normally
//! locator-demo --skip-logger        # audit failure, exit 1
//! locator-demo --skip-frombulator   # audit passes, first use fails
//! locator-demo --mistake            # contract violation at registration
//! ```

use anyhow::Context;
use clap::Parser;
use service_locator::config::{ConfigLoader, LocatorConfig};
use service_locator::locator;
use service_locator::logging::init_structured_logging;
use service_locator::{
    BoxError, ConstructionArgs, ContractPolicy, ParamShape, Service, ServiceKey, ServiceLocator,
    ServiceProxy,
};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "locator-demo")]
#[command(about = "Exercise the service locator with a toy application")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Register the uncoloured logger instead of the coloured one
    #[arg(long)]
    plain: bool,

    /// Leave the logger unregistered; the startup audit reports it and exits
    #[arg(long)]
    skip_logger: bool,

    /// Leave the frombulator unregistered. The dioculator binds it lazily, so the
    /// audit misses it and the failure surfaces on first use instead
    #[arg(long)]
    skip_frombulator: bool,

    /// Register a dioculator under the logger key to trip contract mode
    #[arg(long)]
    mistake: bool,
}

trait Logger: Send + Sync {
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
}

trait Dioculator: Send + Sync {
    fn dioculate(&self) -> Result<(), BoxError>;
}

trait Frombulator: Send + Sync {
    fn name(&self) -> &str;
}

type LoggerProxy = ServiceProxy<Arc<dyn Logger>>;

struct PlainLogger {
    name: String,
}

impl Logger for PlainLogger {
    fn debug(&self, msg: &str) {
        println!("DEBUG | {} | {msg}", self.name);
    }

    fn info(&self, msg: &str) {
        println!("INFO  | {} | {msg}", self.name);
    }

    fn warn(&self, msg: &str) {
        println!("WARN  | {} | {msg}", self.name);
    }
}

struct ColorLogger {
    name: String,
}

impl ColorLogger {
    const BLUE: &'static str = "\x1b[94m";
    const GREEN: &'static str = "\x1b[92m";
    const YELLOW: &'static str = "\x1b[93m";
    const RESET: &'static str = "\x1b[0m";

    fn print(&self, color: &str, level: &str, msg: &str) {
        println!("{color}{level} | {} | {msg}{}", self.name, Self::RESET);
    }
}

impl Logger for ColorLogger {
    fn debug(&self, msg: &str) {
        self.print(Self::BLUE, "DEBUG", msg);
    }

    fn info(&self, msg: &str) {
        self.print(Self::GREEN, "INFO ", msg);
    }

    fn warn(&self, msg: &str) {
        self.print(Self::YELLOW, "WARN ", msg);
    }
}

struct MarkTwoFrombulator {
    name: String,
}

impl Frombulator for MarkTwoFrombulator {
    fn name(&self) -> &str {
        &self.name
    }
}

struct StandardDioculator {
    frombulator: Arc<dyn Frombulator>,
    logger: Arc<dyn Logger>,
}

impl Dioculator for StandardDioculator {
    fn dioculate(&self) -> Result<(), BoxError> {
        self.logger.info("Dioculator.dioculate()");
        self.logger.debug("calling Frombulator.name()");
        println!(
            "Dioculating with frombulator: '{}'",
            self.frombulator.name()
        );
        Ok(())
    }
}

fn logger_proxy(requester: &str) -> LoggerProxy {
    locator::make_proxy(ServiceKey::of::<dyn Logger>(), requester)
        .invoke(ConstructionArgs::new().arg(requester.to_string()))
}

/// Consumer declared before any service is registered
struct Bla {
    logger: LoggerProxy,
    dioculator: ServiceProxy<Arc<dyn Dioculator>>,
    greeting: String,
}

impl Bla {
    fn declare() -> Self {
        Self {
            logger: logger_proxy("bla"),
            dioculator: locator::make_proxy(ServiceKey::of::<dyn Dioculator>(), "bla::Bla")
                .invoke(ConstructionArgs::new().arg("frombulator".to_string())),
            greeting: "BLA".to_string(),
        }
    }

    fn talk(&self) -> anyhow::Result<()> {
        self.logger.with(|l| l.info("about to talk"))?;
        println!("Bla here. I just wanted to say '{}'", self.greeting);
        self.dioculator
            .with(|d| d.dioculate())?
            .map_err(|err| anyhow::anyhow!(err))?;
        self.logger.with(|l| l.warn("just got done talking"))?;
        Ok(())
    }
}

fn logger_service(plain: bool) -> Service {
    let params = ParamShape::none().required("name");
    if plain {
        Service::factory_of_with::<dyn Logger, _>(params, |args| {
            let name = args.param::<String>("name", 0).cloned().unwrap_or_default();
            Ok(Arc::new(PlainLogger { name }))
        })
    } else {
        Service::factory_of_with::<dyn Logger, _>(params, |args| {
            let name = args.param::<String>("name", 0).cloned().unwrap_or_default();
            Ok(Arc::new(ColorLogger { name }))
        })
    }
}

fn frombulator_service() -> Service {
    Service::factory_of_with::<dyn Frombulator, _>(ParamShape::none().optional("name"), |args| {
        let name = args
            .param::<String>("name", 0)
            .cloned()
            .unwrap_or_else(|| "myfrombulator".to_string());
        Ok(Arc::new(MarkTwoFrombulator { name }))
    })
}

fn dioculator_service() -> Service {
    Service::factory_of_with::<dyn Dioculator, _>(ParamShape::none().required("frombulator"), |args| {
        let frombulator_name = args
            .param::<String>("frombulator", 0)
            .cloned()
            .unwrap_or_default();

        // Created inside the initialiser, so the startup audit cannot see this binding
        let logger = Arc::clone(&*logger_proxy("dioculator").get()?);
        let frombulator = locator::make_proxy::<Arc<dyn Frombulator>>(
            ServiceKey::of::<dyn Frombulator>(),
            "dioculator::Dioculator",
        )
        .invoke(ConstructionArgs::new().arg(frombulator_name))
        .get()?;

        logger.info("Dioculator initialized");
        Ok(Arc::new(StandardDioculator {
            frombulator: Arc::clone(&*frombulator),
            logger,
        }))
    })
}

fn load_config(cli: &Cli) -> anyhow::Result<LocatorConfig> {
    // Keys are capabilities and only factories may be registered, unless the
    // file or environment says otherwise
    let mut loader =
        ConfigLoader::new().with_contract_defaults(ContractPolicy::enforced().factories_only());
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader.load().context("loading locator configuration")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_structured_logging(&config.logging);

    locator::install(ServiceLocator::from_config(&config))?;

    let bla = Bla::declare();

    if cli.mistake {
        locator::register(ServiceKey::of::<dyn Logger>(), dioculator_service())
            .context("registering dioculator as the logger")?;
    }
    if !cli.skip_logger {
        locator::register(ServiceKey::of::<dyn Logger>(), logger_service(cli.plain))?;
    }
    locator::register(ServiceKey::of::<dyn Dioculator>(), dioculator_service())?;
    if !cli.skip_frombulator {
        locator::register(ServiceKey::of::<dyn Frombulator>(), frombulator_service())?;
    }

    if let Err(report) = locator::validate() {
        if config.validation.fail_on_unbound {
            eprint!("ERROR: {report}");
            process::exit(1);
        }
        tracing::warn!(unbound = report.bindings.len(), "Continuing with unbound services");
    }

    bla.talk()
}
