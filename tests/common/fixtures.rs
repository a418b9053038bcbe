//! Shared service fixtures for integration tests

use parking_lot::Mutex;
use service_locator::{ParamShape, Service};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub trait Logger: Send + Sync {
    fn info(&self, msg: &str);
}

/// Logger that records every call so tests can observe it
#[derive(Default)]
pub struct RecordingLogger {
    pub lines: Mutex<Vec<String>>,
}

impl Logger for RecordingLogger {
    fn info(&self, msg: &str) {
        self.lines.lock().push(format!("INFO {msg}"));
    }
}

pub trait AbstractShape: Send + Sync {
    fn sides(&self) -> u32;
}

pub struct Circle;

impl AbstractShape for Circle {
    fn sides(&self) -> u32 {
        0
    }
}

pub struct Square;

impl AbstractShape for Square {
    fn sides(&self) -> u32 {
        4
    }
}

pub fn circle_instance() -> Service {
    Service::implementing::<dyn AbstractShape>(Arc::new(Circle))
}

/// Factory producing a named counter value; bumps `built` on every construction
pub fn counting_factory(built: Arc<AtomicUsize>) -> Service {
    Service::factory_with(ParamShape::none().optional("label"), move |args| {
        built.fetch_add(1, Ordering::SeqCst);
        Ok(args
            .param::<String>("label", 0)
            .cloned()
            .unwrap_or_else(|| "unlabelled".to_string()))
    })
}
