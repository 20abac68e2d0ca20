//! Stage listeners — consumers of the orchestrator's event stream

use std::cell::RefCell;
use std::rc::Rc;

use ld_stage::{StageEvent, StageTrace};

/// Receives every stage event, in emission order
pub trait StageListener {
    fn on_stage(&mut self, event: &StageEvent);
}

impl StageListener for StageTrace {
    fn on_stage(&mut self, event: &StageEvent) {
        self.push(event.clone());
    }
}

/// Shared handle, so the owner can inspect a listener after handing it over
impl<L: StageListener> StageListener for Rc<RefCell<L>> {
    fn on_stage(&mut self, event: &StageEvent) {
        self.borrow_mut().on_stage(event);
    }
}

/// Adapter for closures
pub struct FnListener<F>(pub F);

impl<F: FnMut(&StageEvent)> StageListener for FnListener<F> {
    fn on_stage(&mut self, event: &StageEvent) {
        (self.0)(event)
    }
}

/// Logs every event at debug level
#[derive(Debug, Default)]
pub struct LogListener;

impl StageListener for LogListener {
    fn on_stage(&mut self, event: &StageEvent) {
        log::debug!("[{:>9.1}ms] {:?}", event.timestamp_ms, event.stage);
    }
}
