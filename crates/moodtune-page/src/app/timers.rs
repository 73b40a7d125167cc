//! `setTimeout`-backed scheduler.

use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;

use gloo::timers::callback::Timeout;

use super::WebController;
use crate::core::events::PageTask;
use crate::core::schedule::Scheduler;

/// Runs tasks on the browser timer queue.
///
/// Timeouts are forgotten so they fire even though nothing keeps the handle.
/// A callback that outlives the controller does nothing.
pub(crate) struct TimeoutScheduler {
    controller: Weak<RefCell<WebController>>,
}

impl TimeoutScheduler {
    pub(crate) const fn new(controller: Weak<RefCell<WebController>>) -> Self {
        Self { controller }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&mut self, delay: Duration, task: PageTask) {
        let controller = self.controller.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            if let Some(controller) = controller.upgrade() {
                if let Ok(mut controller) = controller.try_borrow_mut() {
                    controller.run_task(task);
                }
            }
        })
        .forget();
    }
}
