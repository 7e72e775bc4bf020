//! # Pack Actuation Capabilities
//!
//! Outbound contracts the thermal supervisor drives. Real deployments wire
//! these to the contactor driver, the cooling loop and the driver display /
//! vehicle controller bus; the `simulated` module provides in-process versions
//! for the host binary and for tests.
//!
//! All calls are best-effort and infallible at this level. A driver that can
//! detect hardware faults must report them through its own channel.

pub mod simulated;

use std::sync::Arc;

pub use simulated::{
    logged_capabilities, RecordingAlertSink, SimulatedContactors, SimulatedCooling,
    SimulatedHardware, TracingAlertSink,
};

/// Main contactor driver
#[cfg_attr(test, mockall::automock)]
pub trait ContactorControl: Send + Sync {
    /// Isolate the pack. Idempotent.
    fn open(&self);
    /// Reconnect the pack after a technician reset. Idempotent.
    fn close(&self);
}

/// Emergency cooling driver
#[cfg_attr(test, mockall::automock)]
pub trait CoolingControl: Send + Sync {
    /// Engage emergency cooling if fitted. Missing hardware is not an error.
    fn activate(&self);
}

/// Best-effort notification channel (driver display, vehicle controller)
#[cfg_attr(test, mockall::automock)]
pub trait AlertSink: Send + Sync {
    fn notify(&self, message: &str);
}

/// The four capabilities injected into a supervisor
#[derive(Clone)]
pub struct Capabilities {
    pub contactors: Arc<dyn ContactorControl>,
    pub cooling: Arc<dyn CoolingControl>,
    pub driver: Arc<dyn AlertSink>,
    pub controller: Arc<dyn AlertSink>,
}

impl Capabilities {
    pub fn new(
        contactors: Arc<dyn ContactorControl>,
        cooling: Arc<dyn CoolingControl>,
        driver: Arc<dyn AlertSink>,
        controller: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            contactors,
            cooling,
            driver,
            controller,
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}
