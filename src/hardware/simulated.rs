use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use super::{AlertSink, Capabilities, ContactorControl, CoolingControl};

/// In-process contactor pair. Tracks position and actuation counts.
#[derive(Debug, Default)]
pub struct SimulatedContactors {
    inner: Mutex<ContactorCounters>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ContactorCounters {
    open: bool,
    open_commands: u32,
    close_commands: u32,
}

impl SimulatedContactors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    pub fn open_commands(&self) -> u32 {
        self.inner.lock().open_commands
    }

    pub fn close_commands(&self) -> u32 {
        self.inner.lock().close_commands
    }
}

impl ContactorControl for SimulatedContactors {
    fn open(&self) {
        let mut inner = self.inner.lock();
        inner.open = true;
        inner.open_commands += 1;
        warn!("main contactors OPENED");
    }

    fn close(&self) {
        let mut inner = self.inner.lock();
        inner.open = false;
        inner.close_commands += 1;
        info!("main contactors CLOSED");
    }
}

/// In-process emergency cooling loop
#[derive(Debug, Default)]
pub struct SimulatedCooling {
    inner: Mutex<(bool, u32)>,
}

impl SimulatedCooling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().0
    }

    pub fn activations(&self) -> u32 {
        self.inner.lock().1
    }
}

impl CoolingControl for SimulatedCooling {
    fn activate(&self) {
        let mut inner = self.inner.lock();
        inner.0 = true;
        inner.1 += 1;
        warn!("emergency cooling ACTIVATED");
    }
}

/// Alert sink that forwards messages to the log
#[derive(Debug, Clone)]
pub struct TracingAlertSink {
    channel: &'static str,
}

impl TracingAlertSink {
    pub fn new(channel: &'static str) -> Self {
        Self { channel }
    }

    pub fn driver() -> Self {
        Self::new("driver")
    }

    pub fn controller() -> Self {
        Self::new("controller")
    }
}

impl AlertSink for TracingAlertSink {
    fn notify(&self, message: &str) {
        info!(channel = self.channel, alert = message, "alert raised");
    }
}

/// Alert sink that keeps every message for later inspection
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl AlertSink for RecordingAlertSink {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_owned());
    }
}

/// Simulated pack hardware with handles kept for observation
#[derive(Debug, Clone, Default)]
pub struct SimulatedHardware {
    pub contactors: Arc<SimulatedContactors>,
    pub cooling: Arc<SimulatedCooling>,
    pub driver: Arc<RecordingAlertSink>,
    pub controller: Arc<RecordingAlertSink>,
}

impl SimulatedHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(
            self.contactors.clone(),
            self.cooling.clone(),
            self.driver.clone(),
            self.controller.clone(),
        )
    }
}

/// Simulated actuators with both alert channels forwarded to the log
pub fn logged_capabilities() -> Capabilities {
    Capabilities::new(
        Arc::new(SimulatedContactors::new()),
        Arc::new(SimulatedCooling::new()),
        Arc::new(TracingAlertSink::driver()),
        Arc::new(TracingAlertSink::controller()),
    )
}
