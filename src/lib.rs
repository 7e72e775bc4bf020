//! Thermal safety supervisor for a battery pack.
//!
//! The [`controller::ThermalSupervisor`] turns a stream of temperature samples
//! and operator commands into a fault state, charge/discharge permissions and
//! a discharge current limit, driving contactors, emergency cooling and alert
//! channels through the traits in [`hardware`].

pub mod config;
pub mod controller;
pub mod domain;
pub mod hardware;
pub mod simulation;
pub mod telemetry;

pub use controller::{SupervisorState, ThermalSupervisor};
pub use domain::{CommandOutcome, FaultState, OperatorCommand, ThermalLimits};
pub use hardware::{AlertSink, Capabilities, ContactorControl, CoolingControl};
