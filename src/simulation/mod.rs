//! # Pack Simulation
//!
//! Closed-loop simulation used by the host binary and the integration tests.
//!
//! ## Components
//!
//! - **battery_thermal**: lumped thermal model producing the temperature feed
//! - **scenario**: scripted drive cycles (load, ambient, operator commands)
//! - **runner**: ticks the model, the supervisor and the simulated hardware
//!
//! ## Usage
//!
//! ```rust
//! use thermal_supervisor::domain::ThermalLimits;
//! use thermal_supervisor::simulation::{run_scenario, Scenario};
//!
//! let reports = run_scenario(Scenario::overheat_and_recovery(), ThermalLimits::default())
//!     .expect("default limits are valid");
//! assert_eq!(reports.len() as u64, Scenario::overheat_and_recovery().total_ticks());
//! ```

pub mod battery_thermal;
pub mod runner;
pub mod scenario;

pub use battery_thermal::{PackThermalConfig, PackThermalModel, PackThermalState};
pub use runner::{run_scenario, run_scenario_with, ScenarioRunner, TickReport};
pub use scenario::{Scenario, ScenarioStep};
