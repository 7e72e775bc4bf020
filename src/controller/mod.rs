pub mod evaluation;
pub mod thermal_supervisor;

pub use evaluation::{evaluate, Assessment, DischargeBand};
pub use thermal_supervisor::{SupervisorState, ThermalSupervisor, TransitionRecord};
