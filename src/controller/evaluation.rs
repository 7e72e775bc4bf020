//! Pure thermal assessment.
//!
//! Every supervisor operation ends by asking this module what the pack state
//! should be for the current reading and latch, then applying the difference.
//! Nothing here has side effects.

use serde::{Deserialize, Serialize};

use crate::domain::{FaultState, ThermalLimits};

/// Discharge permission band for a given temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DischargeBand {
    /// Full current available
    Full,
    /// Cold: current capped at the limited value
    Limited,
    /// Too cold: discharge blocked
    Inhibited,
}

/// Target condition computed from temperature and the reset latch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// Reading above the safe maximum, or not a usable number
    OverTemperature,
    /// Reading is acceptable but a critical fault is still latched
    Latched,
    /// Temperature-driven state on both axes
    Thermal {
        charge_inhibited: bool,
        discharge: DischargeBand,
    },
}

impl Assessment {
    /// Visible fault state. The discharge axis wins the label when both axes are cold.
    pub fn fault_state(&self) -> FaultState {
        match *self {
            Assessment::OverTemperature | Assessment::Latched => FaultState::OverTemperatureCritical,
            Assessment::Thermal { discharge: DischargeBand::Inhibited, .. } => {
                FaultState::UnderTemperatureDischargeInhibit
            }
            Assessment::Thermal { discharge: DischargeBand::Limited, .. } => {
                FaultState::UnderTemperatureDischargeLimited
            }
            Assessment::Thermal { charge_inhibited: true, .. } => {
                FaultState::UnderTemperatureChargeInhibit
            }
            Assessment::Thermal { .. } => FaultState::Normal,
        }
    }
}

/// Classify a temperature on the discharge axis
pub fn discharge_band(limits: &ThermalLimits, temperature_c: f64) -> DischargeBand {
    if temperature_c < limits.min_safe_discharge_temp_c {
        DischargeBand::Inhibited
    } else if temperature_c < limits.min_limited_discharge_temp_c {
        DischargeBand::Limited
    } else {
        DischargeBand::Full
    }
}

/// Discharge current ceiling for a band
pub fn current_limit_a(limits: &ThermalLimits, band: DischargeBand) -> f64 {
    match band {
        DischargeBand::Full => limits.max_discharge_current_a,
        DischargeBand::Limited => limits.limited_discharge_current_a,
        DischargeBand::Inhibited => 0.0,
    }
}

/// Over-temperature dominates everything, then the latch, then the cold axes.
pub fn evaluate(limits: &ThermalLimits, temperature_c: f64, latched: bool) -> Assessment {
    // Any non-finite reading (NaN, +inf, -inf) is a sensor fault and isolates the pack
    if !temperature_c.is_finite() || temperature_c > limits.max_safe_temp_c {
        return Assessment::OverTemperature;
    }
    if latched {
        return Assessment::Latched;
    }
    Assessment::Thermal {
        charge_inhibited: temperature_c < limits.min_safe_charge_temp_c,
        discharge: discharge_band(limits, temperature_c),
    }
}
