use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Thermal fault state of the pack. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum FaultState {
    #[default]
    #[strum(serialize = "normal")]
    Normal,
    /// Latched until a technician performs a manual reset
    #[strum(serialize = "over_temperature_critical")]
    OverTemperatureCritical,
    #[strum(serialize = "under_temperature_charge_inhibit")]
    UnderTemperatureChargeInhibit,
    #[strum(serialize = "under_temperature_discharge_inhibit")]
    UnderTemperatureDischargeInhibit,
    #[strum(serialize = "under_temperature_discharge_limited")]
    UnderTemperatureDischargeLimited,
}

impl FaultState {
    pub fn is_critical(self) -> bool {
        matches!(self, FaultState::OverTemperatureCritical)
    }

    pub fn is_under_temperature(self) -> bool {
        matches!(
            self,
            FaultState::UnderTemperatureChargeInhibit
                | FaultState::UnderTemperatureDischargeInhibit
                | FaultState::UnderTemperatureDischargeLimited
        )
    }
}

/// Operator / controller command delivered to the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OperatorCommand {
    /// Technician reset of a latched over-temperature fault
    Reset,
    AllowCharge,
    AllowDischarge,
}

/// Why a command was refused. Refusals are domain outcomes, not faults.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("manual reset not applicable in state {0}")]
    NotLatched(FaultState),
    #[error("battery temperature {temperature_c:.1}°C above reset threshold {threshold_c:.1}°C")]
    StillTooHot { temperature_c: f64, threshold_c: f64 },
    #[error("pack is isolated by a critical over-temperature fault")]
    CriticalFault,
    #[error("battery temperature {temperature_c:.1}°C below required {required_c:.1}°C")]
    StillTooCold { temperature_c: f64, required_c: f64 },
}

/// Result of an operator command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum CommandOutcome {
    Accepted,
    Rejected(RejectionReason),
}

impl CommandOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommandOutcome::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_fault_state_display() {
        assert_eq!(FaultState::Normal.to_string(), "normal");
        assert_eq!(
            FaultState::UnderTemperatureDischargeLimited.to_string(),
            "under_temperature_discharge_limited"
        );
    }

    #[test]
    fn test_fault_state_classification() {
        assert!(FaultState::OverTemperatureCritical.is_critical());
        assert!(!FaultState::OverTemperatureCritical.is_under_temperature());
        assert!(FaultState::UnderTemperatureChargeInhibit.is_under_temperature());
        assert!(!FaultState::Normal.is_critical());
    }

    #[test]
    fn test_operator_command_parsing() {
        assert_eq!(OperatorCommand::from_str("reset").unwrap(), OperatorCommand::Reset);
        assert_eq!(
            OperatorCommand::from_str("ALLOW_CHARGE").unwrap(),
            OperatorCommand::AllowCharge
        );
        assert_eq!(
            OperatorCommand::from_str("allow_discharge").unwrap(),
            OperatorCommand::AllowDischarge
        );
        assert!(OperatorCommand::from_str("open_contactors").is_err());
    }

    #[test]
    fn test_rejection_reason_message() {
        let reason = RejectionReason::StillTooHot {
            temperature_c: 57.0,
            threshold_c: 55.0,
        };
        assert_eq!(
            reason.to_string(),
            "battery temperature 57.0°C above reset threshold 55.0°C"
        );
    }
}
