//! # Thermal Safety Supervisor
//!
//! Fault state machine guarding a battery pack against over- and
//! under-temperature operation.
//!
//! - Over-temperature always wins: the pack is isolated, emergency cooling is
//!   engaged and the fault is latched until a technician reset.
//! - The latch only clears once the pack is below the safe maximum by the
//!   recovery hysteresis margin.
//! - Cold conditions are evaluated on two independent axes (charge and
//!   discharge) and recover automatically as the pack warms.
//!
//! Every public operation ends in [`ThermalSupervisor::reassess`], which asks
//! [`evaluate`] for the target condition and applies only the difference, so
//! repeated samples never repeat one-shot side effects.
//!
//! The supervisor is synchronous and owns its state. A host that shares it
//! between tasks must serialize access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

use super::evaluation::{current_limit_a, evaluate, Assessment, DischargeBand};
use crate::domain::{
    CommandOutcome, FaultState, LimitsError, OperatorCommand, RejectionReason, ThermalLimits,
};
use crate::hardware::Capabilities;

pub const CRITICAL_ALERT: &str = "CRITICAL: Battery over-temperature! Isolating battery.";
pub const CHARGE_INHIBIT_ALERT: &str = "NOTICE: Battery too cold for charging. Charging inhibited.";
pub const DISCHARGE_INHIBIT_ALERT: &str = "WARNING: Battery too cold! Discharging inhibited.";
pub const DISCHARGE_LIMITED_ALERT: &str = "INFO: Battery cold. Discharge current limited.";
pub const RESET_DENIED_ALERT: &str = "Manual reset denied: battery temperature still too high.";
pub const RECOVERY_DRIVER_ALERT: &str = "Battery temperature normal. System OK.";
pub const RECOVERY_CONTROLLER_ALERT: &str = "BMS: Thermal conditions nominal.";
pub const NORMAL_MESSAGE: &str = "System Normal";

const MAX_TRANSITION_HISTORY: usize = 100;

/// Observable supervisor state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorState {
    /// Last observed reading (°C)
    pub temperature_c: f64,
    pub fault_state: FaultState,
    /// Last human-readable notice
    pub alert_message: String,
    pub contactors_open: bool,
    pub emergency_cooling_active: bool,
    pub charging_inhibited: bool,
    pub discharging_inhibited: bool,
    /// Discharge current ceiling (A)
    pub discharge_current_limit_a: f64,
    /// Set on critical entry, cleared only by a manual reset
    pub manual_reset_required: bool,
}

impl SupervisorState {
    pub fn nominal(limits: &ThermalLimits) -> Self {
        Self {
            temperature_c: limits.nominal_temp_c,
            fault_state: FaultState::Normal,
            alert_message: String::new(),
            contactors_open: false,
            emergency_cooling_active: false,
            charging_inhibited: false,
            discharging_inhibited: false,
            discharge_current_limit_a: limits.max_discharge_current_a,
            manual_reset_required: false,
        }
    }
}

/// One fault-state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub at: DateTime<Utc>,
    pub from: FaultState,
    pub to: FaultState,
    pub temperature_c: f64,
}

pub struct ThermalSupervisor {
    limits: ThermalLimits,
    state: SupervisorState,
    caps: Capabilities,
    transitions: VecDeque<TransitionRecord>,
}

impl ThermalSupervisor {
    /// Create a supervisor in the nominal state. Limits are validated first.
    pub fn new(limits: ThermalLimits, caps: Capabilities) -> Result<Self, LimitsError> {
        limits.validate()?;
        info!(
            max_safe_temp_c = limits.max_safe_temp_c,
            min_safe_charge_temp_c = limits.min_safe_charge_temp_c,
            min_safe_discharge_temp_c = limits.min_safe_discharge_temp_c,
            min_limited_discharge_temp_c = limits.min_limited_discharge_temp_c,
            "thermal supervisor initialised"
        );
        Ok(Self {
            state: SupervisorState::nominal(&limits),
            limits,
            caps,
            transitions: VecDeque::new(),
        })
    }

    /// Feed one temperature sample. Called once per sampling interval.
    pub fn monitor_temperature(&mut self, reading_c: f64) {
        self.state.temperature_c = reading_c;
        self.reassess();
    }

    /// Technician reset of a latched over-temperature fault
    pub fn perform_manual_reset(&mut self) -> CommandOutcome {
        info!(temperature_c = self.state.temperature_c, "manual reset requested");

        if !self.state.fault_state.is_critical() {
            info!(state = %self.state.fault_state, "manual reset not applicable in current state");
            return CommandOutcome::Rejected(RejectionReason::NotLatched(self.state.fault_state));
        }

        let threshold_c = self.limits.reset_threshold_c();
        let temperature_c = self.state.temperature_c;
        // A non-finite reading is a sensor fault and never authorises a reset
        if !temperature_c.is_finite() || temperature_c > threshold_c {
            warn!(temperature_c, threshold_c, "manual reset denied");
            self.state.alert_message = RESET_DENIED_ALERT.to_owned();
            self.caps.driver.notify(RESET_DENIED_ALERT);
            return CommandOutcome::Rejected(RejectionReason::StillTooHot {
                temperature_c,
                threshold_c,
            });
        }

        info!(temperature_c, threshold_c, "manual reset authorised, closing contactors");
        self.state.manual_reset_required = false;
        self.caps.contactors.close();
        self.state.contactors_open = false;

        // Start from a clean slate so any cold condition is announced afresh
        self.state.charging_inhibited = false;
        self.state.discharging_inhibited = false;
        self.state.discharge_current_limit_a = self.limits.max_discharge_current_a;
        self.reassess();

        CommandOutcome::Accepted
    }

    /// Lift a charge inhibit once the pack is warm enough to charge
    pub fn allow_charging(&mut self) -> CommandOutcome {
        if self.state.fault_state.is_critical() {
            info!("conditions not met to allow charging: critical fault latched");
            return CommandOutcome::Rejected(RejectionReason::CriticalFault);
        }

        let required_c = self.limits.min_safe_charge_temp_c;
        let temperature_c = self.state.temperature_c;
        if !(temperature_c >= required_c) {
            info!(temperature_c, required_c, "conditions not met to allow charging");
            return CommandOutcome::Rejected(RejectionReason::StillTooCold {
                temperature_c,
                required_c,
            });
        }

        self.state.charging_inhibited = false;
        self.reassess();
        info!(temperature_c, "charging allowed");
        CommandOutcome::Accepted
    }

    /// Lift discharge inhibit and current limiting once the pack has left the cold bands
    pub fn allow_full_discharge(&mut self) -> CommandOutcome {
        if self.state.fault_state.is_critical() {
            info!("conditions not met to allow full discharge: critical fault latched");
            return CommandOutcome::Rejected(RejectionReason::CriticalFault);
        }

        let required_c = self.limits.min_limited_discharge_temp_c;
        let temperature_c = self.state.temperature_c;
        if !(temperature_c >= required_c) {
            info!(temperature_c, required_c, "conditions not met to allow full discharge");
            return CommandOutcome::Rejected(RejectionReason::StillTooCold {
                temperature_c,
                required_c,
            });
        }

        self.state.discharging_inhibited = false;
        self.state.discharge_current_limit_a = self.limits.max_discharge_current_a;
        self.reassess();
        info!(temperature_c, "full discharge allowed");
        CommandOutcome::Accepted
    }

    pub fn execute(&mut self, command: OperatorCommand) -> CommandOutcome {
        match command {
            OperatorCommand::Reset => self.perform_manual_reset(),
            OperatorCommand::AllowCharge => self.allow_charging(),
            OperatorCommand::AllowDischarge => self.allow_full_discharge(),
        }
    }

    pub fn fault_state(&self) -> FaultState {
        self.state.fault_state
    }

    pub fn alert_message(&self) -> &str {
        &self.state.alert_message
    }

    pub fn temperature_c(&self) -> f64 {
        self.state.temperature_c
    }

    pub fn can_charge(&self) -> bool {
        if self.state.fault_state.is_critical() {
            return false;
        }
        if !(self.state.temperature_c >= self.limits.min_safe_charge_temp_c) {
            return false;
        }
        !self.state.charging_inhibited
    }

    pub fn can_discharge(&self) -> bool {
        if self.state.fault_state.is_critical() {
            return false;
        }
        if !(self.state.temperature_c >= self.limits.min_safe_discharge_temp_c) {
            return false;
        }
        !self.state.discharging_inhibited
    }

    pub fn allowed_discharge_current_limit(&self) -> f64 {
        if !self.can_discharge() {
            return 0.0;
        }
        if self.state.temperature_c < self.limits.min_limited_discharge_temp_c {
            return self.limits.limited_discharge_current_a;
        }
        self.state.discharge_current_limit_a
    }

    pub fn contactors_open(&self) -> bool {
        self.state.contactors_open
    }

    pub fn manual_reset_required(&self) -> bool {
        self.state.manual_reset_required
    }

    pub fn state(&self) -> &SupervisorState {
        &self.state
    }

    pub fn snapshot(&self) -> SupervisorState {
        self.state.clone()
    }

    pub fn limits(&self) -> &ThermalLimits {
        &self.limits
    }

    /// Most recent fault-state transitions, oldest first
    pub fn recent_transitions(&self, count: usize) -> Vec<TransitionRecord> {
        let start = self.transitions.len().saturating_sub(count);
        self.transitions.iter().skip(start).cloned().collect()
    }

    fn reassess(&mut self) {
        let previous = self.state.fault_state;
        let assessment = evaluate(
            &self.limits,
            self.state.temperature_c,
            self.state.manual_reset_required,
        );

        match assessment {
            Assessment::OverTemperature => {
                enter_over_temperature(&mut self.state, &self.limits, &self.caps)
            }
            Assessment::Latched => {
                debug!(
                    temperature_c = self.state.temperature_c,
                    "over-temperature fault latched, manual reset required"
                );
            }
            Assessment::Thermal {
                charge_inhibited,
                discharge,
            } => apply_thermal(
                &mut self.state,
                &self.limits,
                &self.caps,
                charge_inhibited,
                discharge,
            ),
        }

        if self.state.fault_state != previous {
            self.record_transition(previous);
        }
    }

    fn record_transition(&mut self, from: FaultState) {
        let record = TransitionRecord {
            at: Utc::now(),
            from,
            to: self.state.fault_state,
            temperature_c: self.state.temperature_c,
        };
        debug!(from = %record.from, to = %record.to, temperature_c = record.temperature_c, "fault state transition");
        self.transitions.push_back(record);
        if self.transitions.len() > MAX_TRANSITION_HISTORY {
            self.transitions.pop_front();
        }
    }
}

impl std::fmt::Debug for ThermalSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThermalSupervisor")
            .field("limits", &self.limits)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn enter_over_temperature(state: &mut SupervisorState, limits: &ThermalLimits, caps: &Capabilities) {
    if state.fault_state.is_critical() {
        debug!(temperature_c = state.temperature_c, "already isolated for over-temperature");
        return;
    }

    error!(
        temperature_c = state.temperature_c,
        limit_c = limits.max_safe_temp_c,
        "SAFETY VIOLATION: battery over-temperature - isolating pack"
    );

    caps.contactors.open();
    state.contactors_open = true;
    caps.cooling.activate();
    state.emergency_cooling_active = true;

    state.charging_inhibited = true;
    state.discharging_inhibited = true;
    state.discharge_current_limit_a = 0.0;
    state.manual_reset_required = true;
    state.fault_state = FaultState::OverTemperatureCritical;

    state.alert_message = CRITICAL_ALERT.to_owned();
    caps.driver.notify(CRITICAL_ALERT);
    caps.controller.notify(CRITICAL_ALERT);
}

fn apply_thermal(
    state: &mut SupervisorState,
    limits: &ThermalLimits,
    caps: &Capabilities,
    charge_cold: bool,
    band: DischargeBand,
) {
    let previous_state = state.fault_state;
    let previous_band = if state.discharging_inhibited {
        DischargeBand::Inhibited
    } else if previous_state == FaultState::UnderTemperatureDischargeLimited {
        DischargeBand::Limited
    } else {
        DischargeBand::Full
    };

    if charge_cold {
        if !state.charging_inhibited {
            warn!(
                temperature_c = state.temperature_c,
                limit_c = limits.min_safe_charge_temp_c,
                "battery too cold for charging"
            );
            state.charging_inhibited = true;
            state.alert_message = CHARGE_INHIBIT_ALERT.to_owned();
            caps.controller.notify(CHARGE_INHIBIT_ALERT);
        }
    } else if state.charging_inhibited {
        info!(temperature_c = state.temperature_c, "charging inhibit cleared");
        state.charging_inhibited = false;
    }

    state.discharge_current_limit_a = current_limit_a(limits, band);
    match band {
        DischargeBand::Inhibited => {
            state.discharging_inhibited = true;
            if previous_band != DischargeBand::Inhibited {
                warn!(
                    temperature_c = state.temperature_c,
                    limit_c = limits.min_safe_discharge_temp_c,
                    "battery too cold for discharging"
                );
                state.alert_message = DISCHARGE_INHIBIT_ALERT.to_owned();
                caps.driver.notify(DISCHARGE_INHIBIT_ALERT);
                caps.controller.notify(DISCHARGE_INHIBIT_ALERT);
            }
        }
        DischargeBand::Limited => {
            state.discharging_inhibited = false;
            if previous_band != DischargeBand::Limited {
                warn!(
                    temperature_c = state.temperature_c,
                    limit_a = limits.limited_discharge_current_a,
                    "battery cold, discharge current limited"
                );
                state.alert_message = DISCHARGE_LIMITED_ALERT.to_owned();
                caps.driver.notify(DISCHARGE_LIMITED_ALERT);
                caps.controller.notify(DISCHARGE_LIMITED_ALERT);
            }
        }
        DischargeBand::Full => {
            state.discharging_inhibited = false;
        }
    }

    let next_state = Assessment::Thermal {
        charge_inhibited: charge_cold,
        discharge: band,
    }
    .fault_state();
    state.fault_state = next_state;

    if next_state == previous_state {
        return;
    }
    match next_state {
        FaultState::Normal => {
            info!(
                temperature_c = state.temperature_c,
                from = %previous_state,
                "all thermal conditions nominal"
            );
            state.alert_message = NORMAL_MESSAGE.to_owned();
            caps.driver.notify(RECOVERY_DRIVER_ALERT);
            caps.controller.notify(RECOVERY_CONTROLLER_ALERT);
        }
        // A warming pack can fall back to the charge-only label without a fresh alert
        FaultState::UnderTemperatureChargeInhibit => {
            state.alert_message = CHARGE_INHIBIT_ALERT.to_owned();
        }
        _ => {}
    }
}
