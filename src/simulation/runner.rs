use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::battery_thermal::PackThermalModel;
use super::scenario::Scenario;
use crate::controller::ThermalSupervisor;
use crate::domain::{CommandOutcome, FaultState, OperatorCommand, ThermalLimits};
use crate::hardware::{logged_capabilities, Capabilities};

/// Observations after one sampling tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub temperature_c: f64,
    pub fault_state: FaultState,
    /// Current actually drawn during the tick (A)
    pub applied_discharge_a: f64,
    pub can_charge: bool,
    pub can_discharge: bool,
    pub contactors_open: bool,
    /// Command issued at the start of this tick and its outcome
    pub command: Option<(OperatorCommand, CommandOutcome)>,
}

/// Closed loop: pack model -> supervisor -> current gating -> pack model
pub struct ScenarioRunner {
    scenario: Scenario,
    tick_duration: Duration,
    model: PackThermalModel,
    supervisor: ThermalSupervisor,
    step_index: usize,
    tick_in_step: u32,
    tick: u64,
}

impl ScenarioRunner {
    /// Runner on simulated actuators whose alerts go to the log
    pub fn new(scenario: Scenario, limits: ThermalLimits) -> Result<Self> {
        Self::with_capabilities(scenario, limits, logged_capabilities())
    }

    pub fn with_capabilities(
        scenario: Scenario,
        limits: ThermalLimits,
        caps: Capabilities,
    ) -> Result<Self> {
        let tick_duration = scenario.tick_duration()?;
        let mut supervisor = ThermalSupervisor::new(limits, caps)?;
        let model = PackThermalModel::new(scenario.pack.clone());
        supervisor.monitor_temperature(model.temperature_c());
        info!(scenario = %scenario.name, ticks = scenario.total_ticks(), "scenario loaded");

        Ok(Self {
            scenario,
            tick_duration,
            model,
            supervisor,
            step_index: 0,
            tick_in_step: 0,
            tick: 0,
        })
    }

    pub fn supervisor(&self) -> &ThermalSupervisor {
        &self.supervisor
    }

    pub fn is_finished(&self) -> bool {
        self.current_step_index().is_none()
    }

    /// Advance one tick. Returns `None` once every step has run.
    pub fn next_tick(&mut self) -> Option<TickReport> {
        let index = self.current_step_index()?;
        if index != self.step_index {
            self.step_index = index;
            self.tick_in_step = 0;
        }
        let step = self.scenario.steps[index].clone();

        let mut command = None;
        if self.tick_in_step == 0 {
            if let Some(ambient) = step.ambient_temp_c {
                self.model.set_ambient_temp(ambient);
            }
            if let Some(cmd) = step.command {
                let outcome = self.supervisor.execute(cmd);
                info!(command = %cmd, accepted = outcome.is_accepted(), "operator command issued");
                command = Some((cmd, outcome));
            }
        }

        let applied_discharge_a = if self.supervisor.can_discharge() && !self.supervisor.contactors_open() {
            step.requested_discharge_a
                .clamp(0.0, self.supervisor.allowed_discharge_current_limit())
        } else {
            0.0
        };

        let cooling_active = self.supervisor.state().emergency_cooling_active;
        self.model.update(applied_discharge_a, cooling_active, self.tick_duration);

        let reading = step.forced_temp_c.unwrap_or_else(|| self.model.temperature_c());
        self.supervisor.monitor_temperature(reading);

        self.tick += 1;
        self.tick_in_step += 1;

        let report = TickReport {
            tick: self.tick,
            temperature_c: reading,
            fault_state: self.supervisor.fault_state(),
            applied_discharge_a,
            can_charge: self.supervisor.can_charge(),
            can_discharge: self.supervisor.can_discharge(),
            contactors_open: self.supervisor.contactors_open(),
            command,
        };
        debug!(
            tick = report.tick,
            temperature_c = report.temperature_c,
            state = %report.fault_state,
            applied_discharge_a = report.applied_discharge_a,
            "tick"
        );
        Some(report)
    }

    fn current_step_index(&self) -> Option<usize> {
        let mut index = self.step_index;
        let mut consumed = self.tick_in_step;
        while let Some(step) = self.scenario.steps.get(index) {
            if consumed < step.ticks {
                return Some(index);
            }
            index += 1;
            consumed = 0;
        }
        None
    }
}

/// Run a scenario to completion
pub fn run_scenario(scenario: Scenario, limits: ThermalLimits) -> Result<Vec<TickReport>> {
    ScenarioRunner::new(scenario, limits).map(drain)
}

/// Run a scenario to completion against caller-supplied capabilities
pub fn run_scenario_with(
    scenario: Scenario,
    limits: ThermalLimits,
    caps: Capabilities,
) -> Result<Vec<TickReport>> {
    ScenarioRunner::with_capabilities(scenario, limits, caps).map(drain)
}

fn drain(mut runner: ScenarioRunner) -> Vec<TickReport> {
    let mut reports = Vec::new();
    while let Some(report) = runner.next_tick() {
        reports.push(report);
    }
    reports
}
