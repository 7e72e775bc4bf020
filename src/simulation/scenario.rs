use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::battery_thermal::PackThermalConfig;
use crate::domain::OperatorCommand;

/// Scripted drive cycle for the simulated pack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Simulated time per tick (seconds)
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    #[serde(default)]
    pub pack: PackThermalConfig,
    pub steps: Vec<ScenarioStep>,
}

fn default_tick_seconds() -> f64 {
    60.0
}

/// One segment of a scenario. The command, if any, is issued before the first tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioStep {
    /// Number of sampling ticks in this segment
    pub ticks: u32,
    /// Ambient temperature from this segment onward (°C)
    pub ambient_temp_c: Option<f64>,
    /// Discharge current the load asks for (A)
    pub requested_discharge_a: f64,
    /// Overrides the model reading, e.g. to emulate a sensor fault (°C)
    pub forced_temp_c: Option<f64>,
    pub command: Option<OperatorCommand>,
}

impl Scenario {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(raw).context("invalid scenario definition")?;
        scenario.tick_duration()?;
        Ok(scenario)
    }

    /// Simulated time per tick. Fails unless `tick_seconds` is a positive, representable duration.
    pub fn tick_duration(&self) -> Result<Duration> {
        if !(self.tick_seconds > 0.0) {
            anyhow::bail!("scenario tick_seconds must be positive, got {}", self.tick_seconds);
        }
        Duration::try_from_secs_f64(self.tick_seconds)
            .with_context(|| format!("scenario tick_seconds out of range: {}", self.tick_seconds))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| s.ticks as u64).sum()
    }

    /// Hot pack isolated under load, cooled, reset, then parked in deep cold
    pub fn overheat_and_recovery() -> Self {
        Self {
            name: "overheat-and-recovery".into(),
            tick_seconds: 60.0,
            pack: PackThermalConfig {
                ambient_temp_c: 25.0,
                ..Default::default()
            },
            steps: vec![
                ScenarioStep {
                    ticks: 5,
                    requested_discharge_a: 600.0,
                    ..Default::default()
                },
                ScenarioStep {
                    ticks: 2,
                    forced_temp_c: Some(65.0),
                    requested_discharge_a: 600.0,
                    ..Default::default()
                },
                ScenarioStep {
                    ticks: 10,
                    requested_discharge_a: 600.0,
                    ..Default::default()
                },
                ScenarioStep {
                    ticks: 3,
                    command: Some(OperatorCommand::Reset),
                    requested_discharge_a: 300.0,
                    ..Default::default()
                },
                ScenarioStep {
                    ticks: 5,
                    forced_temp_c: Some(-25.0),
                    requested_discharge_a: 300.0,
                    ..Default::default()
                },
                ScenarioStep {
                    ticks: 5,
                    forced_temp_c: Some(-12.0),
                    requested_discharge_a: 300.0,
                    command: Some(OperatorCommand::AllowDischarge),
                    ..Default::default()
                },
            ],
        }
    }
}
