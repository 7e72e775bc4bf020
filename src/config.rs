use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::ThermalLimits;
use crate::simulation::Scenario;
use crate::telemetry::LoggingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thermal: ThermalLimits,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock delay between sampling ticks
    pub tick_millis: u64,
    /// Scenario file; the built-in overheat-and-recovery run when unset
    pub scenario_path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_millis: 250,
            scenario_path: None,
        }
    }
}

impl SimulationConfig {
    pub fn load_scenario(&self) -> Result<Scenario> {
        match &self.scenario_path {
            Some(path) => Scenario::from_toml_file(path),
            None => Ok(Scenario::overheat_and_recovery()),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("BMS__").split("__"));
        let cfg: Config = figment.extract()?;
        cfg.thermal.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.thermal, ThermalLimits::default());
            assert_eq!(cfg.simulation.tick_millis, 250);
            assert!(cfg.simulation.scenario_path.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/default.toml",
                r#"
                [thermal]
                max_safe_temp_c = 58.0
                critical_recovery_hysteresis_c = 8.0

                [simulation]
                tick_millis = 10

                [logging]
                format = "pretty"
                "#,
            )?;
            jail.set_env("BMS__THERMAL__LIMITED_DISCHARGE_CURRENT_A", "150");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.thermal.max_safe_temp_c, 58.0);
            assert_eq!(cfg.thermal.reset_threshold_c(), 50.0);
            assert_eq!(cfg.thermal.limited_discharge_current_a, 150.0);
            assert_eq!(cfg.thermal.min_safe_charge_temp_c, 0.0);
            assert_eq!(cfg.simulation.tick_millis, 10);
            assert_eq!(cfg.logging.format, crate::telemetry::LogFormat::Pretty);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_limits_rejected_at_load() {
        Jail::expect_with(|jail| {
            jail.set_env("BMS__THERMAL__MIN_SAFE_DISCHARGE_TEMP_C", "5");
            assert!(Config::load().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_builtin_scenario_when_unset() {
        let scenario = SimulationConfig::default().load_scenario().unwrap();
        assert_eq!(scenario.name, "overheat-and-recovery");
    }
}
