//! # Pack Thermal Model
//!
//! Lumped thermal-mass model used to produce a temperature feed for the
//! supervisor in simulation.
//!
//! dT/dt = (Q_gen - Q_loss) / (m * c_p)
//!
//! - Q_gen = I² * R_internal, with resistance rising in the cold
//! - Q_loss = h * (T_pack - T_ambient), where h is boosted while emergency
//!   cooling runs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pack thermal model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackThermalConfig {
    /// Pack thermal mass (kg)
    pub thermal_mass_kg: f64,

    /// Specific heat capacity (J/kg·K)
    pub specific_heat_j_per_kg_k: f64,

    /// Internal resistance at 25°C (Ohm)
    pub internal_resistance_ohm: f64,

    /// Passive heat transfer coefficient (W/K)
    pub heat_transfer_coeff_w_per_k: f64,

    /// Additional heat transfer while emergency cooling is active (W/K)
    pub emergency_cooling_coeff_w_per_k: f64,

    /// Ambient temperature (°C)
    pub ambient_temp_c: f64,

    /// Starting pack temperature, ambient when unset (°C)
    pub initial_temp_c: Option<f64>,
}

impl Default for PackThermalConfig {
    fn default() -> Self {
        Self {
            thermal_mass_kg: 400.0,            // Truck traction pack
            specific_heat_j_per_kg_k: 1000.0,
            internal_resistance_ohm: 0.02,
            heat_transfer_coeff_w_per_k: 40.0,
            emergency_cooling_coeff_w_per_k: 400.0,
            ambient_temp_c: 25.0,
            initial_temp_c: None,
        }
    }
}

/// Current thermal state of the pack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackThermalState {
    pub temperature_c: f64,
    /// Rate of temperature change (°C/s)
    pub temp_rate_c_per_s: f64,
    pub heat_generation_w: f64,
    pub heat_dissipation_w: f64,
}

pub struct PackThermalModel {
    config: PackThermalConfig,
    state: PackThermalState,
}

impl PackThermalModel {
    pub fn new(config: PackThermalConfig) -> Self {
        let initial_temp = config.initial_temp_c.unwrap_or(config.ambient_temp_c);
        Self {
            state: PackThermalState {
                temperature_c: initial_temp,
                temp_rate_c_per_s: 0.0,
                heat_generation_w: 0.0,
                heat_dissipation_w: 0.0,
            },
            config,
        }
    }

    pub fn state(&self) -> &PackThermalState {
        &self.state
    }

    pub fn temperature_c(&self) -> f64 {
        self.state.temperature_c
    }

    pub fn config(&self) -> &PackThermalConfig {
        &self.config
    }

    pub fn set_ambient_temp(&mut self, temp_c: f64) {
        self.config.ambient_temp_c = temp_c;
    }

    /// Advance the model by `delta` with `current_a` flowing through the pack
    pub fn update(&mut self, current_a: f64, cooling_active: bool, delta: Duration) {
        let delta_secs = delta.as_secs_f64();
        if delta_secs <= 0.0 {
            return;
        }

        let temp_c = self.state.temperature_c;
        let resistance_ohm =
            self.config.internal_resistance_ohm * Self::resistance_factor(temp_c);
        let heat_gen_w = current_a.powi(2) * resistance_ohm;

        let mut coeff_w_per_k = self.config.heat_transfer_coeff_w_per_k;
        if cooling_active {
            coeff_w_per_k += self.config.emergency_cooling_coeff_w_per_k;
        }
        let heat_loss_w = coeff_w_per_k * (temp_c - self.config.ambient_temp_c);

        let thermal_capacity_j_per_k =
            self.config.thermal_mass_kg * self.config.specific_heat_j_per_kg_k;
        let temp_rate_c_per_s = (heat_gen_w - heat_loss_w) / thermal_capacity_j_per_k;

        let mut new_temp = temp_c + temp_rate_c_per_s * delta_secs;
        // Large steps must not overshoot ambient when only losses act
        if heat_gen_w == 0.0 {
            let ambient = self.config.ambient_temp_c;
            if (temp_c - ambient) * (new_temp - ambient) < 0.0 {
                new_temp = ambient;
            }
        }

        self.state = PackThermalState {
            temperature_c: new_temp,
            temp_rate_c_per_s,
            heat_generation_w: heat_gen_w,
            heat_dissipation_w: heat_loss_w,
        };
    }

    /// Internal resistance multiplier relative to 25°C
    ///
    /// - Below -20°C: 3x
    /// - -20-0°C: 3x down to 1.5x
    /// - 0-25°C: 1.5x down to 1x
    /// - Above 25°C: 1x
    fn resistance_factor(temp_c: f64) -> f64 {
        match temp_c {
            t if t < -20.0 => 3.0,
            t if t < 0.0 => 1.5 + (-t / 20.0) * 1.5,
            t if t < 25.0 => 1.0 + ((25.0 - t) / 25.0) * 0.5,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialization() {
        let model = PackThermalModel::new(PackThermalConfig::default());
        assert_eq!(model.temperature_c(), 25.0);

        let model = PackThermalModel::new(PackThermalConfig {
            ambient_temp_c: 45.0,
            initial_temp_c: Some(50.0),
            ..Default::default()
        });
        assert_eq!(model.temperature_c(), 50.0);
    }

    #[test]
    fn test_heating_under_load() {
        let mut model = PackThermalModel::new(PackThermalConfig::default());
        for _ in 0..60 {
            model.update(800.0, false, Duration::from_secs(60));
        }
        assert!(model.temperature_c() > 25.0);
        assert!(model.state().heat_generation_w > 0.0);
    }

    #[test]
    fn test_equilibrium_at_rest() {
        let mut model = PackThermalModel::new(PackThermalConfig::default());
        for _ in 0..120 {
            model.update(0.0, false, Duration::from_secs(60));
        }
        assert!((model.temperature_c() - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_emergency_cooling_cools_faster() {
        let config = PackThermalConfig {
            initial_temp_c: Some(70.0),
            ..Default::default()
        };
        let mut passive = PackThermalModel::new(config.clone());
        let mut cooled = PackThermalModel::new(config);

        for _ in 0..10 {
            passive.update(0.0, false, Duration::from_secs(60));
            cooled.update(0.0, true, Duration::from_secs(60));
        }
        assert!(cooled.temperature_c() < passive.temperature_c());
        assert!(cooled.temperature_c() >= 25.0);
    }

    #[test]
    fn test_no_overshoot_on_large_step() {
        let config = PackThermalConfig {
            initial_temp_c: Some(70.0),
            thermal_mass_kg: 1.0,
            ..Default::default()
        };
        let mut model = PackThermalModel::new(config);
        model.update(0.0, true, Duration::from_secs(3600));
        assert_eq!(model.temperature_c(), 25.0);
    }

    #[test]
    fn test_cold_pack_warms_toward_ambient() {
        let config = PackThermalConfig {
            initial_temp_c: Some(-25.0),
            ambient_temp_c: 10.0,
            ..Default::default()
        };
        let mut model = PackThermalModel::new(config);
        model.update(0.0, false, Duration::from_secs(600));
        assert!(model.temperature_c() > -25.0);
        assert!(model.temperature_c() < 10.0);
    }

    #[test]
    fn test_resistance_rises_in_cold() {
        assert_eq!(PackThermalModel::resistance_factor(30.0), 1.0);
        assert!(PackThermalModel::resistance_factor(-10.0) > PackThermalModel::resistance_factor(10.0));
        assert_eq!(PackThermalModel::resistance_factor(-30.0), 3.0);
    }
}
