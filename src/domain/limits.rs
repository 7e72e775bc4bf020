use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Thermal limit configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitsError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("threshold ordering violated: {lower} ({lower_c}°C) must be below {upper} ({upper_c}°C)")]
    Ordering {
        lower: &'static str,
        lower_c: f64,
        upper: &'static str,
        upper_c: f64,
    },
    #[error("discharge current limits invalid: limited {limited_a}A, max {max_a}A")]
    CurrentLimits { limited_a: f64, max_a: f64 },
    #[error("critical recovery hysteresis must not be negative, got {0}°C")]
    NegativeHysteresis(f64),
}

/// Thermal thresholds and current limits of the supervised pack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalLimits {
    /// Above this the pack is isolated (°C)
    pub max_safe_temp_c: f64,
    /// Charging is inhibited below this (°C)
    pub min_safe_charge_temp_c: f64,
    /// Discharging is inhibited below this (°C)
    pub min_safe_discharge_temp_c: f64,
    /// Discharge current is limited below this (°C)
    pub min_limited_discharge_temp_c: f64,
    /// Full discharge current ceiling (A)
    pub max_discharge_current_a: f64,
    /// Discharge current ceiling in the cold band (A)
    pub limited_discharge_current_a: f64,
    /// Margin below `max_safe_temp_c` required before a manual reset (°C)
    pub critical_recovery_hysteresis_c: f64,
    /// Temperature assumed before the first sample arrives (°C)
    pub nominal_temp_c: f64,
}

impl Default for ThermalLimits {
    fn default() -> Self {
        Self {
            max_safe_temp_c: 60.0,
            min_safe_charge_temp_c: 0.0,
            min_safe_discharge_temp_c: -20.0,
            min_limited_discharge_temp_c: -10.0,
            max_discharge_current_a: 1000.0, // Heavy truck pack
            limited_discharge_current_a: 100.0,
            critical_recovery_hysteresis_c: 5.0,
            nominal_temp_c: 25.0,
        }
    }
}

impl ThermalLimits {
    /// Highest temperature at which a latched over-temperature fault may be reset
    pub fn reset_threshold_c(&self) -> f64 {
        self.max_safe_temp_c - self.critical_recovery_hysteresis_c
    }

    pub fn validate(&self) -> Result<(), LimitsError> {
        let fields = [
            ("max_safe_temp_c", self.max_safe_temp_c),
            ("min_safe_charge_temp_c", self.min_safe_charge_temp_c),
            ("min_safe_discharge_temp_c", self.min_safe_discharge_temp_c),
            ("min_limited_discharge_temp_c", self.min_limited_discharge_temp_c),
            ("max_discharge_current_a", self.max_discharge_current_a),
            ("limited_discharge_current_a", self.limited_discharge_current_a),
            ("critical_recovery_hysteresis_c", self.critical_recovery_hysteresis_c),
            ("nominal_temp_c", self.nominal_temp_c),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(LimitsError::NotFinite { field, value });
            }
        }

        let ordered = [
            ("min_safe_discharge_temp_c", self.min_safe_discharge_temp_c),
            ("min_limited_discharge_temp_c", self.min_limited_discharge_temp_c),
            ("min_safe_charge_temp_c", self.min_safe_charge_temp_c),
            ("max_safe_temp_c", self.max_safe_temp_c),
        ];
        for pair in ordered.windows(2) {
            let (lower, lower_c) = pair[0];
            let (upper, upper_c) = pair[1];
            if lower_c >= upper_c {
                return Err(LimitsError::Ordering {
                    lower,
                    lower_c,
                    upper,
                    upper_c,
                });
            }
        }

        if self.limited_discharge_current_a < 0.0
            || self.limited_discharge_current_a > self.max_discharge_current_a
        {
            return Err(LimitsError::CurrentLimits {
                limited_a: self.limited_discharge_current_a,
                max_a: self.max_discharge_current_a,
            });
        }

        if self.critical_recovery_hysteresis_c < 0.0 {
            return Err(LimitsError::NegativeHysteresis(
                self.critical_recovery_hysteresis_c,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_valid() {
        assert!(ThermalLimits::default().validate().is_ok());
    }

    #[test]
    fn test_reset_threshold() {
        let limits = ThermalLimits::default();
        assert_eq!(limits.reset_threshold_c(), 55.0);
    }

    #[test]
    fn test_ordering_violation() {
        let limits = ThermalLimits {
            min_limited_discharge_temp_c: 5.0, // Above the charge minimum
            ..Default::default()
        };
        match limits.validate() {
            Err(LimitsError::Ordering { lower, upper, .. }) => {
                assert_eq!(lower, "min_limited_discharge_temp_c");
                assert_eq!(upper, "min_safe_charge_temp_c");
            }
            other => panic!("expected ordering error, got {:?}", other),
        }
    }

    #[test]
    fn test_equal_thresholds_rejected() {
        let limits = ThermalLimits {
            min_safe_discharge_temp_c: -10.0,
            ..Default::default()
        };
        assert!(matches!(limits.validate(), Err(LimitsError::Ordering { .. })));
    }

    #[test]
    fn test_non_finite_rejected() {
        let limits = ThermalLimits {
            max_safe_temp_c: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            limits.validate(),
            Err(LimitsError::NotFinite { field: "max_safe_temp_c", .. })
        ));
    }

    #[test]
    fn test_current_limits_rejected() {
        let limits = ThermalLimits {
            limited_discharge_current_a: 1500.0,
            ..Default::default()
        };
        assert!(matches!(limits.validate(), Err(LimitsError::CurrentLimits { .. })));
    }

    #[test]
    fn test_negative_hysteresis_rejected() {
        let limits = ThermalLimits {
            critical_recovery_hysteresis_c: -1.0,
            ..Default::default()
        };
        assert_eq!(limits.validate(), Err(LimitsError::NegativeHysteresis(-1.0)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let limits: ThermalLimits = toml::from_str("max_safe_temp_c = 58.0").unwrap();
        assert_eq!(limits.max_safe_temp_c, 58.0);
        assert_eq!(limits.limited_discharge_current_a, 100.0);
    }
}
