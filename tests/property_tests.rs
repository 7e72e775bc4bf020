//! Property tests for the supervisor's safety invariants.

use proptest::prelude::*;
use thermal_supervisor::hardware::SimulatedHardware;
use thermal_supervisor::{FaultState, ThermalLimits, ThermalSupervisor};

fn supervisor() -> (ThermalSupervisor, SimulatedHardware) {
    let hw = SimulatedHardware::new();
    let sup = ThermalSupervisor::new(ThermalLimits::default(), hw.capabilities())
        .expect("default limits are valid");
    (sup, hw)
}

fn assert_state_invariants(sup: &ThermalSupervisor) {
    let state = sup.state();
    match state.fault_state {
        FaultState::OverTemperatureCritical => {
            assert!(state.manual_reset_required);
            assert!(state.contactors_open);
            assert!(state.charging_inhibited);
            assert!(state.discharging_inhibited);
        }
        FaultState::UnderTemperatureChargeInhibit => assert!(state.charging_inhibited),
        FaultState::UnderTemperatureDischargeInhibit => assert!(state.discharging_inhibited),
        _ => {}
    }
    if state.discharging_inhibited {
        assert_eq!(state.discharge_current_limit_a, 0.0);
    }
    assert!(state.discharge_current_limit_a <= sup.limits().max_discharge_current_a);
    assert!(sup.allowed_discharge_current_limit() <= sup.limits().max_discharge_current_a);
    if !sup.can_discharge() {
        assert_eq!(sup.allowed_discharge_current_limit(), 0.0);
    }
}

proptest! {
    #[test]
    fn prop_over_temperature_dominates(prior in -60.0f64..100.0, t in 60.001f64..200.0) {
        let (mut sup, hw) = supervisor();
        sup.monitor_temperature(prior);
        sup.monitor_temperature(t);

        prop_assert_eq!(sup.fault_state(), FaultState::OverTemperatureCritical);
        prop_assert!(!sup.can_charge());
        prop_assert!(!sup.can_discharge());
        prop_assert_eq!(sup.allowed_discharge_current_limit(), 0.0);
        prop_assert!(hw.contactors.is_open());
    }

    #[test]
    fn prop_latch_holds_until_reset(readings in prop::collection::vec(-60.0f64..60.0, 1..50)) {
        let (mut sup, hw) = supervisor();
        sup.monitor_temperature(75.0);
        for t in readings {
            sup.monitor_temperature(t);
            prop_assert_eq!(sup.fault_state(), FaultState::OverTemperatureCritical);
            prop_assert!(sup.contactors_open());
        }
        prop_assert_eq!(hw.driver.count(), 1);
        prop_assert_eq!(hw.contactors.open_commands(), 1);
    }

    #[test]
    fn prop_reset_iff_below_hysteresis(t in -60.0f64..60.0) {
        let (mut sup, _hw) = supervisor();
        sup.monitor_temperature(75.0);
        sup.monitor_temperature(t);

        let accepted = sup.perform_manual_reset().is_accepted();
        prop_assert_eq!(accepted, t <= sup.limits().reset_threshold_c());
        if accepted {
            prop_assert!(!sup.contactors_open());
            prop_assert!(!sup.fault_state().is_critical());
        }
    }

    #[test]
    fn prop_invariants_hold_for_any_sequence(
        readings in prop::collection::vec(-60.0f64..90.0, 1..60),
        resets in prop::collection::vec(any::<bool>(), 60),
    ) {
        let (mut sup, _hw) = supervisor();
        for (t, reset) in readings.into_iter().zip(resets) {
            sup.monitor_temperature(t);
            if reset {
                sup.perform_manual_reset();
            }
            sup.allow_charging();
            sup.allow_full_discharge();
            assert_state_invariants(&sup);
        }
    }

    #[test]
    fn prop_repeated_sample_is_idempotent(t in -60.0f64..90.0, repeats in 1usize..10) {
        let (mut sup, hw) = supervisor();
        sup.monitor_temperature(t);
        let snapshot = sup.snapshot();
        let driver_alerts = hw.driver.count();
        let controller_alerts = hw.controller.count();

        for _ in 0..repeats {
            sup.monitor_temperature(t);
        }
        prop_assert_eq!(sup.snapshot(), snapshot);
        prop_assert_eq!(hw.driver.count(), driver_alerts);
        prop_assert_eq!(hw.controller.count(), controller_alerts);
    }
}
