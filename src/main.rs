use anyhow::Result;
use std::time::Duration;
use thermal_supervisor::{config, simulation, telemetry};
use config::Config;
use simulation::ScenarioRunner;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::load()?;
    init_tracing(&cfg.logging);

    let scenario = cfg.simulation.load_scenario()?;
    info!(
        scenario = %scenario.name,
        max_safe_temp_c = cfg.thermal.max_safe_temp_c,
        "starting thermal supervisor simulation"
    );

    // The runner owns the supervisor; this task is its only caller. Alerts go to the log.
    let mut runner = ScenarioRunner::new(scenario, cfg.thermal.clone())?;
    let mut interval = tokio::time::interval(Duration::from_millis(cfg.simulation.tick_millis.max(1)));
    let shutdown = telemetry::shutdown_signal();
    tokio::pin!(shutdown);

    while !runner.is_finished() {
        tokio::select! {
            signal = &mut shutdown => {
                warn!(signal, "simulation interrupted");
                break;
            }
            _ = interval.tick() => {
                if let Some(report) = runner.next_tick() {
                    info!(
                        tick = report.tick,
                        temperature_c = report.temperature_c,
                        state = %report.fault_state,
                        applied_discharge_a = report.applied_discharge_a,
                        can_charge = report.can_charge,
                        can_discharge = report.can_discharge,
                        "sample processed"
                    );
                }
            }
        }
    }

    let final_state = runner.supervisor().snapshot();
    let transitions = runner.supervisor().recent_transitions(usize::MAX);
    info!(
        state = %final_state.fault_state,
        alert = %final_state.alert_message,
        transitions = transitions.len(),
        cold_faults = transitions.iter().filter(|t| t.to.is_under_temperature()).count(),
        critical_faults = transitions.iter().filter(|t| t.to.is_critical()).count(),
        "simulation complete"
    );
    Ok(())
}
