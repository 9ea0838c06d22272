mod config;
mod control;
mod door;
mod error;
mod hardware;
mod indicator;
mod presence;
mod safety;
mod sensor;
mod sim;

use anyhow::Result;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::{mpsc, watch};

use config::ConfigManager;
use control::ControlLoop;
use door::DoorController;
use safety::SafetyMonitor;
use sensor::CurrentSensor;
use sim::{ConsolePad, SimulatedBoard};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "padlift=info".into()),
        )
        .init();

    tracing::info!("Starting padlift door controller v{}", env!("CARGO_PKG_VERSION"));

    // Config path: --config argument, then CONFIG_PATH, then the XDG default
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("CONFIG_PATH").map(PathBuf::from));

    let config_manager = ConfigManager::new(config_path).await?;
    let config = config_manager.config().clone();

    tracing::info!("Configuration ({:?}):", config_manager.config_path());
    tracing::info!("  Cycle time: {} s", config.controller.cycle_time_secs);
    tracing::info!("  Door rise time: {} s", config.controller.door_rise_time_secs);
    tracing::info!("  Door fall time: {} s", config.controller.door_fall_time_secs);
    tracing::info!("  Motor current limit: {} A", config.safety.motor_current_limit_amps);
    tracing::info!(
        "  Sense circuit: {} V over {} ohm",
        config.sensor.supply_voltage,
        config.sensor.series_resistance_ohms
    );

    let board = SimulatedBoard::new(&config.simulation);
    let door = DoorController::new(board.clone(), board.clone(), &config.controller);
    let sensor = CurrentSensor::new(board.clone(), &config.sensor);
    let safety = SafetyMonitor::new(&config.safety);
    let mut control = ControlLoop::new(door, sensor, safety, &config.controller);

    let (events_tx, events_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Pressure pad input
    ConsolePad::default().spawn(board, events_tx);

    // Spawn the control loop
    let control_handle = tokio::spawn(async move {
        control.run(events_rx, shutdown_rx).await;
        control
    });

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received shutdown signal");
        }
        Err(err) => {
            tracing::error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    // Cleanup: let the control loop stop the motor before exiting
    tracing::info!("Shutting down...");
    let _ = shutdown_tx.send(true);
    match control_handle.await {
        Ok(control) => {
            let state = control.door().state();
            tracing::info!("Motor stopped, last known door position: {:?}", state.position());
        }
        Err(e) => {
            tracing::error!("Control loop task failed: {}", e);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
