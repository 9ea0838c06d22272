//! Host-side stand-in for the actuator board
//!
//! `SimulatedBoard` plays the motor driver, status LED and current sense
//! input. The console pad turns stdin lines into pressure pad edges and lets
//! an operator jam the door to exercise the overload cutoff.

use std::io::BufRead;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::config::SimulationConfig;
use crate::hardware::{IndicatorDriver, MotorPins, RawSensor};
use crate::indicator::Indicator;
use crate::presence::{Edge, PresenceEvent};

#[derive(Debug)]
struct BoardState {
    drive_up: bool,
    drive_down: bool,
    indicator: Indicator,
    jammed: bool,
    loads: SimulationConfig,
}

/// Shared handle to the simulated board; clones see the same pins
#[derive(Debug, Clone)]
pub struct SimulatedBoard {
    inner: Arc<Mutex<BoardState>>,
}

impl Default for SimulatedBoard {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

impl SimulatedBoard {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BoardState {
                drive_up: false,
                drive_down: false,
                indicator: Indicator::Off,
                jammed: false,
                loads: config.clone(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        // Pin state stays valid even if a holder panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Block the door so a running motor draws stall current
    pub fn set_jammed(&self, jammed: bool) {
        self.lock().jammed = jammed;
    }

    #[cfg(test)]
    pub fn indicator(&self) -> Indicator {
        self.lock().indicator
    }
}

impl MotorPins for SimulatedBoard {
    fn set_drive_up(&mut self, on: bool) {
        self.lock().drive_up = on;
    }

    fn set_drive_down(&mut self, on: bool) {
        self.lock().drive_down = on;
    }

    fn drive_up(&self) -> bool {
        self.lock().drive_up
    }

    fn drive_down(&self) -> bool {
        self.lock().drive_down
    }
}

impl IndicatorDriver for SimulatedBoard {
    fn show(&mut self, indicator: Indicator) {
        let mut state = self.lock();
        if state.indicator != indicator {
            tracing::debug!(
                "LED -> {} (r/g/b pins {:?})",
                indicator.colour(),
                indicator.pin_levels()
            );
        }
        state.indicator = indicator;
    }
}

impl RawSensor for SimulatedBoard {
    fn sample(&mut self) -> f32 {
        let state = self.lock();
        let running = state.drive_up || state.drive_down;
        match (running, state.jammed) {
            (false, _) => state.loads.idle_load,
            (true, false) => state.loads.running_load,
            (true, true) => state.loads.stall_load,
        }
    }
}

/// Operator input on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Press,
    Release,
    Jam,
    Clear,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "press" | "p" => Some(Self::Press),
            "release" | "r" => Some(Self::Release),
            "jam" | "j" => Some(Self::Jam),
            "clear" | "c" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// Pressure pad driven from the console
///
/// Tracks the pad level so that only real level changes produce edges.
#[derive(Debug, Default)]
pub struct ConsolePad {
    pressed: bool,
}

impl ConsolePad {
    /// Apply a command to the board, returning the presence event it raises
    pub fn apply(
        &mut self,
        command: ConsoleCommand,
        board: &SimulatedBoard,
    ) -> Option<PresenceEvent> {
        match command {
            ConsoleCommand::Press if !self.pressed => {
                self.pressed = true;
                Some(PresenceEvent::from_edge(Edge::Falling))
            }
            ConsoleCommand::Release if self.pressed => {
                self.pressed = false;
                Some(PresenceEvent::from_edge(Edge::Rising))
            }
            ConsoleCommand::Press | ConsoleCommand::Release => None,
            ConsoleCommand::Jam => {
                tracing::info!("Door jammed");
                board.set_jammed(true);
                None
            }
            ConsoleCommand::Clear => {
                tracing::info!("Door obstruction cleared");
                board.set_jammed(false);
                None
            }
        }
    }

    /// Read commands from stdin on a dedicated thread
    ///
    /// The thread ends when stdin closes or the control loop drops its
    /// receiver.
    pub fn spawn(mut self, board: SimulatedBoard, events: mpsc::Sender<PresenceEvent>) {
        std::thread::spawn(move || {
            tracing::info!("Console pad ready: press | release | jam | clear");

            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!("Failed to read console input: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let Some(command) = ConsoleCommand::parse(&line) else {
                    tracing::warn!("Unknown console command: {}", line.trim());
                    continue;
                };

                if let Some(event) = self.apply(command, &board) {
                    if events.blocking_send(event).is_err() {
                        tracing::debug!("Control loop gone, closing console pad");
                        return;
                    }
                }
            }

            tracing::info!("Console input closed");
        });
    }
}
