//! Game loop thread: runs the simulation at the configured tick rate and
//! publishes snapshots.
//!
//! The engine is moved into the thread and never shared. Commands arrive
//! via `mpsc` and are applied between frames; the latest snapshot is stored
//! in shared state for polling.

use std::ops::ControlFlow;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use empire_core::state::WorldSnapshot;
use empire_sim::SimulationEngine;

use crate::state::{GameLoopCommand, LoopHandle};

/// Stop after this many frames; `None` runs until shutdown.
pub type FrameLimit = Option<u64>;

/// Apply one command to the engine. `Break` means the loop should stop.
pub fn dispatch(engine: &mut SimulationEngine, command: GameLoopCommand) -> ControlFlow<()> {
    match command {
        GameLoopCommand::Player(cmd) => engine.apply_command(cmd),
        GameLoopCommand::Pointer(event) => {
            if let Some(outcome) = engine.handle_pointer(event) {
                debug!(?outcome, "pointer gesture resolved");
            }
        }
        GameLoopCommand::Shutdown => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

/// Spawn the game loop in a new thread, taking ownership of `engine`.
pub fn spawn_game_loop(engine: SimulationEngine, limit: FrameLimit) -> std::io::Result<LoopHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot: Arc<Mutex<Option<WorldSnapshot>>> = Arc::new(Mutex::new(None));
    let shared = Arc::clone(&latest_snapshot);

    let thread = std::thread::Builder::new()
        .name("empire-game-loop".into())
        .spawn(move || run_game_loop(engine, cmd_rx, &shared, limit))?;

    Ok(LoopHandle {
        command_tx: cmd_tx,
        latest_snapshot,
        thread,
    })
}

/// The game loop. Runs until Shutdown, channel disconnect, or the frame limit.
fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<WorldSnapshot>>,
    limit: FrameLimit,
) {
    let tick_duration = Duration::from_secs_f64(engine.config().dt());
    let mut last_frame = Instant::now();
    let mut frames: u64 = 0;
    info!(?tick_duration, "game loop started");

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(command) => {
                    if dispatch(&mut engine, command).is_break() {
                        info!(frames, "game loop shut down");
                        return;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance by the measured frame time; the engine clamps stalls
        let now = Instant::now();
        let snapshot = engine.advance((now - last_frame).as_secs_f64());
        last_frame = now;
        frames += 1;

        // 3. Publish for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if limit.is_some_and(|max| frames >= max) {
            info!(frames, "frame limit reached");
            return;
        }

        // 4. Sleep out the rest of the frame
        let elapsed = last_frame.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use empire_core::commands::PlayerCommand;
    use empire_core::config::GameConfig;
    use empire_core::enums::GamePhase;
    use empire_sim::selection::PointerEvent;

    fn small_engine() -> SimulationEngine {
        let mut config = GameConfig::default();
        config.terrain.width = 32;
        config.terrain.height = 32;
        config.spawn.initial_agents = 10;
        SimulationEngine::new(config).unwrap()
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Player(PlayerCommand::ClearSelection))
            .unwrap();
        tx.send(GameLoopCommand::Pointer(PointerEvent::Cancel)).unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let commands: Vec<GameLoopCommand> = rx.try_iter().collect();

        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            GameLoopCommand::Player(PlayerCommand::ClearSelection)
        ));
        assert!(matches!(
            commands[1],
            GameLoopCommand::Pointer(PointerEvent::Cancel)
        ));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_dispatch_pause_resume() {
        let mut engine = small_engine();

        let flow = dispatch(&mut engine, GameLoopCommand::Player(PlayerCommand::Pause));
        assert!(flow.is_continue());
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Paused);
        let paused_tick = snap.time.tick;

        let snap = engine.tick();
        assert_eq!(snap.time.tick, paused_tick);

        dispatch(&mut engine, GameLoopCommand::Player(PlayerCommand::Resume));
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Active);
        assert!(snap.time.tick > paused_tick);

        assert!(dispatch(&mut engine, GameLoopCommand::Shutdown).is_break());
    }

    #[test]
    fn test_loop_stops_at_frame_limit() {
        let handle = spawn_game_loop(small_engine(), Some(5)).unwrap();
        handle.thread.join().unwrap();

        let snapshot = handle.latest_snapshot.lock().unwrap().clone().unwrap();
        assert_eq!(snapshot.stats.agent_count, 10);
    }

    #[test]
    fn test_loop_applies_commands_then_shuts_down() {
        let handle = spawn_game_loop(small_engine(), None).unwrap();
        handle
            .send(GameLoopCommand::Player(PlayerCommand::SpawnAgents {
                count: 3,
                near: empire_core::types::Position::ORIGIN,
            }))
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut agents = 0;
        while Instant::now() < deadline {
            agents = handle.latest().map_or(0, |s| s.stats.agent_count);
            if agents == 13 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(agents, 13);

        handle.shutdown().unwrap();
    }

    #[test]
    fn test_snapshot_serialization_is_fast() {
        let mut engine = SimulationEngine::new(GameConfig::default()).unwrap();
        for _ in 0..50 {
            engine.tick();
        }

        let snapshot = engine.tick();
        let start = Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(50),
            "Snapshot serialization took {:?}",
            elapsed
        );
        assert!(json.contains("\"agents\""));
    }
}
