//! State shared between the runner and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use empire_core::commands::PlayerCommand;
use empire_core::state::WorldSnapshot;
use empire_sim::selection::PointerEvent;

/// Commands sent from the runner to the game loop thread.
#[derive(Debug, Clone)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    Player(PlayerCommand),
    /// A raw pointer event for the selection system.
    Pointer(PointerEvent),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handle to a running game loop thread.
///
/// The thread owns the engine outright; the runner only talks to it through
/// the channel and reads the most recent snapshot.
pub struct LoopHandle {
    pub command_tx: mpsc::Sender<GameLoopCommand>,
    /// Latest snapshot, replaced after every frame.
    pub latest_snapshot: Arc<Mutex<Option<WorldSnapshot>>>,
    pub thread: JoinHandle<()>,
}

impl LoopHandle {
    /// Forward a command. Fails once the loop has exited.
    pub fn send(&self, command: GameLoopCommand) -> Result<(), mpsc::SendError<GameLoopCommand>> {
        self.command_tx.send(command)
    }

    /// Clone of the latest snapshot, if a frame has run yet.
    pub fn latest(&self) -> Option<WorldSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|lock| lock.clone())
    }

    /// Ask the loop to stop and wait for it.
    pub fn shutdown(self) -> std::thread::Result<()> {
        // A closed channel means the loop already stopped.
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);
        self.thread.join()
    }
}
