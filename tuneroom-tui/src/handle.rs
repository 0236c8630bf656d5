use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tuneroom_core::commands::PlayerCommand;

/// Everything the UI can ask of the player
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Player(PlayerCommand),
    /// Set volume (0.0 to 1.0)
    SetVolume(f32),
    /// Seek to position
    Seek(Duration),
}

/// Sending side of the UI -> player channel
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    pub cmd_tx: Sender<AppCommand>,
}

impl PlayerHandle {
    pub fn new() -> (Self, Receiver<AppCommand>) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        (Self { cmd_tx }, cmd_rx)
    }

    pub fn send(&self, command: PlayerCommand) -> anyhow::Result<()> {
        self.cmd_tx.send(AppCommand::Player(command))?;
        Ok(())
    }
}
