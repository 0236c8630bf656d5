use std::time::Duration;

use crossbeam_channel::Receiver;
use tuneroom_core::{
    binding::AudioBinding, error::PlayerError, media::MediaElement, store::PlayerStore,
};

use crate::handle::AppCommand;

/// The store and the element it drives, owned by the UI thread
pub struct Player<E: MediaElement> {
    pub store: PlayerStore,
    binding: AudioBinding<E>,
    /// Latest playback failure not yet shown to the user
    last_error: Option<String>,
}

impl<E: MediaElement> Player<E> {
    pub fn new(store: PlayerStore, element: E) -> Self {
        let mut player = Self {
            store,
            binding: AudioBinding::new(element),
            last_error: None,
        };
        player.sync();
        player
    }

    pub fn position(&self) -> Duration {
        self.binding.element().current_time()
    }

    pub fn volume(&self) -> f32 {
        self.binding.element().volume()
    }

    /// Apply one command from the UI
    pub fn apply(&mut self, command: AppCommand) {
        match command {
            AppCommand::Player(command) => {
                self.store.dispatch(command);
                self.sync();
            }
            AppCommand::SetVolume(volume) => {
                self.binding.element_mut().set_volume(volume);
            }
            AppCommand::Seek(position) => {
                if let Err(e) = self.binding.element_mut().set_current_time(position) {
                    self.report(e);
                }
            }
        }
    }

    /// Drain pending commands, then let a finished track move the queue on
    pub fn tick(&mut self, cmd_rx: &Receiver<AppCommand>) {
        while let Ok(command) = cmd_rx.try_recv() {
            self.apply(command);
        }

        if let Err(e) = self.binding.poll(&mut self.store) {
            self.report(e);
        }
    }

    /// Failure since the last call, for the status bar
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    fn sync(&mut self) {
        if let Err(e) = self.binding.sync(&self.store) {
            self.report(e);
        }
    }

    fn report(&mut self, e: PlayerError) {
        log::error!("Playback error: {}", e);
        self.last_error = Some(e.to_string());
    }
}
