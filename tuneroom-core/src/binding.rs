use std::time::Duration;

use crate::{
    error::PlayerError,
    media::MediaElement,
    store::{PlayerStore, RepeatMode},
};

/// Keeps a media element in step with the player store.
///
/// Call [`AudioBinding::sync`] after the store changes and
/// [`AudioBinding::poll`] on every tick so the end of a track moves the
/// queue along.
pub struct AudioBinding<E: MediaElement> {
    element: E,
    /// Last source handed to the element, loaded or not
    source: Option<String>,
    /// Last play state applied to the element
    applied_playing: Option<bool>,
}

impl<E: MediaElement> AudioBinding<E> {
    pub fn new(element: E) -> Self {
        Self {
            element,
            source: None,
            applied_playing: None,
        }
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    /// Reflect the store onto the element.
    ///
    /// A source that fails to load is returned once and not retried until
    /// the current song changes. Reporting it is left to the caller.
    pub fn sync(&mut self, store: &PlayerStore) -> Result<(), PlayerError> {
        let playing = store.is_playing();
        let mut started = false;
        let mut load_error = None;

        if let Some(song) = store.current_song() {
            if self.source.as_deref() != Some(song.audio_url.as_str()) {
                self.source = Some(song.audio_url.clone());
                match self.load(&song.audio_url) {
                    Ok(()) => {
                        if playing {
                            self.element.play();
                            started = true;
                        }
                    }
                    Err(e) => load_error = Some(e),
                }
            }
        }

        if self.applied_playing != Some(playing) {
            if !playing {
                self.element.pause();
            } else if !started && load_error.is_none() {
                self.element.play();
            }
            self.applied_playing = Some(playing);
        }

        match load_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// React to the element's "ended" event
    pub fn handle_ended(&mut self, store: &mut PlayerStore) -> Result<(), PlayerError> {
        if store.repeat() == RepeatMode::One {
            log::debug!("Repeating current track");
            return self.restart();
        }

        let finished = self.source.clone();
        store.play_next();

        // Same source again (a one-song queue on repeat all): start it over
        let same_source = store.current_song().map(|s| &s.audio_url) == finished.as_ref();
        if store.is_playing() && same_source {
            self.restart()?;
        }

        self.sync(store)
    }

    /// Check for the ended event and handle it; returns whether it fired
    pub fn poll(&mut self, store: &mut PlayerStore) -> Result<bool, PlayerError> {
        if !self.element.take_ended() {
            return Ok(false);
        }
        log::debug!("Track ended");
        self.handle_ended(store)?;
        Ok(true)
    }

    fn load(&mut self, url: &str) -> Result<(), PlayerError> {
        self.element.set_source(url)?;
        self.element.set_current_time(Duration::ZERO)
    }

    fn restart(&mut self) -> Result<(), PlayerError> {
        self.element.set_current_time(Duration::ZERO)?;
        self.element.play();
        Ok(())
    }
}
