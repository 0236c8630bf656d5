use std::time::Duration;

use crate::error::PlayerError;

/// A playback primitive the store can be reflected onto.
///
/// Mirrors the parts of an HTML audio element the player relies on:
/// a source, a position, play/pause, and the "ended" event.
pub trait MediaElement {
    /// Load a new source. Playback does not start until `play`.
    fn set_source(&mut self, url: &str) -> Result<(), PlayerError>;

    fn set_current_time(&mut self, position: Duration) -> Result<(), PlayerError>;

    fn current_time(&self) -> Duration;

    fn play(&mut self);

    fn pause(&mut self);

    fn volume(&self) -> f32;

    /// Set volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f32);

    /// True once after the loaded source finished playing
    fn take_ended(&mut self) -> bool;
}
