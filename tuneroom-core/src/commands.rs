use crate::song::Song;

/// Commands sent from a front end to the player store
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Start or pause playback
    TogglePlay,
    /// Skip to the next track
    Next,
    /// Skip to the previous track
    Previous,
    /// Turn shuffle on or off
    ToggleShuffle,
    /// Cycle the repeat mode
    ToggleRepeat,
    /// Play the queued track at this index
    PlayIndex(usize),
    /// Replace the queue and play from `start_index`
    PlayAlbum { songs: Vec<Song>, start_index: usize },
}
