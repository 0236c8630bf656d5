use std::time::Duration;

use ratatui::widgets::ListState;
use tuneroom_core::store::{PlayerSnapshot, RepeatMode};

/// Application state for the TUI
pub struct AppState {
    // ==============================
    // Player State
    // ==============================
    /// Last snapshot taken from the store
    pub player: PlayerSnapshot,
    /// Current playback position
    pub position: Duration,
    /// Current volume (0.0 to 1.0)
    pub volume: f32,
    /// Who presence updates are shared as
    pub presence_label: String,
    /// Status message to display
    pub status_message: String,

    // ==============================
    // Queue State
    // ==============================
    pub queue_state: ListState,
}

impl AppState {
    pub fn new(presence_label: impl Into<String>) -> Self {
        Self {
            player: PlayerSnapshot::default(),
            position: Duration::ZERO,
            volume: 1.0,
            presence_label: presence_label.into(),
            status_message: "Queue is empty. Pass files or a song list as arguments.".to_string(),
            queue_state: ListState::default(),
        }
    }

    /// Take in a fresh snapshot of the player
    pub fn refresh(&mut self, snapshot: PlayerSnapshot, position: Duration, volume: f32) {
        let track_changed = snapshot.current_index != self.player.current_index
            || snapshot.current_song != self.player.current_song;
        let play_changed = snapshot.is_playing != self.player.is_playing;

        self.player = snapshot;
        self.position = position;
        self.volume = volume;

        if track_changed {
            if let Some(index) = self.player.current_index {
                self.queue_state.select(Some(index));
            }
        }
        if !self.player.queue.is_empty() && self.queue_state.selected().is_none() {
            self.queue_state.select(Some(0));
        }

        if track_changed || play_changed {
            self.status_message = self.describe();
        }
    }

    fn describe(&self) -> String {
        match (&self.player.current_song, self.player.is_playing) {
            (Some(song), true) => match self.player.current_index {
                Some(index) => format!("Track {}/{}: {}", index + 1, self.player.queue.len(), song),
                None => format!("Playing {}", song),
            },
            (Some(_), false) => "Paused".to_string(),
            (None, _) => "Idle".to_string(),
        }
    }

    /// Get the progress percentage (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        let duration = self.duration().as_secs_f32();
        if duration > 0.0 {
            (self.position.as_secs_f32() / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> Duration {
        self.player
            .current_song
            .as_ref()
            .map(|s| Duration::from_secs(u64::from(s.duration)))
            .unwrap_or_default()
    }

    /// Format time as MM:SS
    pub fn format_time(time: Duration) -> String {
        let total = time.as_secs();
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    pub fn repeat_label(&self) -> &'static str {
        match self.player.repeat {
            RepeatMode::Off => "➡️ Repeat off",
            RepeatMode::All => "🔁 Repeat all",
            RepeatMode::One => "🔂 Repeat one",
        }
    }

    pub fn shuffle_label(&self) -> &'static str {
        if self.player.shuffle {
            "🔀 Shuffle on"
        } else {
            "Shuffle off"
        }
    }

    // ==============================================
    // Queue Navigation Methods
    // ==============================================

    pub fn queue_next(&mut self) {
        let len = self.player.queue.len();
        if len == 0 {
            return;
        }
        let i = match self.queue_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.queue_state.select(Some(i));
    }

    pub fn queue_prev(&mut self) {
        let len = self.player.queue.len();
        if len == 0 {
            return;
        }
        let i = match self.queue_state.selected() {
            Some(i) if i > 0 => i - 1,
            _ => len - 1,
        };
        self.queue_state.select(Some(i));
    }

    /// Get currently selected queue index
    pub fn queue_selected(&self) -> Option<usize> {
        self.queue_state.selected()
    }
}
