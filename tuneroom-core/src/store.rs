use rand::{Rng, SeedableRng, rngs::StdRng};
use strum::{EnumIter, EnumString, IntoEnumIterator};

use crate::{
    commands::PlayerCommand,
    presence::{Activity, NoPresence, PresenceSink},
    song::Song,
};

/// Repeat mode for queue playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum RepeatMode {
    #[default]
    #[strum(serialize = "off")]
    Off,
    #[strum(serialize = "all")]
    All,
    #[strum(serialize = "one")]
    One,
}

impl RepeatMode {
    /// Off -> All -> One -> Off, in declaration order
    pub fn cycle(self) -> RepeatMode {
        RepeatMode::iter()
            .cycle()
            .skip_while(|mode| *mode != self)
            .nth(1)
            .unwrap_or_default()
    }
}

/// Cloneable view of the store for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub current_song: Option<Song>,
    pub is_playing: bool,
    pub queue: Vec<Song>,
    pub current_index: Option<usize>,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

/// Playback state: what is queued, what is current, and how to move on.
///
/// Every mutator that changes what the user hears publishes an [`Activity`]
/// to the presence sink.
pub struct PlayerStore {
    current_song: Option<Song>,
    is_playing: bool,
    queue: Vec<Song>,
    current_index: Option<usize>,
    shuffle: bool,
    repeat: RepeatMode,

    presence: Box<dyn PresenceSink>,
    rng: StdRng,
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::new(Box::new(NoPresence))
    }
}

impl std::fmt::Debug for PlayerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerStore")
            .field("current_song", &self.current_song)
            .field("is_playing", &self.is_playing)
            .field("queue_len", &self.queue.len())
            .field("current_index", &self.current_index)
            .field("shuffle", &self.shuffle)
            .field("repeat", &self.repeat)
            .finish()
    }
}

impl PlayerStore {
    pub fn new(presence: Box<dyn PresenceSink>) -> Self {
        Self::with_rng(presence, StdRng::from_os_rng())
    }

    /// Use a specific generator for shuffle picks
    pub fn with_rng(presence: Box<dyn PresenceSink>, rng: StdRng) -> Self {
        Self {
            current_song: None,
            is_playing: false,
            queue: Vec::new(),
            current_index: None,
            shuffle: false,
            repeat: RepeatMode::Off,
            presence,
            rng,
        }
    }

    // ==============================================
    // Accessors
    // ==============================================

    pub fn current_song(&self) -> Option<&Song> {
        self.current_song.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn queue(&self) -> &[Song] {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_song: self.current_song.clone(),
            is_playing: self.is_playing,
            queue: self.queue.clone(),
            current_index: self.current_index,
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }

    // ==============================================
    // Mutators
    // ==============================================

    /// Replace the queue without interrupting what is current
    pub fn initialize_queue(&mut self, songs: Vec<Song>) {
        if self.current_song.is_none() {
            self.current_song = songs.first().cloned();
        }
        if self.current_index.is_none() && !songs.is_empty() {
            self.current_index = Some(0);
        }
        self.queue = songs;
        log::debug!("Queue initialized with {} songs", self.queue.len());
    }

    /// Replace the queue and start playing at `start_index`.
    /// Returns false (and changes nothing) for an empty list or a bad index.
    pub fn play_album(&mut self, songs: Vec<Song>, start_index: usize) -> bool {
        let Some(song) = songs.get(start_index).cloned() else {
            if !songs.is_empty() {
                log::warn!(
                    "Start index {} out of range for {} songs",
                    start_index,
                    songs.len()
                );
            }
            return false;
        };

        self.presence.publish(Activity::playing(&song));

        log::info!("Playing album from track {}: {}", start_index + 1, song);
        self.queue = songs;
        self.current_song = Some(song);
        self.current_index = Some(start_index);
        self.is_playing = true;
        true
    }

    /// Make `song` current and play it. Its queue position is looked up by id;
    /// a song that is not queued leaves the index where it was.
    pub fn set_current_song(&mut self, song: Option<Song>) {
        let Some(song) = song else {
            return;
        };

        self.presence.publish(Activity::playing(&song));

        if let Some(index) = self.queue.iter().position(|s| s.id == song.id) {
            self.current_index = Some(index);
        }
        log::info!("Now playing: {}", song);
        self.current_song = Some(song);
        self.is_playing = true;
    }

    pub fn toggle_play(&mut self) {
        let will_start_playing = !self.is_playing;

        let activity = match (&self.current_song, will_start_playing) {
            (Some(song), true) => Activity::playing(song),
            _ => Activity::Idle,
        };
        self.presence.publish(activity);

        self.is_playing = will_start_playing;
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        log::debug!("Shuffle {}", if self.shuffle { "on" } else { "off" });
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = self.repeat.cycle();
        log::debug!("Repeat {}", self.repeat);
    }

    pub fn play_next(&mut self) {
        let candidate = self
            .shuffle_pick()
            .unwrap_or_else(|| self.current_index.map_or(0, |i| i + 1));

        let next_index = if candidate < self.queue.len() {
            Some(candidate)
        } else {
            match self.repeat {
                RepeatMode::All => Some(0),
                RepeatMode::One => self.current_index,
                RepeatMode::Off => None,
            }
        };

        self.advance_to(next_index);
    }

    pub fn play_previous(&mut self) {
        let candidate = self
            .shuffle_pick()
            .or_else(|| self.current_index.and_then(|i| i.checked_sub(1)));

        let prev_index = match candidate {
            Some(index) if index < self.queue.len() => Some(index),
            _ => match self.repeat {
                RepeatMode::All => self.queue.len().checked_sub(1),
                RepeatMode::One => self.current_index,
                RepeatMode::Off => None,
            },
        };

        self.advance_to(prev_index);
    }

    /// Apply a command coming from a front end
    pub fn dispatch(&mut self, command: PlayerCommand) {
        log::trace!("dispatch {:?}", command);
        match command {
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::Next => self.play_next(),
            PlayerCommand::Previous => self.play_previous(),
            PlayerCommand::ToggleShuffle => self.toggle_shuffle(),
            PlayerCommand::ToggleRepeat => self.toggle_repeat(),
            PlayerCommand::PlayIndex(index) => {
                let song = self.queue.get(index).cloned();
                if song.is_none() {
                    log::warn!("No queued song at index {}", index);
                }
                self.set_current_song(song);
            }
            PlayerCommand::PlayAlbum { songs, start_index } => {
                self.play_album(songs, start_index);
            }
        }
    }

    /// A random index other than the current one, when shuffle has a choice to make
    fn shuffle_pick(&mut self) -> Option<usize> {
        if !self.shuffle || self.queue.len() < 2 {
            return None;
        }

        loop {
            let index = self.rng.random_range(0..self.queue.len());
            if Some(index) != self.current_index {
                return Some(index);
            }
        }
    }

    /// Move to the queued song at `index`, or stop when there is none
    fn advance_to(&mut self, index: Option<usize>) {
        let target = index.and_then(|i| self.queue.get(i).cloned().map(|song| (i, song)));

        match target {
            Some((index, song)) => {
                self.presence.publish(Activity::playing(&song));
                log::info!("Track {}/{}: {}", index + 1, self.queue.len(), song);
                self.current_song = Some(song);
                self.current_index = Some(index);
                self.is_playing = true;
            }
            None => {
                log::info!("Reached the end of the queue");
                self.is_playing = false;
                self.presence.publish(Activity::Idle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        published: Mutex<Vec<Activity>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<String> {
            self.published
                .lock()
                .unwrap()
                .drain(..)
                .map(|a| a.to_string())
                .collect()
        }
    }

    impl PresenceSink for RecordingSink {
        fn publish(&self, activity: Activity) {
            self.published.lock().unwrap().push(activity);
        }
    }

    fn songs(n: usize) -> Vec<Song> {
        (0..n)
            .map(|i| {
                Song::new(
                    format!("id{}", i),
                    format!("Song {}", i),
                    "Artist",
                    format!("/songs/{}.mp3", i),
                )
            })
            .collect()
    }

    fn store() -> (PlayerStore, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let store = PlayerStore::with_rng(Box::new(Arc::clone(&sink)), StdRng::seed_from_u64(7));
        (store, sink)
    }

    #[test]
    fn starts_empty_and_paused() {
        let (store, _) = store();
        assert_eq!(store.snapshot(), PlayerSnapshot::default());
        assert_eq!(store.repeat(), RepeatMode::Off);
    }

    #[test]
    fn initialize_queue_keeps_what_is_current() {
        let (mut store, sink) = store();
        store.initialize_queue(songs(3));
        assert_eq!(store.current_song().unwrap().id, "id0");
        assert_eq!(store.current_index(), Some(0));
        assert!(!store.is_playing());

        store.dispatch(PlayerCommand::PlayIndex(2));
        sink.take();

        let mut fresh = songs(5);
        fresh.reverse();
        store.initialize_queue(fresh);
        assert_eq!(store.queue().len(), 5);
        assert_eq!(store.current_song().unwrap().id, "id2");
        assert_eq!(store.current_index(), Some(2));
        assert!(sink.take().is_empty());
    }

    #[test]
    fn initialize_with_nothing_leaves_no_index() {
        let (mut store, _) = store();
        store.initialize_queue(Vec::new());
        assert_eq!(store.current_song(), None);
        assert_eq!(store.current_index(), None);
    }

    #[test]
    fn play_album_starts_at_index() {
        let (mut store, sink) = store();
        assert!(store.play_album(songs(4), 2));
        assert_eq!(store.current_index(), Some(2));
        assert_eq!(store.current_song().unwrap().id, "id2");
        assert!(store.is_playing());
        assert_eq!(sink.take(), ["Playing Song 2 by Artist"]);
    }

    #[test]
    fn play_album_rejects_empty_and_out_of_range() {
        let (mut store, sink) = store();
        assert!(!store.play_album(Vec::new(), 0));
        assert!(!store.play_album(songs(2), 2));
        assert!(store.queue().is_empty());
        assert!(!store.is_playing());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn set_current_song_finds_queue_position() {
        let (mut store, sink) = store();
        store.initialize_queue(songs(3));
        store.set_current_song(Some(songs(3)[1].clone()));
        assert_eq!(store.current_index(), Some(1));
        assert!(store.is_playing());
        assert_eq!(sink.take(), ["Playing Song 1 by Artist"]);

        let stranger = Song::new("elsewhere", "Other", "Someone", "/o.mp3");
        store.set_current_song(Some(stranger));
        assert_eq!(store.current_index(), Some(1));
        assert_eq!(store.current_song().unwrap().id, "elsewhere");

        store.set_current_song(None);
        assert_eq!(store.current_song().unwrap().id, "elsewhere");
        assert_eq!(sink.take(), ["Playing Other by Someone"]);
    }

    #[test]
    fn toggle_play_reports_playing_or_idle() {
        let (mut store, sink) = store();
        store.toggle_play();
        assert!(store.is_playing());
        store.toggle_play();
        assert!(!store.is_playing());
        assert_eq!(sink.take(), ["Idle", "Idle"]);

        store.initialize_queue(songs(1));
        store.toggle_play();
        store.toggle_play();
        assert_eq!(sink.take(), ["Playing Song 0 by Artist", "Idle"]);
    }

    #[test]
    fn repeat_cycles_through_three_modes() {
        let (mut store, sink) = store();
        let mut seen = Vec::new();
        for _ in 0..4 {
            store.toggle_repeat();
            seen.push(store.repeat());
        }
        assert_eq!(
            seen,
            [RepeatMode::All, RepeatMode::One, RepeatMode::Off, RepeatMode::All]
        );
        store.toggle_shuffle();
        assert!(store.shuffle());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn repeat_mode_parses_case_insensitively() {
        assert_eq!(RepeatMode::from_str("ALL").unwrap(), RepeatMode::All);
        assert_eq!(RepeatMode::from_str("one").unwrap(), RepeatMode::One);
        assert!(RepeatMode::from_str("twice").is_err());
        assert_eq!(RepeatMode::One.to_string(), "one");
    }

    #[test]
    fn next_walks_forward_then_stops() {
        let (mut store, sink) = store();
        store.play_album(songs(2), 0);
        sink.take();

        store.play_next();
        assert_eq!(store.current_index(), Some(1));
        assert!(store.is_playing());

        store.play_next();
        assert!(!store.is_playing());
        assert_eq!(store.current_index(), Some(1));
        assert_eq!(store.current_song().unwrap().id, "id1");
        assert_eq!(sink.take(), ["Playing Song 1 by Artist", "Idle"]);
    }

    #[test]
    fn next_wraps_with_repeat_all_and_holds_with_repeat_one() {
        let (mut store, _) = store();
        store.play_album(songs(3), 2);
        store.toggle_repeat();
        store.play_next();
        assert_eq!(store.current_index(), Some(0));

        store.play_album(songs(3), 2);
        store.toggle_repeat();
        assert_eq!(store.repeat(), RepeatMode::One);
        store.play_next();
        assert_eq!(store.current_index(), Some(2));
        assert!(store.is_playing());
    }

    #[test]
    fn empty_queue_goes_idle() {
        let (mut store, sink) = store();
        store.play_next();
        store.play_previous();
        assert!(!store.is_playing());
        assert_eq!(store.current_index(), None);
        assert_eq!(sink.take(), ["Idle", "Idle"]);

        store.toggle_repeat();
        store.play_next();
        store.play_previous();
        assert_eq!(store.current_song(), None);
    }

    #[test]
    fn previous_walks_back_and_wraps() {
        let (mut store, sink) = store();
        store.play_album(songs(3), 1);
        store.play_previous();
        assert_eq!(store.current_index(), Some(0));

        store.play_previous();
        assert!(!store.is_playing());
        assert_eq!(store.current_index(), Some(0));

        store.toggle_repeat();
        store.play_previous();
        assert_eq!(store.current_index(), Some(2));
        assert!(store.is_playing());

        store.toggle_repeat();
        store.play_album(songs(3), 0);
        sink.take();
        store.play_previous();
        assert_eq!(store.current_index(), Some(0));
        assert_eq!(sink.take(), ["Playing Song 0 by Artist"]);
    }

    #[test]
    fn shuffle_never_repeats_the_current_track() {
        let (mut store, _) = store();
        store.play_album(songs(4), 0);
        store.toggle_shuffle();

        let mut visited = [false; 4];
        for step in 0..200 {
            let before = store.current_index();
            if step % 2 == 0 {
                store.play_next();
            } else {
                store.play_previous();
            }
            assert_ne!(store.current_index(), before);
            assert!(store.is_playing());
            visited[store.current_index().unwrap()] = true;
        }
        assert!(visited.iter().all(|v| *v));
    }

    #[test]
    fn shuffle_with_one_song_follows_repeat_rules() {
        let (mut store, _) = store();
        store.play_album(songs(1), 0);
        store.toggle_shuffle();

        store.play_next();
        assert!(!store.is_playing());

        store.toggle_repeat();
        store.toggle_repeat();
        store.play_next();
        assert_eq!(store.current_index(), Some(0));
        assert!(store.is_playing());
    }

    #[test]
    fn play_index_command_uses_the_queue() {
        let (mut store, sink) = store();
        store.initialize_queue(songs(3));
        store.dispatch(PlayerCommand::PlayIndex(1));
        assert_eq!(store.current_index(), Some(1));

        store.dispatch(PlayerCommand::PlayIndex(9));
        assert_eq!(store.current_index(), Some(1));
        assert_eq!(sink.take(), ["Playing Song 1 by Artist"]);
    }
}
