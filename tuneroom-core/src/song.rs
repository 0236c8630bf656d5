use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use lofty::{
    file::{AudioFile, TaggedFileExt},
    probe::Probe,
    tag::Accessor,
};
use serde::{Deserialize, Serialize};

use crate::error::SongError;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac"];

const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// A playable track, shaped like the song documents served by the chat backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Source handed to the media element
    pub audio_url: String,
    /// Length in whole seconds
    #[serde(default)]
    pub duration: u32,
}

impl Song {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album_id: None,
            image_url: None,
            audio_url: audio_url.into(),
            duration: 0,
        }
    }

    /// Build a song for a local audio file, reading whatever tags it carries.
    pub fn from_path(path: &Path) -> Result<Song, SongError> {
        let full_path = fs::canonicalize(path).map_err(|source| SongError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let location = full_path.to_string_lossy().to_string();

        let mut song = Song::new(location.clone(), "", UNKNOWN_ARTIST, location);

        match read_tags(&full_path) {
            Ok(tags) => {
                if let Some(title) = tags.title {
                    song.title = title;
                }
                if let Some(artist) = tags.artist {
                    song.artist = artist;
                }
                song.album_id = tags.album;
                song.duration = tags.duration;
            }
            Err(e) => log::warn!("{}", e),
        }

        if song.title.is_empty() {
            song.title = full_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown Title")
                .to_string();
        }

        Ok(song)
    }
}

impl Display for Song {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

struct FileTags {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    duration: u32,
}

fn read_tags(path: &Path) -> Result<FileTags, SongError> {
    let tagged_file = Probe::open(path)
        .and_then(|p| p.read())
        .map_err(|source| SongError::Tags {
            path: path.to_path_buf(),
            source,
        })?;

    let duration = tagged_file.properties().duration().as_secs() as u32;
    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    Ok(FileTags {
        title: tag.and_then(|t| t.title()).map(|s| s.to_string()),
        artist: tag.and_then(|t| t.artist()).map(|s| s.to_string()),
        album: tag.and_then(|t| t.album()).map(|s| s.to_string()),
        duration,
    })
}

/// Read a JSON array of songs
pub fn load_songs(path: &Path) -> Result<Vec<Song>, SongError> {
    let raw = fs::read_to_string(path).map_err(|source| SongError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SongError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_song_list(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Audio files directly inside `dir`, sorted by file name
fn directory_songs(dir: &Path) -> Result<Vec<PathBuf>, SongError> {
    let read_dir = fs::read_dir(dir).map_err(|source| SongError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported(path))
        .collect();

    paths.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(paths)
}

/// Turn command line arguments into a queue.
///
/// Accepts `.json` song lists, directories (their audio files, non-recursive)
/// and single audio files. Entries that cannot be read are logged and skipped.
pub fn collect_songs<I, P>(args: I) -> Vec<Song>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut songs = Vec::new();

    for arg in args {
        let path = arg.as_ref();

        if is_song_list(path) {
            match load_songs(path) {
                Ok(list) => {
                    log::info!("Loaded {} songs from {:?}", list.len(), path);
                    songs.extend(list);
                }
                Err(e) => log::warn!("Skipping song list: {}", e),
            }
            continue;
        }

        let files = if path.is_dir() {
            match directory_songs(path) {
                Ok(files) => files,
                Err(e) => {
                    log::warn!("Skipping directory: {}", e);
                    continue;
                }
            }
        } else {
            vec![path.to_path_buf()]
        };

        for file in files {
            match Song::from_path(&file) {
                Ok(song) => songs.push(song),
                Err(e) => log::warn!("Skipping file: {}", e),
            }
        }
    }

    songs
}
