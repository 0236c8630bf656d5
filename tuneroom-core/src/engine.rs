use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use rodio::{
    Decoder, DeviceTrait, OutputStream, OutputStreamBuilder, Sink,
    cpal::{self, traits::HostTrait},
};

use crate::{error::PlayerError, media::MediaElement};

/// What the element has been asked to do, tracked apart from the sink
#[derive(Debug, Default)]
struct Transport {
    loaded: bool,
    /// Set after loading, cleared once playback is requested
    fresh: bool,
    wants_playing: bool,
    ended: bool,
}

impl Transport {
    fn load(&mut self) {
        self.loaded = true;
        self.fresh = true;
        self.ended = false;
    }

    fn unload(&mut self) {
        self.loaded = false;
    }

    /// A finished track has left the sink and must be appended again
    fn needs_reload(&self, sink_empty: bool) -> bool {
        self.loaded && sink_empty
    }

    fn play(&mut self) {
        self.wants_playing = true;
        self.fresh = false;
    }

    fn pause(&mut self) {
        self.wants_playing = false;
    }

    /// Rewinding a source that has not started yet is a no-op
    fn skips_seek(&self, position: Duration) -> bool {
        self.fresh && position.is_zero()
    }

    fn seeked(&mut self) {
        self.ended = false;
    }

    /// True once per drain of a playing source
    fn take_ended(&mut self, sink_empty: bool) -> bool {
        if !self.loaded || !self.wants_playing || self.ended || !sink_empty {
            return false;
        }
        self.ended = true;
        true
    }
}

/// Local audio output: the media element used outside of tests
pub struct AudioEngine {
    _stream: OutputStream,
    sink: Sink,
    /// File currently loaded
    source: Option<PathBuf>,
    transport: Transport,
}

impl AudioEngine {
    pub fn try_new_default() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No default output device found")?;

        let device_name = device.name().unwrap_or_else(|_| "(unknown)".to_string());

        let stream_builder = OutputStreamBuilder::from_device(device)
            .context("cannot create output stream builder from device")?;

        let stream = stream_builder.open_stream().context("Cannot create stream output")?;

        let sink = Sink::connect_new(&stream.mixer());
        sink.pause();

        log::info!("Audio output ready on {}", device_name);
        Ok(AudioEngine {
            _stream: stream,
            sink,
            source: None,
            transport: Transport::default(),
        })
    }

    fn append(&mut self, path: &Path) -> Result<(), PlayerError> {
        let file = File::open(path).map_err(|source| PlayerError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder =
            Decoder::try_from(file).map_err(|e| PlayerError::Decode(path.to_path_buf(), e))?;

        self.sink.clear();
        self.sink.append(decoder);
        if self.transport.wants_playing {
            self.sink.play();
        }
        self.transport.load();
        Ok(())
    }

    /// Put the current file back into a drained sink
    fn reload_if_drained(&mut self) -> Result<(), PlayerError> {
        if !self.transport.needs_reload(self.sink.empty()) {
            return Ok(());
        }
        match self.source.clone() {
            Some(path) => self.append(&path),
            None => Ok(()),
        }
    }
}

/// Resolve a song's audio url to a local file
pub fn local_path(url: &str) -> Result<PathBuf, PlayerError> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if url.contains("://") {
        return Err(PlayerError::UnsupportedSource(url.to_string()));
    }
    Ok(PathBuf::from(url))
}

impl MediaElement for AudioEngine {
    fn set_source(&mut self, url: &str) -> Result<(), PlayerError> {
        let path = local_path(url)?;
        self.sink.pause();
        self.source = None;
        self.transport.unload();
        self.append(&path)?;
        log::debug!("Loaded {:?}", path);
        self.source = Some(path);
        Ok(())
    }

    fn set_current_time(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.reload_if_drained()?;
        if !self.transport.loaded || self.transport.skips_seek(position) {
            return Ok(());
        }
        self.sink.try_seek(position)?;
        self.transport.seeked();
        Ok(())
    }

    fn current_time(&self) -> Duration {
        self.sink.get_pos()
    }

    fn play(&mut self) {
        self.transport.play();
        // Playing an ended track starts it over
        if let Err(e) = self.reload_if_drained() {
            log::warn!("Cannot restart {:?}: {}", self.source, e);
        }
        self.sink.play();
    }

    fn pause(&mut self) {
        self.transport.pause();
        self.sink.pause();
    }

    fn volume(&self) -> f32 {
        self.sink.volume()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn take_ended(&mut self) -> bool {
        self.transport.take_ended(self.sink.empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_file_urls_are_local() {
        assert_eq!(local_path("/music/a.mp3").unwrap(), PathBuf::from("/music/a.mp3"));
        assert_eq!(
            local_path("file:///music/b.flac").unwrap(),
            PathBuf::from("/music/b.flac")
        );
        assert_eq!(local_path("songs/c.ogg").unwrap(), PathBuf::from("songs/c.ogg"));
    }

    #[test]
    fn remote_urls_are_rejected() {
        let err = local_path("https://cdn.example.com/a.mp3").unwrap_err();
        assert!(matches!(err, PlayerError::UnsupportedSource(_)));
        assert!(local_path("http://host/b.mp3").is_err());
    }

    #[test]
    fn ended_fires_once_per_drain() {
        let mut transport = Transport::default();
        assert!(!transport.take_ended(true));

        transport.load();
        transport.play();
        assert!(!transport.take_ended(false));
        assert!(transport.take_ended(true));
        assert!(!transport.take_ended(true));

        transport.seeked();
        assert!(transport.take_ended(true));
    }

    #[test]
    fn paused_drain_is_not_an_end() {
        let mut transport = Transport::default();
        transport.load();
        transport.pause();
        assert!(!transport.take_ended(true));
    }

    #[test]
    fn playing_after_the_end_reloads_the_track() {
        let mut transport = Transport::default();
        transport.load();
        transport.play();
        assert!(transport.take_ended(true));
        transport.pause();

        // Space after the queue ran out: the sink is empty again
        transport.play();
        assert!(transport.needs_reload(true));
        transport.load();
        assert!(!transport.ended);
        assert!(transport.take_ended(true));
    }

    #[test]
    fn nothing_to_reload_without_a_source() {
        let mut transport = Transport::default();
        assert!(!transport.needs_reload(true));
        transport.load();
        assert!(!transport.needs_reload(false));
        transport.unload();
        assert!(!transport.needs_reload(true));
    }

    #[test]
    fn rewinding_a_fresh_source_is_skipped() {
        let mut transport = Transport::default();
        transport.load();
        assert!(transport.skips_seek(Duration::ZERO));
        assert!(!transport.skips_seek(Duration::from_secs(3)));
        transport.play();
        assert!(!transport.skips_seek(Duration::ZERO));
    }
}
