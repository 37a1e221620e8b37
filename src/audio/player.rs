use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::error::PlaybackError;

/// Transport-level control over an audio output. There is deliberately no
/// seek and no position query.
pub trait MediaPlayer {
    /// Prepare `path` for playback, replacing whatever was loaded.
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError>;
    /// Start the loaded file from the beginning, or continue a paused one.
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn unpause(&mut self);
    fn stop(&mut self);
    /// True while audio is actually coming out.
    fn is_busy(&self) -> bool;
}

/// `rodio`-backed player. Lives on the interaction thread together with its
/// output stream.
pub struct RodioPlayer {
    stream: OutputStream,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
}

impl RodioPlayer {
    /// Open the default output device.
    pub fn open() -> Result<Self, PlaybackError> {
        let mut stream =
            OutputStreamBuilder::open_default_stream().map_err(|_| PlaybackError::Unavailable)?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            loaded: None,
        })
    }

    /// Create a paused `Sink` for `path`.
    fn paused_sink(&self, path: &Path) -> Result<Sink, PlaybackError> {
        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        Ok(sink)
    }
}

impl MediaPlayer for RodioPlayer {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        self.stop();
        self.loaded = None;
        let sink = self.paused_sink(path)?;
        debug!(path = %path.display(), "loaded");
        self.sink = Some(sink);
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let finished = self.sink.as_ref().map(|s| s.empty()).unwrap_or(true);
        if finished {
            let path = self.loaded.clone().ok_or(PlaybackError::NothingLoaded)?;
            self.sink = Some(self.paused_sink(&path)?);
        }
        if let Some(s) = &self.sink {
            s.play();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
        }
    }

    fn unpause(&mut self) {
        if let Some(s) = &self.sink {
            s.play();
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    fn is_busy(&self) -> bool {
        self.sink
            .as_ref()
            .map(|s| !s.is_paused() && !s.empty())
            .unwrap_or(false)
    }
}

/// Stand-in used when no output device could be opened: every load fails
/// with [`PlaybackError::Unavailable`].
#[derive(Debug, Default)]
pub struct UnavailablePlayer;

impl MediaPlayer for UnavailablePlayer {
    fn load(&mut self, _path: &Path) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unavailable)
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unavailable)
    }

    fn pause(&mut self) {}

    fn unpause(&mut self) {}

    fn stop(&mut self) {}

    fn is_busy(&self) -> bool {
        false
    }
}
