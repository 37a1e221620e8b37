//! Per-file analysis.
//!
//! Tempo and key come from the file's tags when present, duration from the
//! container. One bounded window of decoded samples feeds the loudness
//! estimate and, for files missing a tempo or key tag, the detector in
//! `detect`. Nothing here fails loudly: a file that cannot be read still
//! yields a `Track` with the fallback values.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::ItemKey;
use rodio::{Decoder, Source};
use tracing::{debug, warn};

use crate::config::AnalysisSettings;
use crate::harmony::is_canonical_key;

use super::detect;
use super::model::Track;

/// Produces a `Track` for an audio file. Must not fail on bad input;
/// unreadable values fall back to the defaults of [`Track::unanalyzed`].
/// The scan worker also survives a panic here, keeping the file unanalyzed.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, path: &Path) -> Track;
}

/// Analyzer backed by file tags and a short decode for loudness and for
/// tempo and key detection.
pub struct TagAnalyzer {
    settings: AnalysisSettings,
}

impl TagAnalyzer {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }
}

impl Analyzer for TagAnalyzer {
    fn analyze(&self, path: &Path) -> Track {
        let mut track = Track::unanalyzed(path);
        let mut tagged_bpm = false;

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                let secs = tagged.properties().duration().as_secs();
                if secs > 0 {
                    track.duration_secs = Some(secs.min(u32::MAX as u64) as u32);
                }

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    let bpm = tag
                        .get_string(&ItemKey::Bpm)
                        .or_else(|| tag.get_string(&ItemKey::IntegerBpm))
                        .and_then(parse_bpm);
                    if let Some(bpm) = bpm {
                        track.tempo_bpm = bpm;
                        tagged_bpm = true;
                    }
                    track.key = tag.get_string(&ItemKey::InitialKey).and_then(parse_key);
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read tags, using defaults");
            }
        }

        let detect = self.settings.detect_missing && (!tagged_bpm || track.key.is_none());
        if self.settings.measure_loudness || detect {
            if let Some(window) = decode_window(path, self.settings.window_secs, detect) {
                if self.settings.measure_loudness {
                    track.loudness_percent = Some(loudness_percent(window.rms));
                }
                if detect {
                    let estimate = detect::estimate(&window.mono, window.sample_rate);
                    debug!(
                        path = %path.display(),
                        bpm = ?estimate.bpm,
                        key = ?estimate.key,
                        "detected from audio"
                    );
                    if let Some(bpm) = estimate.bpm.filter(|_| !tagged_bpm) {
                        track.tempo_bpm = bpm;
                    }
                    if track.key.is_none() {
                        track.key = estimate.key.map(str::to_string);
                    }
                }
            }
        }

        debug!(
            path = %path.display(),
            bpm = track.tempo_bpm,
            key = track.key_text(),
            "analyzed"
        );
        track
    }
}

/// Parse a BPM tag such as `"128"` or `"127.96"`, rounding to whole beats.
pub(crate) fn parse_bpm(raw: &str) -> Option<u32> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some(value.round().min(u32::MAX as f64) as u32)
}

/// Keep a key tag only when it is one of the canonical labels.
pub(crate) fn parse_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    is_canonical_key(key).then(|| key.to_string())
}

/// Map an RMS amplitude to the `0..=100` loudness scale (-60 dB .. 0 dB).
pub(crate) fn loudness_percent(rms: f64) -> u8 {
    let db = 20.0 * (rms + 1e-6).log10();
    ((db + 60.0) * 100.0 / 60.0).clamp(0.0, 100.0) as u8
}

/// Start of a decoded file: overall RMS across channels and, when asked
/// for, a mono mixdown for detection.
struct DecodedWindow {
    rms: f64,
    mono: Vec<f32>,
    sample_rate: u32,
}

fn decode_window(path: &Path, window_secs: u64, keep_mono: bool) -> Option<DecodedWindow> {
    let file = File::open(path).ok()?;
    let decoder = match Decoder::new(BufReader::new(file)) {
        Ok(d) => d,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not decode");
            return None;
        }
    };

    let sample_rate = decoder.sample_rate();
    let channels = (decoder.channels() as usize).max(1);
    let frames = (sample_rate as usize).saturating_mul(window_secs as usize);
    let limit = frames.saturating_mul(channels);

    let mut mono = Vec::with_capacity(if keep_mono { frames } else { 0 });
    let (mut sum, mut count) = (0.0f64, 0usize);
    let (mut mix, mut in_frame) = (0.0f32, 0usize);
    for s in decoder.take(limit) {
        sum += s as f64 * s as f64;
        count += 1;
        if keep_mono {
            mix += s;
            in_frame += 1;
            if in_frame == channels {
                mono.push(mix / channels as f32);
                mix = 0.0;
                in_frame = 0;
            }
        }
    }
    if count == 0 {
        return None;
    }
    Some(DecodedWindow {
        rms: (sum / count as f64).sqrt(),
        mono,
        sample_rate,
    })
}
