//! Pairwise compatibility scoring.

use crate::library::Track;

use super::wheel::CamelotCode;

/// Weights of the harmonic and tempo scores in the total, in tenths.
pub const HARMONIC_WEIGHT: u32 = 7;
pub const TEMPO_WEIGHT: u32 = 3;

/// How well two tracks mix. Computed on demand, never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompatibilityScore {
    pub harmonic: u8,
    pub tempo: u8,
    pub total: u8,
    /// Absolute tempo difference in BPM.
    pub bpm_delta: u32,
}

/// Rate two wheel codes from 0 (unknown key) to 100 (same code).
pub fn score_keys(a: Option<CamelotCode>, b: Option<CamelotCode>) -> u8 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0;
    };
    if a == b {
        return 100;
    }

    let relative = a.relative();
    if b == a.shifted(1) || b == a.shifted(-1) {
        90
    } else if b == relative {
        85
    } else if b == relative.shifted(1) || b == relative.shifted(-1) {
        75
    } else {
        // Both keys are known; mixable with effort.
        25
    }
}

/// Rate two tempos by absolute BPM difference.
pub fn score_tempo(bpm_a: u32, bpm_b: u32) -> u8 {
    match bpm_a.abs_diff(bpm_b) {
        0..=3 => 100,
        4..=6 => 80,
        7..=10 => 60,
        d => 60u32.saturating_sub((d - 10).saturating_mul(2)) as u8,
    }
}

/// Combine a harmonic and a tempo score using the fixed 70/30 weights.
///
/// Integer arithmetic with halves rounded up, so `85/100` gives `90`.
pub fn combine(harmonic: u8, tempo: u8) -> u8 {
    let weighted = harmonic as u32 * HARMONIC_WEIGHT + tempo as u32 * TEMPO_WEIGHT;
    ((weighted + 5) / 10) as u8
}

/// Score `b` as a follow-up to `a`.
pub fn score(a: &Track, b: &Track) -> CompatibilityScore {
    let harmonic = score_keys(a.camelot(), b.camelot());
    let tempo = score_tempo(a.tempo_bpm, b.tempo_bpm);
    CompatibilityScore {
        harmonic,
        tempo,
        total: combine(harmonic, tempo),
        bpm_delta: a.tempo_bpm.abs_diff(b.tempo_bpm),
    }
}
