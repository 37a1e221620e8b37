//! Tempo and key estimates from decoded audio, for files whose tags lack
//! them.
//!
//! Tempo comes from the autocorrelation of a spectral-flux onset envelope,
//! key from a chromagram matched against the Krumhansl-Kessler profiles.
//! Both report `None` instead of guessing on silence, steady tones or
//! excerpts too short to judge.

use std::f32::consts::PI;

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

const ONSET_FRAME: usize = 1024;
const ONSET_HOP: usize = 512;
const CHROMA_FRAME: usize = 8192;
const CHROMA_HOP: usize = 4096;

/// Tempo search range. Narrow enough that half and double time of a
/// typical dance track fall outside it.
const MIN_BPM: f64 = 70.0;
const MAX_BPM: f64 = 180.0;
const MIN_TEMPO_SECS: usize = 6;
/// Mean flux relative to mean spectral magnitude. Steady tones sit far
/// below this.
const MIN_NOVELTY: f64 = 0.02;
/// Best autocorrelation relative to lag 0.
const MIN_PULSE: f64 = 0.2;

const CHROMA_MIN_HZ: f32 = 55.0;
const CHROMA_MAX_HZ: f32 = 2000.0;
const MIN_KEY_CORRELATION: f64 = 0.4;

const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Key labels by tonic pitch class, C = 0.
const MAJOR_LABELS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const MINOR_LABELS: [&str; 12] = [
    "Cm", "C#m", "Dm", "D#m", "Em", "Fm", "F#m", "Gm", "G#m", "Am", "A#m", "Bm",
];

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Estimate {
    pub bpm: Option<u32>,
    /// One of the canonical key labels.
    pub key: Option<&'static str>,
}

/// Estimate tempo and key from mono samples in `-1.0..=1.0`.
pub(crate) fn estimate(mono: &[f32], sample_rate: u32) -> Estimate {
    if mono.is_empty() || sample_rate == 0 {
        return Estimate::default();
    }
    let mut planner = FftPlanner::<f32>::new();
    Estimate {
        bpm: estimate_bpm(&mut planner, mono, sample_rate),
        key: estimate_key(&mut planner, mono, sample_rate),
    }
}

fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (n - 1) as f32).cos()))
        .collect()
}

/// Call `f` with the magnitude spectrum (bins `0..=frame / 2`) of each
/// Hann-windowed frame.
fn for_each_spectrum(
    planner: &mut FftPlanner<f32>,
    samples: &[f32],
    frame: usize,
    hop: usize,
    mut f: impl FnMut(&[f32]),
) {
    if samples.len() < frame {
        return;
    }
    let fft = planner.plan_fft_forward(frame);
    let window = hann(frame);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame];
    let mut spectrum = vec![0.0f32; frame / 2 + 1];

    for start in (0..=samples.len() - frame).step_by(hop) {
        for ((slot, s), w) in buffer
            .iter_mut()
            .zip(&samples[start..start + frame])
            .zip(&window)
        {
            *slot = Complex::new(s * w, 0.0);
        }
        fft.process(&mut buffer);
        for (m, c) in spectrum.iter_mut().zip(&buffer) {
            *m = c.norm();
        }
        f(&spectrum);
    }
}

/// Half-wave rectified spectral flux per hop, plus the mean spectral
/// magnitude per frame.
fn onset_envelope(planner: &mut FftPlanner<f32>, mono: &[f32]) -> (Vec<f64>, f64) {
    let mut envelope = Vec::new();
    let mut previous: Option<Vec<f32>> = None;
    let mut magnitude = 0.0f64;
    let mut frames = 0usize;

    for_each_spectrum(planner, mono, ONSET_FRAME, ONSET_HOP, |spectrum| {
        magnitude += spectrum.iter().map(|&m| m as f64).sum::<f64>();
        frames += 1;
        match &mut previous {
            Some(prev) => {
                let flux: f64 = spectrum
                    .iter()
                    .zip(prev.iter())
                    .map(|(&cur, &old)| (cur - old).max(0.0) as f64)
                    .sum();
                envelope.push(flux);
                prev.copy_from_slice(spectrum);
            }
            None => previous = Some(spectrum.to_vec()),
        }
    });

    let mean_magnitude = if frames == 0 {
        0.0
    } else {
        magnitude / frames as f64
    };
    (envelope, mean_magnitude)
}

/// Mean lagged product, normalized by the overlap length.
fn autocorrelation(signal: &[f64], lag: usize) -> f64 {
    let n = signal.len().saturating_sub(lag);
    if n == 0 {
        return 0.0;
    }
    signal[..n]
        .iter()
        .zip(&signal[lag..])
        .map(|(a, b)| a * b)
        .sum::<f64>()
        / n as f64
}

/// Vertex of the parabola through the peak and its neighbours.
fn refine_peak(left: f64, peak: f64, right: f64) -> f64 {
    let denominator = 2.0 * (2.0 * peak - left - right);
    if denominator.abs() < 1e-12 {
        return 0.0;
    }
    ((left - right) / denominator).clamp(-0.5, 0.5)
}

fn estimate_bpm(planner: &mut FftPlanner<f32>, mono: &[f32], sample_rate: u32) -> Option<u32> {
    if mono.len() < sample_rate as usize * MIN_TEMPO_SECS {
        return None;
    }
    let (envelope, mean_magnitude) = onset_envelope(planner, mono);
    if envelope.is_empty() || mean_magnitude <= f64::EPSILON {
        return None;
    }
    let mean_flux = envelope.iter().sum::<f64>() / envelope.len() as f64;
    if mean_flux / mean_magnitude < MIN_NOVELTY {
        return None;
    }

    let rate = sample_rate as f64 / ONSET_HOP as f64;
    let min_lag = ((rate * 60.0 / MAX_BPM).floor() as usize).max(2);
    let max_lag = (rate * 60.0 / MIN_BPM).ceil() as usize;
    if envelope.len() <= max_lag * 2 {
        return None;
    }

    let centered: Vec<f64> = envelope.iter().map(|v| v - mean_flux).collect();
    let energy = autocorrelation(&centered, 0);
    if energy <= f64::EPSILON {
        return None;
    }

    let (best_lag, best) = (min_lag..=max_lag)
        .map(|lag| (lag, autocorrelation(&centered, lag)))
        .fold((min_lag, f64::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
    if best / energy < MIN_PULSE {
        return None;
    }

    let offset = refine_peak(
        autocorrelation(&centered, best_lag - 1),
        best,
        autocorrelation(&centered, best_lag + 1),
    );
    let bpm = 60.0 * rate / (best_lag as f64 + offset);
    Some(bpm.round() as u32)
}

/// Pitch class (C = 0) of each spectrum bin inside the chroma band.
fn chroma_bins(sample_rate: u32) -> Vec<Option<usize>> {
    let bin_hz = sample_rate as f32 / CHROMA_FRAME as f32;
    (0..=CHROMA_FRAME / 2)
        .map(|bin| {
            let hz = bin as f32 * bin_hz;
            (CHROMA_MIN_HZ..=CHROMA_MAX_HZ).contains(&hz).then(|| {
                let midi = 69.0 + 12.0 * (hz / 440.0).log2();
                (midi.round() as i32).rem_euclid(12) as usize
            })
        })
        .collect()
}

fn correlation(a: &[f64; 12], b: &[f64; 12]) -> f64 {
    let mean_a = a.iter().sum::<f64>() / 12.0;
    let mean_b = b.iter().sum::<f64>() / 12.0;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    let denominator = (var_a * var_b).sqrt();
    if denominator <= f64::EPSILON {
        0.0
    } else {
        cov / denominator
    }
}

/// Best of the 24 rotated profiles, if it correlates well enough.
fn best_key(chroma: &[f64; 12]) -> Option<&'static str> {
    let mut best: Option<(f64, &'static str)> = None;
    for tonic in 0..12 {
        for (profile, labels) in [
            (&MAJOR_PROFILE, &MAJOR_LABELS),
            (&MINOR_PROFILE, &MINOR_LABELS),
        ] {
            let rotated: [f64; 12] = std::array::from_fn(|pc| profile[(pc + 12 - tonic) % 12]);
            let r = correlation(chroma, &rotated);
            if best.is_none_or(|(top, _)| r > top) {
                best = Some((r, labels[tonic]));
            }
        }
    }
    best.filter(|(r, _)| *r >= MIN_KEY_CORRELATION)
        .map(|(_, label)| label)
}

fn estimate_key(
    planner: &mut FftPlanner<f32>,
    mono: &[f32],
    sample_rate: u32,
) -> Option<&'static str> {
    let bins = chroma_bins(sample_rate);
    let mut chroma = [0.0f64; 12];
    for_each_spectrum(planner, mono, CHROMA_FRAME, CHROMA_HOP, |spectrum| {
        for (m, pc) in spectrum.iter().zip(&bins) {
            if let Some(pc) = pc {
                chroma[*pc] += *m as f64;
            }
        }
    });
    if chroma.iter().sum::<f64>() <= f64::EPSILON {
        return None;
    }
    best_key(&chroma)
}
