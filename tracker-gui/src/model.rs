//! # Built-in Model Module
//!
//! A stand-in for the external pitch-estimation model so the application
//! runs end to end without a downloaded network. It implements the full
//! inference-boundary surface: byte regions behind opaque handles, and a
//! windowed autocorrelation estimator that writes the count-header +
//! 3-float-record result layout into its output region.
//!
//! Swapping in a real model means providing another
//! [`InferenceBoundary`] through the loader in `main.rs`; nothing else
//! changes.

use std::collections::HashMap;

use tracker_core::boundary::{InferenceBoundary, MODEL_SAMPLE_RATE, RegionHandle};
use tracker_core::codec;

/// Samples per analysis window.
const WINDOW_SIZE: usize = 2048;

/// A tone quieter than this RMS is treated as silence.
const AMPLITUDE_THRESHOLD: f32 = 0.01;

/// Upper bound on the normalized-difference dip for a window to count
/// as pitched rather than noise.
const CLARITY_THRESHOLD: f32 = 0.3;

/// Built-in pitch estimator behind the inference-boundary surface.
pub struct BuiltinPitchModel {
    regions: HashMap<RegionHandle, Vec<u8>>,
    next_handle: u32,
}

impl BuiltinPitchModel {
    pub fn new() -> Self {
        Self {
            regions: HashMap::new(),
            next_handle: 1,
        }
    }

    fn store(&mut self, bytes: Vec<u8>) -> RegionHandle {
        let handle = RegionHandle(self.next_handle);
        self.next_handle += 1;
        self.regions.insert(handle, bytes);
        handle
    }
}

impl Default for BuiltinPitchModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBoundary for BuiltinPitchModel {
    fn allocate(&mut self, byte_len: usize) -> Option<RegionHandle> {
        Some(self.store(vec![0; byte_len]))
    }

    fn write(&mut self, region: RegionHandle, bytes: &[u8]) {
        if let Some(storage) = self.regions.get_mut(&region) {
            let len = storage.len().min(bytes.len());
            storage[..len].copy_from_slice(&bytes[..len]);
        }
    }

    fn run_analysis(&mut self, input: RegionHandle, sample_count: usize) -> Option<RegionHandle> {
        let samples = decode_input(self.regions.get(&input)?, sample_count);

        let mut records: Vec<(f32, f32, f32)> = Vec::new();
        let mut offset = 0;
        while offset + WINDOW_SIZE <= samples.len() {
            let window = &samples[offset..offset + WINDOW_SIZE];
            let time = (offset + WINDOW_SIZE / 2) as f32 / MODEL_SAMPLE_RATE as f32;
            let (pitch, confidence) =
                estimate_pitch(window, MODEL_SAMPLE_RATE).unwrap_or((0.0, 0.0));
            records.push((pitch, confidence, time));
            offset += WINDOW_SIZE;
        }

        if records.is_empty() {
            return None;
        }

        let mut floats = Vec::with_capacity(1 + 3 * records.len());
        floats.push(records.len() as f32);
        for (pitch, confidence, time) in records {
            floats.push(pitch);
            floats.push(confidence);
            floats.push(time);
        }
        Some(self.store(codec::encode_samples(&floats)))
    }

    fn region_bytes(&self, region: RegionHandle) -> &[u8] {
        self.regions.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    fn release(&mut self, region: RegionHandle) {
        self.regions.remove(&region);
    }

    fn cleanup(&mut self) {
        self.regions.clear();
    }
}

/// Reinterprets the encoded input region as little-endian f32 samples.
fn decode_input(raw: &[u8], sample_count: usize) -> Vec<f32> {
    raw.chunks_exact(4)
        .take(sample_count)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().expect("chunks_exact yields 4 bytes")))
        .collect()
}

/// Estimates the pitch of one window via the normalized difference
/// function (YIN-style), with parabolic interpolation around the dip.
///
/// # Returns
/// * `Some((frequency, confidence))` - Detected frequency in Hz with a
///   confidence derived from the dip depth
/// * `None` - Silence, noise, or no usable period
fn estimate_pitch(window: &[f32], sample_rate: u32) -> Option<(f32, f32)> {
    let half = window.len() / 2;
    if half < 2 {
        return None;
    }

    // Silence gate.
    let rms = (window.iter().map(|&s| s * s).sum::<f32>() / window.len() as f32).sqrt();
    if rms < AMPLITUDE_THRESHOLD {
        return None;
    }

    // Squared difference per candidate lag.
    let mut diff = vec![0.0f32; half];
    for lag in 1..half {
        let mut sum = 0.0;
        for i in 0..half {
            let delta = window[i] - window[i + lag];
            sum += delta * delta;
        }
        diff[lag] = sum;
    }

    // Cumulative mean normalization.
    diff[0] = 1.0;
    let mut running_sum = 0.0;
    for lag in 1..half {
        running_sum += diff[lag];
        if running_sum > 0.0 {
            diff[lag] *= lag as f32 / running_sum;
        } else {
            diff[lag] = 1.0;
        }
    }

    // First local dip near the global minimum, to dodge octave errors.
    let min_val = diff[1..].iter().cloned().fold(f32::INFINITY, f32::min);
    let threshold = min_val + 0.05;
    let mut period = 0;
    for lag in 2..half {
        if diff[lag] < threshold && diff[lag] < diff[lag - 1] {
            period = lag;
            break;
        }
    }
    if period == 0 || period + 1 >= half || diff[period] > CLARITY_THRESHOLD {
        return None;
    }

    // Parabolic interpolation for sub-sample accuracy.
    let y1 = diff[period - 1];
    let y2 = diff[period];
    let y3 = diff[period + 1];
    let denominator = y1 - 2.0 * y2 + y3;
    let period_exact = if denominator != 0.0 {
        period as f32 + (y1 - y3) / (2.0 * denominator)
    } else {
        period as f32
    };

    let frequency = sample_rate as f32 / period_exact;
    if !frequency.is_finite() || frequency < 20.0 {
        return None;
    }

    let confidence = (1.0 - diff[period]).clamp(0.0, 1.0);
    Some((frequency, confidence))
}
