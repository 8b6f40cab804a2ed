//! # Signal Source Module
//!
//! This module produces the synthetic test tones that stand in for live
//! microphone capture. The tracker analyzes a fixed-duration mono buffer
//! at a time, so the source is a pure function from (frequency, duration,
//! sample rate) to a sample buffer.
//!
//! ## Features
//! - Deterministic sine generation (same inputs, same buffer)
//! - Fixed amplitude scale to keep samples well inside [-1, 1]
//! - Replaceable by a capture device without touching the pipeline

/// Amplitude scale applied to every generated sample.
///
/// Half scale leaves headroom and matches what a reasonably loud
/// microphone signal looks like to the model.
pub const TONE_AMPLITUDE: f32 = 0.5;

/// Generates a mono sine test tone.
///
/// The buffer length is `floor(duration_seconds * sample_rate)` and every
/// sample lies in `[-TONE_AMPLITUDE, TONE_AMPLITUDE]`.
///
/// # Arguments
/// * `frequency` - Tone frequency in Hz
/// * `duration_seconds` - Length of the buffer in seconds
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `Vec<f32>` - The generated sample buffer
pub fn generate_test_tone(frequency: f32, duration_seconds: f32, sample_rate: u32) -> Vec<f32> {
    let num_samples = (duration_seconds * sample_rate as f32).floor() as usize;
    let step = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    (0..num_samples)
        .map(|i| (step * i as f32).sin() * TONE_AMPLITUDE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn tone_length_is_floor_of_duration_times_rate() {
        assert_eq!(generate_test_tone(440.0, 1.0, 16000).len(), 16000);
        assert_eq!(generate_test_tone(440.0, 0.5, 16000).len(), 8000);
        // 0.333 s at 16 kHz is 5328.0 samples before the floor
        assert_eq!(generate_test_tone(440.0, 0.333, 16000).len(), 5327);
    }

    #[test]
    fn tone_samples_stay_within_amplitude_scale() {
        let tone = generate_test_tone(440.0, 1.0, 16000);
        for &s in &tone {
            assert!(s >= -TONE_AMPLITUDE && s <= TONE_AMPLITUDE, "sample {} out of range", s);
        }
    }

    #[test]
    fn tone_is_deterministic() {
        let a = generate_test_tone(523.25, 1.0, 16000);
        let b = generate_test_tone(523.25, 1.0, 16000);
        assert_eq!(a, b);
    }

    #[test]
    fn tone_is_periodic_at_rate_over_frequency() {
        // 1000 Hz at 16 kHz gives an exact integer period of 16 samples.
        let tone = generate_test_tone(1000.0, 0.1, 16000);
        let period = 16;
        for i in 0..(tone.len() - period) {
            assert_abs_diff_eq!(tone[i], tone[i + period], epsilon = 1e-4);
        }
    }
}
