//! # Note Naming Module
//!
//! Maps detected frequencies to equal-temperament note labels for the
//! readout. Frequencies below the audible floor map to a placeholder
//! instead of a computed name.

/// Note names within one octave, C-based so the octave number lines up
/// with scientific pitch notation (A4 = 440 Hz).
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Frequencies below this are treated as "no pitch" for labeling.
const MIN_AUDIBLE_HZ: f32 = 20.0;

/// Returns the nearest equal-temperament note label for a frequency.
///
/// Rounds to the nearest MIDI note number relative to A4 = 440 Hz.
/// Frequencies under 20 Hz yield `"--"`.
///
/// # Arguments
/// * `frequency` - Detected frequency in Hz
///
/// # Returns
/// * Note label such as "A4" or "C#3", or "--" when below the floor
pub fn frequency_to_note_name(frequency: f32) -> String {
    if frequency < MIN_AUDIBLE_HZ {
        return "--".to_string();
    }

    // MIDI note number: A4 = 69, one unit per semitone.
    let note_num = (12.0 * (frequency / 440.0).log2()).round() as i32 + 69;
    let name = NOTE_NAMES[note_num.rem_euclid(12) as usize];
    let octave = note_num.div_euclid(12) - 1;
    format!("{name}{octave}")
}
