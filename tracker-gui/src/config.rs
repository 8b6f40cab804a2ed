//! # Settings Module
//!
//! Persists the few knobs the tracker remembers between sessions as a
//! JSON file next to the executable. Loading falls back to defaults when
//! the file is missing or unreadable.

use std::fs::File;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

/// Default requested test-tone frequency in Hz.
pub const DEFAULT_TEST_FREQUENCY: f32 = 440.0;

/// User-facing settings, saved on exit and loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Requested test-tone frequency in Hz.
    pub test_frequency: f32,
    /// Whether a result that completed after a frequency change is still
    /// applied to the history (true matches the stale-result behavior of
    /// the pipeline's first implementation) or discarded.
    pub keep_stale_results: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            test_frequency: DEFAULT_TEST_FREQUENCY,
            keep_stale_results: true,
        }
    }
}

/// Saves the settings to a JSON file.
///
/// # Arguments
/// * `settings` - The settings to save
/// * `path` - File path to write (e.g., "tracker_settings.json")
pub fn save_settings(settings: &TrackerSettings, path: &str) -> std::io::Result<()> {
    let json_string = serde_json::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Loads settings from a JSON file.
///
/// # Arguments
/// * `path` - File path to read (e.g., "tracker_settings.json")
pub fn load_settings(path: &str) -> std::io::Result<TrackerSettings> {
    let mut file = File::open(path)?;
    let mut data = String::new();
    file.read_to_string(&mut data)?;
    let settings: TrackerSettings = serde_json::from_str(&data)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    Ok(settings)
}
