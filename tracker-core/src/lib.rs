// tracker-core/src/lib.rs

//! The core logic for the real-time pitch tracker.
//! This crate is responsible for test-tone generation, the marshaling
//! codec for the inference boundary, the worker channel protocol,
//! submission scheduling, and the rolling pitch history. It is
//! completely headless and contains no GUI code.

pub mod boundary;
pub mod bridge;
pub mod codec;
pub mod history;
pub mod notes;
pub mod scheduler;
pub mod signal;
pub mod worker;

/// One pitch estimate produced by the inference model.
///
/// A response to an analysis request is a non-empty sequence of these,
/// ordered by `time` ascending; the last frame is the most current
/// estimate for the analyzed window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultFrame {
    /// Estimated pitch in Hz.
    pub pitch: f32,
    /// Model confidence in the estimate (0.0 to 1.0).
    pub confidence: f32,
    /// Offset of the estimate within the analyzed window, in seconds.
    pub time: f32,
}
