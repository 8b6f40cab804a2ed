//! # Marshaling Codec Module
//!
//! This module owns the binary contract at the inference boundary. Sample
//! buffers are encoded as a contiguous little-endian 32-bit float layout
//! (one float per sample, no header), and the boundary's flat result
//! buffer is decoded as a count header followed by fixed-stride records.
//!
//! The decode validates the buffer length before indexing, so raw offset
//! math never leaks into call sites. It operates on bytes that have
//! already been copied out of boundary-owned memory; no reference into
//! the boundary outlives the call that produced it.

use thiserror::Error;

use crate::ResultFrame;

/// Size of one encoded sample in bytes.
const FLOAT_BYTES: usize = 4;

/// Number of floats in one result record: pitch, confidence, time.
const RECORD_FLOATS: usize = 3;

/// Errors raised while decoding a result buffer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The buffer does not describe a well-formed result.
    #[error("malformed result buffer: {0}")]
    Malformed(String),

    /// The buffer is well-formed but carries zero frames.
    #[error("analysis produced no frames")]
    Empty,
}

/// Encodes a sample buffer into the boundary's wire format.
///
/// The output is exactly `4 * samples.len()` bytes: each sample as a
/// little-endian f32, in order, with no header.
pub fn encode_samples(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * FLOAT_BYTES);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Decodes the boundary's flat result buffer into structured frames.
///
/// Layout: float 0 is the frame count N (truncated to an integer),
/// followed by N consecutive (pitch, confidence, time) float records.
///
/// # Errors
/// * `CodecError::Malformed` - the count is negative or non-finite, or
///   the buffer is shorter than `4 * (1 + 3N)` bytes
/// * `CodecError::Empty` - the count is zero
pub fn decode_result(raw: &[u8]) -> Result<Vec<ResultFrame>, CodecError> {
    if raw.len() < FLOAT_BYTES {
        return Err(CodecError::Malformed(format!(
            "buffer of {} bytes has no room for a frame count",
            raw.len()
        )));
    }

    let count_raw = read_f32(raw, 0);
    if !count_raw.is_finite() {
        return Err(CodecError::Malformed(format!(
            "frame count is not finite: {count_raw}"
        )));
    }

    let count = count_raw.trunc();
    if count < 0.0 {
        return Err(CodecError::Malformed(format!("negative frame count: {count}")));
    }
    if count == 0.0 {
        return Err(CodecError::Empty);
    }

    // Checked arithmetic: an absurd count header must decode to
    // Malformed, not overflow the length computation.
    let num_frames = count as usize;
    let required = RECORD_FLOATS
        .checked_mul(num_frames)
        .and_then(|floats| floats.checked_add(1))
        .and_then(|floats| floats.checked_mul(FLOAT_BYTES));
    match required {
        Some(required) if raw.len() >= required => {}
        _ => {
            return Err(CodecError::Malformed(format!(
                "{num_frames} frames do not fit in {} bytes",
                raw.len()
            )));
        }
    }

    let mut frames = Vec::with_capacity(num_frames);
    for i in 0..num_frames {
        let base = 1 + i * RECORD_FLOATS;
        frames.push(ResultFrame {
            pitch: read_f32(raw, base),
            confidence: read_f32(raw, base + 1),
            time: read_f32(raw, base + 2),
        });
    }
    Ok(frames)
}

/// Reads the little-endian f32 at the given float index.
///
/// Callers must have validated the buffer length already.
fn read_f32(raw: &[u8], float_index: usize) -> f32 {
    let offset = float_index * FLOAT_BYTES;
    let bytes: [u8; 4] = raw[offset..offset + FLOAT_BYTES]
        .try_into()
        .expect("length validated by caller");
    f32::from_le_bytes(bytes)
}
