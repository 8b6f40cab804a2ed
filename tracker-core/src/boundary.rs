//! # Inference Boundary Module
//!
//! This module defines the seam between the tracker and the external
//! pitch-estimation model. The model is a black box reached through a
//! four-operation surface (allocate, run, release, cleanup) plus a flat
//! byte view of boundary-owned regions; everything on our side of the
//! seam goes through [`InferenceBoundary`].
//!
//! Regions are transient: the bridge copies bytes in and out and releases
//! every handle before a call returns, on success and failure alike.

use anyhow::Result;

/// Sample rate the model expects its input buffers at, in Hz.
pub const MODEL_SAMPLE_RATE: u32 = 16_000;

/// Opaque handle to a boundary-owned memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionHandle(pub u32);

/// The external model's surface, as seen by the inference bridge.
///
/// Implementations own their regions; the bridge never holds a view into
/// a region across another boundary call.
pub trait InferenceBoundary: Send {
    /// Allocates a region of `byte_len` bytes. `None` means the boundary
    /// is out of memory.
    fn allocate(&mut self, byte_len: usize) -> Option<RegionHandle>;

    /// Copies `bytes` into a previously allocated region.
    fn write(&mut self, region: RegionHandle, bytes: &[u8]);

    /// Runs pitch analysis over the encoded input region. `None` means
    /// the model produced no output.
    fn run_analysis(&mut self, input: RegionHandle, sample_count: usize) -> Option<RegionHandle>;

    /// Returns the bytes of a region. Unknown handles yield an empty
    /// slice, which the decode rejects as malformed.
    fn region_bytes(&self, region: RegionHandle) -> &[u8];

    /// Releases a region. Releasing an unknown handle is a no-op.
    fn release(&mut self, region: RegionHandle);

    /// Optional teardown hook; the default does nothing.
    fn cleanup(&mut self) {}
}

/// Constructs a boundary from a model source string.
///
/// The closure runs once on the worker thread; a failure is permanent for
/// the process lifetime and carries its underlying cause.
pub type BoundaryLoader =
    Box<dyn FnOnce(&str) -> Result<Box<dyn InferenceBoundary>> + Send + 'static>;
