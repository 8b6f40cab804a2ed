//! # Inference Bridge Module
//!
//! This module owns the lifecycle of the external model: load it once,
//! feed it encoded sample buffers, copy structured results back out, and
//! release every boundary region on every exit path. The bridge lives on
//! the worker thread; the orchestrator only ever sees its results through
//! the worker channel.
//!
//! ## Lifecycle
//! Unloaded -> Loading -> Ready on success, Loading -> Failed on error.
//! Failed is permanent for the process lifetime; the bridge never retries
//! a load internally.

use anyhow::anyhow;
use thiserror::Error;

use crate::ResultFrame;
use crate::boundary::{BoundaryLoader, InferenceBoundary};
use crate::codec::{self, CodecError};

/// Lifecycle state of the inference bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// No load has been requested yet.
    Unloaded,
    /// A load is running on the worker thread.
    Loading,
    /// The model accepts analysis requests.
    Ready,
    /// The load failed; permanent for the process lifetime.
    Failed,
}

/// Errors raised by the bridge. All of them are converted to a single
/// `Error` message at the worker channel; the orchestrator never sees a
/// raw panic or a bare cause chain.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The model failed to initialize. Fatal; no retry.
    #[error("model failed to load: {0}")]
    Load(#[source] anyhow::Error),

    /// `analyze` was called while the bridge was not Ready. Ordering
    /// error; scheduler discipline should make this unreachable.
    #[error("model not initialized")]
    NotReady,

    /// The boundary could not provide an input region.
    #[error("failed to allocate {0} bytes in the inference boundary")]
    AllocationFailure(usize),

    /// The analysis call yielded no output region.
    #[error("null result from the inference boundary")]
    NullResult,

    /// The output region did not decode to a usable frame sequence.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Owns the boundary and drives one analysis at a time through it.
pub struct InferenceBridge {
    boundary: Option<Box<dyn InferenceBoundary>>,
    state: BridgeState,
}

impl InferenceBridge {
    pub fn new() -> Self {
        Self {
            boundary: None,
            state: BridgeState::Unloaded,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Loads the model through the given loader.
    ///
    /// Only callable from `Unloaded`; a second call fails without
    /// touching the boundary. On loader failure the bridge transitions to
    /// `Failed` and stays there.
    pub fn load(&mut self, model_source: &str, loader: BoundaryLoader) -> Result<(), BridgeError> {
        if self.state != BridgeState::Unloaded {
            return Err(BridgeError::Load(anyhow!(
                "load already attempted (state {:?})",
                self.state
            )));
        }

        self.state = BridgeState::Loading;
        match loader(model_source) {
            Ok(boundary) => {
                self.boundary = Some(boundary);
                self.state = BridgeState::Ready;
                Ok(())
            }
            Err(cause) => {
                self.state = BridgeState::Failed;
                Err(BridgeError::Load(cause))
            }
        }
    }

    /// Runs one analysis over the given sample buffer.
    ///
    /// Encodes the samples, copies them into a boundary-owned input
    /// region, invokes the model, copies the flat result out and decodes
    /// it. The input region is released right after the analysis call and
    /// the output region right after the copy-out, so no region survives
    /// this function on any path.
    pub fn analyze(&mut self, samples: &[f32]) -> Result<Vec<ResultFrame>, BridgeError> {
        if self.state != BridgeState::Ready {
            return Err(BridgeError::NotReady);
        }
        let boundary = self.boundary.as_mut().ok_or(BridgeError::NotReady)?;

        let encoded = codec::encode_samples(samples);
        let input = boundary
            .allocate(encoded.len())
            .ok_or(BridgeError::AllocationFailure(encoded.len()))?;
        boundary.write(input, &encoded);

        let output = boundary.run_analysis(input, samples.len());
        boundary.release(input);
        let output = output.ok_or(BridgeError::NullResult)?;

        // Copy out before releasing; the codec must never see
        // boundary-owned memory directly.
        let raw = boundary.region_bytes(output).to_vec();
        boundary.release(output);

        let frames = codec::decode_result(&raw)?;
        Ok(frames)
    }

    /// Best-effort teardown of the boundary.
    ///
    /// Runs the boundary's cleanup hook at most once and drops it.
    /// Idempotent and safe to call in any state.
    pub fn dispose(&mut self) {
        if let Some(mut boundary) = self.boundary.take() {
            boundary.cleanup();
        }
    }
}

impl Default for InferenceBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::RegionHandle;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A boundary that tracks allocations through shared counters so
    /// tests can assert that every region handed out was released.
    struct AccountingBoundary {
        regions: HashMap<RegionHandle, Vec<u8>>,
        next_handle: u32,
        live_regions: Arc<AtomicUsize>,
        cleanup_calls: Arc<AtomicUsize>,
        /// Flat float sequence the next run_analysis returns, or None to
        /// simulate a null result.
        canned_output: Option<Vec<f32>>,
        fail_allocation: bool,
    }

    impl AccountingBoundary {
        fn new(canned_output: Option<Vec<f32>>) -> Self {
            Self {
                regions: HashMap::new(),
                next_handle: 1,
                live_regions: Arc::new(AtomicUsize::new(0)),
                cleanup_calls: Arc::new(AtomicUsize::new(0)),
                canned_output,
                fail_allocation: false,
            }
        }
    }

    impl InferenceBoundary for AccountingBoundary {
        fn allocate(&mut self, byte_len: usize) -> Option<RegionHandle> {
            if self.fail_allocation {
                return None;
            }
            let handle = RegionHandle(self.next_handle);
            self.next_handle += 1;
            self.regions.insert(handle, vec![0; byte_len]);
            self.live_regions.fetch_add(1, Ordering::SeqCst);
            Some(handle)
        }

        fn write(&mut self, region: RegionHandle, bytes: &[u8]) {
            if let Some(storage) = self.regions.get_mut(&region) {
                let len = storage.len().min(bytes.len());
                storage[..len].copy_from_slice(&bytes[..len]);
            }
        }

        fn run_analysis(&mut self, _input: RegionHandle, _sample_count: usize) -> Option<RegionHandle> {
            let floats = self.canned_output.clone()?;
            let bytes = codec::encode_samples(&floats);
            let handle = RegionHandle(self.next_handle);
            self.next_handle += 1;
            self.regions.insert(handle, bytes);
            self.live_regions.fetch_add(1, Ordering::SeqCst);
            Some(handle)
        }

        fn region_bytes(&self, region: RegionHandle) -> &[u8] {
            self.regions.get(&region).map(Vec::as_slice).unwrap_or(&[])
        }

        fn release(&mut self, region: RegionHandle) {
            if self.regions.remove(&region).is_some() {
                self.live_regions.fetch_sub(1, Ordering::SeqCst);
            }
        }

        fn cleanup(&mut self) {
            self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Loads a bridge around the given boundary and returns it together
    /// with the shared (live_regions, cleanup_calls) counters.
    fn ready_bridge(
        boundary: AccountingBoundary,
    ) -> (InferenceBridge, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let live = boundary.live_regions.clone();
        let cleanups = boundary.cleanup_calls.clone();
        let mut bridge = InferenceBridge::new();
        bridge
            .load(
                "test:model",
                Box::new(move |_| Ok(Box::new(boundary) as Box<dyn InferenceBoundary>)),
            )
            .unwrap();
        assert_eq!(bridge.state(), BridgeState::Ready);
        (bridge, live, cleanups)
    }

    #[test]
    fn analyze_before_load_is_not_ready() {
        let mut bridge = InferenceBridge::new();
        assert!(matches!(bridge.analyze(&[0.0; 16]), Err(BridgeError::NotReady)));
    }

    #[test]
    fn load_failure_is_permanent() {
        let mut bridge = InferenceBridge::new();
        let err = bridge
            .load("test:model", Box::new(|_| Err(anyhow!("no such model"))))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Load(_)));
        assert_eq!(bridge.state(), BridgeState::Failed);

        // A second attempt is refused and the state stays Failed.
        let err = bridge
            .load(
                "test:model",
                Box::new(|_| Ok(Box::new(AccountingBoundary::new(None)) as Box<dyn InferenceBoundary>)),
            )
            .unwrap_err();
        assert!(matches!(err, BridgeError::Load(_)));
        assert_eq!(bridge.state(), BridgeState::Failed);
        assert!(matches!(bridge.analyze(&[0.0; 16]), Err(BridgeError::NotReady)));
    }

    #[test]
    fn analyze_decodes_frames_and_releases_regions() {
        let boundary = AccountingBoundary::new(Some(vec![1.0, 440.0, 0.9, 0.5]));
        let (mut bridge, live, _) = ready_bridge(boundary);

        let frames = bridge.analyze(&[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pitch, 440.0);
        assert_eq!(frames[0].confidence, 0.9);
        assert_eq!(frames[0].time, 0.5);
        assert_eq!(live.load(Ordering::SeqCst), 0, "input and output regions must be released");
    }

    #[test]
    fn null_result_releases_input_region() {
        let boundary = AccountingBoundary::new(None);
        let (mut bridge, live, _) = ready_bridge(boundary);

        assert!(matches!(bridge.analyze(&[0.0; 8]), Err(BridgeError::NullResult)));
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn malformed_output_releases_both_regions() {
        // Claims two frames but carries none.
        let boundary = AccountingBoundary::new(Some(vec![2.0]));
        let (mut bridge, live, _) = ready_bridge(boundary);

        assert!(matches!(
            bridge.analyze(&[0.0; 8]),
            Err(BridgeError::Codec(CodecError::Malformed(_)))
        ));
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_output_is_reported_as_empty() {
        let boundary = AccountingBoundary::new(Some(vec![0.0]));
        let (mut bridge, live, _) = ready_bridge(boundary);

        assert!(matches!(
            bridge.analyze(&[0.0; 8]),
            Err(BridgeError::Codec(CodecError::Empty))
        ));
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn allocation_failure_is_reported() {
        let mut boundary = AccountingBoundary::new(Some(vec![1.0, 440.0, 0.9, 0.5]));
        boundary.fail_allocation = true;
        let (mut bridge, _, _) = ready_bridge(boundary);

        assert!(matches!(
            bridge.analyze(&[0.0; 8]),
            Err(BridgeError::AllocationFailure(32))
        ));
    }

    #[test]
    fn dispose_runs_cleanup_once_and_is_idempotent() {
        let boundary = AccountingBoundary::new(None);
        let (mut bridge, _, cleanups) = ready_bridge(boundary);

        bridge.dispose();
        bridge.dispose(); // must not panic or run cleanup again
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispose_is_safe_before_any_load() {
        let mut bridge = InferenceBridge::new();
        bridge.dispose();
        assert_eq!(bridge.state(), BridgeState::Unloaded);
    }
}
