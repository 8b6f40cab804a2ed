//! End-to-end tests for the worker channel protocol: a mock inference
//! boundary behind the real bridge, codec, history buffer, and note
//! naming.

use std::collections::HashMap;
use std::time::Duration;

use tracker_core::boundary::{InferenceBoundary, RegionHandle};
use tracker_core::codec;
use tracker_core::history::{HistoryBuffer, HistoryEntry};
use tracker_core::notes;
use tracker_core::signal;
use tracker_core::worker::{self, WorkerCommand, WorkerEvent};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A boundary that answers every analysis with one canned frame, or with
/// no output region at all.
struct MockBoundary {
    regions: HashMap<RegionHandle, Vec<u8>>,
    next_handle: u32,
    canned_frame: Option<(f32, f32, f32)>,
}

impl MockBoundary {
    fn new(canned_frame: Option<(f32, f32, f32)>) -> Self {
        Self {
            regions: HashMap::new(),
            next_handle: 1,
            canned_frame,
        }
    }

    fn store(&mut self, bytes: Vec<u8>) -> RegionHandle {
        let handle = RegionHandle(self.next_handle);
        self.next_handle += 1;
        self.regions.insert(handle, bytes);
        handle
    }
}

impl InferenceBoundary for MockBoundary {
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
        // The input region must hold the full encoded buffer.
        assert_eq!(self.regions[&input].len(), sample_count * 4);

        let (pitch, confidence, time) = self.canned_frame?;
        let bytes = codec::encode_samples(&[1.0, pitch, confidence, time]);
        Some(self.store(bytes))
    }

    fn region_bytes(&self, region: RegionHandle) -> &[u8] {
        self.regions.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    fn release(&mut self, region: RegionHandle) {
        self.regions.remove(&region);
    }
}

fn spawn_with(canned_frame: Option<(f32, f32, f32)>) -> worker::WorkerHandle {
    worker::spawn(Box::new(move |_source: &str| {
        Ok(Box::new(MockBoundary::new(canned_frame)) as Box<dyn InferenceBoundary>)
    }))
}

#[test]
fn full_pipeline_appends_one_history_entry() {
    let handle = spawn_with(Some((440.0, 0.9, 0.5)));
    handle
        .send(WorkerCommand::Init {
            model_source: "mock:model".to_string(),
        })
        .unwrap();

    let event = handle.events().recv_timeout(RECV_TIMEOUT).unwrap();
    assert!(matches!(event, WorkerEvent::InitComplete));

    // 1 second of 440 Hz at the model rate of 16 kHz.
    let samples = signal::generate_test_tone(440.0, 1.0, 16_000);
    assert_eq!(samples.len(), 16_000);
    handle
        .send(WorkerCommand::Analyze {
            samples,
            requested_frequency: 440.0,
        })
        .unwrap();

    let event = handle.events().recv_timeout(RECV_TIMEOUT).unwrap();
    let WorkerEvent::AnalysisComplete {
        frames,
        requested_frequency,
        processing_time_ms,
    } = event
    else {
        panic!("expected AnalysisComplete, got {event:?}");
    };

    assert_eq!(requested_frequency, 440.0);
    assert!(processing_time_ms >= 0.0);
    assert_eq!(frames.len(), 1);

    // The last frame is the current estimate and feeds the history.
    let mut history = HistoryBuffer::default();
    let current = frames.last().unwrap();
    history.append(HistoryEntry {
        pitch: current.pitch,
        confidence: current.confidence,
    });

    assert_eq!(history.len(), 1);
    let snapshot = history.snapshot();
    assert_eq!(snapshot[0].pitch, 440.0);
    assert_eq!(snapshot[0].confidence, 0.9);
    assert_eq!(notes::frequency_to_note_name(snapshot[0].pitch), "A4");
}

#[test]
fn analyze_before_init_is_answered_with_error() {
    let handle = spawn_with(Some((440.0, 0.9, 0.5)));

    handle
        .send(WorkerCommand::Analyze {
            samples: vec![0.0; 64],
            requested_frequency: 440.0,
        })
        .unwrap();

    let event = handle.events().recv_timeout(RECV_TIMEOUT).unwrap();
    let WorkerEvent::Error { message } = event else {
        panic!("expected Error, got {event:?}");
    };
    assert!(message.contains("not initialized"));
}

#[test]
fn failed_analysis_yields_exactly_one_error_and_pipeline_continues() {
    // No output region from the model: every analysis fails, but each
    // request still gets exactly one response.
    let handle = spawn_with(None);
    handle
        .send(WorkerCommand::Init {
            model_source: "mock:model".to_string(),
        })
        .unwrap();
    assert!(matches!(
        handle.events().recv_timeout(RECV_TIMEOUT).unwrap(),
        WorkerEvent::InitComplete
    ));

    for _ in 0..3 {
        handle
            .send(WorkerCommand::Analyze {
                samples: vec![0.0; 64],
                requested_frequency: 440.0,
            })
            .unwrap();
        let event = handle.events().recv_timeout(RECV_TIMEOUT).unwrap();
        assert!(matches!(event, WorkerEvent::Error { .. }));
    }

    // No stray second response for any of the requests.
    assert!(handle.events().try_recv().is_err());
}

#[test]
fn load_failure_is_reported_as_error() {
    let handle = worker::spawn(Box::new(|source: &str| {
        Err(anyhow::anyhow!("cannot fetch {source}"))
    }));
    handle
        .send(WorkerCommand::Init {
            model_source: "mock:missing".to_string(),
        })
        .unwrap();

    let event = handle.events().recv_timeout(RECV_TIMEOUT).unwrap();
    let WorkerEvent::Error { message } = event else {
        panic!("expected Error, got {event:?}");
    };
    assert!(message.contains("failed to load model"));
}

#[test]
fn shutdown_is_safe_without_any_request() {
    let mut handle = spawn_with(Some((440.0, 0.9, 0.5)));
    handle.shutdown();
}

#[test]
fn shutdown_is_safe_before_initialization_finishes() {
    // The worker never receives Init at all.
    let mut handle = spawn_with(None);
    handle.shutdown();
}
