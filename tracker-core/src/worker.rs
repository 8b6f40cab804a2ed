//! # Worker Channel Module
//!
//! The message-passing boundary that isolates the inference bridge from
//! the orchestrator. The bridge and its boundary live on one dedicated
//! worker thread; the orchestrator talks to it exclusively through typed
//! commands and events over crossbeam channels. Sample buffers are moved
//! into [`WorkerCommand::Analyze`], so the sender provably holds no
//! reference to the storage after the send.
//!
//! ## Protocol
//! - No `Analyze` before `InitComplete` (the scheduler enforces this; an
//!   early `Analyze` is answered with `Error`).
//! - Every `Analyze` yields exactly one `AnalysisComplete` or one
//!   `Error`, unless the channel is torn down first.
//! - Messages are delivered in send order per direction.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender};

use crate::ResultFrame;
use crate::boundary::BoundaryLoader;
use crate::bridge::{BridgeState, InferenceBridge};

/// Orchestrator -> worker messages.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Load the model. Honored once; the outcome is permanent.
    Init { model_source: String },
    /// Analyze one sample buffer. The buffer's storage is transferred
    /// with the message.
    Analyze {
        samples: Vec<f32>,
        requested_frequency: f32,
    },
    /// Tear the worker down; the boundary's cleanup hook runs
    /// best-effort.
    Cleanup,
}

/// Worker -> orchestrator messages.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The model is loaded and accepts work.
    InitComplete,
    /// One analysis finished successfully.
    AnalysisComplete {
        frames: Vec<ResultFrame>,
        requested_frequency: f32,
        processing_time_ms: f32,
    },
    /// Initialization or one analysis failed.
    Error { message: String },
}

/// Owning handle to the worker thread and its channels.
#[derive(Debug)]
pub struct WorkerHandle {
    command_tx: Sender<WorkerCommand>,
    event_rx: Receiver<WorkerEvent>,
    thread_handle: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Sends a command to the worker. Fails only when the channel is
    /// down, which is unrecoverable for any in-flight request.
    pub fn send(&self, command: WorkerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| anyhow!("worker channel closed"))
    }

    /// The event side of the channel, for draining on the UI tick.
    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.event_rx
    }

    /// Sends `Cleanup` and joins the thread. Safe to call with no
    /// request outstanding and with a worker that never initialized.
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Cleanup);
        if let Some(handle) = self.thread_handle.take() {
            eprintln!("[MAIN] Waiting for analysis worker to finish...");
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns the analysis worker thread.
///
/// The loader runs on the worker thread when `Init` arrives; nothing in
/// the orchestrator shares state with it afterwards.
pub fn spawn(loader: BoundaryLoader) -> WorkerHandle {
    let (command_tx, command_rx) = crossbeam_channel::unbounded::<WorkerCommand>();
    let (event_tx, event_rx) = crossbeam_channel::unbounded::<WorkerEvent>();

    let thread_handle = thread::spawn(move || {
        run_worker(command_rx, event_tx, loader);
    });

    WorkerHandle {
        command_tx,
        event_rx,
        thread_handle: Some(thread_handle),
    }
}

/// The worker thread body: one bridge, one command loop.
fn run_worker(
    command_rx: Receiver<WorkerCommand>,
    event_tx: Sender<WorkerEvent>,
    loader: BoundaryLoader,
) {
    eprintln!("[WORKER] Analysis worker started");
    let mut bridge = InferenceBridge::new();
    let mut loader = Some(loader);

    while let Ok(command) = command_rx.recv() {
        let event = match command {
            WorkerCommand::Init { model_source } => handle_init(&mut bridge, &mut loader, &model_source),
            WorkerCommand::Analyze {
                samples,
                requested_frequency,
            } => handle_analyze(&mut bridge, samples, requested_frequency),
            WorkerCommand::Cleanup => {
                eprintln!("[WORKER] Received cleanup command");
                break;
            }
        };

        // Orchestrator gone; nothing left to report to.
        if event_tx.send(event).is_err() {
            break;
        }
    }

    bridge.dispose();
    eprintln!("[WORKER] Analysis worker finished");
}

fn handle_init(
    bridge: &mut InferenceBridge,
    loader: &mut Option<BoundaryLoader>,
    model_source: &str,
) -> WorkerEvent {
    let Some(loader) = loader.take() else {
        return WorkerEvent::Error {
            message: "initialization already attempted".to_string(),
        };
    };

    match bridge.load(model_source, loader) {
        Ok(()) => {
            eprintln!("[WORKER] Model loaded successfully from {model_source}");
            WorkerEvent::InitComplete
        }
        Err(error) => {
            eprintln!("[WORKER] Failed to load model: {error}");
            WorkerEvent::Error {
                message: format!("failed to load model: {error}"),
            }
        }
    }
}

fn handle_analyze(
    bridge: &mut InferenceBridge,
    samples: Vec<f32>,
    requested_frequency: f32,
) -> WorkerEvent {
    // Protocol ordering error; the scheduler never submits before
    // InitComplete, so log it and answer with Error.
    if bridge.state() != BridgeState::Ready {
        eprintln!("[WORKER] Analyze received before the model was ready");
        return WorkerEvent::Error {
            message: "model not initialized".to_string(),
        };
    }

    let started = Instant::now();
    match bridge.analyze(&samples) {
        Ok(frames) => WorkerEvent::AnalysisComplete {
            frames,
            requested_frequency,
            processing_time_ms: started.elapsed().as_secs_f64() as f32 * 1000.0,
        },
        Err(error) => {
            eprintln!("[WORKER] Analysis failed: {error}");
            WorkerEvent::Error {
                message: error.to_string(),
            }
        }
    }
}
