//! # Pitch Tracker GUI
//!
//! This module contains the orchestrator for the real-time pitch tracker.
//! It drives the analysis pipeline: a synthetic test tone is submitted to
//! the worker thread, the inference model's pitch/confidence stream comes
//! back over the worker channel, and the results feed a live strip chart.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application, polled on a 16 ms tick
//! - **Worker Thread**: Inference bridge and model behind the worker channel
//! - **Communication**: Crossbeam channels, typed commands and events
//! - **Pacing**: The analysis scheduler enforces single-flight and the
//!   250 ms submission throttle

mod config;
mod model;
mod ui;

use std::time::Instant;

use iced::{self, Element, Subscription, Theme};
use tracker_core::boundary::{InferenceBoundary, MODEL_SAMPLE_RATE};
use tracker_core::history::{HistoryBuffer, HistoryEntry};
use tracker_core::scheduler::AnalysisScheduler;
use tracker_core::worker::{self, WorkerCommand, WorkerEvent, WorkerHandle};
use tracker_core::{notes, signal};

use config::TrackerSettings;
use ui::main_display::create_main_view;

/// Duration of each analyzed test-tone buffer in seconds.
const TONE_DURATION_SECONDS: f32 = 1.0;

/// Source string handed to the model loader.
const MODEL_SOURCE: &str = "builtin:yin";

/// Where settings are persisted between sessions.
const SETTINGS_PATH: &str = "tracker_settings.json";

/// Main entry point for the pitch tracker application.
pub fn main() -> iced::Result {
    eprintln!("[MAIN] Starting pitch tracker...");
    let result = iced::application("Pitch Tracker", TrackerApp::update, TrackerApp::view)
        .subscription(TrackerApp::subscription)
        .theme(TrackerApp::theme)
        .run();
    eprintln!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    /// Start/stop button pressed; toggles the running flag.
    StartStopPressed,
    /// Frequency slider moved (Hz).
    FrequencyChanged(f32),
    /// Timer tick for event draining and submission pacing.
    Tick,
    /// Application exit request.
    Exit,
}

/// Data the UI needs for rendering.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    /// Worker sent InitComplete; analysis may be scheduled.
    pub worker_ready: bool,
    /// The external running flag driving the scheduler.
    pub running: bool,
    /// Fatal load failure message, shown as a blocking notice.
    pub load_failure: Option<String>,
    /// Most recent pitch estimate in Hz.
    pub last_pitch: Option<f32>,
    /// Confidence of the most recent estimate (0.0 to 1.0).
    pub last_confidence: Option<f32>,
    /// Note label for the most recent estimate.
    pub note_label: String,
    /// Worker-side processing time of the last analysis.
    pub processing_time_ms: Option<f32>,
    /// Currently requested test-tone frequency in Hz.
    pub test_frequency: f32,
}

/// Main application state for the pitch tracker.
struct TrackerApp {
    // Pipeline components
    worker: Option<WorkerHandle>,
    scheduler: AnalysisScheduler,
    history: HistoryBuffer,

    // Persisted settings
    settings: TrackerSettings,

    // Single source of truth for all display data
    display_data: AppDisplayData,
}

impl Default for TrackerApp {
    /// Creates the application: loads settings, spawns the analysis
    /// worker with the built-in model, and requests initialization.
    fn default() -> Self {
        eprintln!("[MAIN] Creating TrackerApp...");
        let settings = match config::load_settings(SETTINGS_PATH) {
            Ok(settings) => {
                eprintln!("[MAIN] Settings loaded from {SETTINGS_PATH}");
                settings
            }
            Err(_) => TrackerSettings::default(),
        };

        let worker = worker::spawn(Box::new(|_source: &str| {
            Ok(Box::new(model::BuiltinPitchModel::new()) as Box<dyn InferenceBoundary>)
        }));
        if let Err(e) = worker.send(WorkerCommand::Init {
            model_source: MODEL_SOURCE.to_string(),
        }) {
            eprintln!("[MAIN] Failed to request model init: {e}");
        }

        let test_frequency = settings.test_frequency;
        Self {
            worker: Some(worker),
            scheduler: AnalysisScheduler::new(),
            history: HistoryBuffer::default(),
            settings,
            display_data: AppDisplayData {
                worker_ready: false,
                running: false,
                load_failure: None,
                last_pitch: None,
                last_confidence: None,
                note_label: "--".to_string(),
                processing_time_ms: None,
                test_frequency,
            },
        }
    }
}

impl TrackerApp {
    /// Handles application state updates based on incoming messages.
    fn update(&mut self, message: Message) {
        match message {
            Message::Tick => {
                self.drain_worker_events();
                self.maybe_submit();
            }
            Message::StartStopPressed => {
                if self.display_data.load_failure.is_some() || !self.display_data.worker_ready {
                    return;
                }
                let running = !self.display_data.running;
                eprintln!("[MAIN] Running flag set to {running}");
                self.display_data.running = running;
                self.scheduler.set_running(running);
            }
            Message::FrequencyChanged(frequency) => {
                self.settings.test_frequency = frequency;
                self.display_data.test_frequency = frequency;
                // An in-flight request is never cancelled; resetting the
                // baseline forces a fresh submission right away.
                if self.display_data.running {
                    self.scheduler.reset_baseline();
                    self.maybe_submit();
                }
            }
            Message::Exit => {
                eprintln!("[MAIN] Exit requested - starting cleanup...");
                match config::save_settings(&self.settings, SETTINGS_PATH) {
                    Ok(_) => eprintln!("[MAIN] Settings saved."),
                    Err(e) => eprintln!("[MAIN] Error saving settings: {e}"),
                }
                if let Some(mut worker) = self.worker.take() {
                    worker.shutdown();
                }
                eprintln!("[MAIN] Cleanup completed - exiting");
                std::process::exit(0);
            }
        }
    }

    /// Applies every event the worker produced since the last tick.
    fn drain_worker_events(&mut self) {
        let Some(worker) = &self.worker else { return };
        let mut events = Vec::new();
        while let Ok(event) = worker.events().try_recv() {
            events.push(event);
        }
        for event in events {
            self.process_worker_event(event);
        }
    }

    /// Processes a single event received from the worker thread.
    fn process_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::InitComplete => {
                eprintln!("[MAIN] Worker initialized successfully");
                self.display_data.worker_ready = true;
                self.scheduler.set_ready(true);
            }
            WorkerEvent::AnalysisComplete {
                frames,
                requested_frequency,
                processing_time_ms,
            } => {
                self.scheduler.mark_completed(Instant::now());

                // Stale-result policy: a completion for a frequency the
                // slider has moved away from is dropped when configured.
                if !self.settings.keep_stale_results
                    && requested_frequency != self.settings.test_frequency
                {
                    eprintln!(
                        "[MAIN] Discarding stale result for {requested_frequency} Hz"
                    );
                    return;
                }

                // The last frame is the most current estimate.
                if let Some(frame) = frames.last() {
                    self.history.append(HistoryEntry {
                        pitch: frame.pitch,
                        confidence: frame.confidence,
                    });
                    self.display_data.last_pitch = Some(frame.pitch);
                    self.display_data.last_confidence = Some(frame.confidence);
                    self.display_data.note_label = notes::frequency_to_note_name(frame.pitch);
                    self.display_data.processing_time_ms = Some(processing_time_ms);
                }
            }
            WorkerEvent::Error { message } => {
                if !self.display_data.worker_ready {
                    // Before InitComplete the only failable request is the
                    // load itself; fatal, no retry.
                    eprintln!("[MAIN] Model load failed: {message}");
                    self.display_data.load_failure = Some(message);
                } else {
                    // One analysis failed; skip the display update for
                    // this cycle and resume polling.
                    eprintln!("[MAIN] Analysis error: {message}");
                    self.scheduler.mark_completed(Instant::now());
                }
            }
        }
    }

    /// Submits a fresh test tone when the scheduler allows it.
    fn maybe_submit(&mut self) {
        // No worker, no transition: begin_submission must not strand the
        // scheduler in Submitting with nobody to send to.
        let Some(worker) = &self.worker else { return };
        let now = Instant::now();
        if !self.scheduler.begin_submission(now) {
            return;
        }

        let frequency = self.settings.test_frequency;
        let samples = signal::generate_test_tone(frequency, TONE_DURATION_SECONDS, MODEL_SAMPLE_RATE);
        match worker.send(WorkerCommand::Analyze {
            samples,
            requested_frequency: frequency,
        }) {
            Ok(()) => self.scheduler.mark_submitted(),
            Err(e) => {
                // Channel failure: unrecoverable for this request only.
                eprintln!("[MAIN] Failed to submit analysis: {e}");
                self.scheduler.mark_completed(now);
            }
        }
    }

    /// Renders the main application interface.
    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data, self.history.snapshot())
    }

    /// Timer subscription driving event draining and submission pacing.
    /// 16 ms keeps the chart smooth and the scheduler responsive.
    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}
