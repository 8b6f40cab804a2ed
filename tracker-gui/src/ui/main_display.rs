//! # Main Display Module
//!
//! This module contains the main display components and layout logic
//! for the pitch tracker application.

use iced::widget::{Space, button, column, container, horizontal_space, row, slider, text};
use iced::{Alignment, Color, Element, Length};
use tracker_core::history::HistoryEntry;

use super::confidence_bar::ConfidenceBar;
use super::pitch_chart::PitchChart;

/// Slider range for the requested test frequency, in Hz.
const MIN_FREQUENCY: f32 = 80.0;
const MAX_FREQUENCY: f32 = 1000.0;

/// Creates the complete main application view.
pub fn create_main_view(
    data: &crate::AppDisplayData,
    history: Vec<HistoryEntry>,
) -> Element<'static, crate::Message> {
    // A failed model load is fatal; nothing below can do useful work.
    if let Some(message) = &data.load_failure {
        return create_load_failure_notice(message.clone());
    }

    let title = text("Pitch Tracker").size(28);

    let readout_panel = create_readout_panel(data);
    let controls_panel = create_controls_panel(data);
    let chart_panel = create_chart_panel(data, history);

    let main_content = column![
        title,
        Space::with_height(15),
        row![readout_panel, Space::with_width(10), controls_panel].align_y(Alignment::Start),
        Space::with_height(10),
        chart_panel,
    ]
    .spacing(10)
    .padding(20);

    container(main_content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Full-window notice shown when the model failed to load.
fn create_load_failure_notice(message: String) -> Element<'static, crate::Message> {
    let notice = column![
        text("Model failed to load").size(32),
        Space::with_height(10),
        text(message).size(16),
        Space::with_height(10),
        text("No further analysis is possible.").size(16),
        Space::with_height(20),
        button(text("Quit").size(16)).on_press(crate::Message::Exit),
    ]
    .align_x(Alignment::Center);

    container(notice)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Creates the pitch readout panel: note label, frequency, confidence.
fn create_readout_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    // The note label fades with low confidence, but never disappears.
    let label_alpha = data.last_confidence.map_or(0.3, |c| c.max(0.3));
    let note_label = text(data.note_label.clone())
        .size(40)
        .color(Color { a: label_alpha, ..Color::WHITE });

    let pitch_text = data
        .last_pitch
        .map(|pitch| format!("{pitch:.1} Hz"))
        .unwrap_or_else(|| "0.0 Hz".to_string());
    let confidence_text = data
        .last_confidence
        .map(|c| format!("{:.0}%", c * 100.0))
        .unwrap_or_else(|| "0%".to_string());

    let processing_text = data
        .processing_time_ms
        .map(|ms| format!("Processing time: {ms:.0} ms"))
        .unwrap_or_default();

    let readout_content = column![
        row![
            text("Note").size(14),
            horizontal_space(),
            text("Confidence").size(14),
        ],
        Space::with_height(5),
        row![
            note_label,
            Space::with_width(10),
            text(pitch_text).size(24),
            horizontal_space(),
            container(text(confidence_text).size(16)).padding([4, 8]),
        ]
        .align_y(Alignment::Center),
        Space::with_height(10),
        ConfidenceBar::new(data.last_confidence).view(),
        Space::with_height(5),
        text(processing_text)
            .size(12)
            .color(Color::from_rgb(0.6, 0.6, 0.6)),
    ]
    .spacing(5);

    container(
        column![
            text("Detected Pitch").size(18),
            Space::with_height(10),
            readout_content
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::Fill)
    .height(Length::Fixed(220.0))
    .into()
}

/// Creates the control panel: frequency slider and run controls.
fn create_controls_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let frequency_slider = slider(
        MIN_FREQUENCY..=MAX_FREQUENCY,
        data.test_frequency,
        crate::Message::FrequencyChanged,
    )
    .step(1.0);

    let start_stop = create_start_stop_button(data);

    let controls_content = column![
        text("Test Tone Frequency:").size(14),
        text(format!("{:.0} Hz", data.test_frequency)).size(24),
        frequency_slider,
        Space::with_height(15),
        row![
            start_stop,
            Space::with_width(10),
            button(text("Quit").size(14)).on_press(crate::Message::Exit),
        ],
    ]
    .spacing(8);

    container(
        column![
            text("Controls").size(18),
            Space::with_height(10),
            controls_content
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::Fixed(300.0))
    .height(Length::Fixed(220.0))
    .into()
}

/// The start/stop button, disabled until the worker finished loading.
fn create_start_stop_button(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    if !data.worker_ready {
        // No on_press: stays disabled while the model loads.
        return button(text("Loading model...").size(14)).into();
    }

    let label = if data.running {
        "Stop Test Tone"
    } else {
        "Start Test Tone"
    };
    button(text(label).size(14))
        .on_press(crate::Message::StartStopPressed)
        .into()
}

/// Creates the strip-chart panel of recent estimates.
fn create_chart_panel(
    data: &crate::AppDisplayData,
    history: Vec<HistoryEntry>,
) -> Element<'static, crate::Message> {
    let chart = PitchChart::new(history, data.test_frequency).view();

    container(
        column![
            text("Pitch History").size(18),
            Space::with_height(10),
            container(chart).width(Length::Fill).height(Length::Fill)
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::Fill)
    .height(Length::Fixed(300.0))
    .into()
}
