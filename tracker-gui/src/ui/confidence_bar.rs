//! # Confidence Bar Widget
//!
//! A horizontal bar showing the confidence of the most recent pitch
//! estimate, color-coded by threshold: green above 0.5, yellow above
//! 0.2, red below.

use iced::widget::canvas::{self, Geometry, Path};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme, mouse};

/// Confidence above this renders green.
const GOOD_THRESHOLD: f32 = 0.5;

/// Confidence above this (but below good) renders yellow.
const FAIR_THRESHOLD: f32 = 0.2;

/// Confidence bar widget.
pub struct ConfidenceBar {
    /// Current confidence (None when nothing has been analyzed yet).
    confidence: Option<f32>,
}

impl ConfidenceBar {
    pub fn new(confidence: Option<f32>) -> Self {
        Self { confidence }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(16.0)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for ConfidenceBar {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let background = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&background, Color::from_rgb8(0x40, 0x40, 0x40));

        if let Some(confidence) = self.confidence {
            let clamped = confidence.clamp(0.0, 1.0);

            let color = if clamped > GOOD_THRESHOLD {
                Color::from_rgb8(0x4C, 0xAF, 0x50) // Green
            } else if clamped > FAIR_THRESHOLD {
                Color::from_rgb8(0xFF, 0xC1, 0x07) // Yellow
            } else {
                Color::from_rgb8(0xF4, 0x43, 0x36) // Red
            };

            let fill = Path::rectangle(
                Point::ORIGIN,
                Size::new(bounds.width * clamped, bounds.height),
            );
            frame.fill(&fill, color);
        }

        vec![frame.into_geometry()]
    }
}
