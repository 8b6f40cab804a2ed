//! # Pitch Chart Widget
//!
//! The live strip chart of recent pitch estimates. Each completed
//! analysis contributes one point; the chart shows the rolling history
//! against a fixed 50-800 Hz scale with a dashed line at the currently
//! requested test frequency.

use iced::widget::canvas::{self, Geometry, LineDash, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Theme, mouse};
use tracker_core::history::{HISTORY_CAPACITY, HistoryEntry};

/// Vertical scale of the chart in Hz.
const MIN_PITCH: f32 = 50.0;
const MAX_PITCH: f32 = 800.0;

/// Spacing of the horizontal gridlines in Hz.
const GRID_STEP: f32 = 100.0;

/// Trace color for the pitch line and its points.
const TRACE_COLOR: Color = Color::from_rgb(0.10, 0.45, 0.91);

/// Strip-chart widget over a history snapshot.
pub struct PitchChart {
    history: Vec<HistoryEntry>,
    /// Currently requested test frequency, drawn as a dashed target line.
    test_frequency: f32,
}

impl PitchChart {
    pub fn new(history: Vec<HistoryEntry>, test_frequency: f32) -> Self {
        Self {
            history,
            test_frequency,
        }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }

    /// Maps a pitch to a y coordinate on the fixed scale.
    fn scale_y(&self, pitch: f32, height: f32) -> f32 {
        height - ((pitch - MIN_PITCH) / (MAX_PITCH - MIN_PITCH)) * height
    }
}

impl<Message> canvas::Program<Message> for PitchChart {
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

        if !bounds.width.is_finite() || !bounds.height.is_finite() {
            return vec![frame.into_geometry()];
        }

        let background = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&background, Color::from_rgb8(0x20, 0x20, 0x20));

        // Horizontal gridlines with Hz labels.
        let mut gridline_pitch = GRID_STEP;
        while gridline_pitch < MAX_PITCH {
            let y = self.scale_y(gridline_pitch, bounds.height);
            let gridline = Path::line(Point::new(0.0, y), Point::new(bounds.width, y));
            frame.stroke(
                &gridline,
                Stroke::default()
                    .with_width(1.0)
                    .with_color(Color::from_rgb8(0x38, 0x38, 0x38)),
            );
            frame.fill_text(canvas::Text {
                content: format!("{gridline_pitch:.0} Hz"),
                position: Point::new(5.0, y - 12.0),
                color: Color::from_rgb8(0x99, 0x99, 0x99),
                size: iced::Pixels(10.0),
                ..canvas::Text::default()
            });
            gridline_pitch += GRID_STEP;
        }

        // Dashed line at the requested test frequency.
        let target_y = self.scale_y(self.test_frequency, bounds.height);
        let target_line = Path::line(Point::new(0.0, target_y), Point::new(bounds.width, target_y));
        frame.stroke(
            &target_line,
            Stroke {
                line_dash: LineDash {
                    segments: &[5.0, 5.0],
                    offset: 0,
                },
                ..Stroke::default()
                    .with_width(1.0)
                    .with_color(Color::from_rgb8(0x99, 0x99, 0x99))
            },
        );

        if self.history.len() > 1 {
            // Points are laid out left to right in arrival order, on a
            // fixed axis of HISTORY_CAPACITY slots.
            let x_step = bounds.width / HISTORY_CAPACITY as f32;

            let trace = Path::new(|builder| {
                for (i, point) in self.history.iter().enumerate() {
                    let position =
                        Point::new(i as f32 * x_step, self.scale_y(point.pitch, bounds.height));
                    if i == 0 {
                        builder.move_to(position);
                    } else {
                        builder.line_to(position);
                    }
                }
            });
            frame.stroke(&trace, Stroke::default().with_width(2.0).with_color(TRACE_COLOR));

            // Confidence shows as point opacity.
            for (i, point) in self.history.iter().enumerate() {
                let position =
                    Point::new(i as f32 * x_step, self.scale_y(point.pitch, bounds.height));
                let dot = Path::circle(position, 2.0);
                frame.fill(
                    &dot,
                    Color {
                        a: point.confidence.clamp(0.0, 1.0),
                        ..TRACE_COLOR
                    },
                );
            }
        }

        vec![frame.into_geometry()]
    }
}
