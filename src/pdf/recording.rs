//! A surface that records draw calls instead of producing a file.

use std::convert::Infallible;

use serde::Serialize;

use crate::layout::{Align, Surface};
use crate::theme::Color;

/// One recorded drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillColor { color: Color },
    StrokeColor { color: Color },
    LineWidth { width: f32 },
    Font { name: String, size: f32 },
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Text { x: f32, y: f32, text: String, align: Align },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    NewPage,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for RecordingSurface {
    type Output = Vec<DrawCommand>;
    type Error = Infallible;

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillColor { color });
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::StrokeColor { color });
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth { width });
    }

    fn set_font(&mut self, name: &str, size: f32) {
        self.commands.push(DrawCommand::Font {
            name: name.to_string(),
            size,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::Rect { x, y, width, height });
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, align: Align) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            align,
        });
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.commands.push(DrawCommand::Line { x1, y1, x2, y2 });
    }

    fn new_page(&mut self) {
        self.commands.push(DrawCommand::NewPage);
    }

    fn finish(self) -> Result<Vec<DrawCommand>, Infallible> {
        Ok(self.commands)
    }
}
