//! Tool-mode state: select vs draw, pencil vs eraser.

use crate::entities::{Color, DRAW_PALETTE};

/// Default pencil stroke width in board pixels.
pub const DEFAULT_LINE_WIDTH: f64 = 3.0;

/// The eraser paints this many times wider than the pencil.
pub const ERASER_WIDTH_FACTOR: f64 = 3.0;

/// Top-level interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Tokens are draggable and editable.
    #[default]
    Select,
    /// Pointer gestures paint into the ink layer.
    Draw,
}

/// Sub-mode of the draw tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Pencil,
    Eraser,
}

/// Current tool selection plus brush settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub mode: DrawMode,
    pub stroke_color: Color,
    pub line_width: f64,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            mode: DrawMode::default(),
            stroke_color: DRAW_PALETTE[0],
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle between select and draw; entering draw always starts in pencil.
    pub fn toggle_draw(&mut self) {
        match self.tool {
            Tool::Select => {
                self.tool = Tool::Draw;
                self.mode = DrawMode::Pencil;
            }
            Tool::Draw => self.tool = Tool::Select,
        }
    }

    pub fn toggle_eraser(&mut self) {
        self.mode = match self.mode {
            DrawMode::Pencil => DrawMode::Eraser,
            DrawMode::Eraser => DrawMode::Pencil,
        };
    }

    /// Effective stroke width for the active draw mode.
    pub fn brush_width(&self) -> f64 {
        match self.mode {
            DrawMode::Pencil => self.line_width,
            DrawMode::Eraser => self.line_width * ERASER_WIDTH_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tools = ToolState::new();
        assert_eq!(tools.tool, Tool::Select);
        assert_eq!(tools.mode, DrawMode::Pencil);
        assert_eq!(tools.stroke_color, DRAW_PALETTE[0]);
        assert_eq!(tools.line_width, DEFAULT_LINE_WIDTH);
    }

    #[test]
    fn test_toggle_draw_resets_to_pencil() {
        let mut tools = ToolState::new();
        tools.toggle_draw();
        tools.toggle_eraser();
        assert_eq!(tools.mode, DrawMode::Eraser);

        tools.toggle_draw();
        assert_eq!(tools.tool, Tool::Select);
        tools.toggle_draw();
        assert_eq!(tools.mode, DrawMode::Pencil);
    }

    #[test]
    fn test_brush_width() {
        let mut tools = ToolState::new();
        assert_eq!(tools.brush_width(), 3.0);
        tools.toggle_eraser();
        assert_eq!(tools.brush_width(), 9.0);
    }
}
