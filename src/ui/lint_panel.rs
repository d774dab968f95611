use fltk::{
    enums::{Color, Font},
    prelude::*,
    text::{TextBuffer, TextDisplay},
};

use crate::app::controllers::panels::LintPanel;

/// Read-only pane under the editor that shows style-check reports.
#[derive(Clone)]
pub struct FltkLintPanel {
    display: TextDisplay,
    buffer: TextBuffer,
}

impl FltkLintPanel {
    pub fn new(font: Font, size: i32) -> Self {
        let buffer = TextBuffer::default();
        let mut display = TextDisplay::new(0, 0, 0, 0, None);
        display.set_buffer(buffer.clone());
        display.set_text_font(font);
        display.set_text_size(size);
        display.set_color(Color::from_rgb(250, 250, 250));
        Self { display, buffer }
    }

    pub fn widget(&self) -> &TextDisplay {
        &self.display
    }
}

impl LintPanel for FltkLintPanel {
    fn clear(&mut self) {
        self.buffer.set_text("");
    }

    fn append(&mut self, text: &str) {
        self.buffer.append(text);
        self.display.redraw();
    }
}
