//! `TextWidget` backed by FLTK buffers.
//!
//! Every document owns a text buffer and a parallel style buffer. A single
//! `TextEditor` is shared between documents; only the active one is attached
//! to it at a time.

use std::cell::RefCell;
use std::rc::Rc;

use fltk::enums::{Color, Font};
use fltk::prelude::*;
use fltk::text::{StyleTableEntry, TextBuffer, TextEditor};

use crate::app::domain::text_widget::{StyleTag, TextWidget, UNTAGGED_STYLE};

type Listener = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

/// Read text from an FLTK TextBuffer without leaking the C-allocated copy.
///
/// `TextBuffer::text()` copies the `malloc()`'d string returned by
/// `Fl_Text_Buffer_text()` but never frees it, leaking the whole buffer on
/// every call. The highlighter reads the buffer on each keystroke, so this
/// goes through the FFI directly and frees the allocation.
pub fn buffer_text_no_leak(buf: &TextBuffer) -> String {
    unsafe extern "C" {
        fn Fl_Text_Buffer_text(buf: *mut std::ffi::c_void) -> *mut std::ffi::c_char;
        fn free(ptr: *mut std::ffi::c_void);
    }

    // SAFETY: `buf.as_ptr()` is the live FLTK buffer. `Fl_Text_Buffer_text`
    // returns a malloc'd, null-terminated copy (or null), which is read once
    // and released with the matching `free`.
    unsafe {
        let inner = buf.as_ptr() as *mut std::ffi::c_void;
        let ptr = Fl_Text_Buffer_text(inner);
        if ptr.is_null() {
            return String::new();
        }
        let result = std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned();
        free(ptr as *mut std::ffi::c_void);
        result
    }
}

/// Style table for `set_highlight_data`: the untagged entry followed by one
/// entry per `StyleTag`, in style-char order.
pub fn style_table(font: Font, size: i32) -> Vec<StyleTableEntry> {
    let mut entries = vec![StyleTableEntry {
        color: Color::Foreground,
        font,
        size,
    }];
    entries.extend(StyleTag::ALL.iter().map(|tag| {
        let (r, g, b) = tag.to_rgb();
        StyleTableEntry {
            color: Color::from_rgb(r, g, b),
            font,
            size,
        }
    }));
    entries
}

fn filler(ch: char, len: usize) -> String {
    std::iter::repeat_n(ch, len).collect()
}

fn to_pos(pos: usize) -> i32 {
    i32::try_from(pos).unwrap_or(i32::MAX)
}

fn from_pos(pos: i32) -> usize {
    usize::try_from(pos).unwrap_or_default()
}

pub struct FltkText {
    buffer: TextBuffer,
    style: TextBuffer,
    editor: TextEditor,
    table: Vec<StyleTableEntry>,
    listener: Listener,
    attached: bool,
    /// Cursor kept while another document owns the editor.
    parked_cursor: usize,
}

impl FltkText {
    pub fn new(editor: TextEditor, table: Vec<StyleTableEntry>) -> Self {
        let mut buffer = TextBuffer::default();
        let style = TextBuffer::default();
        let listener: Listener = Rc::new(RefCell::new(None));

        let mut style_buf = style.clone();
        let notify = listener.clone();
        buffer.add_modify_callback(move |pos, inserted, deleted, _restyled, _deleted_text| {
            if inserted == 0 && deleted == 0 {
                return;
            }
            if deleted > 0 {
                style_buf.remove(pos, pos + deleted);
            }
            if inserted > 0 {
                style_buf.insert(pos, &filler(UNTAGGED_STYLE, from_pos(inserted)));
            }
            if let Some(callback) = notify.borrow_mut().as_mut() {
                callback();
            }
        });

        Self {
            buffer,
            style,
            editor,
            table,
            listener,
            attached: false,
            parked_cursor: 0,
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    fn set_style(&mut self, start: usize, end: usize, ch: char) {
        let end = end.min(self.length());
        if start >= end {
            return;
        }
        self.style
            .replace(to_pos(start), to_pos(end), &filler(ch, end - start));
    }
}

impl TextWidget for FltkText {
    fn text(&self) -> String {
        buffer_text_no_leak(&self.buffer)
    }

    fn text_range(&self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        self.buffer
            .text_range(to_pos(start), to_pos(end))
            .unwrap_or_default()
    }

    fn length(&self) -> usize {
        from_pos(self.buffer.length())
    }

    fn insert(&mut self, pos: usize, text: &str) {
        self.buffer.insert(to_pos(pos), text);
    }

    fn remove(&mut self, start: usize, end: usize) {
        if start < end {
            self.buffer.remove(to_pos(start), to_pos(end));
        }
    }

    fn set_text(&mut self, text: &str) {
        if self.text() == text {
            return;
        }
        self.buffer.set_text(text);
        self.set_insert_position(0);
    }

    fn insert_position(&self) -> usize {
        if self.attached {
            from_pos(self.editor.insert_position())
        } else {
            self.parked_cursor
        }
    }

    fn set_insert_position(&mut self, pos: usize) {
        let pos = pos.min(self.length());
        if self.attached {
            self.editor.set_insert_position(to_pos(pos));
        } else {
            self.parked_cursor = pos;
        }
    }

    fn show_insert_position(&mut self) {
        if self.attached {
            self.editor.show_insert_position();
        }
    }

    fn activate(&mut self) {
        self.editor.set_buffer(self.buffer.clone());
        self.editor
            .set_highlight_data(self.style.clone(), self.table.clone());
        self.attached = true;
        let cursor = self.parked_cursor;
        self.set_insert_position(cursor);
        self.editor.redraw();
    }

    fn deactivate(&mut self) {
        self.parked_cursor = self.insert_position();
        self.attached = false;
    }

    fn selection(&self) -> Option<(usize, usize)> {
        if !self.buffer.selected() {
            return None;
        }
        self.buffer
            .selection_position()
            .map(|(start, end)| (from_pos(start.min(end)), from_pos(start.max(end))))
            .filter(|(start, end)| start < end)
    }

    fn select(&mut self, start: usize, end: usize) {
        self.buffer.select(to_pos(start), to_pos(end));
        self.set_insert_position(end);
        self.show_insert_position();
    }

    fn unselect(&mut self) {
        self.buffer.unselect();
    }

    fn clear_tags(&mut self, start: usize, end: usize) {
        self.set_style(start, end, UNTAGGED_STYLE);
    }

    fn add_tag(&mut self, start: usize, end: usize, tag: StyleTag) {
        self.set_style(start, end, tag.style_char());
    }

    fn cursor_screen_position(&self) -> (i32, i32) {
        if !self.attached {
            return (0, 0);
        }
        let (x, y) = self.editor.position_to_xy(self.editor.insert_position());
        let (wx, wy) = self
            .editor
            .window()
            .map(|w| (w.x_root(), w.y_root()))
            .unwrap_or_default();
        (wx + x, wy + y + self.editor.text_size() + 4)
    }

    fn set_change_listener(&mut self, listener: Box<dyn FnMut()>) {
        *self.listener.borrow_mut() = Some(listener);
    }
}
