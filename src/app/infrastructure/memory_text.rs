use crate::app::domain::text_widget::{StyleTag, TextWidget};

/// Headless `TextWidget` backed by a `String`.
///
/// Keeps one optional tag per byte so highlight results can be inspected
/// without a display. Cursor and selection follow edits the way a text
/// display does.
#[derive(Default)]
pub struct MemoryText {
    text: String,
    tags: Vec<Option<StyleTag>>,
    cursor: usize,
    selection: Option<(usize, usize)>,
    listener: Option<Box<dyn FnMut()>>,
}

impl MemoryText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tags: vec![None; text.len()],
            ..Self::default()
        }
    }

    pub fn tag_at(&self, pos: usize) -> Option<StyleTag> {
        self.tags.get(pos).copied().flatten()
    }

    pub fn tags_snapshot(&self) -> Vec<Option<StyleTag>> {
        self.tags.clone()
    }

    /// Tagged runs as `(start, end, tag)`, merged where adjacent bytes share a tag.
    pub fn tagged_spans(&self) -> Vec<(usize, usize, StyleTag)> {
        let mut spans: Vec<(usize, usize, StyleTag)> = Vec::new();
        for (i, tag) in self.tags.iter().enumerate() {
            let Some(tag) = *tag else { continue };
            match spans.last_mut() {
                Some(last) if last.1 == i && last.2 == tag => last.1 = i + 1,
                _ => spans.push((i, i + 1, tag)),
            }
        }
        spans
    }

    fn clamp(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener();
        }
    }
}

impl TextWidget for MemoryText {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn text_range(&self, start: usize, end: usize) -> String {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start >= end {
            return String::new();
        }
        self.text[start..end].to_string()
    }

    fn length(&self) -> usize {
        self.text.len()
    }

    fn insert(&mut self, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let pos = self.clamp(pos);
        let len = text.len();
        self.text.insert_str(pos, text);
        self.tags
            .splice(pos..pos, std::iter::repeat_n(None, len));

        if self.cursor >= pos {
            self.cursor += len;
        }
        if let Some((start, end)) = self.selection {
            let start = if start >= pos { start + len } else { start };
            let end = if end > pos { end + len } else { end };
            self.selection = Some((start, end));
        }
        self.notify();
    }

    fn remove(&mut self, start: usize, end: usize) {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start >= end {
            return;
        }
        let len = end - start;
        self.text.replace_range(start..end, "");
        self.tags.drain(start..end);

        let shift = |p: usize| {
            if p >= end {
                p - len
            } else if p > start {
                start
            } else {
                p
            }
        };
        self.cursor = shift(self.cursor);
        self.selection = self
            .selection
            .map(|(s, e)| (shift(s), shift(e)))
            .filter(|(s, e)| s < e);
        self.notify();
    }

    fn set_text(&mut self, text: &str) {
        let changed = self.text != text;
        self.text = text.to_string();
        self.tags = vec![None; text.len()];
        self.cursor = 0;
        self.selection = None;
        if changed {
            self.notify();
        }
    }

    fn insert_position(&self) -> usize {
        self.cursor
    }

    fn set_insert_position(&mut self, pos: usize) {
        self.cursor = self.clamp(pos);
    }

    fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    fn select(&mut self, start: usize, end: usize) {
        let (start, end) = (self.clamp(start), self.clamp(end));
        self.selection = (start < end).then_some((start, end));
    }

    fn unselect(&mut self) {
        self.selection = None;
    }

    fn clear_tags(&mut self, start: usize, end: usize) {
        let end = end.min(self.tags.len());
        if start < end {
            self.tags[start..end].fill(None);
        }
    }

    fn add_tag(&mut self, start: usize, end: usize, tag: StyleTag) {
        let end = end.min(self.tags.len());
        if start < end {
            self.tags[start..end].fill(Some(tag));
        }
    }

    fn cursor_screen_position(&self) -> (i32, i32) {
        let line = self.text[..self.cursor].matches('\n').count() as i32;
        let column = self.cursor - self.line_start(self.cursor);
        (column as i32 * 8, (line + 1) * 16)
    }

    fn set_change_listener(&mut self, listener: Box<dyn FnMut()>) {
        self.listener = Some(listener);
    }
}
