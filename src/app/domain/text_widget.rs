//! The capability set the editor core needs from a multi-line text widget.
//!
//! Positions are byte offsets into the buffer, the addressing FLTK's
//! `TextBuffer` uses. Callers only ever pass positions that sit on character
//! boundaries (cursor positions, line starts, token boundaries).

/// Colour class applied to a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleTag {
    Orange,
    Blue,
    Green,
    Red,
    Black,
}

impl StyleTag {
    pub const ALL: [StyleTag; 5] = [
        StyleTag::Orange,
        StyleTag::Blue,
        StyleTag::Green,
        StyleTag::Red,
        StyleTag::Black,
    ];

    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            StyleTag::Orange => (0xCC, 0x7A, 0x00),
            StyleTag::Blue => (0x00, 0x3D, 0x99),
            StyleTag::Green => (0x24, 0x8F, 0x24),
            StyleTag::Red => (0xDC, 0x14, 0x3C),
            StyleTag::Black => (0x00, 0x00, 0x00),
        }
    }

    /// Style-buffer character for this tag. `'A'` is reserved for untagged text.
    pub fn style_char(self) -> char {
        match self {
            StyleTag::Orange => 'B',
            StyleTag::Blue => 'C',
            StyleTag::Green => 'D',
            StyleTag::Red => 'E',
            StyleTag::Black => 'F',
        }
    }
}

/// Style-buffer character for text without a tag.
pub const UNTAGGED_STYLE: char = 'A';

pub trait TextWidget {
    /// Whole buffer contents.
    fn text(&self) -> String;

    fn text_range(&self, start: usize, end: usize) -> String;

    fn length(&self) -> usize;

    fn insert(&mut self, pos: usize, text: &str);

    fn remove(&mut self, start: usize, end: usize);

    /// Replace the whole buffer.
    fn set_text(&mut self, text: &str);

    fn insert_position(&self) -> usize;

    fn set_insert_position(&mut self, pos: usize);

    /// Scroll so the insert cursor is visible.
    fn show_insert_position(&mut self) {}

    /// Become the buffer shown in the editor view.
    fn activate(&mut self) {}

    /// Stop being shown; cursor state is kept for the next `activate`.
    fn deactivate(&mut self) {}

    /// Active selection as `(start, end)`, `None` when nothing is selected.
    fn selection(&self) -> Option<(usize, usize)>;

    fn select(&mut self, start: usize, end: usize);

    fn unselect(&mut self);

    /// Remove every style tag inside `start..end`.
    fn clear_tags(&mut self, start: usize, end: usize);

    fn add_tag(&mut self, start: usize, end: usize, tag: StyleTag);

    /// Screen coordinates just below the insert cursor.
    fn cursor_screen_position(&self) -> (i32, i32);

    /// Register the callback fired after every insert or delete.
    fn set_change_listener(&mut self, listener: Box<dyn FnMut()>);

    fn line_start(&self, pos: usize) -> usize {
        let text = self.text();
        let pos = pos.min(text.len());
        text.get(..pos)
            .and_then(|before| before.rfind('\n'))
            .map_or(0, |i| i + 1)
    }

    fn line_end(&self, pos: usize) -> usize {
        let text = self.text();
        let pos = pos.min(text.len());
        text.get(pos..)
            .and_then(|after| after.find('\n'))
            .map_or(text.len(), |i| pos + i)
    }

    /// Text of the line holding the cursor, without its newline.
    fn line_text(&self) -> String {
        let pos = self.insert_position();
        self.text_range(self.line_start(pos), self.line_end(pos))
    }

    /// Text between the start of the cursor line and the cursor.
    fn line_text_before_cursor(&self) -> String {
        let pos = self.insert_position();
        self.text_range(self.line_start(pos), pos)
    }

    /// Start offsets of every line touched by `start..=end`, top to bottom.
    fn line_starts_between(&self, start: usize, end: usize) -> Vec<usize> {
        let text = self.text();
        let end = end.min(text.len());
        let start = start.min(end);
        let mut starts = vec![self.line_start(start)];
        if let Some(span) = text.get(start..end) {
            starts.extend(
                span.char_indices()
                    .filter(|&(_, ch)| ch == '\n')
                    .map(|(i, _)| start + i + 1),
            );
        }
        starts
    }

    fn line_count(&self) -> usize {
        self.text().matches('\n').count() + 1
    }

    fn select_all(&mut self) {
        let len = self.length();
        self.select(0, len);
    }
}
