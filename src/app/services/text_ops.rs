use std::path::Path;

use crate::app::domain::text_widget::TextWidget;

/// Extract filename from a file path
///
/// Returns the filename component of a path, or "Unknown" if it can't be extracted.
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Find next occurrence of search string in text
///
/// Returns the byte position of the match, or None if not found.
/// Searches from start_pos onwards. Case folding is ASCII-only so byte
/// positions in the folded text match the original.
pub fn find_in_text(text: &str, search: &str, start_pos: usize, case_sensitive: bool) -> Option<usize> {
    if search.is_empty() || start_pos >= text.len() || !text.is_char_boundary(start_pos) {
        return None;
    }

    if case_sensitive {
        text[start_pos..].find(search).map(|pos| start_pos + pos)
    } else {
        let haystack = text[start_pos..].to_ascii_lowercase();
        let needle = search.to_ascii_lowercase();
        haystack.find(&needle).map(|pos| start_pos + pos)
    }
}

/// Start positions of every match, overlapping ones included.
pub fn find_all(text: &str, search: &str, case_sensitive: bool) -> Vec<usize> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(at) = find_in_text(text, search, pos, case_sensitive) {
        found.push(at);
        let step = text[at..].chars().next().map_or(1, char::len_utf8);
        pos = at + step;
    }
    found
}

/// Incremental search over one text widget.
///
/// A new query collects every match up front and selects the first; asking
/// again with the same query selects the next one, wrapping back to the first
/// after the last.
#[derive(Debug, Default, Clone)]
pub struct SearchSession {
    last_query: String,
    case_sensitive: bool,
    positions: Vec<usize>,
    next_index: usize,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    pub fn match_count(&self) -> usize {
        self.positions.len()
    }

    /// Select the next match for `query`. Returns its start, or `None` when
    /// the query is empty or has no match.
    pub fn search(&mut self, text: &mut dyn TextWidget, query: &str, case_sensitive: bool) -> Option<usize> {
        text.unselect();
        if query.is_empty() {
            self.last_query.clear();
            return None;
        }

        if query != self.last_query || case_sensitive != self.case_sensitive {
            self.positions = find_all(&text.text(), query, case_sensitive);
            self.next_index = 0;
            self.last_query = query.to_string();
            self.case_sensitive = case_sensitive;
        }
        if self.next_index >= self.positions.len() {
            self.next_index = 0;
        }

        let start = *self.positions.get(self.next_index)?;
        let end = start + query.len();
        text.select(start, end);
        text.set_insert_position(start);
        text.show_insert_position();
        self.next_index += 1;
        Some(start)
    }

    /// Forget collected positions so the next search rescans the buffer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Replace every occurrence of `search` in the widget, scanning forward
/// from each replacement. The last replacement is left selected.
///
/// Returns the number of replacements.
pub fn replace_all(text: &mut dyn TextWidget, search: &str, replacement: &str, case_sensitive: bool) -> usize {
    text.unselect();
    if search.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut pos = 0;
    let mut last = None;
    while let Some(found) = find_in_text(&text.text(), search, pos, case_sensitive) {
        text.remove(found, found + search.len());
        text.insert(found, replacement);
        pos = found + replacement.len();
        last = Some((found, pos));
        count += 1;
    }

    if let Some((start, end)) = last {
        text.select(start, end);
    }
    tracing::debug!(count, search, "replace all");
    count
}
