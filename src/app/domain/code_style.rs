//! Per-language editing policy.
//!
//! A `CodeStyle` decides what the tab, enter and backspace keys do, which
//! characters open a deeper indent level, how the buffer is coloured and
//! whether the file is handed to an external style checker.

use std::path::Path;

use crate::app::controllers::coordinator::Coordinator;
use crate::app::domain::completion::{self, CompletionIndex, CompletionRequest};
use crate::app::domain::text_widget::TextWidget;
use crate::app::services::lint::StyleChecker;
use crate::app::services::syntax::{self, Token, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStyle {
    #[default]
    Plain,
    Python,
    Html,
    Css,
    JavaScript,
}

/// What the widget should do with the key after the style ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The style consumed the key; suppress the widget default.
    Handled,
    /// Let the widget apply its default behaviour.
    Default,
    /// Show these completion candidates; the key is consumed.
    Complete(CompletionRequest),
}

impl CodeStyle {
    pub fn from_path(path: Option<&Path>) -> Self {
        let ext = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("py") => CodeStyle::Python,
            Some("html" | "htm") => CodeStyle::Html,
            Some("css") => CodeStyle::Css,
            Some("js" | "mjs" | "cjs") => CodeStyle::JavaScript,
            _ => CodeStyle::Plain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodeStyle::Plain => "Plain",
            CodeStyle::Python => "Python",
            CodeStyle::Html => "HTML",
            CodeStyle::Css => "CSS",
            CodeStyle::JavaScript => "JavaScript",
        }
    }

    pub fn one_indent(self) -> &'static str {
        match self {
            CodeStyle::Plain => "\t",
            CodeStyle::Python => "    ",
            CodeStyle::Html | CodeStyle::Css | CodeStyle::JavaScript => "  ",
        }
    }

    pub fn indent_length(self) -> usize {
        self.one_indent().len()
    }

    /// Characters that, right before the cursor, make enter add one indent level.
    pub fn next_is_indent(self) -> &'static [char] {
        match self {
            CodeStyle::Plain => &['(', '{', '['],
            CodeStyle::Python => &['(', '{', '[', ':'],
            CodeStyle::Html => &[],
            CodeStyle::Css | CodeStyle::JavaScript => &['{'],
        }
    }

    /// syntect grammar name used for highlighting.
    pub fn grammar(self) -> Option<&'static str> {
        match self {
            CodeStyle::Plain => None,
            CodeStyle::Python => Some("Python"),
            CodeStyle::Html => Some("HTML"),
            CodeStyle::Css => Some("CSS"),
            CodeStyle::JavaScript => Some("JavaScript"),
        }
    }

    pub fn supports_completion(self) -> bool {
        self == CodeStyle::Python
    }

    pub fn tab(self, text: &mut dyn TextWidget, index: &CompletionIndex) -> KeyOutcome {
        if !self.supports_completion() || text.selection().is_some() {
            return self.indent(text);
        }
        let cursor = text.insert_position();
        let before = text.text_range(text.line_start(cursor), cursor);
        match before.chars().last() {
            Some(ch) if !ch.is_whitespace() => {}
            _ => return self.indent(text),
        }

        let prefix_start = completion::prefix_start(text);
        let prefix = text.text_range(prefix_start, cursor);
        let candidates = index.candidates(&prefix);
        if candidates.is_empty() {
            tracing::debug!(prefix, "no completion candidates");
            return KeyOutcome::Handled;
        }
        KeyOutcome::Complete(CompletionRequest {
            prefix_start,
            prefix_end: cursor,
            candidates,
            anchor: text.cursor_screen_position(),
        })
    }

    /// Indent every selected line, or insert one unit at the cursor.
    pub fn indent(self, text: &mut dyn TextWidget) -> KeyOutcome {
        let unit = self.one_indent();
        match text.selection() {
            Some((start, end)) => {
                // Bottom-up so earlier line starts stay valid.
                for line_start in selected_line_starts(text, start, end).into_iter().rev() {
                    text.insert(line_start, unit);
                }
            }
            None => {
                let cursor = text.insert_position();
                text.insert(cursor, unit);
                text.set_insert_position(cursor + unit.len());
            }
        }
        KeyOutcome::Handled
    }

    /// Remove one leading unit from each selected line, or from the cursor line.
    pub fn dedent(self, text: &mut dyn TextWidget) -> KeyOutcome {
        let unit = self.one_indent();
        let starts = match text.selection() {
            Some((start, end)) => selected_line_starts(text, start, end),
            None => vec![text.line_start(text.insert_position())],
        };
        for line_start in starts.into_iter().rev() {
            if text.text_range(line_start, line_start + unit.len()) == unit {
                text.remove(line_start, line_start + unit.len());
            }
        }
        KeyOutcome::Handled
    }

    pub fn back_space(self, text: &mut dyn TextWidget) -> KeyOutcome {
        if text.selection().is_some() {
            return KeyOutcome::Default;
        }
        let unit = self.one_indent();
        let cursor = text.insert_position();
        if cursor < unit.len() {
            return KeyOutcome::Default;
        }
        if text.text_range(cursor - unit.len(), cursor) == unit {
            text.remove(cursor - unit.len(), cursor);
            text.set_insert_position(cursor - unit.len());
            return KeyOutcome::Handled;
        }
        KeyOutcome::Default
    }

    /// Break the line keeping the current indent, one level deeper after a
    /// trigger character. A selection is replaced by the line break.
    pub fn enter_indent(self, text: &mut dyn TextWidget) -> KeyOutcome {
        if let Some((start, end)) = text.selection() {
            text.remove(start, end);
            text.unselect();
            text.set_insert_position(start);
        }
        let unit = self.one_indent();
        let before = text.line_text_before_cursor();
        let depth = self.indent_depth(&before);

        let mut insert = String::with_capacity(1 + (depth + 1) * unit.len());
        insert.push('\n');
        insert.push_str(&unit.repeat(depth));
        if before
            .chars()
            .last()
            .is_some_and(|ch| self.next_is_indent().contains(&ch))
        {
            insert.push_str(unit);
        }

        let cursor = text.insert_position();
        text.insert(cursor, &insert);
        text.set_insert_position(cursor + insert.len());
        text.show_insert_position();
        KeyOutcome::Handled
    }

    /// Number of whole units in the leading run of `line`.
    pub fn indent_depth(self, line: &str) -> usize {
        let unit = self.one_indent();
        let mut rest = line;
        let mut depth = 0;
        while let Some(stripped) = rest.strip_prefix(unit) {
            rest = stripped;
            depth += 1;
        }
        depth
    }

    /// Run the external checker on a saved file and forward its report.
    pub fn lint(self, path: Option<&Path>, checker: &StyleChecker, coordinator: &Coordinator) {
        if self == CodeStyle::Plain {
            return;
        }
        let Some(path) = path else { return };
        let Some(result) = checker.check(path) else {
            tracing::debug!(style = self.name(), "no style checker configured");
            return;
        };
        let report = match result {
            Ok(output) => {
                if output.is_empty() && !checker.forward_empty() {
                    return;
                }
                output
            }
            Err(err) => {
                tracing::warn!(%err, path = %path.display(), "style check failed");
                err.into_report()
            }
        };
        coordinator.update_lint(report);
    }

    /// Re-colour the cursor line.
    pub fn line_highlight(self, text: &mut dyn TextWidget, tokenizer: &Tokenizer) {
        let Some(grammar) = self.grammar() else { return };
        let cursor = text.insert_position();
        let start = text.line_start(cursor);
        let end = text.line_end(cursor);
        let mut line = text.text_range(start, end);
        line.push('\n');

        let tokens = tokenizer.tokenize(&line, grammar);
        text.clear_tags(start, end);
        self.apply_tokens(text, start, end, &tokens);
    }

    /// Re-colour the whole buffer and return the tokens for indexing.
    pub fn all_highlight(self, text: &mut dyn TextWidget, tokenizer: &Tokenizer) -> Vec<Token> {
        let Some(grammar) = self.grammar() else {
            return Vec::new();
        };
        let source = text.text();
        let tokens = tokenizer.tokenize(&source, grammar);
        text.clear_tags(0, source.len());
        self.apply_tokens(text, 0, source.len(), &tokens);
        tokens
    }

    fn apply_tokens(self, text: &mut dyn TextWidget, start: usize, end: usize, tokens: &[Token]) {
        let mut pos = start;
        for token in tokens {
            if pos >= end {
                break;
            }
            let next = (pos + token.text.len()).min(end);
            if let Some(tag) = syntax::tag_for(self, &token.kind) {
                text.add_tag(pos, next, tag);
            }
            pos = next;
        }
    }
}

/// Starts of the lines a selection touches. A selection ending right after a
/// newline does not pull in the following line.
fn selected_line_starts(text: &dyn TextWidget, start: usize, end: usize) -> Vec<usize> {
    let end = if end > start && text.text_range(end - 1, end) == "\n" {
        end - 1
    } else {
        end
    };
    text.line_starts_between(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::settings::LintSettings;
    use crate::app::domain::text_widget::StyleTag;
    use crate::app::infrastructure::memory_text::MemoryText;
    use pretty_assertions::assert_eq;

    const ALL: [CodeStyle; 5] = [
        CodeStyle::Plain,
        CodeStyle::Python,
        CodeStyle::Html,
        CodeStyle::Css,
        CodeStyle::JavaScript,
    ];

    #[test]
    fn test_resolution_by_extension() {
        let cases = [
            ("a.py", CodeStyle::Python),
            ("index.html", CodeStyle::Html),
            ("index.HTM", CodeStyle::Html),
            ("site.css", CodeStyle::Css),
            ("app.js", CodeStyle::JavaScript),
            ("mod.mjs", CodeStyle::JavaScript),
            ("notes.txt", CodeStyle::Plain),
            ("Makefile", CodeStyle::Plain),
        ];
        for (name, expected) in cases {
            assert_eq!(CodeStyle::from_path(Some(Path::new(name))), expected, "{name}");
        }
        assert_eq!(CodeStyle::from_path(None), CodeStyle::Plain);
    }

    #[test]
    fn test_indent_then_dedent_restores_line() {
        for style in ALL {
            let mut text = MemoryText::with_text("value = 1");
            text.set_insert_position(0);
            style.indent(&mut text);
            assert_eq!(text.text(), format!("{}value = 1", style.one_indent()));
            style.dedent(&mut text);
            assert_eq!(text.text(), "value = 1", "{style:?}");
        }
    }

    #[test]
    fn test_indent_inside_leading_run_round_trips() {
        for style in ALL {
            let unit = style.one_indent();
            let original = format!("{unit}{unit}value = 1");
            let mut text = MemoryText::with_text(&original);
            text.set_insert_position(unit.len());
            style.indent(&mut text);
            assert_eq!(text.text(), format!("{unit}{unit}{unit}value = 1"));
            style.dedent(&mut text);
            assert_eq!(text.text(), original, "{style:?}");
        }
    }

    #[test]
    fn test_indent_mid_line_inserts_at_cursor() {
        let mut text = MemoryText::with_text("x = 1");
        text.set_insert_position(1);
        CodeStyle::Plain.indent(&mut text);
        assert_eq!(text.text(), "x\t = 1");
        assert_eq!(text.insert_position(), 2);

        // Dedent only strips leading indentation.
        CodeStyle::Plain.dedent(&mut text);
        assert_eq!(text.text(), "x\t = 1");
    }

    #[test]
    fn test_indent_selection_is_line_wise() {
        let style = CodeStyle::Python;
        let mut text = MemoryText::with_text("a\nb\nc\n");
        text.select(0, 4);
        assert_eq!(style.indent(&mut text), KeyOutcome::Handled);
        assert_eq!(text.text(), "    a\n    b\nc\n");

        text.select(0, text.length());
        style.dedent(&mut text);
        assert_eq!(text.text(), "a\nb\nc\n");
    }

    #[test]
    fn test_dedent_without_unit_is_noop() {
        for style in ALL {
            let original = format!("x{}y", style.one_indent());
            let mut text = MemoryText::with_text(&original);
            text.set_insert_position(2);
            style.dedent(&mut text);
            assert_eq!(text.text(), original);
        }
        let mut text = MemoryText::with_text("  half");
        CodeStyle::Python.dedent(&mut text);
        assert_eq!(text.text(), "  half");
    }

    #[test]
    fn test_back_space_removes_whole_unit() {
        let style = CodeStyle::Python;
        let mut text = MemoryText::with_text("        x");
        text.set_insert_position(8);
        assert_eq!(style.back_space(&mut text), KeyOutcome::Handled);
        assert_eq!(text.text(), "    x");
        assert_eq!(text.insert_position(), 4);

        let mut text = MemoryText::with_text("ab  ");
        text.set_insert_position(4);
        assert_eq!(style.back_space(&mut text), KeyOutcome::Default);
        assert_eq!(text.text(), "ab  ");
    }

    #[test]
    fn test_back_space_with_selection_is_default() {
        let mut text = MemoryText::with_text("    x");
        text.set_insert_position(4);
        text.select(0, 4);
        assert_eq!(CodeStyle::Python.back_space(&mut text), KeyOutcome::Default);
        assert_eq!(text.text(), "    x");
    }

    #[test]
    fn test_enter_after_colon_adds_level() {
        let mut text = MemoryText::with_text("def f():\n    pass\n");
        text.set_insert_position(8);
        CodeStyle::Python.enter_indent(&mut text);
        assert_eq!(text.text(), "def f():\n    \n    pass\n");
        assert_eq!(text.insert_position(), 13);
    }

    #[test]
    fn test_enter_keeps_leading_indent() {
        let mut text = MemoryText::with_text("    x = 1");
        text.set_insert_position(9);
        CodeStyle::Python.enter_indent(&mut text);
        assert_eq!(text.text(), "    x = 1\n    ");

        let mut text = MemoryText::with_text("  a {");
        text.set_insert_position(5);
        CodeStyle::Css.enter_indent(&mut text);
        assert_eq!(text.text(), "  a {\n    ");
    }

    #[test]
    fn test_enter_replaces_selection() {
        let mut text = MemoryText::with_text("    if x: pass");
        text.set_insert_position(14);
        text.select(9, 14);
        assert_eq!(CodeStyle::Python.enter_indent(&mut text), KeyOutcome::Handled);
        assert_eq!(text.text(), "    if x:\n        ");
        assert_eq!(text.insert_position(), text.length());
        assert!(text.selection().is_none());
    }

    #[test]
    fn test_indent_depth_counts_leading_run_only() {
        let style = CodeStyle::Plain;
        assert_eq!(style.indent_depth("\t\tx\ty\t"), 2);
        assert_eq!(CodeStyle::Python.indent_depth("      x"), 1);
    }

    #[test]
    fn test_all_highlight_is_idempotent() {
        let tokenizer = Tokenizer::new();
        let source = "import os\n\ndef f(x):\n    return 'a' + str(x)  # note\n";
        let mut text = MemoryText::with_text(source);
        CodeStyle::Python.all_highlight(&mut text, &tokenizer);
        let first = text.tags_snapshot();
        CodeStyle::Python.all_highlight(&mut text, &tokenizer);
        assert_eq!(text.tags_snapshot(), first);
        assert!(!text.tagged_spans().is_empty());
    }

    #[test]
    fn test_highlight_tags_keyword_and_comment() {
        let tokenizer = Tokenizer::new();
        let mut text = MemoryText::with_text("def f():\n    pass  # note\n");
        CodeStyle::Python.all_highlight(&mut text, &tokenizer);
        assert_eq!(text.tag_at(0), Some(StyleTag::Orange));
        let hash = text.text().find('#').unwrap_or_default();
        assert_eq!(text.tag_at(hash), Some(StyleTag::Red));
        assert_eq!(text.tag_at(hash + 3), Some(StyleTag::Red));
    }

    #[test]
    fn test_line_highlight_stays_on_line() {
        let tokenizer = Tokenizer::new();
        let mut text = MemoryText::with_text("x = 1\ndef g():\n");
        text.add_tag(0, 1, StyleTag::Blue);
        text.set_insert_position(8);
        CodeStyle::Python.line_highlight(&mut text, &tokenizer);
        assert_eq!(text.tag_at(0), Some(StyleTag::Blue));
        assert_eq!(text.tag_at(6), Some(StyleTag::Orange));
    }

    #[test]
    fn test_plain_does_not_highlight() {
        let tokenizer = Tokenizer::new();
        let mut text = MemoryText::with_text("def f():");
        assert!(CodeStyle::Plain.all_highlight(&mut text, &tokenizer).is_empty());
        assert!(text.tagged_spans().is_empty());
    }

    #[test]
    fn test_tab_offers_completion() {
        let mut index = CompletionIndex::default();
        index.rebuild(&[Token {
            kind: "entity.name.function.python".to_string(),
            text: "render".to_string(),
        }]);
        let mut text = MemoryText::with_text("    ren");
        text.set_insert_position(7);
        match CodeStyle::Python.tab(&mut text, &index) {
            KeyOutcome::Complete(request) => {
                assert_eq!(request.prefix_start, 4);
                assert_eq!(request.prefix_end, 7);
                assert_eq!(request.candidates, vec!["render".to_string()]);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(text.text(), "    ren");
    }

    #[test]
    fn test_tab_without_candidates_is_noop() {
        let index = CompletionIndex::default();
        let mut text = MemoryText::with_text("zzq");
        text.set_insert_position(3);
        assert_eq!(CodeStyle::Python.tab(&mut text, &index), KeyOutcome::Handled);
        assert_eq!(text.text(), "zzq");
    }

    #[test]
    fn test_tab_after_whitespace_indents() {
        let index = CompletionIndex::default();
        let mut text = MemoryText::with_text("x\n");
        text.set_insert_position(2);
        CodeStyle::Python.tab(&mut text, &index);
        assert_eq!(text.text(), "x\n    ");

        let mut text = MemoryText::with_text("abc");
        text.set_insert_position(3);
        CodeStyle::Html.tab(&mut text, &index);
        assert_eq!(text.text(), "abc  ");
    }

    #[test]
    fn test_plain_lint_is_noop() {
        let checker = StyleChecker::new(LintSettings::default());
        let coordinator = Coordinator::mock();
        CodeStyle::Plain.lint(Some(Path::new("a.txt")), &checker, &coordinator);
        CodeStyle::Python.lint(None, &checker, &coordinator);
        assert!(coordinator.mock_calls().is_empty());
    }
}
