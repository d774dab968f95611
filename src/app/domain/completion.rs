use crate::app::domain::text_widget::TextWidget;
use crate::app::services::syntax::Token;

/// Names offered for completion regardless of buffer contents.
pub const PYTHON_BUILTINS: &[&str] = &[
    "abs", "all", "any", "ascii", "bin", "bool", "breakpoint", "bytearray", "bytes",
    "callable", "chr", "classmethod", "compile", "complex", "delattr", "dict", "dir",
    "divmod", "enumerate", "eval", "exec", "filter", "float", "format", "frozenset",
    "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input", "int",
    "isinstance", "issubclass", "iter", "len", "list", "locals", "map", "max",
    "memoryview", "min", "next", "object", "oct", "open", "ord", "pow", "print",
    "property", "range", "repr", "reversed", "round", "set", "setattr", "slice",
    "sorted", "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip",
    "False", "None", "True", "Exception", "ValueError", "TypeError", "KeyError",
    "IndexError", "AttributeError", "RuntimeError", "self", "cls",
];

/// A pending completion: the prefix span to replace and the matching names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prefix_start: usize,
    pub prefix_end: usize,
    pub candidates: Vec<String>,
    /// Screen position just below the cursor, where the list is shown.
    pub anchor: (i32, i32),
}

/// Identifiers harvested from the last full-buffer tokenization.
#[derive(Debug, Clone, Default)]
pub struct CompletionIndex {
    names: Vec<String>,
}

impl CompletionIndex {
    /// Rebuild from tokens: class and function names, plus the identifier
    /// following an `import` or `as` keyword.
    ///
    /// The Python grammar scopes a defined name as `meta.generic-name`, so the
    /// first identifier after `class` or `def` is taken as well.
    pub fn rebuild(&mut self, tokens: &[Token]) {
        self.names.clear();
        let mut name_follows = false;
        for token in tokens {
            if token.kind.starts_with("entity.name.class")
                || token.kind.starts_with("entity.name.function")
            {
                self.remember(token.text.trim());
                name_follows = false;
                continue;
            }

            let trimmed = token.text.trim();
            if trimmed.is_empty() {
                continue;
            }
            if is_keyword_kind(&token.kind) && matches!(trimmed, "import" | "as" | "class" | "def") {
                name_follows = true;
                continue;
            }
            if name_follows {
                if let Some(name) = leading_identifier(trimmed) {
                    self.remember(name);
                }
                name_follows = false;
            }
        }
        tracing::debug!(count = self.names.len(), "completion index rebuilt");
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Harvested names followed by the built-ins, without duplicates, keeping
    /// those that start with `prefix` or its capitalised form.
    pub fn candidates(&self, prefix: &str) -> Vec<String> {
        let capitalized = capitalize(prefix);
        let mut out: Vec<String> = Vec::new();
        let all = self
            .names
            .iter()
            .map(String::as_str)
            .chain(PYTHON_BUILTINS.iter().copied());
        for name in all {
            let matches = name.starts_with(prefix) || name.starts_with(&capitalized);
            if matches && !out.iter().any(|seen| seen == name) {
                out.push(name.to_string());
            }
        }
        out
    }

    fn remember(&mut self, name: &str) {
        if !name.is_empty() && !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }
}

/// Start offset of the word ending at the cursor: scans back to the nearest
/// space, tab, newline, or the start of the buffer.
pub fn prefix_start(text: &dyn TextWidget) -> usize {
    let cursor = text.insert_position();
    let before = text.text_range(0, cursor);
    before
        .rfind([' ', '\t', '\n'])
        .map_or(0, |i| i + 1)
}

/// Replace the prefix span with the chosen candidate.
pub fn apply(text: &mut dyn TextWidget, request: &CompletionRequest, choice: &str) {
    text.remove(request.prefix_start, request.prefix_end);
    text.insert(request.prefix_start, choice);
    text.set_insert_position(request.prefix_start + choice.len());
}

fn is_keyword_kind(kind: &str) -> bool {
    kind.starts_with("keyword") || kind.starts_with("storage")
}

fn leading_identifier(text: &str) -> Option<&str> {
    let end = text
        .char_indices()
        .find(|&(_, ch)| !(ch.is_alphanumeric() || ch == '_'))
        .map_or(text.len(), |(i, _)| i);
    (end > 0).then(|| &text[..end])
}

fn capitalize(prefix: &str) -> String {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
