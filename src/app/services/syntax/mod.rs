mod palette;

use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};

pub use palette::tag_for;

/// Kind given to text outside any grammar scope, or when no grammar matches.
pub const PLAIN_KIND: &str = "text";

/// One lexeme and the innermost scope it was parsed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: String,
    pub text: String,
}

/// Splits text into scoped tokens using syntect's bundled grammars.
///
/// Concatenating the `text` of every token returned by [`Tokenizer::tokenize`]
/// reproduces the input exactly.
pub struct Tokenizer {
    syntax_set: SyntaxSet,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    pub fn has_grammar(&self, grammar: &str) -> bool {
        self.syntax_set.find_syntax_by_name(grammar).is_some()
    }

    pub fn tokenize(&self, text: &str, grammar: &str) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }
        let Some(syntax) = self.syntax_set.find_syntax_by_name(grammar) else {
            tracing::debug!(grammar, "no grammar loaded, emitting plain token");
            return vec![Token {
                kind: PLAIN_KIND.to_string(),
                text: text.to_string(),
            }];
        };

        let mut parse_state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens: Vec<Token> = Vec::new();

        for line in LinesWithEndings::new(text) {
            let ops = parse_state
                .parse_line(line, &self.syntax_set)
                .unwrap_or_default();
            let mut last = 0;
            for (offset, op) in ops {
                let offset = offset.min(line.len());
                if offset > last {
                    push_token(&mut tokens, kind_of(&stack), &line[last..offset]);
                    last = offset;
                }
                if let Err(err) = stack.apply(&op) {
                    tracing::debug!(?err, "scope stack out of sync, continuing");
                }
            }
            if last < line.len() {
                push_token(&mut tokens, kind_of(&stack), &line[last..]);
            }
        }

        tokens
    }
}

fn kind_of(stack: &ScopeStack) -> String {
    stack
        .as_slice()
        .last()
        .map(|scope| scope.build_string())
        .unwrap_or_else(|| PLAIN_KIND.to_string())
}

/// Append a lexeme, merging it into the previous token when the kind repeats.
fn push_token(tokens: &mut Vec<Token>, kind: String, text: &str) {
    match tokens.last_mut() {
        Some(prev) if prev.kind == kind => prev.text.push_str(text),
        _ => tokens.push(Token {
            kind,
            text: text.to_string(),
        }),
    }
}

struct LinesWithEndings<'a> {
    text: &'a str,
}

impl<'a> LinesWithEndings<'a> {
    fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl<'a> Iterator for LinesWithEndings<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.text.is_empty() {
            return None;
        }
        let end = self.text.find('\n').map(|i| i + 1).unwrap_or(self.text.len());
        let line = &self.text[..end];
        self.text = &self.text[end..];
        Some(line)
    }
}
