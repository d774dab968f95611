use crate::app::domain::code_style::CodeStyle;
use crate::app::domain::text_widget::StyleTag;

/// Scope-prefix tables, checked in order. The first prefix that matches the
/// token kind decides its tag. Punctuation delimiting strings and comments
/// sits ahead of the generic `punctuation` entry so quotes take the string
/// colour.
const PYTHON: &[(&str, StyleTag)] = &[
    ("punctuation.definition.comment", StyleTag::Red),
    ("comment", StyleTag::Red),
    ("constant.character.escape", StyleTag::Red),
    ("punctuation.definition.string", StyleTag::Green),
    ("string", StyleTag::Green),
    ("constant.numeric", StyleTag::Red),
    ("constant.language", StyleTag::Orange),
    ("storage.type", StyleTag::Orange),
    ("storage.modifier", StyleTag::Orange),
    ("keyword.declaration", StyleTag::Orange),
    ("keyword.operator.logical", StyleTag::Orange),
    ("keyword.operator", StyleTag::Red),
    ("keyword", StyleTag::Orange),
    ("punctuation.definition.decorator", StyleTag::Orange),
    ("entity.name.function.decorator", StyleTag::Orange),
    ("entity.name", StyleTag::Blue),
    ("support.function", StyleTag::Blue),
    ("support.type", StyleTag::Blue),
    ("support.class", StyleTag::Blue),
    ("variable.language", StyleTag::Blue),
    ("punctuation", StyleTag::Black),
];

const HTML: &[(&str, StyleTag)] = &[
    ("punctuation.definition.comment", StyleTag::Red),
    ("comment", StyleTag::Red),
    ("punctuation.definition.string", StyleTag::Red),
    ("string", StyleTag::Red),
    ("entity.name.tag", StyleTag::Orange),
    ("entity.other.attribute-name", StyleTag::Green),
    ("punctuation.definition.tag", StyleTag::Blue),
    ("punctuation", StyleTag::Black),
];

const CSS: &[(&str, StyleTag)] = &[
    ("punctuation.definition.comment", StyleTag::Red),
    ("comment", StyleTag::Red),
    ("punctuation.definition.string", StyleTag::Red),
    ("string", StyleTag::Red),
    ("constant.numeric", StyleTag::Red),
    ("constant.other.color", StyleTag::Red),
    ("entity.name.tag", StyleTag::Orange),
    ("entity.other.attribute-name", StyleTag::Orange),
    ("support.type.property-name", StyleTag::Green),
    ("keyword", StyleTag::Green),
    ("support.constant", StyleTag::Blue),
    ("punctuation", StyleTag::Blue),
];

const JAVASCRIPT: &[(&str, StyleTag)] = &[
    ("punctuation.definition.comment", StyleTag::Red),
    ("comment", StyleTag::Red),
    ("punctuation.definition.string", StyleTag::Red),
    ("string", StyleTag::Red),
    ("constant.numeric", StyleTag::Red),
    ("storage.type", StyleTag::Blue),
    ("keyword.declaration", StyleTag::Blue),
    ("keyword.operator", StyleTag::Blue),
    ("keyword", StyleTag::Green),
    ("entity.name", StyleTag::Orange),
    ("support.class", StyleTag::Orange),
    ("punctuation", StyleTag::Black),
];

fn table(style: CodeStyle) -> &'static [(&'static str, StyleTag)] {
    match style {
        CodeStyle::Plain => &[],
        CodeStyle::Python => PYTHON,
        CodeStyle::Html => HTML,
        CodeStyle::Css => CSS,
        CodeStyle::JavaScript => JAVASCRIPT,
    }
}

/// Tag for a token kind under `style`, `None` when the kind is unmapped.
pub fn tag_for(style: CodeStyle, kind: &str) -> Option<StyleTag> {
    table(style)
        .iter()
        .find(|(prefix, _)| scope_has_prefix(kind, prefix))
        .map(|&(_, tag)| tag)
}

/// Scope-aware prefix test: `string` matches `string.quoted` but not `stringy`.
fn scope_has_prefix(kind: &str, prefix: &str) -> bool {
    kind.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
