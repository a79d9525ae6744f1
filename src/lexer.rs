//! Lexical token stream of a parsed module.
//!
//! Tokens are the leaves of the tree-sitter tree, except that a qualified
//! path (`a::b`, `os.path`, `pkg.Name`) whose qualifier is a plain
//! identifier chain becomes one token instead of several.

use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Node, Point};

use crate::types::Span;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Line or block comment.
    Comment,
    /// Unqualified identifier starting with an upper-case letter.
    ConId,
    /// Reserved word.
    Keyword,
    /// String, number, or boolean literal piece.
    Literal,
    /// Punctuation, operators, and anything unclassified.
    Other,
    /// Qualified identifier whose last segment starts upper-case.
    QConId,
    /// Qualified identifier whose last segment starts lower-case or `_`.
    QVarId,
    /// Unqualified identifier starting lower-case or `_`.
    VarId,
}

/// One token: its class, location, and literal source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lexical class.
    pub kind: TokenKind,
    /// Location in the module source.
    pub span: Span,
    /// Exact source text.
    pub text: String,
}

/// Named leaf kinds that hold identifiers across the supported grammars.
const IDENTIFIER_KINDS: &[&str] = &[
    "field_identifier",
    "identifier",
    "package_identifier",
    "property_identifier",
    "shorthand_field_identifier",
    "shorthand_property_identifier",
];

/// Qualified-path node kinds, with the (qualifier, name) field names.
const QUALIFIED_KINDS: &[(&str, &str, &str)] = &[
    ("attribute", "object", "attribute"),
    ("member_expression", "object", "property"),
    ("scoped_identifier", "path", "name"),
    ("selector_expression", "operand", "field"),
];

/// Any identifier the lexer will classify: a letter or `_`, then word
/// characters or `'`. Raw identifiers (`r#type`) and `$`-prefixed names fail.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^[\p{L}_][\w']*$").expect("valid regex");
});

/// Unqualified lower-case identifier. Shared with the identifier filter so
/// the two can never disagree.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
pub(crate) static VAR_ID: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^[\p{Ll}_][\w']*$").expect("valid regex");
});

/// Qualified identifier whose last segment is lower-case.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
pub(crate) static QUALIFIED_VAR_ID: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?:[\p{L}_][\w']*(?:\.|::))+[\p{Ll}_][\w']*$").expect("valid regex");
});

/// Lex the tree rooted at `root` into tokens, in source order.
pub fn lex(root: Node<'_>, source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    lex_node(root, source, &mut tokens);
    return tokens;
}

/// Emit tokens for `node`, descending unless it is a comment, a qualified path, or a leaf.
fn lex_node(node: Node<'_>, source: &str, tokens: &mut Vec<Token>) {
    // Some grammars split comments into marker and body leaves.
    if node.kind().contains("comment") {
        if let Some(token) = leaf_token(node, source) {
            tokens.push(token);
        }
        return;
    }

    if let Some(token) = qualified_token(node, source) {
        tokens.push(token);
        return;
    }

    if node.child_count() == 0 {
        if let Some(token) = leaf_token(node, source) {
            tokens.push(token);
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        lex_node(child, source, tokens);
    }
}

/// A single token for a qualified path whose parts are all plain identifiers.
fn qualified_token(node: Node<'_>, source: &str) -> Option<Token> {
    let (text, name) = qualified_text(node, source)?;
    let kind = if VAR_ID.is_match(name) { TokenKind::QVarId } else { TokenKind::QConId };
    return Some(Token {
        kind,
        span: node_span(node),
        text,
    });
}

/// Canonical text of a qualified path and its last segment.
///
/// `None` unless every segment is a plain identifier and the source spells
/// the path exactly as `a::b` or `a.b`. Whitespace, comments, or optional
/// chaining (`a?.b`) between segments leave the node to be lexed leaf by leaf.
fn qualified_text<'a>(node: Node<'_>, source: &'a str) -> Option<(String, &'a str)> {
    let (kind, qualifier_field, name_field) = QUALIFIED_KINDS.iter().find(|(kind, _, _)| return *kind == node.kind())?;
    let separator = if *kind == "scoped_identifier" { "::" } else { "." };

    let name_node = node.child_by_field_name(name_field)?;
    if !IDENTIFIER_KINDS.contains(&name_node.kind()) && name_node.kind() != "type_identifier" {
        return None;
    }
    let name = name_node.utf8_text(source.as_bytes()).ok()?;
    if !IDENTIFIER.is_match(name) {
        return None;
    }

    let qualifier_node = node.child_by_field_name(qualifier_field)?;
    let qualifier = if qualifier_node.child_count() == 0 {
        let text = qualifier_node.utf8_text(source.as_bytes()).ok()?;
        if !IDENTIFIER.is_match(text) {
            return None;
        }
        text.to_string()
    } else {
        qualified_text(qualifier_node, source)?.0
    };

    let text = format!("{qualifier}{separator}{name}");
    if node.utf8_text(source.as_bytes()).ok()? != text {
        return None;
    }
    return Some((text, name));
}

/// Classify a leaf node. Zero-width leaves (error recovery) yield nothing.
fn leaf_token(node: Node<'_>, source: &str) -> Option<Token> {
    let text = node.utf8_text(source.as_bytes()).ok()?;
    if text.is_empty() {
        return None;
    }

    let kind = classify_leaf(node.kind(), node.is_named(), text);
    return Some(Token {
        kind,
        span: node_span(node),
        text: text.to_string(),
    });
}

/// Lexical class from the node kind, namedness, and text.
fn classify_leaf(kind: &str, is_named: bool, text: &str) -> TokenKind {
    if kind.contains("comment") {
        return TokenKind::Comment;
    }
    if is_named && IDENTIFIER_KINDS.contains(&kind) {
        if !IDENTIFIER.is_match(text) {
            return TokenKind::Other;
        }
        return if VAR_ID.is_match(text) { TokenKind::VarId } else { TokenKind::ConId };
    }
    if kind == "type_identifier" {
        return TokenKind::ConId;
    }
    // Anonymous alphabetic leaves are the grammar's reserved words; named
    // ones whose kind is their text are `self`, `crate`, `None` and friends.
    if kind == text && text.chars().all(|c| return c.is_ascii_alphabetic() || c == '_') {
        return TokenKind::Keyword;
    }
    if is_named && is_literal_kind(kind) {
        return TokenKind::Literal;
    }
    return TokenKind::Other;
}

/// Literal leaf kinds across the supported grammars.
fn is_literal_kind(kind: &str) -> bool {
    return kind.contains("literal")
        || kind.contains("string")
        || matches!(kind, "integer" | "float" | "escape_sequence" | "number" | "true" | "false");
}

/// One-based span of a node.
fn node_span(node: Node<'_>) -> Span {
    let (start_line, start_col) = one_based(node.start_position());
    let (end_line, end_col) = one_based(node.end_position());
    return Span::concrete(start_line, start_col, end_line, end_col);
}

/// Convert a zero-based tree-sitter point to one-based (line, column).
fn one_based(point: Point) -> (u32, u32) {
    let line = u32::try_from(point.row).unwrap_or(u32::MAX).saturating_add(1);
    let col = u32::try_from(point.column).unwrap_or(u32::MAX).saturating_add(1);
    return (line, col);
}
