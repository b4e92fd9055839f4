//! Code identifiers of an expression
//!
//! A [`Word`] is an identifier occurring in code position: outside string and
//! char literal content and outside comments. Interpolation holes are code.
//! Inference and renaming both work on words only, so literal text can never
//! be touched.

use crate::lexer::{self, LexError, Token, TokenKind};
use std::ops::Range;

/// Identifier in code position
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Word {
    /// Identifier text
    pub(crate) text: String,

    /// Byte range in the scanned text
    pub(crate) range: Range<usize>,

    /// Preceded by `.`: a member name, never a bound occurrence
    pub(crate) member: bool,

    /// Followed by member access (`.`, `?.`, `!.`)
    pub(crate) before_dot: bool,

    /// Followed by `=>`
    pub(crate) before_arrow: bool,
}

impl Word {
    /// Identifier without a leading `@` escape
    pub(crate) fn bare(&self) -> &str {
        self.text.strip_prefix('@').unwrap_or(&self.text)
    }
}

/// Collect words from a tokenizable expression
pub(crate) fn tokenized(source: &str) -> Result<Vec<Word>, LexError> {
    let mut words = Vec::new();
    collect(source, 0, &mut words)?;
    Ok(words)
}

fn collect(source: &str, base: usize, out: &mut Vec<Word>) -> Result<(), LexError> {
    let tokens = lexer::tokenize(source).map_err(|e| LexError {
        offset: base + e.offset,
    })?;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Identifier => {
                let member = previous(&tokens, i).is_some_and(|t| t.kind == TokenKind::Dot);
                let (before_dot, before_arrow) = lookahead(source, &tokens, i);
                out.push(Word {
                    text: token.text(source).to_string(),
                    range: base + token.span.start..base + token.span.end,
                    member,
                    before_dot,
                    before_arrow,
                });
            }
            kind if kind.is_interpolated() => {
                let literal = token.text(source);
                let holes = lexer::interpolation_holes(literal).ok_or(LexError {
                    offset: base + token.span.start,
                })?;
                for hole in holes {
                    let offset = base + token.span.start + hole.start;
                    collect(&literal[hole], offset, out)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn previous(tokens: &[Token], i: usize) -> Option<&Token> {
    tokens[..i].iter().rev().find(|t| !t.kind.is_trivia())
}

fn lookahead(source: &str, tokens: &[Token], i: usize) -> (bool, bool) {
    let mut rest = tokens[i + 1..].iter().filter(|t| !t.kind.is_trivia());
    match rest.next() {
        Some(t) if t.kind == TokenKind::Dot => (true, false),
        Some(t) if t.kind == TokenKind::Arrow => (false, true),
        Some(t) if t.kind == TokenKind::Punct && matches!(t.text(source), "?" | "!") => {
            (rest.next().is_some_and(|n| n.kind == TokenKind::Dot), false)
        }
        _ => (false, false),
    }
}
