//! Expression tokenizer
//!
//! Splits expression text into a lossless token stream: concatenating every
//! token's slice reproduces the input exactly, whitespace and comments
//! included. Unterminated literals and comments are lexing errors.

use crate::scan;
use logos::{Lexer, Logos};
use std::ops::Range;

/// Token kinds of the expression surface
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Run of whitespace
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// `// ...` up to end of line
    #[regex(r"//[^\n]*")]
    LineComment,

    /// `/* ... */`
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// `/* ...` never closed; reported as a lexing error
    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedComment,

    /// `"..."` with backslash escapes
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    /// `@"..."` with doubled-quote escapes
    #[regex(r#"@"([^"]|"")*""#)]
    VerbatimStr,

    /// `$"..{hole}.."`, delimited with hole nesting
    #[token("$\"", interpolated)]
    InterpolatedStr,

    /// `$@"..{hole}.."` or `@$"..{hole}.."`
    #[token("$@\"", interpolated)]
    #[token("@$\"", interpolated)]
    InterpolatedVerbatimStr,

    /// `'c'`
    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char,

    /// Identifier, optionally `@`-escaped
    #[regex(r"@?[\p{XID_Start}_]\p{XID_Continue}*")]
    Identifier,

    /// Numeric literal (suffixes included)
    #[regex(r"[0-9][0-9A-Za-z_]*")]
    Number,

    /// `=>`
    #[token("=>")]
    Arrow,

    /// `.`
    #[token(".")]
    Dot,

    /// `(`
    #[token("(")]
    OpenParen,

    /// `)`
    #[token(")")]
    CloseParen,

    /// `,`
    #[token(",")]
    Comma,

    /// Any other single character
    #[regex(r#"[^ \t\r\n\f\p{XID_Continue}"'@$.(),]"#)]
    Punct,
}

impl TokenKind {
    /// String or char literal content, never rewritten
    #[inline]
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self, Self::Str | Self::VerbatimStr | Self::Char)
    }

    /// Interpolated string whose holes hold code
    #[inline]
    #[must_use]
    pub fn is_interpolated(self) -> bool {
        matches!(self, Self::InterpolatedStr | Self::InterpolatedVerbatimStr)
    }

    /// Tokens with no meaning for inference
    #[inline]
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::LineComment | Self::BlockComment)
    }
}

/// One token with its byte span in the lexed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind
    pub kind: TokenKind,

    /// Byte range in the source text
    pub span: Range<usize>,
}

impl Token {
    /// Token text within `source`
    #[inline]
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

/// Text could not be tokenized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot tokenize expression at byte {offset}")]
pub struct LexError {
    /// Byte offset of the offending input
    pub offset: usize,
}

/// Tokenize `source` losslessly
///
/// # Errors
/// Returns [`LexError`] at the first unrecognized or unterminated construct
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        match kind {
            Ok(TokenKind::UnterminatedComment) | Err(()) => {
                return Err(LexError { offset: span.start });
            }
            Ok(kind) => tokens.push(Token { kind, span }),
        }
    }
    Ok(tokens)
}

/// Byte ranges of the code holes inside an interpolated string token
///
/// Ranges are relative to `literal`. Doubled braces are literal text.
/// Returns `None` if `literal` is not one closed string literal.
#[must_use]
pub fn interpolation_holes(literal: &str) -> Option<Vec<Range<usize>>> {
    scan::string_literal(literal.as_bytes(), 0)
        .filter(|l| l.end == literal.len())
        .map(|l| l.holes)
}

// Extends an interpolated string token past its closing quote.
fn interpolated(lex: &mut Lexer<'_, TokenKind>) -> bool {
    let start = lex.span().start;
    match scan::string_literal(lex.source().as_bytes(), start) {
        Some(literal) => {
            lex.bump(literal.end - lex.span().end);
            true
        }
        None => false,
    }
}
