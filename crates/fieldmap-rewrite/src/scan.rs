//! Literal delimiting shared by the tokenizer and the boundary scan
//!
//! Interpolated strings are delimited with hole nesting: inside a hole,
//! braces nest and nested string and char literals are skipped whole, so a
//! quote inside a hole never ends the outer literal.

use std::ops::Range;

/// Opening sequence of a string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringPrefix {
    /// Bytes up to and including the opening quote
    pub(crate) len: usize,

    /// `@"..."` rules: no backslash escapes, `""` is a quote, newlines allowed
    pub(crate) verbatim: bool,

    /// `{...}` holes hold code
    pub(crate) interpolated: bool,
}

/// Delimited string literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StringLiteral {
    /// Byte offset one past the closing quote
    pub(crate) end: usize,

    /// Code holes, absolute byte ranges
    pub(crate) holes: Vec<Range<usize>>,
}

pub(crate) fn string_prefix(rest: &[u8]) -> Option<StringPrefix> {
    let (len, verbatim, interpolated) = match rest {
        [b'"', ..] => (1, false, false),
        [b'@', b'"', ..] => (2, true, false),
        [b'$', b'"', ..] => (2, false, true),
        [b'$', b'@', b'"', ..] | [b'@', b'$', b'"', ..] => (3, true, true),
        _ => return None,
    };
    Some(StringPrefix {
        len,
        verbatim,
        interpolated,
    })
}

/// Delimit the string literal opening at `start`
///
/// `None` if `start` does not open a string, or the literal or one of its
/// holes never closes.
pub(crate) fn string_literal(bytes: &[u8], start: usize) -> Option<StringLiteral> {
    let prefix = string_prefix(bytes.get(start..)?)?;
    let mut holes = Vec::new();
    let mut i = start + prefix.len;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if !prefix.verbatim => i += 2,
            b'"' if prefix.verbatim && bytes.get(i + 1) == Some(&b'"') => i += 2,
            b'"' => return Some(StringLiteral { end: i + 1, holes }),
            b'\n' if !prefix.verbatim => return None,
            b @ (b'{' | b'}') if prefix.interpolated && bytes.get(i + 1) == Some(&b) => i += 2,
            b'{' if prefix.interpolated => {
                let end = hole_end(bytes, i + 1)?;
                holes.push(i + 1..end);
                i = end + 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Byte offset one past the closing quote of the char literal whose body
/// starts at `start`
pub(crate) fn char_literal_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => return Some(i + 1),
            b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}

// Offset of the `}` closing a hole whose code starts at `start`.
fn hole_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' if depth == 0 => return Some(i),
            b'}' => {
                depth -= 1;
                i += 1;
            }
            b'\'' => i = char_literal_end(bytes, i + 1)?,
            _ if string_prefix(&bytes[i..]).is_some() => i = string_literal(bytes, i)?.end,
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holes(text: &str) -> Vec<&str> {
        let literal = string_literal(text.as_bytes(), 0).unwrap();
        assert_eq!(literal.end, text.len());
        literal.holes.into_iter().map(|h| &text[h]).collect()
    }

    #[test]
    fn plain_and_verbatim_strings() {
        assert_eq!(string_literal(br#""a \" b" + x"#, 0).unwrap().end, 8);
        assert_eq!(string_literal(br#"@"a "" b" + x"#, 0).unwrap().end, 9);
        assert!(string_literal(b"\"open", 0).is_none());
        assert!(string_literal(b"x", 0).is_none());
    }

    #[test]
    fn nested_string_inside_hole() {
        assert_eq!(holes(r#"$"{x.A ?? "x"}""#), [r#"x.A ?? "x""#]);
        assert_eq!(holes(r#"$"{x.A ?? "}"}!""#), [r#"x.A ?? "}""#]);
    }

    #[test]
    fn nested_interpolation_and_braces() {
        assert_eq!(
            holes(r#"$"{f(new { A = 1 })} {$"{x.B}"}""#),
            ["f(new { A = 1 })", r#"$"{x.B}""#]
        );
        assert_eq!(holes(r#"$@"{{lit}} {x.C:N0}""#), ["x.C:N0"]);
    }

    #[test]
    fn char_literal_inside_hole() {
        assert_eq!(holes(r#"$"{(x.Ok ? '}' : '{')}""#), ["(x.Ok ? '}' : '{')"]);
    }

    #[test]
    fn unclosed_hole_or_literal() {
        assert!(string_literal(br#"$"{x.A"#, 0).is_none());
        assert!(string_literal(br#"$"{x.A ?? "x}""#, 0).is_none());
    }
}
