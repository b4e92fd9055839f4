//! Conservative boundary scan
//!
//! Used when an expression cannot be tokenized. Literal and comment spans are
//! located with a plain character scan; quoted regions are opaque apart from
//! the code holes of interpolated strings, which are delimited with nesting
//! and scanned as code. If a span cannot be closed the scan gives up and the
//! caller renames nothing.

use crate::scan;
use crate::words::Word;
use std::ops::Range;

/// Collect code words, or `None` when a literal or comment never closes
pub(crate) fn words(text: &str) -> Option<Vec<Word>> {
    let mut words = Vec::new();
    code(text, 0..text.len(), &mut words)?;
    Some(words)
}

fn code(text: &str, range: Range<usize>, out: &mut Vec<Word>) -> Option<()> {
    let bytes = text.as_bytes();
    let end = range.end;
    let mut i = range.start;

    while i < end {
        let rest = &text[i..end];
        if rest.starts_with("//") {
            i = rest.find('\n').map_or(end, |n| i + n);
        } else if rest.starts_with("/*") {
            i = i + 2 + rest[2..].find("*/")? + 2;
        } else if scan::string_prefix(rest.as_bytes()).is_some() {
            let literal = scan::string_literal(&bytes[..end], i)?;
            for hole in literal.holes {
                code(text, hole, out)?;
            }
            i = literal.end;
        } else if rest.starts_with('\'') {
            i = scan::char_literal_end(&bytes[..end], i + 1)?;
        } else if let Some(len) = identifier(text, i, end) {
            out.push(word(text, i, i + len));
            i += len;
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    Some(())
}

fn word(text: &str, start: usize, end: usize) -> Word {
    let before = text[..start].trim_end();
    let after = text[end..].trim_start();
    let after = after
        .strip_prefix('?')
        .or_else(|| after.strip_prefix('!'))
        .unwrap_or(after);
    Word {
        text: text[start..end].to_string(),
        range: start..end,
        member: before.ends_with('.'),
        before_dot: after.starts_with('.'),
        before_arrow: text[end..].trim_start().starts_with("=>"),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// Length of the identifier starting at `start`, if one starts there and
// `start` is not inside a longer one.
fn identifier(text: &str, start: usize, end: usize) -> Option<usize> {
    if text[..start].chars().next_back().is_some_and(is_ident_char) {
        return None;
    }
    let rest = &text[start..end];
    let body = rest.strip_prefix('@').unwrap_or(rest);
    let first = body.chars().next().filter(|c| c.is_alphabetic() || *c == '_')?;
    let tail: usize = body[first.len_utf8()..]
        .chars()
        .take_while(|c| is_ident_char(*c))
        .map(char::len_utf8)
        .sum();
    Some(rest.len() - body.len() + first.len_utf8() + tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        words(text).unwrap().into_iter().map(|w| w.text).collect()
    }

    #[test]
    fn scan_skips_quoted_regions() {
        assert_eq!(texts(r#"s.A + "s.B" + s.C"#), ["s", "A", "s", "C"]);
    }

    #[test]
    fn scan_reads_interpolation_holes_as_code() {
        assert_eq!(texts(r#"$"s {s.Name}" + s"#), ["s", "Name", "s"]);
    }

    #[test]
    fn scan_skips_literal_nested_in_hole() {
        assert_eq!(texts(r#"$"{x.A ?? "x"}" + x"#), ["x", "A", "x"]);
        assert!(words(r#"$"{x.A ?? "x}" + x"#).is_none());
    }

    #[test]
    fn scan_unicode_identifiers_are_whole() {
        assert_eq!(texts("Größe.Of(e) + straße"), ["Größe", "Of", "e", "straße"]);
    }

    #[test]
    fn scan_skips_comments() {
        assert_eq!(texts("s // s.Name\n+ /* s */ t"), ["s", "t"]);
    }

    #[test]
    fn scan_word_boundaries() {
        assert_eq!(texts("ss + s1 + s"), ["ss", "s1", "s"]);
    }

    #[test]
    fn scan_verbatim_doubled_quotes() {
        assert_eq!(texts(r#"@"a ""s"" b" + s"#), ["s"]);
    }

    #[test]
    fn scan_gives_up_on_unterminated() {
        assert!(words(r#"s.Name + "open"#).is_none());
        assert!(words("s /* open").is_none());
        assert!(words("'x").is_none());
    }

    #[test]
    fn scan_marks_members() {
        let found = words("s?.Name").unwrap();
        assert!(found[0].before_dot);
        assert!(found[1].member);
    }
}
