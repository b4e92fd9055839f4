//! Parameter-name inference
//!
//! Recovers the single name an expression was written against.
//!
//! Order, first match wins:
//! 1. a lambda head (`s => ..`, `(s) => ..`, `(Order s) => ..`) declares it
//! 2. an identifier followed by member access or `=>`, conventional aliases first
//! 3. the first identifier in code position
//!
//! Steps 2 and 3 only consider lower-case, non-keyword identifiers: a bare
//! `DateTime.Now` is a type access, not a parameter.

use crate::words::Word;

/// Short names configuration surfaces conventionally bind
pub const CONVENTIONAL_ALIASES: &[&str] = &["s", "src", "x", "p", "o", "e", "m", "item", "source"];

const KEYWORDS: &[&str] = &[
    "as", "await", "base", "bool", "byte", "char", "checked", "decimal", "default", "double",
    "false", "float", "in", "int", "is", "long", "nameof", "new", "not", "null", "object", "or",
    "and", "out", "ref", "short", "sizeof", "static", "string", "this", "true", "typeof",
    "unchecked", "var", "with",
];

/// Lambda wrapper split from its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaHead {
    /// Declared parameter name
    pub parameter: String,

    /// Byte offset where the body starts
    pub body_offset: usize,
}

/// Split a single-parameter lambda wrapper off `text`
///
/// Multi-parameter heads and heads containing literals are not wrappers.
#[must_use]
pub fn split_lambda(text: &str) -> Option<LambdaHead> {
    let arrow = text.find("=>")?;
    let head = text[..arrow].trim();
    if head.is_empty() || head.contains(['"', '\'', '/']) {
        return None;
    }

    let name = match head.strip_prefix('(').and_then(|h| h.strip_suffix(')')) {
        Some(inner) if inner.contains(',') => return None,
        Some(inner) => inner.split_whitespace().last()?,
        None => head,
    };
    if !is_identifier(name) {
        return None;
    }

    let after = &text[arrow + 2..];
    let body_offset = arrow + 2 + (after.len() - after.trim_start().len());
    Some(LambdaHead {
        parameter: name.to_string(),
        body_offset,
    })
}

/// Infer the name `text` is bound to
///
/// Uses the conventional aliases. `None` when no eligible identifier exists
/// or the text cannot be scanned.
#[must_use]
pub fn infer_parameter(text: &str) -> Option<String> {
    if let Some(head) = split_lambda(text) {
        return Some(head.parameter);
    }
    let words = crate::words::tokenized(text)
        .ok()
        .or_else(|| crate::fallback::words(text))?;
    let aliases: Vec<String> = CONVENTIONAL_ALIASES.iter().map(|s| (*s).to_string()).collect();
    from_words(&words, &aliases)
}

/// Infer the bound name from code words
pub(crate) fn from_words(words: &[Word], aliases: &[String]) -> Option<String> {
    let eligible = |w: &&Word| !w.member && is_parameter_like(w.bare());

    let candidates: Vec<&Word> = words
        .iter()
        .filter(eligible)
        .filter(|w| w.before_dot || w.before_arrow)
        .collect();

    candidates
        .iter()
        .find(|w| aliases.iter().any(|a| a == w.bare()))
        .or_else(|| candidates.first())
        .copied()
        .or_else(|| words.iter().find(eligible))
        .map(|w| w.text.clone())
}

fn is_parameter_like(name: &str) -> bool {
    name.starts_with(|c: char| c.is_lowercase() || c == '_') && !KEYWORDS.contains(&name)
}

fn is_identifier(name: &str) -> bool {
    let bare = name.strip_prefix('@').unwrap_or(name);
    let mut chars = bare.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words;

    fn aliases() -> Vec<String> {
        CONVENTIONAL_ALIASES.iter().map(|s| (*s).to_string()).collect()
    }

    fn infer(text: &str) -> Option<String> {
        from_words(&words::tokenized(text).unwrap(), &aliases())
    }

    #[test]
    fn lambda_simple() {
        let head = split_lambda("s => s.Price").unwrap();
        assert_eq!(head.parameter, "s");
        assert_eq!(&"s => s.Price"[head.body_offset..], "s.Price");
    }

    #[test]
    fn lambda_parenthesized_and_typed() {
        assert_eq!(split_lambda("(src) => src.Id").unwrap().parameter, "src");
        assert_eq!(split_lambda("(Order order) => order.Id").unwrap().parameter, "order");
    }

    #[test]
    fn lambda_rejects_multi_parameter_and_nested() {
        assert!(split_lambda("(a, b) => a").is_none());
        assert!(split_lambda("s.Items.Select(i => i.Id)").is_none());
        assert!(split_lambda("\"=>\"").is_none());
    }

    #[test]
    fn infer_prefers_conventional_alias() {
        assert_eq!(infer("order.Total + s.Tax").as_deref(), Some("s"));
    }

    #[test]
    fn infer_first_member_access_without_alias() {
        assert_eq!(infer("order.Total + customer.Tax").as_deref(), Some("order"));
    }

    #[test]
    fn infer_ignores_type_access() {
        assert_eq!(infer("DateTime.Now.Year - s.BirthYear").as_deref(), Some("s"));
        assert_eq!(infer("DateTime.Now"), None);
    }

    #[test]
    fn infer_falls_back_to_first_identifier() {
        assert_eq!(infer("new Money(amount)").as_deref(), Some("amount"));
    }

    #[test]
    fn infer_parameter_public_entry() {
        assert_eq!(infer_parameter("(Order o) => o.Id").as_deref(), Some("o"));
        assert_eq!(infer_parameter("item.Price * 2").as_deref(), Some("item"));
        assert_eq!(infer_parameter("42"), None);
    }

    #[test]
    fn infer_unicode_names() {
        assert_eq!(split_lambda("größe => größe.Wert").unwrap().parameter, "größe");
        assert_eq!(infer("Größe.Of(e.Value)").as_deref(), Some("e"));
    }

    #[test]
    fn infer_nothing_in_pure_literal() {
        assert_eq!(infer(r#""Use s.Name in docs""#), None);
    }
}
