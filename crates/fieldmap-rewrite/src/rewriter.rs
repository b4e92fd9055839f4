//! Parameter rewriting
//!
//! Provides [`ParameterRewriter`], which renames the bound parameter of an
//! expression to a fixed target name.

use crate::infer::{self, CONVENTIONAL_ALIASES};
use crate::words::{self, Word};
use crate::fallback;
use serde::Serialize;

/// Name bound occurrences are renamed to unless configured otherwise
pub const DEFAULT_TARGET: &str = "source";

/// How a rewrite was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMode {
    /// Full tokenization; every bound occurrence renamed
    Tokenized,

    /// Tokenization failed; boundary scan renamed occurrences outside quoted spans
    Fallback,

    /// Text could not be classified; nothing renamed, original text kept
    Malformed,
}

/// Result of rewriting one expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    /// Rewritten text (lambda wrapper removed)
    pub text: String,

    /// Parameter that was renamed, if one was found
    pub parameter: Option<String>,

    /// Number of occurrences renamed
    pub renamed: usize,

    /// How the rewrite was carried out
    pub mode: RewriteMode,
}

impl Rewrite {
    /// Check if the text had to be left as is
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.mode == RewriteMode::Malformed
    }
}

/// Renames the bound parameter of expressions
#[derive(Debug, Clone)]
pub struct ParameterRewriter {
    target: String,
    aliases: Vec<String>,
}

impl ParameterRewriter {
    /// Rewriter targeting `target`
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            aliases: CONVENTIONAL_ALIASES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Replace the conventional aliases preferred during inference
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Target name
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Infer the parameter of `text` and rename it
    ///
    /// A lambda wrapper is stripped and only its body returned. Text that
    /// cannot be classified is returned unchanged, wrapper included.
    #[must_use]
    pub fn rewrite(&self, text: &str) -> Rewrite {
        let head = infer::split_lambda(text);
        let body = head.as_ref().map_or(text, |h| &text[h.body_offset..]);
        let declared = head.map(|h| h.parameter);

        let Some((words, mode)) = scan(body) else {
            return malformed(text, declared);
        };
        let parameter = declared.or_else(|| infer::from_words(&words, &self.aliases));
        self.apply(body, &words, parameter, mode)
    }

    /// Rename `parameter` in `text` without inference or wrapper stripping
    #[must_use]
    pub fn rename(&self, text: &str, parameter: &str) -> Rewrite {
        let Some((words, mode)) = scan(text) else {
            return malformed(text, Some(parameter.to_string()));
        };
        self.apply(text, &words, Some(parameter.to_string()), mode)
    }

    fn apply(
        &self,
        text: &str,
        words: &[Word],
        parameter: Option<String>,
        mode: RewriteMode,
    ) -> Rewrite {
        let Some(name) = parameter.as_deref() else {
            return Rewrite {
                text: text.to_string(),
                parameter,
                renamed: 0,
                mode,
            };
        };
        let bare = name.strip_prefix('@').unwrap_or(name);

        let mut out = String::with_capacity(text.len() + self.target.len());
        let mut cursor = 0;
        let mut renamed = 0;
        for word in words.iter().filter(|w| !w.member && w.bare() == bare) {
            out.push_str(&text[cursor..word.range.start]);
            out.push_str(&self.target);
            cursor = word.range.end;
            renamed += 1;
        }
        out.push_str(&text[cursor..]);

        tracing::trace!(parameter = name, renamed, ?mode, "rewrote expression");
        Rewrite {
            text: out,
            parameter,
            renamed,
            mode,
        }
    }
}

impl Default for ParameterRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}

fn scan(text: &str) -> Option<(Vec<Word>, RewriteMode)> {
    match words::tokenized(text) {
        Ok(words) => Some((words, RewriteMode::Tokenized)),
        Err(err) => {
            tracing::debug!(%err, "falling back to boundary scan");
            fallback::words(text).map(|words| (words, RewriteMode::Fallback))
        }
    }
}

fn malformed(text: &str, parameter: Option<String>) -> Rewrite {
    tracing::debug!("expression left untouched: cannot classify literal spans");
    Rewrite {
        text: text.to_string(),
        parameter,
        renamed: 0,
        mode: RewriteMode::Malformed,
    }
}
