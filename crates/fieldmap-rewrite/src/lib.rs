//! fieldmap parameter rewriting
//!
//! Renames the single bound parameter of a custom mapping expression to a
//! fixed target name without touching string or char literal content,
//! comments, member names, or longer identifiers that merely contain it.
//!
//! # Example
//!
//! ```rust
//! use fieldmap_rewrite::ParameterRewriter;
//!
//! let rewriter = ParameterRewriter::default();
//! let out = rewriter.rewrite("s => s.Price * s.Quantity");
//! assert_eq!(out.text, "source.Price * source.Quantity");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod fallback;
pub mod infer;
pub mod lexer;
mod rewriter;
mod scan;
mod words;

pub use infer::{infer_parameter, split_lambda, LambdaHead, CONVENTIONAL_ALIASES};
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use rewriter::{ParameterRewriter, Rewrite, RewriteMode, DEFAULT_TARGET};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
