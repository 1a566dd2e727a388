//! Value types for SQL identifiers, carrying a "was it quoted" bit.
//!
//! Comparisons with catalog names apply case folding only when the
//! identifier was not quoted in its source position — matching PostgreSQL's
//! own identifier-folding rule.

use std::fmt;

#[derive(Debug, Clone, Eq)]
pub struct Ident {
    pub text: String,
    pub quoted: bool,
}

impl Ident {
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn unquoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// The text used for catalog matching: folded to lowercase unless quoted.
    pub fn folded(&self) -> String {
        if self.quoted {
            self.text.clone()
        } else {
            self.text.to_lowercase()
        }
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.folded() == other.folded()
    }
}

impl std::hash::Hash for Ident {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.folded().hash(state);
    }
}

/// Quote a raw catalog-sourced name (already resolved, not carrying its own
/// "was it quoted" bit) for safe interpolation into generated DDL/DML.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text.replace('"', "\"\""))
        } else {
            write!(f, "{}", self.text)
        }
    }
}
