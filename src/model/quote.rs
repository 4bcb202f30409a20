//! Quote model for Quotebook.
//!
//! A quote is a short text with a category tag. There is no separate ID:
//! two quotes are the same quote iff their `text` fields are equal. The
//! category is mutable metadata that remote data may overwrite.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered sequence of quotes. Insertion order is meaningful.
pub type Collection = Vec<Quote>;

/// Reasons a record cannot become a [`Quote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("text is empty")]
    EmptyText,

    #[error("category is empty")]
    EmptyCategory,
}

/// A validated quote.
///
/// Both fields are trimmed and non-empty. [`Quote::new`] and deserialization
/// (which goes through [`RawQuote`]) are the only ways to build one:
///
/// ```compile_fail
/// let quote = qb::model::Quote {
///     text: String::new(),
///     category: String::new(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQuote")]
pub struct Quote {
    text: String,
    category: String,
}

impl Quote {
    /// Create a quote from user-entered values.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if either field is empty after trimming.
    pub fn new(text: &str, category: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// The quote itself; the merge key.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Category tag.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Swap in the category of another validated quote, returning the old one.
    pub(crate) fn replace_category(&mut self, from: &Quote) -> String {
        std::mem::replace(&mut self.category, from.category.clone())
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" - {}", self.text, self.category)
    }
}

/// Unvalidated record as it arrives from storage, import or the remote.
///
/// Every field is optional so that one malformed record can be skipped
/// without failing the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(default, alias = "title")]
    pub text: Option<String>,

    #[serde(default)]
    pub category: Option<String>,
}

impl TryFrom<RawQuote> for Quote {
    type Error = ValidationError;

    fn try_from(raw: RawQuote) -> Result<Self, Self::Error> {
        Quote::new(
            raw.text.as_deref().unwrap_or_default(),
            raw.category.as_deref().unwrap_or_default(),
        )
    }
}

/// The collection shown when nothing has ever been stored.
#[must_use]
pub fn default_quotes() -> Collection {
    [
        (
            "The best way to get started is to quit talking and begin doing.",
            "Motivation",
        ),
        (
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        (
            "Success is not in what you have, but who you are.",
            "Success",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_fields() {
        let quote = Quote::new("  Be brave  ", "\tCourage\n").unwrap();
        assert_eq!(quote.text(), "Be brave");
        assert_eq!(quote.category(), "Courage");
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(Quote::new("   ", "Life"), Err(ValidationError::EmptyText));
        assert_eq!(Quote::new("Be brave", ""), Err(ValidationError::EmptyCategory));
    }

    #[test]
    fn test_identity_is_text_only() {
        let a = Quote::new("Be brave", "Courage").unwrap();
        let b = Quote::new("Be brave", "Bravery").unwrap();
        assert_eq!(a.text(), b.text());
        assert_ne!(a, b);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Quote = serde_json::from_str(r#"{"text":" Dream big ","category":"Motivation"}"#)
            .unwrap();
        assert_eq!(ok.text(), "Dream big");

        let missing = serde_json::from_str::<Quote>(r#"{"text":"Dream big"}"#);
        assert!(missing.is_err());

        let empty = serde_json::from_str::<Quote>(r#"{"text":"","category":"X"}"#);
        assert!(empty.is_err());
    }

    #[test]
    fn test_raw_accepts_title_alias() {
        let raw: RawQuote = serde_json::from_str(r#"{"title":"Hello","category":"Remote"}"#)
            .unwrap();
        let quote = Quote::try_from(raw).unwrap();
        assert_eq!(quote.text(), "Hello");
    }

    #[test]
    fn test_replace_category_returns_previous() {
        let mut quote = Quote::new("Be brave", "Courage").unwrap();
        let remote = Quote::new("Be brave", "Bravery").unwrap();

        assert_eq!(quote.replace_category(&remote), "Courage");
        assert_eq!(quote.category(), "Bravery");
        assert_eq!(quote.text(), "Be brave");
    }

    #[test]
    fn test_default_quotes() {
        let quotes = default_quotes();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[1].category(), "Life");
    }
}
