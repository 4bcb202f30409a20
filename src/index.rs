//! Category index and filter selection.
//!
//! The index is a sorted, deduplicated projection of the categories present
//! in a collection. It is never stored; callers recompute it with
//! [`reindex`] whenever the collection changes.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::model::Quote;

/// Sentinel used to persist and parse the "no filter" selection.
pub const ALL_CATEGORIES: &str = "all";

/// Sorted set of distinct categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryIndex(BTreeSet<String>);

impl CategoryIndex {
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Categories in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Compute the category index of a collection.
#[must_use]
pub fn reindex(quotes: &[Quote]) -> CategoryIndex {
    CategoryIndex(quotes.iter().map(|q| q.category().to_string()).collect())
}

/// The active category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterSelection {
    #[default]
    All,
    Category(String),
}

impl FilterSelection {
    /// Fall back to [`FilterSelection::All`] if the selected category is not
    /// in the index.
    #[must_use]
    pub fn resolve(self, index: &CategoryIndex) -> Self {
        match self {
            Self::Category(ref category) if !index.contains(category) => Self::All,
            other => other,
        }
    }

    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => quote.category() == category.as_str(),
        }
    }
}

impl FromStr for FilterSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == ALL_CATEGORIES {
            Ok(Self::All)
        } else {
            Ok(Self::Category(s.to_string()))
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_CATEGORIES),
            Self::Category(category) => f.write_str(category),
        }
    }
}

impl Serialize for FilterSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Quotes matching the selection, in collection order.
///
/// An unknown category yields an empty result, not an error.
#[must_use]
pub fn apply_filter(quotes: &[Quote], selection: &FilterSelection) -> Vec<Quote> {
    quotes
        .iter()
        .filter(|q| selection.matches(q))
        .cloned()
        .collect()
}
