//! Data models for Quotebook.
//!
//! - Quote (text + category, identified by text)
//! - Collection (ordered quotes)

pub mod quote;

pub use quote::{default_quotes, Collection, Quote, RawQuote, ValidationError};
