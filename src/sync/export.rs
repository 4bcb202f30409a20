//! Export of the collection as a self-describing JSON document.
//!
//! ```json
//! {
//!   "format": "quotebook",
//!   "version": 1,
//!   "exported_at": "2026-01-20T10:00:00+00:00",
//!   "count": 2,
//!   "content_hash": "ab12...",
//!   "quotes": [{"text": "...", "category": "..."}]
//! }
//! ```

use chrono::Utc;

use crate::error::Result;
use crate::model::Quote;
use crate::sync::hash::content_hash;
use crate::sync::types::{ExportDocument, EXPORT_FORMAT, EXPORT_VERSION};

/// Default file name offered for exports.
pub const DEFAULT_EXPORT_FILE: &str = "quotes.json";

/// Build the export document for a collection.
///
/// # Errors
///
/// Returns an error if the quotes cannot be serialized.
pub fn export_document(quotes: &[Quote]) -> Result<ExportDocument<Quote>> {
    Ok(ExportDocument {
        format: EXPORT_FORMAT.to_string(),
        version: EXPORT_VERSION,
        exported_at: Utc::now().to_rfc3339(),
        count: quotes.len(),
        content_hash: content_hash(quotes)?,
        quotes: quotes.to_vec(),
    })
}

/// Serialize a collection as a pretty-printed export document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_collection(quotes: &[Quote]) -> Result<Vec<u8>> {
    let document = export_document(quotes)?;
    let mut bytes = serde_json::to_vec_pretty(&document)?;
    bytes.push(b'\n');
    Ok(bytes)
}
