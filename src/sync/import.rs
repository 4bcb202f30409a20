//! Parsing of import streams.
//!
//! Accepted inputs:
//! - an export document (`{"format": "quotebook", "quotes": [...]}`)
//! - a bare JSON array of `{text, category}` records
//! - JSONL, one record per line
//!
//! Import is additive and forgiving: each record is validated on its own
//! and bad ones are skipped. Only a stream with no parseable structure at
//! all is rejected.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Collection, Quote, RawQuote};
use crate::sync::hash::content_hash;
use crate::sync::types::{EXPORT_FORMAT, EXPORT_VERSION};

/// Quotes extracted from an import stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    pub quotes: Collection,
    /// Records (or JSONL lines) that were rejected.
    pub skipped: usize,
    /// The document's `content_hash` did not match its quotes.
    pub hash_mismatch: bool,
}

/// Parse an import stream into valid quotes.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the stream is neither JSON nor JSONL with at
/// least one JSON line, or if it is an export document of an unsupported
/// version.
pub fn parse_import(source_name: &str, bytes: &[u8]) -> Result<ParsedImport> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(records)) => Ok(validate_records(records)),
        Ok(Value::Object(map)) if map.contains_key("quotes") => {
            parse_document(source_name, Value::Object(map))
        }
        Ok(record @ Value::Object(_)) => Ok(validate_records(vec![record])),
        Ok(_) => Err(Error::parse(
            source_name,
            "expected a JSON array or object of quote records",
        )),
        Err(whole) => parse_jsonl(source_name, bytes).map_err(|_| {
            Error::parse(source_name, whole.to_string())
        }),
    }
}

fn parse_document(source_name: &str, document: Value) -> Result<ParsedImport> {
    let Value::Object(mut map) = document else {
        return Err(Error::parse(source_name, "expected an export document"));
    };

    if let Some(format) = map.get("format").and_then(Value::as_str) {
        if format != EXPORT_FORMAT {
            warn!(format, "Importing document with unknown format marker");
        }
    }
    if let Some(version) = map.get("version").and_then(Value::as_u64) {
        if version > u64::from(EXPORT_VERSION) {
            return Err(Error::parse(
                source_name,
                format!("export version {version} is newer than supported version {EXPORT_VERSION}"),
            ));
        }
    }

    let expected_hash = map
        .get("content_hash")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let Some(Value::Array(records)) = map.remove("quotes") else {
        return Err(Error::parse(source_name, "\"quotes\" must be an array"));
    };

    let mut parsed = validate_records(records);
    if let Some(expected) = expected_hash {
        let actual = content_hash(&parsed.quotes)?;
        parsed.hash_mismatch = parsed.skipped > 0 || actual != expected;
        if parsed.hash_mismatch {
            warn!(source = source_name, "Export content hash does not match its quotes");
        }
    }

    Ok(parsed)
}

fn parse_jsonl(source_name: &str, bytes: &[u8]) -> Result<ParsedImport> {
    let text = String::from_utf8_lossy(bytes);
    let mut records = Vec::new();
    let mut bad_lines = 0;

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => records.push(value),
            Err(e) => {
                debug!(line = line_num + 1, error = %e, "Skipping unparseable import line");
                bad_lines += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(Error::parse(source_name, "no JSON records found"));
    }

    let mut parsed = validate_records(records);
    parsed.skipped += bad_lines;
    Ok(parsed)
}

fn validate_records(records: Vec<Value>) -> ParsedImport {
    let mut parsed = ParsedImport::default();

    for (index, value) in records.into_iter().enumerate() {
        let quote = serde_json::from_value::<RawQuote>(value)
            .map_err(|e| e.to_string())
            .and_then(|raw| Quote::try_from(raw).map_err(|e| e.to_string()));
        match quote {
            Ok(quote) => parsed.quotes.push(quote),
            Err(reason) => {
                debug!(record = index, %reason, "Skipping invalid import record");
                parsed.skipped += 1;
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::export::export_collection;

    fn q(text: &str, category: &str) -> Quote {
        Quote::new(text, category).unwrap()
    }

    #[test]
    fn test_bare_array_skips_invalid() {
        let input = br#"[{"text":"","category":"X"},{"text":"Valid","category":"Y"}]"#;

        let parsed = parse_import("in.json", input).unwrap();

        assert_eq!(parsed.quotes, vec![q("Valid", "Y")]);
        assert_eq!(parsed.skipped, 1);
        assert!(!parsed.hash_mismatch);
    }

    #[test]
    fn test_export_document_roundtrip() {
        let quotes = vec![q("A", "x"), q("B", "y")];
        let bytes = export_collection(&quotes).unwrap();

        let parsed = parse_import("quotes.json", &bytes).unwrap();

        assert_eq!(parsed.quotes, quotes);
        assert_eq!(parsed.skipped, 0);
        assert!(!parsed.hash_mismatch);
    }

    #[test]
    fn test_tampered_document_is_flagged() {
        let bytes = export_collection(&[q("A", "x")]).unwrap();
        let tampered = String::from_utf8(bytes).unwrap().replace("\"x\"", "\"z\"");

        let parsed = parse_import("quotes.json", tampered.as_bytes()).unwrap();

        assert_eq!(parsed.quotes, vec![q("A", "z")]);
        assert!(parsed.hash_mismatch);
    }

    #[test]
    fn test_newer_version_rejected() {
        let input = br#"{"format":"quotebook","version":99,"quotes":[]}"#;
        let result = parse_import("future.json", input);
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_jsonl() {
        let input = b"{\"text\":\"One\",\"category\":\"a\"}\n\nnot json\n{\"text\":\"Two\",\"category\":\"b\"}\n";

        let parsed = parse_import("quotes.jsonl", input).unwrap();

        assert_eq!(parsed.quotes, vec![q("One", "a"), q("Two", "b")]);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_single_object_is_one_record() {
        let parsed = parse_import("one.json", br#"{"text":"Solo","category":"a"}"#).unwrap();
        assert_eq!(parsed.quotes, vec![q("Solo", "a")]);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            parse_import("junk.txt", b"this is not json"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(parse_import("empty", b""), Err(Error::Parse { .. })));
        assert!(matches!(parse_import("num", b"42"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let input = br#"[{"text":"Same","category":"a"},{"text":"Same","category":"a"}]"#;
        let parsed = parse_import("dupes.json", input).unwrap();
        assert_eq!(parsed.quotes.len(), 2);
    }
}
