//! Content hashing for export documents.
//!
//! The hash is SHA256 over the compact JSON of the quotes array. Import
//! recomputes it to flag documents that were edited by hand or truncated.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA256 hash of a serializable value.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized to JSON.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Quote;

    #[test]
    fn test_content_hash_deterministic() {
        let quotes = vec![Quote::new("Be brave", "Courage").unwrap()];

        let hash1 = content_hash(&quotes).unwrap();
        let hash2 = content_hash(&quotes).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_content_hash_changes_with_category() {
        let a = vec![Quote::new("Be brave", "Courage").unwrap()];
        let b = vec![Quote::new("Be brave", "Bravery").unwrap()];
        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn test_content_hash_depends_on_order() {
        let x = Quote::new("A", "x").unwrap();
        let y = Quote::new("B", "y").unwrap();
        assert_ne!(
            content_hash(&[x.clone(), y.clone()]).unwrap(),
            content_hash(&[y, x]).unwrap()
        );
    }
}
