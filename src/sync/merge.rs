//! Reconciliation of a local collection against a remote one.
//!
//! Rules:
//! - Quotes are matched by `text`.
//! - A remote quote with no local match is appended after all local quotes,
//!   in remote order.
//! - A match with a different category takes the remote category in place.
//! - Local quotes with no remote match are kept unchanged, in order.
//! - Nothing is ever removed; an empty remote is a no-op.
//!
//! When a text occurs more than once, the k-th remote occurrence pairs with
//! the k-th occurrence in the merged collection and any further remote
//! occurrences pair with the last one. With unique texts this is plain
//! "first match"; with duplicates it keeps `reconcile(l, l)` a no-op and
//! never appends the same remote text twice.

use std::collections::HashMap;

use crate::model::{Collection, Quote};
use crate::sync::types::{CategoryConflict, ConflictKind, MergeOutcome, MergeStats};

/// Merge `remote` into `local`, remote winning category conflicts.
///
/// Local quotes keep their positions and remote-only quotes follow them in
/// remote order. Nothing is removed.
///
/// Duplicate texts pair by occurrence: the k-th remote quote with a given
/// text updates the k-th local quote with that text, and any remote
/// occurrences beyond the local count update the last one. A text missing
/// locally is appended once, at its first remote occurrence, and later
/// remote duplicates of it only update that appended quote, so the last
/// duplicate's category wins. Merging a collection with itself is always a
/// no-op.
#[must_use]
pub fn reconcile(local: &[Quote], remote: &[Quote]) -> MergeOutcome {
    reconcile_with_snapshot(local, remote, None)
}

/// Like [`reconcile`], additionally classifying each overwrite against the
/// remote collection seen by the previous sync.
///
/// Duplicate texts follow the same pairing as [`reconcile`]. The snapshot
/// never changes `merged` or `changed`.
#[must_use]
pub fn reconcile_with_snapshot(
    local: &[Quote],
    remote: &[Quote],
    snapshot: Option<&[Quote]>,
) -> MergeOutcome {
    let mut merged: Collection = local.to_vec();
    let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, quote) in merged.iter().enumerate() {
        positions.entry(quote.text().to_string()).or_default().push(i);
    }

    let previous = snapshot.map(first_categories).unwrap_or_default();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut stats = MergeStats::default();
    let mut conflicts = Vec::new();

    for incoming in remote {
        let nth = occurrences.entry(incoming.text()).or_insert(0);
        let slot = positions
            .get(incoming.text())
            .and_then(|slots| slots.get(*nth).or_else(|| slots.last()).copied());
        *nth += 1;

        let Some(idx) = slot else {
            positions
                .entry(incoming.text().to_string())
                .or_default()
                .push(merged.len());
            merged.push(incoming.clone());
            stats.added += 1;
            continue;
        };

        let existing = &mut merged[idx];
        if existing.category() == incoming.category() {
            stats.unchanged += 1;
            continue;
        }

        let kind = match previous.get(incoming.text()) {
            Some(synced) if *synced != existing.category() => ConflictKind::Conflict,
            _ => ConflictKind::RemoteUpdate,
        };
        if kind == ConflictKind::Conflict {
            stats.conflicts += 1;
        }
        conflicts.push(CategoryConflict {
            text: incoming.text().to_string(),
            local_category: existing.replace_category(incoming),
            remote_category: incoming.category().to_string(),
            kind,
        });
        stats.updated += 1;
    }

    MergeOutcome {
        merged,
        changed: stats.added > 0 || stats.updated > 0,
        stats,
        conflicts,
    }
}

/// Category of the first occurrence of each text.
fn first_categories(quotes: &[Quote]) -> HashMap<&str, &str> {
    let mut map = HashMap::with_capacity(quotes.len());
    for quote in quotes {
        map.entry(quote.text()).or_insert(quote.category());
    }
    map
}
