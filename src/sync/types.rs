//! Sync types shared by the merge engine, the orchestrator and the
//! import/export surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Collection, Quote};

/// How a category overwrite relates to the last synced state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Only the remote side changed since the last sync (or there is no
    /// record of a previous sync for this quote).
    RemoteUpdate,
    /// The local category had diverged from the last synced value. The
    /// remote value still wins.
    Conflict,
}

/// A category overwrite surfaced by the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConflict {
    pub text: String,
    pub local_category: String,
    pub remote_category: String,
    pub kind: ConflictKind,
}

/// Per-merge counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Remote quotes appended because no local quote had their text.
    pub added: usize,
    /// Local quotes whose category was overwritten by the remote.
    pub updated: usize,
    /// Remote quotes that matched a local quote exactly.
    pub unchanged: usize,
    /// Overwrites classified as [`ConflictKind::Conflict`].
    pub conflicts: usize,
}

impl MergeStats {
    /// Total remote records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.updated + self.unchanged
    }
}

/// Result of reconciling a local collection against a remote one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Collection,
    /// True iff at least one append or category overwrite happened.
    pub changed: bool,
    pub stats: MergeStats,
    pub conflicts: Vec<CategoryConflict>,
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Unchanged,
    Updated,
    Failed,
}

/// Report produced by every sync cycle. Transient, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Short identifier used to correlate log lines of one cycle.
    pub cycle_id: String,
    pub outcome: SyncOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged: Option<Collection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub stats: MergeStats,
    pub conflicts: Vec<CategoryConflict>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn failed(cycle_id: String, reason: impl Into<String>) -> Self {
        Self {
            cycle_id,
            outcome: SyncOutcome::Failed,
            merged: None,
            failure_reason: Some(reason.into()),
            stats: MergeStats::default(),
            conflicts: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    pub(crate) fn unchanged(cycle_id: String, outcome: MergeOutcome) -> Self {
        Self {
            cycle_id,
            outcome: SyncOutcome::Unchanged,
            merged: None,
            failure_reason: None,
            stats: outcome.stats,
            conflicts: outcome.conflicts,
            finished_at: Utc::now(),
        }
    }

    pub(crate) fn updated(cycle_id: String, outcome: MergeOutcome) -> Self {
        Self {
            cycle_id,
            outcome: SyncOutcome::Updated,
            merged: Some(outcome.merged),
            failure_reason: None,
            stats: outcome.stats,
            conflicts: outcome.conflicts,
            finished_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.outcome == SyncOutcome::Failed
    }
}

/// Result of a manual sync trigger.
#[derive(Debug, Clone)]
pub enum ManualSync {
    /// The cycle ran to completion.
    Ran(SyncReport),
    /// Another cycle was in flight; this trigger was dropped.
    Dropped,
}

/// Result of adding a quote locally.
#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub quote: Quote,
    /// Whether the best-effort remote post succeeded.
    pub posted: bool,
}

/// Result of an additive import.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Records appended to the collection.
    pub added: usize,
    /// Records rejected by validation or unparseable lines.
    pub skipped: usize,
    /// The document carried a content hash that did not match its quotes.
    pub hash_mismatch: bool,
}

/// Current export document format version.
pub const EXPORT_VERSION: u32 = 1;

/// Format marker written into every export document.
pub const EXPORT_FORMAT: &str = "quotebook";

/// Self-describing export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument<Q> {
    pub format: String,
    pub version: u32,
    pub exported_at: String,
    pub count: usize,
    /// SHA256 of the serialized quotes array.
    pub content_hash: String,
    pub quotes: Vec<Q>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_stats_total() {
        let stats = MergeStats {
            added: 2,
            updated: 1,
            unchanged: 4,
            conflicts: 1,
        };
        assert_eq!(stats.total(), 7);
    }

    #[test]
    fn test_failed_report_serializes_reason() {
        let report = SyncReport::failed("sync_abc".into(), "connection refused");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["failure_reason"], "connection refused");
        assert!(json.get("merged").is_none());
        assert!(report.is_failed());
    }
}
