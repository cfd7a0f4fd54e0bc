//! Aggregate ledger statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Read-only totals over every recorded version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionStats {
    /// Number of version rows.
    pub total_versions: i64,
    /// Sum of all version sizes in bytes.
    pub total_size: i64,
    /// Summed size per MIME type.
    pub size_by_mime_type: BTreeMap<String, i64>,
    /// Versions divided by distinct documents (0 when empty).
    pub avg_versions_per_document: f64,
}

impl VersionStats {
    /// Derive the average from totals.
    pub fn average(total_versions: i64, distinct_documents: i64) -> f64 {
        if distinct_documents == 0 {
            0.0
        } else {
            total_versions as f64 / distinct_documents as f64
        }
    }
}
