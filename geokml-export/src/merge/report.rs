//! Merge diagnostics

use serde::Serialize;
use serde_json::Value;

/// One field whose value differs between the two locales
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiscrepancy {
    pub slug: String,
    pub field: String,
    pub primary_value: Value,
    pub secondary_value: Value,
}

/// Structured outcome of one bilingual merge
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    /// Records in the primary input
    pub primary_total: usize,
    /// Records in the secondary input
    pub secondary_total: usize,
    /// Primary records that found a secondary counterpart
    pub matched: usize,
    /// Slugs of primary records without a counterpart (empty string for a missing slug)
    pub unmatched_slugs: Vec<String>,
    /// Secondary records left out of the lookup for lack of a slug
    pub secondary_missing_slug: usize,
    /// Secondary records ignored because an earlier one had the same slug
    pub secondary_duplicate_slug: usize,
    /// Secondary records with no primary counterpart (not emitted)
    pub secondary_only: usize,
    pub discrepancies: Vec<FieldDiscrepancy>,
}

impl MergeReport {
    pub fn unmatched(&self) -> usize {
        self.unmatched_slugs.len()
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} merged of {} primary / {} secondary, {} unmatched, {} secondary-only, {} discrepancies",
            self.matched,
            self.primary_total,
            self.secondary_total,
            self.unmatched(),
            self.secondary_only,
            self.discrepancies.len()
        )
    }

    /// Distinct discrepancy field names with their counts, most frequent first
    pub fn discrepancy_fields(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for discrepancy in &self.discrepancies {
            match counts.iter_mut().find(|(field, _)| *field == discrepancy.field) {
                Some((_, count)) => *count += 1,
                None => counts.push((discrepancy.field.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}
