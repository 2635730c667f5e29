//! Reconciliation of a fresh match listing against a stored dataset.

use serde::Serialize;
use std::collections::HashSet;

use super::schema::SchemaNormalizer;
use super::table::Table;

/// How the missing set was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// No stored dataset: everything listed is missing
    Full,
    /// Stored dataset present: only unseen identifiers are missing
    Delta,
}

/// Which matches a run has to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub mode: ReconcileMode,
    /// Identifiers on the listing, duplicates included
    pub listed: usize,
    /// Rows in the stored dataset
    pub stored: usize,
    /// Identifiers to extract, distinct and in listing order
    pub missing: Vec<String>,
}

fn distinct_in_order<'a>(ids: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut distinct = Vec::new();
    for id in ids {
        if seen.insert(id.as_str()) {
            distinct.push(id.clone());
        }
    }
    distinct
}

impl ReconcilePlan {
    /// Plan a run given the stored dataset, if any, and the fresh listing
    pub fn plan(stored: Option<&Table>, fresh: &[String]) -> Self {
        match stored {
            None => Self::full(fresh),
            Some(table) => Self::delta(table, fresh),
        }
    }

    pub fn full(fresh: &[String]) -> Self {
        Self {
            mode: ReconcileMode::Full,
            listed: fresh.len(),
            stored: 0,
            missing: distinct_in_order(fresh),
        }
    }

    /// Missing = fresh identifiers absent from the stored first column
    ///
    /// Equal counts mean the dataset is complete and nothing is extracted.
    pub fn delta(stored: &Table, fresh: &[String]) -> Self {
        let missing = if stored.rows.len() == fresh.len() {
            Vec::new()
        } else {
            let known: HashSet<&str> = stored
                .rows
                .iter()
                .filter_map(|row| row.first())
                .map(String::as_str)
                .collect();
            distinct_in_order(fresh.iter().filter(|id| !known.contains(id.as_str())))
        };

        Self {
            mode: ReconcileMode::Delta,
            listed: fresh.len(),
            stored: stored.rows.len(),
            missing,
        }
    }

    /// Stored dataset already covers the listing
    pub fn is_up_to_date(&self) -> bool {
        self.mode == ReconcileMode::Delta && self.missing.is_empty()
    }
}

/// Stored rows re-projected onto the normalizer's columns, in stored order
pub fn existing_rows(stored: Option<&Table>, normalizer: &SchemaNormalizer) -> Vec<Vec<String>> {
    match stored {
        None => Vec::new(),
        Some(table) => table
            .rows
            .iter()
            .map(|row| normalizer.project(&table.header, row))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::schema::MATCH_COLUMNS;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn stored(match_ids: &[&str]) -> Table {
        let rows = match_ids
            .iter()
            .map(|id| {
                let mut row = vec!["-".to_string(); MATCH_COLUMNS.len()];
                row[0] = id.to_string();
                row
            })
            .collect();
        Table::new(&MATCH_COLUMNS, rows)
    }

    #[test]
    fn test_full_mode_everything_missing() {
        let plan = ReconcilePlan::plan(None, &ids(&["a", "b"]));
        assert_eq!(plan.mode, ReconcileMode::Full);
        assert_eq!(plan.missing, ids(&["a", "b"]));
        assert!(!plan.is_up_to_date());
    }

    #[test]
    fn test_full_mode_empty_listing() {
        let plan = ReconcilePlan::plan(None, &[]);
        assert!(plan.missing.is_empty());
        assert!(!plan.is_up_to_date());
    }

    #[test]
    fn test_full_mode_collapses_duplicates() {
        let plan = ReconcilePlan::full(&ids(&["a", "b", "a"]));
        assert_eq!(plan.missing, ids(&["a", "b"]));
        assert_eq!(plan.listed, 3);
    }

    #[test]
    fn test_delta_equal_counts_skip() {
        let table = stored(&["a", "b", "c"]);
        let plan = ReconcilePlan::plan(Some(&table), &ids(&["a", "b", "c"]));
        assert_eq!(plan.mode, ReconcileMode::Delta);
        assert!(plan.missing.is_empty());
        assert!(plan.is_up_to_date());
    }

    #[test]
    fn test_delta_one_new() {
        let table = stored(&["a", "b", "c"]);
        let plan = ReconcilePlan::plan(Some(&table), &ids(&["d", "a", "b", "c"]));
        assert_eq!(plan.missing, ids(&["d"]));
        assert_eq!(plan.stored, 3);
        assert_eq!(plan.listed, 4);
    }

    #[test]
    fn test_delta_is_set_difference() {
        let table = stored(&["a", "b"]);
        let fresh = ids(&["a", "x", "b", "y", "x"]);
        let plan = ReconcilePlan::plan(Some(&table), &fresh);
        assert_eq!(plan.missing, ids(&["x", "y"]));
    }

    #[test]
    fn test_plan_is_idempotent_and_pure() {
        let table = stored(&["a", "b"]);
        let before = table.clone();
        let fresh = ids(&["a", "b", "c"]);

        let first = ReconcilePlan::plan(Some(&table), &fresh);
        let second = ReconcilePlan::plan(Some(&table), &fresh);
        assert_eq!(first, second);
        assert_eq!(table, before);
    }

    #[test]
    fn test_existing_rows_reprojected() {
        let table = Table {
            header: ids(&["Match_ID", "HomeTeam"]),
            rows: vec![ids(&["a", "Arsenal"])],
        };
        let rows = existing_rows(Some(&table), &SchemaNormalizer::matches());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), MATCH_COLUMNS.len());
        assert_eq!(rows[0][0], "a");
        assert_eq!(rows[0][5], "Arsenal");
        assert_eq!(rows[0][1], "-");

        assert!(existing_rows(None, &SchemaNormalizer::matches()).is_empty());
    }
}
