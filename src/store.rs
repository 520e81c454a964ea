use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::types::{AccessRecord, TimeWindow};

/// The session's loaded dataset: parsed once, immutable until an explicit
/// reload replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<AccessRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<AccessRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AccessRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The newest timestamp in the full dataset, normalized to midnight.
    ///
    /// Time windows anchor here rather than at wall-clock now, so a
    /// historical dataset still shows its own final week/month.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.timestamp.date()).max()
    }

    /// Distinct status values in first-encountered order, from the full
    /// (never status-filtered) dataset. Feeds the status multi-select.
    pub fn distinct_statuses(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut statuses = Vec::new();
        for record in &self.records {
            if seen.insert(record.status.as_str()) {
                statuses.push(record.status.clone());
            }
        }
        statuses
    }

    /// Records surviving the given window, anchored to this store's
    /// reference date.
    pub fn windowed(&self, window: TimeWindow) -> Vec<AccessRecord> {
        match self.reference_date() {
            Some(reference) => apply_window(&self.records, window, reference),
            None => Vec::new(),
        }
    }
}

/// Keep records with `timestamp >= reference_midnight - offset`. `All` keeps
/// everything; there is no upper bound, so the newest records always survive.
pub fn apply_window(
    records: &[AccessRecord],
    window: TimeWindow,
    reference: NaiveDate,
) -> Vec<AccessRecord> {
    let Some(offset) = window.offset_days() else {
        return records.to_vec();
    };

    let cutoff = reference
        .checked_sub_days(Days::new(offset as u64))
        .unwrap_or(NaiveDate::MIN)
        .and_hms_opt(0, 0, 0)
        .unwrap_or(NaiveDateTime::MIN);

    records
        .iter()
        .filter(|r| r.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// AND-combined raw-table filter.
///
/// An empty needle always passes its field; the status set is a strict
/// membership test, so an empty set admits nothing. Matching is
/// case-sensitive literal containment. Never fails; an empty result is a
/// valid output.
pub fn apply_search(
    records: &[AccessRecord],
    user_needle: &str,
    member_needle: &str,
    statuses: &BTreeSet<String>,
) -> Vec<AccessRecord> {
    records
        .iter()
        .filter(|r| user_needle.is_empty() || r.user.contains(user_needle))
        .filter(|r| member_needle.is_empty() || r.member.contains(member_needle))
        .filter(|r| statuses.contains(&r.status))
        .cloned()
        .collect()
}
