use crate::error::{DashboardError, Result};
use crate::types::{CountTable, RankMode};

/// Truncate a descending-by-count table to its first (`Top`) or last
/// (`Bottom`) `n` rows; `None` passes the table through unchanged.
///
/// `Bottom` keeps the tail rows in their existing relative order, so the
/// lowest counts still read higher-to-lower among themselves. Tables shorter
/// than `n` come back whole, with no padding and no error.
///
/// The input must already be sorted non-increasing by count (as produced by
/// `aggregate::by_user` / `by_member`); that precondition and `n >= 1` are
/// checked defensively.
pub fn rank(table: CountTable<String>, mode: RankMode, n: usize) -> Result<CountTable<String>> {
    if matches!(mode, RankMode::None) {
        return Ok(table);
    }

    if n == 0 {
        return Err(DashboardError::validation(
            "rank count must be at least 1",
        ));
    }
    if let Some(pair) = table.windows(2).find(|pair| pair[0].1 < pair[1].1) {
        return Err(DashboardError::validation(format!(
            "rank input is not sorted by count: '{}' ({}) precedes '{}' ({})",
            pair[0].0, pair[0].1, pair[1].0, pair[1].1
        )));
    }

    let mut table = table;
    let keep = n.min(table.len());
    if matches!(mode, RankMode::Top) {
        table.truncate(keep);
        Ok(table)
    } else {
        Ok(table.split_off(table.len() - keep))
    }
}
