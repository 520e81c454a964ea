// Pure state transitions behind the dashboard controls, kept free of any
// terminal handle so they can be unit tested directly.

use std::collections::BTreeSet;

use crate::params::{MAX_RANK_N, MIN_RANK_N};
use crate::types::{RankMode, TimeWindow};

/// Order matches the sidebar radio of the dashboard: everything, then the
/// narrower windows.
pub fn cycle_window(window: TimeWindow) -> TimeWindow {
    match window {
        TimeWindow::All => TimeWindow::Last30Days,
        TimeWindow::Last30Days => TimeWindow::Last7Days,
        TimeWindow::Last7Days => TimeWindow::All,
    }
}

pub fn cycle_rank(mode: RankMode) -> RankMode {
    match mode {
        RankMode::Top => RankMode::Bottom,
        RankMode::Bottom => RankMode::None,
        RankMode::None => RankMode::Top,
    }
}

/// Step the rank count, clamped to its slider bounds. A step that would leave
/// the bounds sticks at the edge instead of failing.
pub fn step_rank_n(n: usize, delta: i64) -> usize {
    let stepped = n as i64 + delta;
    stepped.clamp(MIN_RANK_N as i64, MAX_RANK_N as i64) as usize
}

/// Toggle the `index`-th observed status in the filter set. Returns false for
/// an out-of-range index (no change).
pub fn toggle_status(filter: &mut BTreeSet<String>, statuses: &[String], index: usize) -> bool {
    let Some(status) = statuses.get(index) else {
        return false;
    };
    if !filter.remove(status) {
        filter.insert(status.clone());
    }
    true
}

/// Bar height for rendering: identity on a linear scale, a monotone log10
/// transform otherwise. Labels always show the true count; only the bar
/// geometry is scaled.
pub fn bar_height(count: u64, log_scale: bool) -> u64 {
    if !log_scale {
        return count;
    }
    if count == 0 {
        0
    } else {
        (((count as f64).log10() + 1.0) * 100.0).round() as u64
    }
}

pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Clamp a table selection to the row count, collapsing to `None` on an
/// empty table.
pub fn clamp_selection(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(selected.unwrap_or(0).min(len - 1))
    }
}

/// Move a table selection by `delta`, staying inside `0..len`.
pub fn move_selection(selected: Option<usize>, len: usize, delta: i64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = selected.unwrap_or(0) as i64;
    Some((current + delta).clamp(0, len as i64 - 1) as usize)
}

/// Truncate a bar label to fit its column, marking the cut with an ellipsis.
pub fn short_label(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut label: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    label.push('…');
    label
}
