use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};
use crate::types::{RankMode, TimeWindow};

pub const MIN_RANK_N: usize = 5;
pub const MAX_RANK_N: usize = 50;
pub const DEFAULT_RANK_N: usize = 10;

/// Immutable bundle of the active filter controls, validated on construction.
///
/// Owned by the control surface and passed by value into the core on every
/// recompute; the core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub time_window: TimeWindow,
    pub log_scale: bool,
    pub rank_mode: RankMode,
    pub n: usize,
    pub search_user: String,
    pub search_member: String,
    pub status_filter: BTreeSet<String>,
}

impl Default for QueryParams {
    /// The dashboard's initial control state: all-time window, linear scale,
    /// Top-10, empty search boxes. `status_filter` starts empty; callers seed
    /// it with the dataset's distinct statuses once those are known.
    fn default() -> Self {
        Self {
            time_window: TimeWindow::All,
            log_scale: false,
            rank_mode: RankMode::Top,
            n: DEFAULT_RANK_N,
            search_user: String::new(),
            search_member: String::new(),
            status_filter: BTreeSet::new(),
        }
    }
}

impl QueryParams {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time_window: TimeWindow,
        log_scale: bool,
        rank_mode: RankMode,
        n: usize,
        search_user: String,
        search_member: String,
        status_filter: BTreeSet<String>,
    ) -> Result<Self> {
        validate_rank_n(n)?;
        Ok(Self {
            time_window,
            log_scale,
            rank_mode,
            n,
            search_user,
            search_member,
            status_filter,
        })
    }

    /// Re-check the invariants after field-by-field edits.
    pub fn validate(&self) -> Result<()> {
        validate_rank_n(self.n)
    }
}

pub fn validate_rank_n(n: usize) -> Result<()> {
    if (MIN_RANK_N..=MAX_RANK_N).contains(&n) {
        Ok(())
    } else {
        Err(DashboardError::validation(format!(
            "rank count must be between {MIN_RANK_N} and {MAX_RANK_N}, got {n}"
        )))
    }
}

impl FromStr for TimeWindow {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(TimeWindow::All),
            "7d" | "week" => Ok(TimeWindow::Last7Days),
            "30d" | "month" => Ok(TimeWindow::Last30Days),
            other => Err(DashboardError::validation(format!(
                "unknown time window '{other}' (expected all, 7d, or 30d)"
            ))),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeWindow::All => "all time",
            TimeWindow::Last7Days => "last 7 days",
            TimeWindow::Last30Days => "last 30 days",
        };
        write!(f, "{label}")
    }
}

impl FromStr for RankMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(RankMode::None),
            "top" => Ok(RankMode::Top),
            "bottom" => Ok(RankMode::Bottom),
            other => Err(DashboardError::validation(format!(
                "unknown rank mode '{other}' (expected none, top, or bottom)"
            ))),
        }
    }
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RankMode::None => "all",
            RankMode::Top => "top",
            RankMode::Bottom => "bottom",
        };
        write!(f, "{label}")
    }
}
