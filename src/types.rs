use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One logged access event: who queried which member, when, and the outcome.
///
/// Timestamps are kept naive on purpose: the source CSV carries no zone and
/// every time-window computation is anchored to the dataset itself, so
/// attaching UTC would only pretend to knowledge we don't have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub timestamp: NaiveDateTime,
    pub user: String,
    pub member: String,
    pub status: String,
}

/// Ordered (key, count) pairs, the unit of aggregate output.
///
/// The ordering is part of each producer's contract: chronological for the
/// daily trend, 0..=23 for hours, count-descending for the ranked views.
pub type CountTable<K> = Vec<(K, u64)>;

/// Relative time cutoff anchored to the newest record in the dataset,
/// not to wall-clock now, since the dataset may be historical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    #[default]
    All,
    Last7Days,
    Last30Days,
}

impl TimeWindow {
    /// Days subtracted from the reference midnight; `None` keeps everything.
    pub fn offset_days(self) -> Option<i64> {
        match self {
            TimeWindow::All => None,
            TimeWindow::Last7Days => Some(7),
            TimeWindow::Last30Days => Some(30),
        }
    }
}

/// Truncation applied to the count-ranked user/member tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMode {
    None,
    #[default]
    Top,
    Bottom,
}

/// Rendering hint handed to the display layer alongside each view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ChartKind {
    /// Connected trend line over dates.
    Line,
    /// Bars with the count rendered outside each bar.
    Bar,
    /// Count-ranked bars; heights may be log-scaled, labels stay true counts.
    RankedBar { log_scale: bool },
    /// Proportional view labeled with name, percent, and value.
    Pie,
    /// Searchable, scrollable raw-record table.
    Table,
}

/// One assembled aggregate view: a titled count table plus its chart hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateView<K> {
    pub title: String,
    pub chart: ChartKind,
    pub rows: CountTable<K>,
}

/// The raw-record view: search/status-filtered rows, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordTableView {
    pub title: String,
    pub chart: ChartKind,
    pub rows: Vec<AccessRecord>,
}

/// Everything one recompute pass produces, handed to the renderer as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardViews {
    /// Records surviving the time-window filter (the header caption count).
    pub record_count: usize,
    pub daily: AggregateView<NaiveDate>,
    pub hourly: AggregateView<u32>,
    pub users: AggregateView<String>,
    pub members: AggregateView<String>,
    pub statuses: AggregateView<String>,
    pub records: RecordTableView,
}
