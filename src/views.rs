use crate::aggregate;
use crate::error::Result;
use crate::params::QueryParams;
use crate::rank;
use crate::store::{self, RecordStore};
use crate::types::{
    AggregateView, ChartKind, DashboardViews, RankMode, RecordTableView,
};

/// Derive all six views from the loaded dataset under the given parameters.
///
/// Every view starts from the time-windowed record set. The search/status
/// filter and the final time-descending sort apply to the raw table only;
/// the ranker applies to the user/member tables only. Nothing is cached
/// between calls; the only fallible step is the ranker's defensive
/// validation.
pub fn assemble(store: &RecordStore, params: &QueryParams) -> Result<DashboardViews> {
    let windowed = store.windowed(params.time_window);

    let daily = AggregateView {
        title: "Daily access trend".to_string(),
        chart: ChartKind::Line,
        rows: aggregate::by_day(&windowed),
    };

    let hourly = AggregateView {
        title: "Hourly distribution (0-23)".to_string(),
        chart: ChartKind::Bar,
        rows: aggregate::by_hour(&windowed),
    };

    let ranked_chart = ChartKind::RankedBar {
        log_scale: params.log_scale,
    };
    let users = AggregateView {
        title: rank_title("Accesses by user", params),
        chart: ranked_chart,
        rows: rank::rank(aggregate::by_user(&windowed), params.rank_mode, params.n)?,
    };
    let members = AggregateView {
        title: rank_title("Lookups by member", params),
        chart: ranked_chart,
        rows: rank::rank(aggregate::by_member(&windowed), params.rank_mode, params.n)?,
    };

    let statuses = AggregateView {
        title: "Status breakdown".to_string(),
        chart: ChartKind::Pie,
        rows: aggregate::by_status(&windowed),
    };

    let mut raw_rows = store::apply_search(
        &windowed,
        &params.search_user,
        &params.search_member,
        &params.status_filter,
    );
    // Newest first; stable, so same-second rows keep their input order.
    raw_rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let records = RecordTableView {
        title: "Raw records".to_string(),
        chart: ChartKind::Table,
        rows: raw_rows,
    };

    Ok(DashboardViews {
        record_count: windowed.len(),
        daily,
        hourly,
        users,
        members,
        statuses,
        records,
    })
}

fn rank_title(base: &str, params: &QueryParams) -> String {
    match params.rank_mode {
        RankMode::None => base.to_string(),
        RankMode::Top => format!("{base} (top {})", params.n),
        RankMode::Bottom => format!("{base} (bottom {})", params.n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessRecord, TimeWindow};
    use chrono::NaiveDateTime;
    use std::collections::BTreeSet;

    fn record(ts: &str, user: &str, member: &str, status: &str) -> AccessRecord {
        AccessRecord {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").expect("timestamp"),
            user: user.to_string(),
            member: member.to_string(),
            status: status.to_string(),
        }
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(vec![
            record("2024-01-01 10:00:00", "alice", "A", "OK"),
            record("2024-01-01 10:00:00", "bob", "B", "FAIL"),
            record("2024-01-02 09:00:00", "alice", "A", "OK"),
            record("2024-03-10 22:00:00", "carol", "C", "OK"),
        ])
    }

    fn params_with_all_statuses(store: &RecordStore) -> QueryParams {
        QueryParams {
            status_filter: store.distinct_statuses().into_iter().collect(),
            ..QueryParams::default()
        }
    }

    #[test]
    fn assembles_all_six_views() {
        let store = sample_store();
        let views = assemble(&store, &params_with_all_statuses(&store)).expect("assemble");

        assert_eq!(views.record_count, 4);
        assert_eq!(views.daily.rows.len(), 3);
        assert_eq!(views.hourly.rows.len(), 24);
        assert_eq!(views.users.rows[0], ("alice".to_string(), 2));
        assert_eq!(views.members.rows[0], ("A".to_string(), 2));
        assert_eq!(views.statuses.rows[0], ("OK".to_string(), 3));
        assert_eq!(views.records.rows.len(), 4);
        assert_eq!(views.daily.chart, ChartKind::Line);
        assert_eq!(views.statuses.chart, ChartKind::Pie);
    }

    #[test]
    fn raw_table_is_sorted_newest_first() {
        let store = sample_store();
        let views = assemble(&store, &params_with_all_statuses(&store)).expect("assemble");

        let stamps: Vec<_> = views.records.rows.iter().map(|r| r.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(stamps, sorted);
        assert_eq!(views.records.rows[0].user, "carol");
        // Stable: the two same-second rows keep input order.
        assert_eq!(views.records.rows[2].user, "alice");
        assert_eq!(views.records.rows[3].user, "bob");
    }

    #[test]
    fn search_narrows_only_the_raw_table() {
        let store = sample_store();
        let mut params = params_with_all_statuses(&store);
        params.search_user = "alice".to_string();

        let views = assemble(&store, &params).expect("assemble");
        // Charts still see all four records.
        assert_eq!(views.record_count, 4);
        assert_eq!(views.users.rows.len(), 3);
        assert_eq!(views.statuses.rows[0], ("OK".to_string(), 3));
        // Only the table narrowed.
        assert_eq!(views.records.rows.len(), 2);
        assert!(views.records.rows.iter().all(|r| r.user == "alice"));
    }

    #[test]
    fn empty_status_filter_empties_only_the_raw_table() {
        let store = sample_store();
        let mut params = params_with_all_statuses(&store);
        params.status_filter = BTreeSet::new();

        let views = assemble(&store, &params).expect("assemble");
        assert!(views.records.rows.is_empty());
        assert!(!views.statuses.rows.is_empty());
    }

    #[test]
    fn time_window_narrows_every_view() {
        let store = sample_store();
        let mut params = params_with_all_statuses(&store);
        params.time_window = TimeWindow::Last7Days;

        // Reference date is 2024-03-10; only carol's record is inside.
        let views = assemble(&store, &params).expect("assemble");
        assert_eq!(views.record_count, 1);
        assert_eq!(views.daily.rows.len(), 1);
        assert_eq!(views.users.rows, vec![("carol".to_string(), 1)]);
        assert_eq!(views.records.rows.len(), 1);
        assert_eq!(views.hourly.rows.len(), 24);
        assert_eq!(views.hourly.rows.iter().map(|&(_, c)| c).sum::<u64>(), 1);
    }

    #[test]
    fn rank_mode_truncates_user_and_member_views() {
        let store = sample_store();
        let mut params = params_with_all_statuses(&store);
        params.rank_mode = RankMode::Top;
        params.n = 5;

        let views = assemble(&store, &params).expect("assemble");
        assert_eq!(views.users.rows.len(), 3); // fewer than n exist
        assert_eq!(views.users.title, "Accesses by user (top 5)");

        params.rank_mode = RankMode::None;
        let views = assemble(&store, &params).expect("assemble");
        assert_eq!(views.users.title, "Accesses by user");
        assert_eq!(views.users.chart, ChartKind::RankedBar { log_scale: false });
    }

    #[test]
    fn empty_store_assembles_empty_views() {
        let store = RecordStore::default();
        let views = assemble(&store, &QueryParams::default()).expect("assemble");
        assert_eq!(views.record_count, 0);
        assert!(views.daily.rows.is_empty());
        assert_eq!(views.hourly.rows.len(), 24);
        assert!(views.users.rows.is_empty());
        assert!(views.records.rows.is_empty());
    }

    #[test]
    fn scenario_from_three_record_dataset() {
        let store = RecordStore::new(vec![
            record("2024-01-01 10:00:00", "alice", "A", "OK"),
            record("2024-01-01 10:00:00", "bob", "B", "FAIL"),
            record("2024-01-02 09:00:00", "alice", "A", "OK"),
        ]);
        let mut params = params_with_all_statuses(&store);
        params.rank_mode = RankMode::Top;
        params.n = 5;

        let views = assemble(&store, &params).expect("assemble");
        assert_eq!(
            views.daily.rows,
            vec![
                (chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2),
                (chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 1),
            ]
        );
        assert_eq!(
            views.users.rows,
            vec![("alice".to_string(), 2), ("bob".to_string(), 1)]
        );
        assert_eq!(
            rank::rank(views.users.rows.clone(), RankMode::Top, 1).unwrap(),
            vec![("alice".to_string(), 2)]
        );
    }
}
