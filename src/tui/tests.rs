use crate::params::{MAX_RANK_N, MIN_RANK_N, QueryParams};
use crate::store::RecordStore;
use crate::tui::logic::*;
use crate::tui::{App, EditTarget, TuiOutcome};
use crate::types::{AccessRecord, RankMode, TimeWindow};
use crate::utils::NumberFormatOptions;
use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
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
        record("2024-01-01 11:00:00", "bob", "B", "FAIL"),
        record("2024-01-02 09:00:00", "alice", "A", "OK"),
    ])
}

fn sample_app() -> App {
    let store = sample_store();
    let params = QueryParams {
        status_filter: store.distinct_statuses().into_iter().collect(),
        ..QueryParams::default()
    };
    App::new(
        store,
        params,
        NumberFormatOptions::default(),
        "test data".to_string(),
    )
    .expect("app")
}

fn press(app: &mut App, code: KeyCode) -> Option<TuiOutcome> {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

// ============================================================================
// PURE LOGIC HELPERS
// ============================================================================

#[test]
fn window_cycle_covers_all_three() {
    let mut window = TimeWindow::All;
    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(window);
        window = cycle_window(window);
    }
    assert_eq!(window, TimeWindow::All);
    assert!(seen.contains(&TimeWindow::Last7Days));
    assert!(seen.contains(&TimeWindow::Last30Days));
}

#[test]
fn rank_cycle_covers_all_three() {
    assert_eq!(cycle_rank(RankMode::Top), RankMode::Bottom);
    assert_eq!(cycle_rank(RankMode::Bottom), RankMode::None);
    assert_eq!(cycle_rank(RankMode::None), RankMode::Top);
}

#[test]
fn rank_n_steps_stay_in_bounds() {
    assert_eq!(step_rank_n(10, 1), 11);
    assert_eq!(step_rank_n(10, -1), 9);
    assert_eq!(step_rank_n(MIN_RANK_N, -1), MIN_RANK_N);
    assert_eq!(step_rank_n(MAX_RANK_N, 1), MAX_RANK_N);
    assert_eq!(step_rank_n(0, 1), MIN_RANK_N);
}

#[test]
fn status_toggle_flips_membership() {
    let statuses = vec!["OK".to_string(), "FAIL".to_string()];
    let mut filter: BTreeSet<String> = statuses.iter().cloned().collect();

    assert!(toggle_status(&mut filter, &statuses, 1));
    assert!(!filter.contains("FAIL"));
    assert!(toggle_status(&mut filter, &statuses, 1));
    assert!(filter.contains("FAIL"));
    // Out-of-range index is a no-op.
    assert!(!toggle_status(&mut filter, &statuses, 9));
    assert_eq!(filter.len(), 2);
}

#[test]
fn bar_heights_preserve_order_under_log_scale() {
    assert_eq!(bar_height(0, true), 0);
    assert_eq!(bar_height(7, false), 7);
    let heights: Vec<u64> = [1u64, 5, 10, 500, 10_000]
        .iter()
        .map(|&c| bar_height(c, true))
        .collect();
    for pair in heights.windows(2) {
        assert!(pair[0] < pair[1], "log heights must stay ordered: {heights:?}");
    }
}

#[test]
fn percentages_handle_empty_totals() {
    assert_eq!(percentage(0, 0), 0.0);
    assert!((percentage(1, 3) - 33.333).abs() < 0.01);
    assert_eq!(percentage(3, 3), 100.0);
}

#[test]
fn selection_helpers_clamp() {
    assert_eq!(clamp_selection(Some(10), 3), Some(2));
    assert_eq!(clamp_selection(None, 3), Some(0));
    assert_eq!(clamp_selection(Some(0), 0), None);

    assert_eq!(move_selection(Some(0), 3, -1), Some(0));
    assert_eq!(move_selection(Some(2), 3, 10), Some(2));
    assert_eq!(move_selection(Some(1), 3, 1), Some(2));
    assert_eq!(move_selection(None, 0, 1), None);
}

#[test]
fn labels_truncate_with_ellipsis() {
    assert_eq!(short_label("alice", 8), "alice");
    assert_eq!(short_label("charlotte", 8), "charlot…");
}

// ============================================================================
// APP KEY HANDLING
// ============================================================================

#[test]
fn q_quits_and_capital_r_reloads() {
    let mut app = sample_app();
    assert_eq!(press(&mut app, KeyCode::Char('q')), Some(TuiOutcome::Quit));

    let mut app = sample_app();
    assert_eq!(press(&mut app, KeyCode::Char('R')), Some(TuiOutcome::Reload));
}

#[test]
fn tab_key_cycles_views() {
    let mut app = sample_app();
    assert_eq!(app.tab(), 0);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.tab(), 1);
    press(&mut app, KeyCode::BackTab);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.tab(), 5);
}

#[test]
fn window_key_recomputes_views() {
    let mut app = sample_app();
    assert_eq!(app.views().record_count, 3);

    // All -> last 30 days: everything is within a month of Jan 2nd.
    press(&mut app, KeyCode::Char('w'));
    assert_eq!(app.params().time_window, TimeWindow::Last30Days);
    assert_eq!(app.views().record_count, 3);

    // -> last 7 days, still all three (reference date is Jan 2nd).
    press(&mut app, KeyCode::Char('w'));
    assert_eq!(app.params().time_window, TimeWindow::Last7Days);
    assert_eq!(app.views().record_count, 3);
}

#[test]
fn rank_and_scale_keys_update_params() {
    let mut app = sample_app();
    press(&mut app, KeyCode::Char('l'));
    assert!(app.params().log_scale);

    press(&mut app, KeyCode::Char('r'));
    assert_eq!(app.params().rank_mode, RankMode::Bottom);

    press(&mut app, KeyCode::Char('+'));
    assert_eq!(app.params().n, 11);
    for _ in 0..10 {
        press(&mut app, KeyCode::Char('-'));
    }
    assert_eq!(app.params().n, MIN_RANK_N);
    assert!(app.error().is_none());
}

#[test]
fn search_keys_enter_edit_mode_on_records_tab() {
    let mut app = sample_app();
    press(&mut app, KeyCode::Char('u'));
    assert_eq!(app.tab(), 5);
    assert_eq!(app.editing(), EditTarget::User);

    // While editing, characters land in the needle, including 'q'.
    press(&mut app, KeyCode::Char('q'));
    press(&mut app, KeyCode::Backspace);
    for c in "alice".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    assert_eq!(app.params().search_user, "alice");
    assert_eq!(app.views().records.rows.len(), 2);
    // Charts are untouched by the needle.
    assert_eq!(app.views().record_count, 3);

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.editing(), EditTarget::None);

    press(&mut app, KeyCode::Char('m'));
    assert_eq!(app.editing(), EditTarget::Member);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.editing(), EditTarget::None);
}

#[test]
fn digit_keys_toggle_statuses() {
    let mut app = sample_app();
    assert_eq!(app.views().records.rows.len(), 3);

    // Statuses in first-encounter order: [1] OK, [2] FAIL.
    press(&mut app, KeyCode::Char('1'));
    assert_eq!(app.views().records.rows.len(), 1);
    assert_eq!(app.views().records.rows[0].status, "FAIL");

    press(&mut app, KeyCode::Char('2'));
    assert!(app.views().records.rows.is_empty());
    // The status chart still shows the full windowed population.
    assert_eq!(app.views().statuses.rows.len(), 2);

    press(&mut app, KeyCode::Char('0'));
    assert_eq!(app.views().records.rows.len(), 3);
}

#[test]
fn arrow_keys_scroll_the_record_table() {
    let mut app = sample_app();
    // Selection only moves on the records tab.
    press(&mut app, KeyCode::Down);
    assert_eq!(app.selected_row(), Some(0));

    press(&mut app, KeyCode::Char('u'));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.tab(), 5);

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    // Three rows: clamped to the last index, then one step back.
    assert_eq!(app.selected_row(), Some(2));
    press(&mut app, KeyCode::Up);
    assert_eq!(app.selected_row(), Some(1));
    press(&mut app, KeyCode::PageDown);
    assert_eq!(app.selected_row(), Some(2));
}
