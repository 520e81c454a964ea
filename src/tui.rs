pub mod logic;

#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph, Row, Table,
    TableState, Tabs,
};

use crate::params::QueryParams;
use crate::store::RecordStore;
use crate::types::{AggregateView, DashboardViews, RankMode};
use crate::utils::{NumberFormatOptions, format_date_for_display, format_number};
use crate::views;

const TAB_TITLES: [&str; 6] = ["Daily", "Hourly", "Users", "Members", "Status", "Records"];
const RECORDS_TAB: usize = 5;

/// What the event loop ended with; `Reload` asks the caller to refetch the
/// dataset and re-enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiOutcome {
    Quit,
    Reload,
}

/// Which text input currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    None,
    User,
    Member,
}

/// The interactive dashboard: one tab per view, keyboard controls mutating
/// the query parameters, one full synchronous recompute per change.
pub struct App {
    store: RecordStore,
    statuses: Vec<String>,
    params: QueryParams,
    views: DashboardViews,
    format: NumberFormatOptions,
    source_label: String,
    tab: usize,
    editing: EditTarget,
    table_state: TableState,
    error: Option<String>,
}

impl App {
    pub fn new(
        store: RecordStore,
        params: QueryParams,
        format: NumberFormatOptions,
        source_label: String,
    ) -> Result<Self> {
        let statuses = store.distinct_statuses();
        let views = views::assemble(&store, &params)?;
        let mut table_state = TableState::default();
        table_state.select(logic::clamp_selection(None, views.records.rows.len()));

        Ok(Self {
            store,
            statuses,
            params,
            views,
            format,
            source_label,
            tab: 0,
            editing: EditTarget::None,
            table_state,
            error: None,
        })
    }

    pub fn tab(&self) -> usize {
        self.tab
    }

    pub fn editing(&self) -> EditTarget {
        self.editing
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.table_state.selected()
    }

    /// Re-derive every view from the current parameters. On a rejected
    /// parameter the previous views stay rendered and the reason is shown.
    fn recompute(&mut self) {
        match views::assemble(&self.store, &self.params) {
            Ok(views) => {
                self.views = views;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.table_state.select(logic::clamp_selection(
            self.table_state.selected(),
            self.views.records.rows.len(),
        ));
    }

    /// Apply one key press. Returns the outcome once the session should end.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<TuiOutcome> {
        if self.editing != EditTarget::None {
            self.handle_edit_key(key.code);
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(TuiOutcome::Quit),
            KeyCode::Char('R') => return Some(TuiOutcome::Reload),
            KeyCode::Tab | KeyCode::Right => self.tab = (self.tab + 1) % TAB_TITLES.len(),
            KeyCode::BackTab | KeyCode::Left => {
                self.tab = (self.tab + TAB_TITLES.len() - 1) % TAB_TITLES.len();
            }
            KeyCode::Char('w') => {
                self.params.time_window = logic::cycle_window(self.params.time_window);
                self.recompute();
            }
            KeyCode::Char('l') => {
                self.params.log_scale = !self.params.log_scale;
                self.recompute();
            }
            KeyCode::Char('r') => {
                self.params.rank_mode = logic::cycle_rank(self.params.rank_mode);
                self.recompute();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.params.n = logic::step_rank_n(self.params.n, 1);
                self.recompute();
            }
            KeyCode::Char('-') => {
                self.params.n = logic::step_rank_n(self.params.n, -1);
                self.recompute();
            }
            KeyCode::Char('u') => {
                self.tab = RECORDS_TAB;
                self.editing = EditTarget::User;
            }
            KeyCode::Char('m') => {
                self.tab = RECORDS_TAB;
                self.editing = EditTarget::Member;
            }
            KeyCode::Char('0') => {
                self.params.status_filter = self.statuses.iter().cloned().collect();
                self.recompute();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if logic::toggle_status(&mut self.params.status_filter, &self.statuses, index) {
                    self.recompute();
                }
            }
            KeyCode::Up => self.move_table_selection(-1),
            KeyCode::Down => self.move_table_selection(1),
            KeyCode::PageUp => self.move_table_selection(-10),
            KeyCode::PageDown => self.move_table_selection(10),
            _ => {}
        }
        None
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let needle = match self.editing {
            EditTarget::User => &mut self.params.search_user,
            EditTarget::Member => &mut self.params.search_member,
            EditTarget::None => return,
        };
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing = EditTarget::None;
                return;
            }
            KeyCode::Backspace => {
                needle.pop();
            }
            KeyCode::Char(c) => needle.push(c),
            _ => return,
        }
        self.recompute();
    }

    fn move_table_selection(&mut self, delta: i64) {
        if self.tab != RECORDS_TAB {
            return;
        }
        self.table_state.select(logic::move_selection(
            self.table_state.selected(),
            self.views.records.rows.len(),
            delta,
        ));
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let [header, tabs, body, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_header(frame, header);
        self.draw_tabs(frame, tabs);
        match self.tab {
            0 => self.draw_daily(frame, body),
            1 => self.draw_hourly(frame, body),
            2 => self.draw_ranked(frame, body, &self.views.users),
            3 => self.draw_ranked(frame, body, &self.views.members),
            4 => self.draw_statuses(frame, body),
            _ => self.draw_records(frame, body),
        }
        self.draw_footer(frame, footer);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "loglens",
                Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" — access log analytics  "),
            Span::styled(&self.source_label, Style::new().fg(Color::DarkGray)),
        ]);
        let caption = Line::from(Span::styled(
            format!(
                "{} records • {} • {} scale • rank: {} {}",
                format_number(self.views.record_count as u64, &self.format),
                self.params.time_window,
                if self.params.log_scale { "log" } else { "linear" },
                self.params.rank_mode,
                match self.params.rank_mode {
                    RankMode::None => String::new(),
                    _ => self.params.n.to_string(),
                }
            ),
            Style::new().fg(Color::Gray),
        ));
        frame.render_widget(Paragraph::new(vec![title, caption]), area);
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = TAB_TITLES.iter().map(|t| Line::from(*t)).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab)
            .highlight_style(Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let text = match self.error.as_deref() {
            Some(error) => Line::from(Span::styled(error, Style::new().fg(Color::Red))),
            None if self.editing != EditTarget::None => Line::from(
                "type to search • Enter/Esc done",
            ),
            None => Line::from(
                "q quit • ←/→ view • w window • l scale • r rank • +/- N • u/m search • 1-9/0 status • R reload",
            ),
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::new().fg(Color::DarkGray)),
            area,
        );
    }

    fn draw_daily(&self, frame: &mut Frame, area: Rect) {
        let view = &self.views.daily;
        let block = Block::bordered().title(view.title.clone());
        if view.rows.is_empty() {
            frame.render_widget(
                Paragraph::new("no records in this window").block(block),
                area,
            );
            return;
        }

        let points: Vec<(f64, f64)> = view
            .rows
            .iter()
            .enumerate()
            .map(|(i, &(_, count))| (i as f64, count as f64))
            .collect();
        let max_count = view.rows.iter().map(|&(_, c)| c).max().unwrap_or(1).max(1);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::new().fg(Color::Cyan))
            .data(&points);

        let first = view.rows.first().map(|&(d, _)| d);
        let last = view.rows.last().map(|&(d, _)| d);
        let x_labels: Vec<Line> = [first, last]
            .into_iter()
            .flatten()
            .map(|d| Line::from(format_date_for_display(d)))
            .collect();
        let y_labels: Vec<Line> = [0, max_count / 2, max_count]
            .into_iter()
            .map(|v| Line::from(format_number(v, &self.format)))
            .collect();

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([0.0, (view.rows.len().saturating_sub(1)).max(1) as f64])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, max_count as f64])
                    .labels(y_labels),
            );
        frame.render_widget(chart, area);
    }

    fn draw_hourly(&self, frame: &mut Frame, area: Rect) {
        let view = &self.views.hourly;
        let bars: Vec<Bar> = view
            .rows
            .iter()
            .map(|&(hour, count)| {
                Bar::default()
                    .value(count)
                    .label(Line::from(format!("{hour:02}")))
                    .text_value(format_number(count, &self.format))
            })
            .collect();

        let bar_width = (area.width.saturating_sub(2) / 24).saturating_sub(1).max(2);
        let chart = BarChart::default()
            .block(Block::bordered().title(view.title.clone()))
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::new().fg(Color::Green))
            .value_style(Style::new().fg(Color::White));
        frame.render_widget(chart, area);
    }

    fn draw_ranked(&self, frame: &mut Frame, area: Rect, view: &AggregateView<String>) {
        let block = Block::bordered().title(view.title.clone());
        if view.rows.is_empty() {
            frame.render_widget(
                Paragraph::new("no records in this window").block(block),
                area,
            );
            return;
        }

        let bars: Vec<Bar> = view
            .rows
            .iter()
            .map(|(name, count)| {
                Bar::default()
                    .value(logic::bar_height(*count, self.params.log_scale))
                    .label(Line::from(logic::short_label(name, 8)))
                    .text_value(format_number(*count, &self.format))
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(9)
            .bar_gap(1)
            .bar_style(Style::new().fg(Color::Magenta))
            .value_style(Style::new().fg(Color::White));
        frame.render_widget(chart, area);
    }

    fn draw_statuses(&self, frame: &mut Frame, area: Rect) {
        let view = &self.views.statuses;
        let total: u64 = view.rows.iter().map(|&(_, c)| c).sum();

        let rows: Vec<Row> = view
            .rows
            .iter()
            .map(|(status, count)| {
                Row::new(vec![
                    status.clone(),
                    format_number(*count, &self.format),
                    format!("{:.1}%", logic::percentage(*count, total)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(12),
                Constraint::Length(12),
                Constraint::Length(8),
            ],
        )
        .header(
            Row::new(vec!["Status", "Count", "Share"])
                .style(Style::new().add_modifier(Modifier::BOLD)),
        )
        .block(Block::bordered().title(view.title.clone()));
        frame.render_widget(table, area);
    }

    fn draw_records(&mut self, frame: &mut Frame, area: Rect) {
        let [controls, table_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);

        let edit_marker = |target| if self.editing == target { "▏" } else { "" };
        let status_line: String = self
            .statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mark = if self.params.status_filter.contains(status) {
                    "✓"
                } else {
                    "✗"
                };
                format!("[{}]{status}{mark}", i + 1)
            })
            .collect::<Vec<_>>()
            .join(" ");

        let controls_text = vec![Line::from(vec![
            Span::raw(format!(
                "user: {}{}  member: {}{}  ",
                self.params.search_user,
                edit_marker(EditTarget::User),
                self.params.search_member,
                edit_marker(EditTarget::Member),
            )),
            Span::styled(status_line, Style::new().fg(Color::Gray)),
        ])];
        frame.render_widget(
            Paragraph::new(controls_text).block(Block::bordered().title("Filters")),
            controls,
        );

        let view = &self.views.records;
        let rows: Vec<Row> = view
            .rows
            .iter()
            .map(|record| {
                Row::new(vec![
                    record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    record.user.clone(),
                    record.member.clone(),
                    record.status.clone(),
                ])
            })
            .collect();

        let title = format!("{} ({} rows)", view.title, view.rows.len());
        let table = Table::new(
            rows,
            [
                Constraint::Length(19),
                Constraint::Min(10),
                Constraint::Min(10),
                Constraint::Length(10),
            ],
        )
        .header(
            Row::new(vec!["Time", "User", "Member", "Status"])
                .style(Style::new().add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(Style::new().bg(Color::DarkGray))
        .block(Block::bordered().title(title));
        frame.render_stateful_widget(table, table_area, &mut self.table_state);
    }
}

/// Enter the terminal, run the event loop, restore on the way out.
pub fn run_tui(
    store: RecordStore,
    params: QueryParams,
    format: NumberFormatOptions,
    source_label: String,
) -> Result<TuiOutcome> {
    let mut app = App::new(store, params, format, source_label)?;
    let mut terminal = ratatui::init();
    let result = run_event_loop(&mut terminal, &mut app);
    ratatui::restore();
    result
}

fn run_event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<TuiOutcome> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(outcome) = app.handle_key(key)
        {
            return Ok(outcome);
        }
    }
}
