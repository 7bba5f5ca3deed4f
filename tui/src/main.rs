//! Patient-portal engagement dashboard: interactive Ratatui TUI
//!
//! Layout (overview):
//!   ┌─── header ──────────────────────────────────────────────────────────┐
//!   │  signed-in user, role, dataset origin                               │
//!   ├─── filters ─────────────────────────────────────────────────────────┤
//!   │  [1] Age  [2] Gender  [3] Device                                    │
//!   ├─── KPIs ────────────────────────────────────────────────────────────┤
//!   │  logins │ messages │ no-show │ session minutes                      │
//!   ├─── charts ──────────────────────────────────────────────────────────┤
//!   │  the charts the role may see                                        │
//!   ├─── search / locked ─────────────────────────────────────────────────┤
//!   │  patient search (admin) or the locked-chart notice                  │
//!   ├─────────────────────────────────────────────────────────────────────┤
//!   │  footer (key bindings)                                              │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//! Set ENGAGE_CONFIG to a TOML file to override the defaults.

use std::{
    io,
    path::PathBuf,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph, Sparkline, Wrap},
    Frame, Terminal,
};

use engage_access::{StaticCredentials, TomlAccessPolicy};
use engage_contracts::{
    error::EngageResult,
    filter::FilterField,
    record::PatientRecord,
};
use engage_core::{
    chart::{Chart, ChartSeries},
    dashboard::{Overview, PatientDetail, SatisfactionBand},
    Dashboard, DashboardConfig, LoginOutcome, Screen, ViewOutcome,
};
use engage_dataset::{load_dataset, source_from_config, DatasetOrigin};
use engage_session::FileSessionStore;
use engage_verify::{dataset_schema, DatasetVerifier};

// ── Loading ───────────────────────────────────────────────────────────────────

type Loaded = EngageResult<(Dashboard, DatasetOrigin)>;

fn open_dashboard(config: &DashboardConfig) -> Loaded {
    let source = source_from_config(&config.dataset)?;
    let loaded = load_dataset(
        source.as_deref(),
        &DatasetVerifier::new(),
        &dataset_schema(config.dataset.verify_invariants),
        config.dataset.fallback_count,
    );

    let policy = match &config.access.policy_file {
        Some(path) => TomlAccessPolicy::from_file(path)?,
        None => TomlAccessPolicy::default_policy()?,
    };

    let dashboard = Dashboard::new(
        loaded.records,
        Box::new(StaticCredentials),
        Box::new(policy),
        Box::new(FileSessionStore::new(&config.session.dir)),
    )?;
    Ok((dashboard, loaded.origin))
}

/// Load on a worker thread so the loading screen keeps drawing while a slow
/// URL times out.
fn spawn_loader(config: DashboardConfig) -> Receiver<Loaded> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver only disappears if the UI already quit.
        let _ = tx.send(open_dashboard(&config));
    });
    rx
}

fn read_config() -> EngageResult<DashboardConfig> {
    match std::env::var_os("ENGAGE_CONFIG") {
        Some(path) => DashboardConfig::from_file(&PathBuf::from(path)),
        None => Ok(DashboardConfig::default()),
    }
}

// ── App state ─────────────────────────────────────────────────────────────────

enum Phase {
    Loading { rx: Receiver<Loaded>, started: Instant },
    Ready { dashboard: Dashboard, origin: DatasetOrigin },
    Failed(String),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

#[derive(Default)]
struct SearchPanel {
    term: String,
    editing: bool,
    list: ListState,
}

struct App {
    phase: Phase,

    // Login form.
    username: String,
    password: String,
    focus: LoginField,

    search: SearchPanel,

    // Simulated four-week login series for the open patient.
    trend: [u32; 4],

    // One-line feedback shown above the footer.
    status: Option<String>,
    quit: bool,
}

impl App {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            username: String::new(),
            password: String::new(),
            focus: LoginField::Username,
            search: SearchPanel::default(),
            trend: [0; 4],
            status: None,
            quit: false,
        }
    }

    /// Move from `Loading` to `Ready` or `Failed` once the worker reports.
    fn poll_loader(&mut self) {
        let Phase::Loading { rx, .. } = &self.phase else {
            return;
        };
        let next = match rx.try_recv() {
            Ok(Ok((dashboard, origin))) => Phase::Ready { dashboard, origin },
            Ok(Err(e)) => Phase::Failed(e.to_string()),
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Phase::Failed("dataset loader stopped unexpectedly".to_string()),
        };
        self.phase = next;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        let Phase::Ready { dashboard, .. } = &mut self.phase else {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.quit = true;
            }
            return;
        };

        let screen = match dashboard.screen() {
            Ok(screen) => screen,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };

        match screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Overview(overview) => self.handle_overview_key(key, &overview),
            Screen::Patient(_) => self.handle_patient_key(key),
        }
    }

    fn dashboard_mut(&mut self) -> Option<&mut Dashboard> {
        match &mut self.phase {
            Phase::Ready { dashboard, .. } => Some(dashboard),
            _ => None,
        }
    }

    fn report<T>(&mut self, result: EngageResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.status = Some(e.to_string());
                None
            }
        }
    }

    // ── Login ─────────────────────────────────────────────────────────────────

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            KeyCode::Enter => self.submit_login(),
            KeyCode::Backspace => {
                self.focused_input().pop();
            }
            KeyCode::Char(c) => self.focused_input().push(c),
            _ => {}
        }
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    fn submit_login(&mut self) {
        let (username, password) = (self.username.trim().to_string(), self.password.clone());
        let Some(dashboard) = self.dashboard_mut() else {
            return;
        };
        let outcome = dashboard.login(&username, &password);
        match self.report(outcome) {
            Some(LoginOutcome::SignedIn(session)) => {
                self.status = Some(format!("Welcome, {}.", session.name));
                self.username.clear();
                self.password.clear();
                self.focus = LoginField::Username;
            }
            Some(LoginOutcome::Rejected { reason }) => {
                self.status = Some(reason);
                self.password.clear();
            }
            None => {}
        }
    }

    // ── Overview ──────────────────────────────────────────────────────────────

    fn handle_overview_key(&mut self, key: KeyEvent, overview: &Overview) {
        if self.search.editing {
            self.handle_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit = true,
            KeyCode::Char('1') => self.cycle_filter(FilterField::AgeGroup),
            KeyCode::Char('2') => self.cycle_filter(FilterField::Gender),
            KeyCode::Char('3') => self.cycle_filter(FilterField::DeviceType),
            KeyCode::Char('0') => {
                if let Some(d) = self.dashboard_mut() {
                    d.reset_filters();
                }
                self.status = Some("Filters reset.".to_string());
            }
            KeyCode::Char('/') if overview.patient_search_enabled => {
                self.search.editing = true;
                self.search.list.select(Some(0));
            }
            KeyCode::Char('/') => {
                self.status = Some("Admin access required to view patient details.".to_string());
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter if overview.patient_search_enabled => self.open_selected(),
            KeyCode::Char('l') | KeyCode::Char('L') => {
                if let Some(d) = self.dashboard_mut() {
                    let result = d.logout();
                    if self.report(result).is_some() {
                        self.search = SearchPanel::default();
                        self.status = Some("Signed out.".to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn cycle_filter(&mut self, field: FilterField) {
        let Some(dashboard) = self.dashboard_mut() else {
            return;
        };
        let choices = dashboard.filter_options().choices(field);
        let current = dashboard.filters().value(field);
        let index = choices.iter().position(|c| *c == current).unwrap_or(0);
        let next = choices[(index + 1) % choices.len()];
        let result = dashboard.set_filter(field, next);
        self.report(result);
        self.search.list.select(Some(0));
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.search.editing = false,
            KeyCode::Enter => {
                self.search.editing = false;
                self.open_selected();
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Backspace => {
                self.search.term.pop();
                self.search.list.select(Some(0));
            }
            KeyCode::Char(c) => {
                self.search.term.push(c);
                self.search.list.select(Some(0));
            }
            _ => {}
        }
    }

    fn search_hits(&self) -> Vec<PatientRecord> {
        match &self.phase {
            Phase::Ready { dashboard, .. } => dashboard
                .search_patients(&self.search.term)
                .ok()
                .flatten()
                .map(|hits| hits.into_iter().cloned().collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.search_hits().len();
        if len == 0 {
            self.search.list.select(None);
            return;
        }
        let current = self.search.list.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        self.search.list.select(Some(next));
    }

    fn open_selected(&mut self) {
        let hits = self.search_hits();
        let Some(record) = self.search.list.selected().and_then(|i| hits.get(i)) else {
            return;
        };
        let (id, login_count) = (record.patient_id.clone(), record.login_count);

        let Some(dashboard) = self.dashboard_mut() else {
            return;
        };
        let outcome = dashboard.select_patient(&id);
        match self.report(outcome) {
            Some(ViewOutcome::Opened) => {
                self.trend = engage_dataset::simulate_weekly_logins(login_count, &mut rand::thread_rng());
                self.status = None;
            }
            Some(ViewOutcome::Restricted { reason }) => self.status = Some(reason),
            Some(ViewOutcome::NotFound) => self.status = Some(format!("No patient with id '{id}'.")),
            None => {}
        }
    }

    // ── Patient ───────────────────────────────────────────────────────────────

    fn handle_patient_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit = true,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                if let Some(d) = self.dashboard_mut() {
                    let result = d.back_to_overview();
                    self.report(result);
                }
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                if let Some(d) = self.dashboard_mut() {
                    let result = d.logout();
                    self.report(result);
                }
            }
            _ => {}
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

fn border() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn key_style() -> Style {
    Style::default().fg(Color::Cyan)
}

fn ui(f: &mut Frame, app: &App) {
    match &app.phase {
        Phase::Loading { started, .. } => render_loading(f, *started),
        Phase::Failed(reason) => render_failed(f, reason),
        Phase::Ready { dashboard, origin } => match dashboard.screen() {
            Ok(Screen::Login) => render_login(f, app),
            Ok(Screen::Overview(overview)) => render_overview(f, app, &overview, origin),
            Ok(Screen::Patient(detail)) => render_patient(f, app, &detail),
            Err(e) => render_failed(f, &e.to_string()),
        },
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(area.x + (area.width - w) / 2, area.y + (area.height - h) / 2, w, h)
}

fn render_loading(f: &mut Frame, started: Instant) {
    let frame = (started.elapsed().as_millis() / 150) as usize % SPINNER.len();
    let text = Paragraph::new(format!("{} Loading patient data...", SPINNER[frame]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border()));
    f.render_widget(text, centered(f.area(), 40, 3));
}

fn render_failed(f: &mut Frame, reason: &str) {
    let text = Paragraph::new(vec![
        Line::from(Span::styled("Dashboard unavailable", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(reason.to_string()),
        Line::from(""),
        Line::from(Span::styled("[q] Quit", key_style())),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).border_style(border()));
    f.render_widget(text, centered(f.area(), 70, 9));
}

fn render_login(f: &mut Frame, app: &App) {
    let field = |label: &str, value: String, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::raw(format!("  {:<10}", label)),
            Span::styled(format!(" {:<24}", value), style),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Patient Portal Analytics",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field("Username", app.username.clone(), app.focus == LoginField::Username),
        field("Password", "*".repeat(app.password.chars().count()), app.focus == LoginField::Password),
        Line::from(""),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(status.clone(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(
        "Demo: admin/admin123 or user/user123",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(vec![
        Span::styled("[Tab] ", key_style()),
        Span::raw("Switch  "),
        Span::styled("[Enter] ", key_style()),
        Span::raw("Sign in  "),
        Span::styled("[Esc] ", key_style()),
        Span::raw("Quit"),
    ]));

    let form = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().title(" Sign in ").borders(Borders::ALL).border_style(border()));
    f.render_widget(form, centered(f.area(), 56, 12));
}

fn render_overview(f: &mut Frame, app: &App, o: &Overview, origin: &DatasetOrigin) {
    let bottom = if o.patient_search_enabled { 9 } else { 4 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // header
            Constraint::Length(3),      // filters
            Constraint::Length(4),      // KPIs
            Constraint::Min(10),        // charts
            Constraint::Length(bottom), // search or locked notice
            Constraint::Length(3),      // footer
        ])
        .split(f.area());

    render_header(f, rows[0], o, origin);
    render_filters(f, rows[1], o);
    render_kpis(f, rows[2], o);
    render_charts(f, rows[3], &o.charts);
    if o.patient_search_enabled {
        render_search(f, rows[4], app);
    } else {
        render_locked(f, rows[4], o);
    }
    render_footer(f, rows[5], app, o);
}

fn render_header(f: &mut Frame, area: Rect, o: &Overview, origin: &DatasetOrigin) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Patient Portal Engagement    ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} ({})    ", o.session.name, o.session.role.label())),
        Span::styled(
            format!("{} records, {}", o.total_records, origin),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(border()));
    f.render_widget(header, area);
}

fn render_filters(f: &mut Frame, area: Rect, o: &Overview) {
    let mut spans = Vec::new();
    for (key, field) in [("[1]", FilterField::AgeGroup), ("[2]", FilterField::Gender), ("[3]", FilterField::DeviceType)] {
        let value = o.filters.value(field);
        let style = if value == engage_contracts::filter::ALL {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        };
        spans.push(Span::styled(format!("{} ", key), key_style()));
        spans.push(Span::raw(format!("{}: ", field.label())));
        spans.push(Span::styled(value.to_string(), style));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
        format!(
            "{} active, {} of {} records",
            o.filters.active_count(),
            o.filtered_records,
            o.total_records
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let filters = Paragraph::new(Line::from(spans))
        .block(Block::default().title(" Filters ").borders(Borders::ALL).border_style(border()));
    f.render_widget(filters, area);
}

fn render_kpis(f: &mut Frame, area: Rect, o: &Overview) {
    let kpis = o.kpis.rounded();
    let cells = [
        ("Avg Logins / Week", format!("{:.1}", kpis.avg_logins)),
        ("Avg Secure Messages", format!("{:.1}", kpis.avg_messages)),
        ("Avg No-Show Rate", format!("{:.1}%", kpis.avg_no_show_rate)),
        ("Avg Session Minutes", format!("{:.1}", kpis.avg_session_minutes)),
    ];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, value), column) in cells.into_iter().zip(columns.iter()) {
        let cell = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().title(format!(" {} ", title)).borders(Borders::ALL).border_style(border()));
        f.render_widget(cell, *column);
    }
}

fn render_charts(f: &mut Frame, area: Rect, charts: &[Chart]) {
    if charts.is_empty() {
        return;
    }
    let top = charts.len().min(3);
    let (first, second) = charts.split_at(top);

    let rows = if second.is_empty() {
        vec![area]
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
            .to_vec()
    };

    for (row, group) in rows.iter().zip([first, second]) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, group.len() as u32); group.len()])
            .split(*row);
        for (chart, column) in group.iter().zip(columns.iter()) {
            render_chart(f, *column, chart);
        }
    }
}

fn render_chart(f: &mut Frame, area: Rect, chart: &Chart) {
    let block = Block::default()
        .title(format!(" {} ", chart.title()))
        .borders(Borders::ALL)
        .border_style(border());

    let points = chart.series.points();
    if points.is_empty() {
        let empty = Paragraph::new("No data for the current filters")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    match &chart.series {
        ChartSeries::Weekly(_) => {
            let data: Vec<u64> = points.iter().map(|(_, v)| (v * 10.0).round() as u64).collect();
            let first = points.first().map(|(l, _)| l.as_str()).unwrap_or_default();
            let last = points.last().map(|(l, _)| l.as_str()).unwrap_or_default();
            let sparkline = Sparkline::default()
                .block(block.title_bottom(format!(" {} .. {} ", first, last)))
                .data(&data)
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(sparkline, area);
        }
        ChartSeries::ByAgeGroup(_) | ChartSeries::ByDevice(_) | ChartSeries::Refills(_) => {
            let bars: Vec<Bar> = points
                .iter()
                .map(|(label, value)| {
                    Bar::default()
                        .value((value * 10.0).round() as u64)
                        .text_value(format!("{:.1}", value))
                        .label(Line::from(label.clone()))
                })
                .collect();
            let width = (area.width.saturating_sub(2) / bars.len().max(1) as u16).saturating_sub(1).clamp(3, 14);
            let barchart = BarChart::default()
                .block(block)
                .data(BarGroup::default().bars(&bars))
                .bar_width(width)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
            f.render_widget(barchart, area);
        }
    }
}

fn render_locked(f: &mut Frame, area: Rect, o: &Overview) {
    let text = if o.locked.is_empty() {
        Line::from("")
    } else {
        Line::from(vec![
            Span::styled(format!("{} more charts ", o.locked.len()), Style::default().fg(Color::Yellow)),
            Span::raw("available with admin access."),
        ])
    };
    let locked = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().title(" Restricted ").borders(Borders::ALL).border_style(border()));
    f.render_widget(locked, area);
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let cursor = if app.search.editing { "_" } else { "" };
    let title = format!(" Patient Search: {}{} ", app.search.term, cursor);

    let items: Vec<ListItem> = app
        .search_hits()
        .iter()
        .map(|r| {
            ListItem::new(format!(
                "{:<8} {:<22} {:>3}  {:<6} {:<5} {} logins",
                r.patient_id,
                r.patient_name,
                r.age,
                r.gender.as_str(),
                r.age_group.as_str(),
                r.login_count
            ))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(border()))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("▸ ");

    let mut state = app.search.list.clone();
    f.render_stateful_widget(list, area, &mut state);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App, o: &Overview) {
    let mut spans: Vec<Span> = vec![
        Span::styled(" [1-3] ", key_style()),
        Span::raw("Cycle filter  "),
        Span::styled("[0] ", key_style()),
        Span::raw("Reset  "),
    ];
    if o.patient_search_enabled {
        spans.push(Span::styled("[/] ", key_style()));
        spans.push(Span::raw("Search  "));
        spans.push(Span::styled("[↑↓ Enter] ", key_style()));
        spans.push(Span::raw("Open patient  "));
    }
    spans.push(Span::styled("[l] ", key_style()));
    spans.push(Span::raw("Log out  "));
    spans.push(Span::styled("[q] ", key_style()));
    spans.push(Span::raw("Quit  "));
    if let Some(status) = &app.status {
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    let footer = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(border()));
    f.render_widget(footer, area);
}

fn render_patient(f: &mut Frame, app: &App, d: &PatientDetail) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(12), Constraint::Length(3)])
        .split(f.area());

    let r = &d.record;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{}  ", r.patient_name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{}  {} years, {}", r.patient_id, r.age, r.gender)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(border()));
    f.render_widget(header, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(30), Constraint::Percentage(30)])
        .split(rows[1]);

    let satisfaction_color = match d.satisfaction {
        SatisfactionBand::Good => Color::Green,
        SatisfactionBand::Fair => Color::Yellow,
        SatisfactionBand::Poor => Color::Red,
    };
    let detail = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<20}", label), Style::default().fg(Color::DarkGray)),
            Span::raw(value),
        ])
    };
    let lines = vec![
        detail("Location", format!("{}, {}", r.city, r.state)),
        detail("Insurance", r.insurance_type.to_string()),
        detail("Condition", r.chronic_condition.to_string()),
        detail("Enrolled", r.enrollment_date.to_string()),
        detail("Device", r.device_type.to_string()),
        Line::from(""),
        detail("Engagement", format!("{} ({} logins)", d.engagement_level, r.login_count)),
        detail("Session minutes", format!("{:.1}", r.avg_session_minutes)),
        detail(
            "Appointments",
            format!("{} scheduled, {} missed", r.appointments_scheduled, r.appointments_missed),
        ),
        detail("No-show rate", format!("{:.1}%", d.no_show_rate)),
        Line::from(vec![
            Span::styled(format!("{:<20}", "Satisfaction"), Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:.1} / 5 ({:.0}%)", r.satisfaction_score, d.satisfaction_percent),
                Style::default().fg(satisfaction_color),
            ),
        ]),
    ];
    let info = Paragraph::new(lines)
        .block(Block::default().title(" Patient ").borders(Borders::ALL).border_style(border()));
    f.render_widget(info, columns[0]);

    let trend: Vec<Bar> = app
        .trend
        .iter()
        .enumerate()
        .map(|(i, logins)| {
            Bar::default()
                .value(u64::from(*logins))
                .label(Line::from(format!("Week {}", i + 1)))
        })
        .collect();
    let trend_chart = BarChart::default()
        .block(Block::default().title(" Login Trend ").borders(Borders::ALL).border_style(border()))
        .data(BarGroup::default().bars(&trend))
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan));
    f.render_widget(trend_chart, columns[1]);

    let activity = [
        Bar::default()
            .value(u64::from(r.secure_messages))
            .label(Line::from("Messages")),
        Bar::default()
            .value(u64::from(r.refill_requests))
            .label(Line::from("Refills")),
    ];
    let activity_chart = BarChart::default()
        .block(Block::default().title(" Messages vs Refills ").borders(Borders::ALL).border_style(border()))
        .data(BarGroup::default().bars(&activity))
        .bar_width(9)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Magenta));
    f.render_widget(activity_chart, columns[2]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" [Esc/b] ", key_style()),
        Span::raw("Back to overview  "),
        Span::styled("[l] ", key_style()),
        Span::raw("Log out  "),
        Span::styled("[q] ", key_style()),
        Span::raw("Quit"),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(border()));
    f.render_widget(footer, rows[2]);
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Main event loop ───────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let phase = match read_config() {
        Ok(config) => Phase::Loading {
            rx: spawn_loader(config),
            started: Instant::now(),
        },
        Err(e) => Phase::Failed(e.to_string()),
    };

    let mut terminal = setup_terminal()?;
    let mut app = App::new(phase);

    const TICK_MS: u64 = 150;

    while !app.quit {
        app.poll_loader();
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(TICK_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}
