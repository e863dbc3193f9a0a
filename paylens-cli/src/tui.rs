use anyhow::{bail, Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use paylens_client::AnalysisClient;
use paylens_core::viewmodel::{format_inr, ResultsView};
use paylens_core::{
    directory, register_chart_kinds, ChartKind, Completion, FavoritesStore, Navigator, NetStyle,
    Session, SessionState, View, NAV_ITEMS,
};
use paylens_ingest::{normalize_dropped_path, InputSource, UploadCandidate};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    symbols,
    widgets::{
        Axis, BarChart, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::render::{chart_shares, share_bar, signed_inr};
use crate::state;
use crate::worker::{self, AnalysisEvent, AnalyzeRequest, WorkerCommand};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::LightRed,
];

#[derive(Debug, Clone)]
pub struct TuiSettings {
    pub endpoint: String,
    pub favorites_path: PathBuf,
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
enum Notice {
    /// Gate rejections and local problems; shown under the input
    Inline(String),
    /// Analysis failures; any key dismisses
    Blocking(String),
}

#[derive(Debug)]
enum Action {
    None,
    Quit,
    Send(WorkerCommand),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Upload,
    Analyzing,
    Results,
}

struct App {
    nav: Navigator,
    session: Session,
    results: Option<ResultsView>,
    favorites: FavoritesStore,
    settings: TuiSettings,
    path_input: String,
    query: String,
    cursor: usize,
    notice: Option<Notice>,
    chart_kind: ChartKind,
    ticks: usize,
}

impl App {
    fn new(settings: TuiSettings, favorites: FavoritesStore) -> Self {
        Self {
            nav: Navigator::new(),
            session: Session::new(),
            results: None,
            favorites,
            settings,
            path_input: String::new(),
            query: String::new(),
            cursor: 0,
            notice: None,
            chart_kind: ChartKind::Pie,
            ticks: 0,
        }
    }

    fn phase(&self) -> Phase {
        match self.session.state() {
            SessionState::Upload => Phase::Upload,
            SessionState::Analyzing => Phase::Analyzing,
            SessionState::Results(_) => Phase::Results,
        }
    }

    fn go(&mut self, view: View) {
        self.leave_view();
        self.nav.set_current_view(view);
    }

    /// Inline notices belong to the view that raised them.
    fn leave_view(&mut self) {
        self.cursor = 0;
        if !matches!(self.notice, Some(Notice::Blocking(_))) {
            self.notice = None;
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        if matches!(self.notice, Some(Notice::Blocking(_))) {
            self.notice = None;
            return Action::None;
        }
        if key.code == KeyCode::Tab {
            let leaving_analysis =
                self.nav.current() == View::StatementAnalysis && self.session.cancel();
            self.leave_view();
            self.nav.next_tab();
            if leaving_analysis {
                return Action::Send(WorkerCommand::Cancel);
            }
            return Action::None;
        }

        match self.nav.current() {
            View::Home => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
                KeyCode::Enter | KeyCode::Char('a') => self.go(View::StatementAnalysis),
                _ => {}
            },
            View::Search => match key.code {
                KeyCode::Esc => self.go(View::Home),
                KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
                KeyCode::Down => self.cursor = (self.cursor + 1).min(self.search_results().len().saturating_sub(1)),
                KeyCode::Enter => {
                    if let Some(name) = self.search_results().get(self.cursor).map(|s| s.name) {
                        self.toggle_favorite(name);
                    }
                }
                KeyCode::Backspace => {
                    self.query.pop();
                    self.cursor = 0;
                }
                KeyCode::Char(c) => {
                    self.query.push(c);
                    self.cursor = 0;
                }
                _ => {}
            },
            View::Favorites => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => self.go(View::Home),
                KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
                KeyCode::Down => self.cursor = (self.cursor + 1).min(self.favorites.len().saturating_sub(1)),
                KeyCode::Enter | KeyCode::Delete | KeyCode::Char('d') => {
                    let selected = self.favorites.iter().nth(self.cursor).map(str::to_string);
                    if let Some(name) = selected {
                        self.toggle_favorite(&name);
                        self.cursor = self.cursor.min(self.favorites.len().saturating_sub(1));
                    }
                }
                _ => {}
            },
            View::Settings => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    self.go(View::Home);
                }
            }
            View::StatementAnalysis => return self.on_analysis_key(key),
        }
        Action::None
    }

    fn on_analysis_key(&mut self, key: KeyEvent) -> Action {
        match (self.phase(), key.code) {
            (Phase::Upload, KeyCode::Enter) => {
                let raw = self.path_input.trim().to_string();
                self.submit(InputSource::FilePicker, &raw)
            }
            (Phase::Upload, KeyCode::Esc) => {
                self.go(View::Home);
                Action::None
            }
            (Phase::Upload, KeyCode::Backspace) => {
                self.path_input.pop();
                Action::None
            }
            (Phase::Upload, KeyCode::Char(c)) => {
                self.path_input.push(c);
                Action::None
            }
            (Phase::Analyzing, KeyCode::Esc) => {
                if self.session.cancel() {
                    self.notice = Some(Notice::Inline("Analysis cancelled".to_string()));
                    return Action::Send(WorkerCommand::Cancel);
                }
                Action::None
            }
            (Phase::Results, KeyCode::Char('c')) => {
                self.chart_kind = self.chart_kind.toggled();
                Action::None
            }
            (Phase::Results, KeyCode::Char('n')) => {
                self.session.reset();
                self.results = None;
                self.path_input.clear();
                Action::None
            }
            (Phase::Results, KeyCode::Esc) => {
                self.go(View::Home);
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Terminals report a file dropped on the window as a bracketed paste.
    fn on_paste(&mut self, text: &str) -> Action {
        match self.nav.current() {
            View::Search => {
                self.query.push_str(text.trim());
                self.cursor = 0;
                Action::None
            }
            View::Home | View::StatementAnalysis if self.phase() == Phase::Upload => {
                self.go(View::StatementAnalysis);
                self.submit(InputSource::DragDrop, text)
            }
            _ => Action::None,
        }
    }

    fn submit(&mut self, source: InputSource, raw: &str) -> Action {
        let candidate = if raw.trim().is_empty() {
            None
        } else {
            let path = match source {
                InputSource::DragDrop => normalize_dropped_path(raw),
                InputSource::FilePicker => PathBuf::from(raw.trim()),
            };
            match UploadCandidate::from_path(&path) {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::warn!(error = %e, "could not load upload");
                    self.notice = Some(Notice::Inline(format!("Could not open file: {e}")));
                    return Action::None;
                }
            }
        };

        match self.session.begin(source, candidate) {
            Ok(ticket) => {
                self.notice = None;
                Action::Send(WorkerCommand::Analyze(AnalyzeRequest {
                    request_id: ticket.request_id,
                    candidate: ticket.candidate,
                }))
            }
            Err(e) => {
                self.notice = Some(Notice::Inline(e.user_message()));
                Action::None
            }
        }
    }

    fn apply_event(&mut self, event: AnalysisEvent) {
        match event {
            AnalysisEvent::Started { request_id } => {
                tracing::debug!(request_id, "analysis started");
            }
            AnalysisEvent::Finished { request_id, outcome } => {
                match self.session.complete(request_id, outcome) {
                    Completion::Applied => {
                        self.results = self.session.results().map(ResultsView::build);
                        self.chart_kind = ChartKind::Pie;
                        self.notice = None;
                    }
                    Completion::Failed(e) => {
                        self.notice = Some(Notice::Blocking(e.user_message().to_string()));
                    }
                    Completion::Stale => {}
                }
            }
        }
    }

    fn search_results(&self) -> Vec<&'static directory::StatementSource> {
        directory::search(&self.query)
    }

    fn toggle_favorite(&mut self, name: &str) {
        let now = self.favorites.toggle(name);
        tracing::info!(source = name, favorite = now, "toggled favorite");
        if let Err(e) = state::write_favorites(&self.settings.favorites_path, &self.favorites) {
            tracing::warn!(error = %e, "saving favorites failed");
            self.notice = Some(Notice::Inline(format!("Could not save favorites: {e}")));
        }
    }
}

pub async fn run_tui(client: AnalysisClient, settings: TuiSettings) -> Result<()> {
    register_chart_kinds();

    let favorites = state::read_favorites(&settings.favorites_path)?;
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (ev_tx, ev_rx) = std::sync::mpsc::channel();
    let worker = tokio::spawn(worker::run_worker(client, cmd_rx, ev_tx));

    let app = App::new(settings, favorites);
    let res = tokio::task::spawn_blocking(move || run_terminal(app, cmd_tx, ev_rx))
        .await
        .context("ui thread panicked")?;

    worker.abort();
    res
}

fn run_terminal(
    mut app: App,
    cmd_tx: mpsc::UnboundedSender<WorkerCommand>,
    ev_rx: std::sync::mpsc::Receiver<AnalysisEvent>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = ui_loop(&mut terminal, &mut app, &cmd_tx, &ev_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;

    res
}

fn ui_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    cmd_tx: &mpsc::UnboundedSender<WorkerCommand>,
    ev_rx: &std::sync::mpsc::Receiver<AnalysisEvent>,
) -> Result<()> {
    loop {
        while let Ok(ev) = ev_rx.try_recv() {
            app.apply_event(ev);
        }

        terminal.draw(|f| draw(f, app))?;
        app.ticks = app.ticks.wrapping_add(1);

        if event::poll(std::time::Duration::from_millis(80))? {
            let action = match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Paste(text) => app.on_paste(&text),
                _ => Action::None,
            };
            match action {
                Action::Quit => break,
                Action::Send(cmd) => {
                    if cmd_tx.send(cmd).is_err() {
                        bail!("analysis worker stopped");
                    }
                }
                Action::None => {}
            }
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(3)])
        .split(f.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "PayLens",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", app.nav.current().title()), Style::default().fg(Color::Cyan)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    match app.nav.current() {
        View::Home => draw_home(f, chunks[1], app),
        View::Search => draw_search(f, chunks[1], app),
        View::Favorites => draw_favorites(f, chunks[1], app),
        View::Settings => draw_settings(f, chunks[1], app),
        View::StatementAnalysis => draw_analysis(f, chunks[1], app),
    }

    let tabs = Tabs::new(NAV_ITEMS.iter().map(|v| v.title()).collect::<Vec<_>>())
        .select(app.nav.current().nav_index().unwrap_or(0))
        .highlight_style(match app.nav.current().nav_index() {
            Some(_) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            None => Style::default(),
        })
        .block(Block::default().borders(Borders::ALL).title("Tab: switch · Ctrl-C: quit"));
    f.render_widget(tabs, chunks[2]);

    if let Some(Notice::Blocking(msg)) = &app.notice {
        let area = centered(f.area(), 60, 7);
        f.render_widget(Clear, area);
        let popup = Paragraph::new(Text::from(vec![
            Line::raw(msg.as_str()),
            Line::raw(""),
            Line::styled("press any key", Style::default().fg(Color::Gray)),
        ]))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Analysis failed")
                .border_style(Style::default().fg(Color::Red)),
        );
        f.render_widget(popup, area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn draw_home(f: &mut Frame, area: Rect, app: &App) {
    let supported: Vec<&str> = directory::SOURCES
        .iter()
        .filter(|s| s.analysis_supported)
        .map(|s| s.name)
        .collect();

    let text = Text::from(vec![
        Line::styled("Analyze your UPI statements", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::raw(format!("Supported statements: {}", supported.join(", "))),
        Line::raw(format!("Favorites: {}", app.favorites.len())),
        Line::raw(""),
        Line::styled("Enter: analyze a statement · drop a PDF on the window · q: quit", Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_search(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    f.render_widget(
        Paragraph::new(app.query.as_str()).block(Block::default().borders(Borders::ALL).title("search apps and banks")),
        chunks[0],
    );

    let items: Vec<ListItem> = app
        .search_results()
        .iter()
        .map(|s| {
            let star = if app.favorites.contains(s.name) { "★ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(star, Style::default().fg(Color::Yellow)),
                Span::raw(s.name),
                Span::styled(format!("  {}", s.description), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Enter: toggle favorite"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut ls = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(list, chunks[1], &mut ls);
}

fn draw_favorites(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("d: remove");
    if app.favorites.is_empty() {
        f.render_widget(
            Paragraph::new("No favorites yet. Add some from Search.").block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .favorites
        .iter()
        .map(|name| {
            let desc = directory::find(name).map(|s| s.description).unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled("★ ", Style::default().fg(Color::Yellow)),
                Span::raw(name.to_string()),
                Span::styled(format!("  {desc}"), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut ls = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(list, area, &mut ls);
}

fn draw_settings(f: &mut Frame, area: Rect, app: &App) {
    let log = app
        .settings
        .log_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    let text = Text::from(vec![
        Line::raw(format!("Analysis endpoint: {}", app.settings.endpoint)),
        Line::raw(format!("Favorites file:    {}", app.settings.favorites_path.display())),
        Line::raw(format!("Log file:          {log}")),
        Line::raw(format!("Version:           {}", crate::VERSION)),
    ]);
    f.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL)), area);
}

fn draw_analysis(f: &mut Frame, area: Rect, app: &App) {
    match (app.phase(), &app.results) {
        (Phase::Upload, _) => draw_upload(f, area, app),
        (Phase::Analyzing, _) => draw_analyzing(f, area, app),
        (Phase::Results, Some(view)) => draw_results(f, area, app, view),
        (Phase::Results, None) => draw_upload(f, area, app),
    }
}

fn draw_upload(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let intro = Paragraph::new(Text::from(vec![
        Line::raw("Upload your PhonePe statement PDF."),
        Line::styled(
            "Type a path and press Enter, or drop the file on this window. Esc: back",
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Statement Analysis"));
    f.render_widget(intro, chunks[0]);

    f.render_widget(
        Paragraph::new(app.path_input.as_str()).block(Block::default().borders(Borders::ALL).title("pdf path")),
        chunks[1],
    );

    if let Some(Notice::Inline(msg)) = &app.notice {
        f.render_widget(
            Paragraph::new(msg.as_str()).style(Style::default().fg(Color::Red)),
            chunks[2],
        );
    }
}

fn draw_analyzing(f: &mut Frame, area: Rect, app: &App) {
    let frame = SPINNER[app.ticks % SPINNER.len()];
    let file = app.session.selected_file().unwrap_or("statement");
    let text = Text::from(vec![
        Line::raw(""),
        Line::styled(
            format!("{frame} Analyzing {file}..."),
            Style::default().fg(Color::Cyan),
        ),
        Line::styled("Esc: cancel", Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn net_color(style: NetStyle) -> Color {
    match style {
        NetStyle::Positive => Color::Green,
        NetStyle::Negative => Color::Red,
    }
}

fn draw_results(f: &mut Frame, area: Rect, app: &App, view: &ResultsView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8), Constraint::Length(9)])
        .split(area);

    let s = &view.summary;
    let summary = Paragraph::new(Text::from(vec![
        Line::raw(format!(
            "Received {}   Spent {}   Pages {}",
            format_inr(s.total_received),
            format_inr(s.total_spent),
            s.page_count
        )),
        Line::from(vec![
            Span::raw(format!(
                "{} transactions ({} credits, {} debits)   Net ",
                s.total_transactions, s.credit_count, s.debit_count
            )),
            Span::styled(
                signed_inr(s.net, s.net_style),
                Style::default().fg(net_color(s.net_style)).add_modifier(Modifier::BOLD),
            ),
        ]),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(app.session.selected_file().unwrap_or("Summary").to_string()),
    );
    f.render_widget(summary, rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    draw_category_chart(f, middle[0], app, view);
    draw_monthly(f, middle[1], view);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);
    draw_categories(f, bottom[0], view);
    draw_recent(f, bottom[1], view);
}

fn hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn draw_category_chart(f: &mut Frame, area: Rect, app: &App, view: &ResultsView) {
    let title = match app.chart_kind {
        ChartKind::Bar => "Spending by category (bar) · c: pie",
        _ => "Spending by category (pie) · c: bar",
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if !register_chart_kinds().supports(app.chart_kind) {
        f.render_widget(Paragraph::new("Chart unavailable").block(block), area);
        return;
    }

    match (app.chart_kind, &view.chart) {
        (ChartKind::Bar, _) => {
            if view.categories.is_empty() {
                f.render_widget(Paragraph::new("No category data").block(block), area);
                return;
            }
            let data: Vec<(&str, u64)> = view
                .categories
                .iter()
                .map(|row| (row.category.as_str(), row.amount.round() as u64))
                .collect();
            let bars = BarChart::default()
                .block(block)
                .data(data.as_slice())
                .bar_width(9)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
            f.render_widget(bars, area);
        }
        (_, None) => f.render_widget(Paragraph::new("No category data").block(block), area),
        (_, Some(chart)) => {
            let shares = chart_shares(chart);
            let width = area.width.saturating_sub(32).max(4) as usize;
            let max = shares.iter().map(|(_, p)| *p).fold(0.0, f64::max);
            let lines: Vec<Line> = shares
                .iter()
                .zip(&chart.slices)
                .enumerate()
                .map(|(i, ((label, pct), slice))| {
                    let color = slice
                        .color
                        .as_deref()
                        .and_then(hex_color)
                        .unwrap_or(PALETTE[i % PALETTE.len()]);
                    Line::from(vec![
                        Span::styled("● ", Style::default().fg(color)),
                        Span::raw(format!("{:<18} {:>5.1}% ", label, pct)),
                        Span::styled(share_bar(*pct, max, width), Style::default().fg(color)),
                    ])
                })
                .collect();
            f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
        }
    }
}

fn draw_monthly(f: &mut Frame, area: Rect, view: &ResultsView) {
    let block = Block::default().borders(Borders::ALL).title("Monthly trend");

    if view.monthly.is_empty() {
        f.render_widget(Paragraph::new("No monthly data").block(block), area);
        return;
    }
    if !register_chart_kinds().supports(ChartKind::Line) {
        f.render_widget(Paragraph::new("Chart unavailable").block(block), area);
        return;
    }

    let points: Vec<(f64, f64)> = view
        .monthly
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.net))
        .collect();

    let lo = points.iter().map(|(_, y)| *y).fold(0.0, f64::min);
    let mut hi = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    if hi <= lo {
        hi = lo + 1.0;
    }
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;

    let labels = view.monthly.labels();
    let first = labels.first().copied().unwrap_or_default().to_string();
    let last = labels.last().copied().unwrap_or_default().to_string();

    let dataset = Dataset::default()
        .name("net")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([lo, hi])
                .labels(vec![Span::raw(format_inr(lo)), Span::raw(format_inr(hi))]),
        );
    f.render_widget(chart, area);
}

fn draw_categories(f: &mut Frame, area: Rect, view: &ResultsView) {
    let rows: Vec<Row> = view
        .categories
        .iter()
        .map(|c| {
            Row::new(vec![
                c.category.clone(),
                format_inr(c.amount),
                format!("{:.1}%", c.percentage),
                c.count.to_string(),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Length(4),
        ],
    )
    .header(Row::new(vec!["Category", "Amount", "Share", "Txns"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(Block::default().borders(Borders::ALL).title("Categories"));
    f.render_widget(table, area);
}

fn draw_recent(f: &mut Frame, area: Rect, view: &ResultsView) {
    let rows: Vec<Row> = view
        .recent
        .iter()
        .map(|t| {
            Row::new(vec![
                Span::raw(t.date.clone()),
                Span::raw(t.description.clone()),
                Span::raw(t.category.clone()),
                Span::styled(signed_inr(t.amount, t.style), Style::default().fg(net_color(t.style))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(16),
            Constraint::Length(14),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("Recent transactions"));
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylens_core::error::NO_TRANSACTIONS_MESSAGE;
    use paylens_core::{AnalysisError, AnalysisResult, CategoryStat, Summary, Transaction};
    use ratatui::backend::TestBackend;
    use std::path::Path;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("paylens-tui-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let p = dir.join(name);
        std::fs::write(&p, bytes).unwrap();
        p
    }

    fn app(name: &str) -> App {
        let dir = scratch_dir(name);
        App::new(
            TuiSettings {
                endpoint: "http://127.0.0.1:3000/api/analyze-statement".into(),
                favorites_path: dir.join("favorites.json"),
                log_path: None,
            },
            FavoritesStore::new(),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            transactions: vec![
                Transaction::new("2024-01-15", -200.0, "Paid to AMAZON", "Shopping"),
                Transaction::new("2024-02-10", 500.0, "Received from RAHUL", "Transfer"),
            ],
            summary: Summary {
                total_received: 500.0,
                total_spent: -200.0,
                balance: 300.0,
                credit_count: 1,
                debit_count: 1,
                total_transactions: 2,
            },
            category_breakdown: [(
                "Shopping".to_string(),
                CategoryStat {
                    amount: 200.0,
                    percentage: 100.0,
                    count: 1,
                },
            )]
            .into_iter()
            .collect(),
            page_count: 1,
            chart_data: Some(serde_json::json!({
                "type": "pie",
                "data": {"labels": ["Shopping"], "datasets": [{"data": [100.0], "backgroundColor": ["#4ECDC4"]}]}
            })),
            ..Default::default()
        }
    }

    /// Drop a real PDF on the home screen and return the request id sent.
    fn drop_pdf(app: &mut App, name: &str) -> u64 {
        let pdf = write_file(&scratch_dir(name), "statement.pdf", b"%PDF-1.4");
        match app.on_paste(&format!("'{}'", pdf.display())) {
            Action::Send(WorkerCommand::Analyze(req)) => req.request_id,
            other => panic!("expected analyze request, got {other:?}"),
        }
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 36)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_enter_on_home_opens_upload() {
        let mut app = app("home");
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.nav.current(), View::StatementAnalysis);
        assert_eq!(app.phase(), Phase::Upload);
        render(&app);
    }

    #[test]
    fn test_typed_non_pdf_is_rejected_inline() {
        let mut app = app("nonpdf");
        let txt = write_file(&scratch_dir("nonpdf"), "notes.txt", b"hello");
        app.on_key(key(KeyCode::Enter));
        type_str(&mut app, &txt.display().to_string());

        assert!(matches!(app.on_key(key(KeyCode::Enter)), Action::None));
        assert_eq!(app.notice, Some(Notice::Inline("Please select a valid PDF file".into())));
        assert_eq!(app.phase(), Phase::Upload);
    }

    #[test]
    fn test_empty_submit_is_no_file() {
        let mut app = app("empty");
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.notice, Some(Notice::Inline("Please select a valid PDF file".into())));
    }

    #[test]
    fn test_dropped_non_pdf_uses_drop_wording() {
        let mut app = app("dropcsv");
        let csv = write_file(&scratch_dir("dropcsv"), "export.csv", b"a,b");
        app.on_paste(&format!("\"{}\"", csv.display()));
        assert_eq!(app.notice, Some(Notice::Inline("Please drop a valid PDF file".into())));
        assert_eq!(app.nav.current(), View::StatementAnalysis);
    }

    #[test]
    fn test_drop_pdf_then_results() {
        let mut app = app("results");
        let id = drop_pdf(&mut app, "results");
        assert_eq!(app.phase(), Phase::Analyzing);
        render(&app);

        app.apply_event(AnalysisEvent::Finished {
            request_id: id,
            outcome: Ok(sample_result()),
        });
        assert_eq!(app.phase(), Phase::Results);
        let view = app.results.as_ref().unwrap();
        assert_eq!(view.summary.net, 300.0);
        assert_eq!(view.categories.len(), 1);
        let screen = render(&app);
        assert!(screen.contains("Categories"));
        assert!(screen.contains("Shopping"));
        assert!(screen.contains("₹200"));
        assert!(screen.contains("Monthly trend"));
        assert!(screen.contains("Jan 2024"));
        assert!(!screen.contains("No monthly data"));

        app.on_key(key(KeyCode::Char('c')));
        assert_eq!(app.chart_kind, ChartKind::Bar);
        let screen = render(&app);
        assert!(screen.contains("(bar)"));
        assert!(!screen.contains("No category data"));

        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.phase(), Phase::Upload);
        assert!(app.results.is_none());
    }

    #[test]
    fn test_failure_shows_blocking_notice() {
        let mut app = app("failure");
        let id = drop_pdf(&mut app, "failure");
        app.apply_event(AnalysisEvent::Finished {
            request_id: id,
            outcome: Err(AnalysisError::Backend {
                status: Some(500),
                message: "No transactions found".into(),
            }),
        });

        assert_eq!(app.phase(), Phase::Upload);
        assert_eq!(app.notice, Some(Notice::Blocking(NO_TRANSACTIONS_MESSAGE.into())));
        render(&app);

        app.on_key(key(KeyCode::Char('x')));
        assert!(app.notice.is_none());
        assert!(app.path_input.is_empty());
    }

    #[test]
    fn test_cancel_ignores_late_completion() {
        let mut app = app("cancel");
        let id = drop_pdf(&mut app, "cancel");

        assert!(matches!(app.on_key(key(KeyCode::Esc)), Action::Send(WorkerCommand::Cancel)));
        assert_eq!(app.phase(), Phase::Upload);

        app.apply_event(AnalysisEvent::Finished {
            request_id: id,
            outcome: Ok(sample_result()),
        });
        assert_eq!(app.phase(), Phase::Upload);
        assert!(app.results.is_none());
    }

    #[test]
    fn test_leaving_analysis_cancels_request() {
        let mut app = app("leave");
        drop_pdf(&mut app, "leave");

        assert!(matches!(app.on_key(key(KeyCode::Tab)), Action::Send(WorkerCommand::Cancel)));
        assert_eq!(app.nav.current(), View::Home);
        assert_eq!(app.phase(), Phase::Upload);
    }

    #[test]
    fn test_tab_clears_inline_notice() {
        let mut app = app("tabnotice");
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Enter));
        assert!(matches!(app.notice, Some(Notice::Inline(_))));

        assert!(matches!(app.on_key(key(KeyCode::Tab)), Action::None));
        assert_ne!(app.nav.current(), View::StatementAnalysis);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_search_toggles_and_persists_favorite() {
        let mut app = app("search");
        let _ = std::fs::remove_file(&app.settings.favorites_path);
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.nav.current(), View::Search);

        type_str(&mut app, "hdfc");
        app.on_key(key(KeyCode::Enter));
        assert!(app.favorites.contains("HDFC Bank"));
        render(&app);

        let saved = state::read_favorites(&app.settings.favorites_path).unwrap();
        assert!(saved.contains("HDFC Bank"));

        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.nav.current(), View::Favorites);
        render(&app);
        app.on_key(key(KeyCode::Char('d')));
        assert!(app.favorites.is_empty());
    }

    #[test]
    fn test_settings_and_quit() {
        let mut app = app("settings");
        app.nav.set_current_view(View::Settings);
        render(&app);
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.nav.current(), View::Home);
        assert!(matches!(app.on_key(key(KeyCode::Char('q'))), Action::Quit));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#FF6384"), Some(Color::Rgb(0xFF, 0x63, 0x84)));
        assert_eq!(hex_color("red"), None);
    }
}
