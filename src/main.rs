use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use reqwest::Url;
use tracing::{info, warn};

use streamboard_terminal::config::AppConfig;
use streamboard_terminal::countdown::{
    Clock, CountdownHandle, SystemClock, TICK_CADENCE, start_countdown,
};
use streamboard_terminal::feed_fetch::FeedSource;
use streamboard_terminal::http_client::init_http_client;
use streamboard_terminal::live::LiveState;
use streamboard_terminal::logging;
use streamboard_terminal::page::{NO_CATEGORIES_MESSAGE, NO_STREAMS_MESSAGE};
use streamboard_terminal::provider::spawn_provider;
use streamboard_terminal::state::{
    AppState, CountdownView, Delta, FeedStatus, PresenceState, ProviderCommand, Screen,
    apply_delta,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    delta_tx: mpsc::Sender<Delta>,
    clock: Arc<dyn Clock>,
    countdown: Option<CountdownHandle>,
    refresh_every: Duration,
    last_refresh: Instant,
}

impl App {
    fn new(
        state: AppState,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
        delta_tx: mpsc::Sender<Delta>,
        refresh_every: Duration,
    ) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
            delta_tx,
            clock: Arc::new(SystemClock),
            countdown: None,
            refresh_every,
            last_refresh: Instant::now(),
        }
    }

    fn now(&self) -> i64 {
        self.clock.now_secs()
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('d') | KeyCode::Enter => {
                if self.state.screen == Screen::Listing {
                    let now = self.now();
                    self.state.open_selected(now);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.back_to_listing(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.send_command(ProviderCommand::ReloadFeed, "Feed reload")
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.send_command(ProviderCommand::FetchPresence, "Community widget refresh")
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn send_command(&mut self, cmd: ProviderCommand, what: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {what} unavailable"));
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
        } else {
            self.state.push_log(format!("[INFO] {what} requested"));
        }
    }

    fn maybe_refresh(&mut self) {
        if self.last_refresh.elapsed() >= self.refresh_every {
            let now = self.now();
            self.state.refresh(now);
            self.last_refresh = Instant::now();
        }
    }

    /// Keeps exactly one countdown task alive for the page that wants it.
    fn sync_countdown(&mut self) {
        let wanted = self.state.wanted_countdown();
        if let (Some(target), Some(handle)) = (wanted, &self.countdown)
            && handle.target() == target
        {
            return;
        }
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }
        let Some(target) = wanted else {
            return;
        };
        let tick_tx = self.delta_tx.clone();
        let expire_tx = self.delta_tx.clone();
        self.countdown = Some(start_countdown(
            target,
            self.clock.clone(),
            TICK_CADENCE,
            move |remaining| {
                let _ = tick_tx.send(Delta::CountdownTick { target, remaining });
            },
            move || {
                let _ = expire_tx.send(Delta::CountdownExpired { target });
            },
        ));
    }
}

struct LaunchArgs {
    screen: Screen,
    demo: bool,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(path) = config.log_file.clone().or_else(logging::default_log_path)
        && let Err(err) = logging::init_file_logging(&path)
    {
        eprintln!("warning: {err:#}");
    }

    let args = parse_launch_args();
    let source = if args.demo {
        FeedSource::Demo
    } else {
        config.feed_source.clone()
    };
    info!(source = %source.describe(), "starting");
    init_http_client(config.http_timeout)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = spawn_provider(source, config.presence_server_id.clone(), tx.clone(), cmd_rx);

    let mut state = AppState::new(
        args.screen,
        config.stream_page_url.clone(),
        config.presence_server_id.is_some(),
    );
    state.set_viewport_width(terminal.size()?.width);
    let mut app = App::new(state, Some(cmd_tx), tx, config.live_refresh);
    let res = run_app(&mut terminal, &mut app, rx);

    if let Some(handle) = app.countdown.take() {
        handle.cancel();
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        warn!(error = %err, "terminal loop failed");
    }
    res.context("terminal loop failed")
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            let now = app.now();
            apply_delta(&mut app.state, delta, now);
        }

        app.maybe_refresh();
        app.sync_countdown();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Resize(width, _) => app.state.set_viewport_width(width),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_lines(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Listing => render_listing(frame, chunks[1], &app.state, app.now()),
        Screen::Match { .. } => render_match(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    frame.render_widget(Paragraph::new(footer_text(&app.state)), chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_lines(state: &AppState) -> Vec<Line<'static>> {
    let title = match state.screen {
        Screen::Listing => "STREAMBOARD | Live Sports".to_string(),
        Screen::Match { .. } => "STREAMBOARD | Match".to_string(),
    };
    let mut menu_spans = Vec::new();
    for (idx, item) in state.menu.iter().enumerate() {
        if idx > 0 {
            menu_spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        }
        let style = if item.is_dynamic() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        menu_spans.push(Span::styled(item.label.clone(), style));
    }
    if menu_spans.is_empty() {
        menu_spans.push(Span::styled(
            "loading menu…",
            Style::default().fg(Color::DarkGray),
        ));
    }
    vec![
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(menu_spans),
    ]
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Listing => {
            "j/k/↑/↓ Move | Enter/d Open | r Reload | ? Help | q Quit".to_string()
        }
        Screen::Match { .. } => {
            "b/Esc Back | r Reload | p Community | ? Help | q Quit".to_string()
        }
    }
}

fn render_listing(frame: &mut Frame, area: Rect, state: &AppState, now: i64) {
    if let FeedStatus::Failed(err) = &state.feed_status {
        let msg = Paragraph::new(err.user_message())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(Block::default().title("Categories").borders(Borders::ALL));
        frame.render_widget(msg, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(area);

    let categories = if state.feed_status == FeedStatus::Loading {
        vec![Line::from("Loading categories…")]
    } else if state.listing.is_empty() {
        vec![Line::from(NO_CATEGORIES_MESSAGE)]
    } else {
        state
            .listing
            .cards
            .iter()
            .map(|card| {
                let mut spans = vec![Span::raw(card.name.clone())];
                if let Some(badge) = &card.badge {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(
                        badge.clone(),
                        Style::default().fg(Color::Black).bg(Color::Red),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    };
    let cards = Paragraph::new(categories)
        .block(Block::default().title("Categories").borders(Borders::ALL));
    frame.render_widget(cards, columns[0]);

    render_event_rows(frame, columns[1], state, now);
}

fn render_event_rows(frame: &mut Frame, area: Rect, state: &AppState, now: i64) {
    let block = Block::default().title("Schedule").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let rows = &state.listing.rows;
    let visible = inner.height as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);
    let lines: Vec<Line> = rows[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let selected = start + offset == state.selected;
            let state_style = match row.state {
                LiveState::Live => Style::default().fg(Color::Red),
                LiveState::Upcoming => Style::default().fg(Color::Green),
                LiveState::Ended => Style::default().fg(Color::DarkGray),
            };
            let row_style = if selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(if selected { "> " } else { "  " }, row_style),
                Span::styled(format!("{:<6}", row.state.label()), state_style),
                Span::styled(format!("{:<12}", format_start(row.start, now)), row_style),
                Span::styled(
                    format!("{:<12}", row.sport.as_deref().unwrap_or("-")),
                    row_style,
                ),
                Span::styled(row.title.clone(), row_style.add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", row.id), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_match(frame: &mut Frame, area: Rect, state: &AppState) {
    let show_presence = state.presence != PresenceState::Disabled;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if show_presence {
            [Constraint::Min(40), Constraint::Length(32)]
        } else {
            [Constraint::Min(40), Constraint::Length(0)]
        })
        .split(area);

    match &state.match_page {
        None => {
            let loading = Paragraph::new("Loading match…")
                .block(Block::default().title("Match").borders(Borders::ALL));
            frame.render_widget(loading, columns[0]);
        }
        Some(Err(err)) => {
            let text = vec![
                Line::from(Span::styled(
                    err.heading(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(err.user_message()),
            ];
            let msg = Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Match").borders(Borders::ALL));
            frame.render_widget(msg, columns[0]);
        }
        Some(Ok(page)) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(6),
                    Constraint::Length(3),
                    Constraint::Min(1),
                ])
                .split(columns[0]);

            let meta = Paragraph::new(vec![
                Line::from(Span::styled(
                    page.meta.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(page.meta.description.clone()),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().title(page.date.clone()).borders(Borders::ALL));
            frame.render_widget(meta, rows[0]);

            let countdown = match &state.countdown {
                CountdownView::Running { remaining, .. } => format!("Starts in {remaining}"),
                CountdownView::Expired { .. } => "Starting now".to_string(),
                CountdownView::Hidden => page.state.label().to_string(),
            };
            let countdown = Paragraph::new(countdown)
                .block(Block::default().title("Kickoff").borders(Borders::ALL));
            frame.render_widget(countdown, rows[1]);

            let links: Vec<Line> = if page.links.is_empty() {
                vec![Line::from(NO_STREAMS_MESSAGE)]
            } else {
                page.links
                    .iter()
                    .map(|link| {
                        Line::from(vec![
                            Span::styled(
                                format!("{:<20}", link.label),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(link.href.clone(), Style::default().fg(Color::Cyan)),
                        ])
                    })
                    .collect()
            };
            let title = format!("Streams ({})", page.links.len());
            let links = Paragraph::new(links)
                .wrap(Wrap { trim: false })
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(links, rows[2]);
        }
    }

    if show_presence {
        render_presence(frame, columns[1], &state.presence);
    }
}

fn render_presence(frame: &mut Frame, area: Rect, presence: &PresenceState) {
    let lines = match presence {
        PresenceState::Disabled => return,
        PresenceState::Loading => vec![Line::from("Loading…")],
        PresenceState::Failed(_) => vec![Line::from("Could not load community widget.")],
        PresenceState::Ready(widget) => {
            let mut lines = vec![Line::from(format!("{} online", widget.online_count))];
            for member in &widget.members {
                lines.push(Line::from(format!("● {}", member.display_name)));
            }
            if let Some(invite) = &widget.invite_url {
                lines.push(Line::from(""));
                lines.push(Line::from(format!("and more at {invite}")));
            }
            lines
        }
    };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Community").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No notices yet".to_string();
    }
    let start = state.logs.len().saturating_sub(2);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_start(start: i64, now: i64) -> String {
    let Some(at) = DateTime::<Utc>::from_timestamp(start, 0) else {
        return "TBD".to_string();
    };
    if (start - now).abs() < 86_400 {
        at.format("%H:%M UTC").to_string()
    } else {
        at.format("%d %b %H:%M").to_string()
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Streamboard - Help",
        "",
        "Listing:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Open match page",
        "",
        "Match page:",
        "  b / Esc      Back to listing",
        "  p            Refresh community widget",
        "",
        "Global:",
        "  r            Reload feed",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

fn parse_launch_args() -> LaunchArgs {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut screen = Screen::Listing;
    let mut demo = false;
    for (idx, arg) in args.iter().enumerate() {
        if arg == "--demo" {
            demo = true;
        }
        if let Some(id) = arg.strip_prefix("--id=") {
            screen = Screen::Match {
                id: Some(id.trim().to_string()),
            };
        }
        if arg == "--id" {
            screen = Screen::Match {
                id: args.get(idx + 1).map(|next| next.trim().to_string()),
            };
        }
        if let Some(query) = arg.strip_prefix("--query=") {
            screen = Screen::Match {
                id: id_from_query(query),
            };
        }
        if arg == "--query" {
            screen = Screen::Match {
                id: args.get(idx + 1).and_then(|next| id_from_query(next)),
            };
        }
    }
    LaunchArgs { screen, demo }
}

/// Pulls `id` out of a page query string such as `?id=1760000000_2`.
fn id_from_query(query: &str) -> Option<String> {
    let query = query.trim().trim_start_matches('?');
    let url = Url::parse(&format!("http://localhost/?{query}")).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
