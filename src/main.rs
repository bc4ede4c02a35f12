use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use roster_terminal::state::{apply_delta, AppState, Delta, FetchPhase, Screen, StoreCommand, Team};
use roster_terminal::storage::PlayerStore;
use roster_terminal::store_worker::spawn_store_worker;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<StoreCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<StoreCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn dispatch(&mut self, cmd: StoreCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Storage worker is not responding");
        }
    }

    fn dispatch_opt(&mut self, cmd: Option<StoreCommand>) {
        if let Some(cmd) = cmd {
            self.dispatch(cmd);
        }
    }

    fn dispatch_all(&mut self, cmds: Vec<StoreCommand>) {
        for cmd in cmds {
            self.dispatch(cmd);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        // Alerts swallow the next key press.
        if self.state.alert.is_some() {
            self.state.dismiss_alert();
            return;
        }

        if self.state.confirm_remove {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    let cmd = self.state.confirm_remove_group();
                    self.dispatch_opt(cmd);
                }
                _ => self.state.cancel_remove_group(),
            }
            return;
        }

        if self.state.input_active {
            match key.code {
                KeyCode::Esc => {
                    self.state.input_active = false;
                    self.state.pending_input.clear();
                }
                KeyCode::Enter => {
                    let cmd = if matches!(self.state.screen, Screen::Groups) {
                        self.state.submit_new_group()
                    } else {
                        self.state.submit_new_player()
                    };
                    self.dispatch_opt(cmd);
                }
                KeyCode::Backspace => self.state.pop_input(),
                KeyCode::Char(c) => self.state.push_input(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('n') | KeyCode::Char('a') => self.state.input_active = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => {
                if matches!(self.state.screen, Screen::Groups) {
                    let cmd = self.state.open_selected_group();
                    self.dispatch_opt(cmd);
                }
            }
            KeyCode::Char('1') => {
                let cmd = self.state.set_team(Team::A);
                self.dispatch_opt(cmd);
            }
            KeyCode::Char('2') => {
                let cmd = self.state.set_team(Team::B);
                self.dispatch_opt(cmd);
            }
            KeyCode::Char('t') | KeyCode::Tab => {
                let cmd = self.state.toggle_team();
                self.dispatch_opt(cmd);
            }
            KeyCode::Char('x') | KeyCode::Char('d') => {
                let cmd = self.state.remove_selected_player();
                self.dispatch_opt(cmd);
            }
            KeyCode::Char('R') => self.state.request_remove_group(),
            KeyCode::Char('b') | KeyCode::Esc => {
                let cmd = self.state.go_back();
                self.dispatch_opt(cmd);
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let store = PlayerStore::open_default()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_store_worker(store, tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    app.dispatch(StoreCommand::FetchGroups);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
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
            let followups = apply_delta(&mut app.state, delta);
            app.dispatch_all(followups);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
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
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Groups => render_groups(frame, chunks[1], &app.state),
        Screen::Players { .. } => render_players(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.confirm_remove {
        render_confirm_overlay(frame, frame.size(), &app.state);
    }

    if let Some(alert) = &app.state.alert {
        render_alert_overlay(frame, frame.size(), &alert.title, &alert.message);
    }

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    match &state.screen {
        Screen::Groups => "ROSTER | Groups\nPlay with your group".to_string(),
        Screen::Players { group } => {
            format!("ROSTER | {group} | {}\nAdd people and split the teams", state.team.label())
        }
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Groups => {
            "n New group | Enter Open | j/k/↑/↓ Move | ? Help | q Quit".to_string()
        }
        Screen::Players { .. } => {
            "a New player | 1/2/t Team | j/k Move | x Remove player | R Remove group | b/Esc Back | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_groups(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    render_input_form(frame, sections[0], state, "New group", "press n to create a group");

    let list_area = sections[1];
    if state.groups.is_empty() {
        let message = if state.groups_loading {
            "Loading groups..."
        } else {
            "How about creating the first group?"
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    render_name_rows(frame, list_area, &state.groups, state.selected);
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    render_input_form(frame, sections[0], state, "New player", "press a to add a player");
    render_team_header(frame, sections[1], state);

    let list_area = sections[2];
    if state.players.is_empty() {
        let message = match state.phase {
            FetchPhase::Loading | FetchPhase::Idle => "Loading players...",
            FetchPhase::Failed => "Could not load the players",
            FetchPhase::Loaded => "No players on this team.",
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let names: Vec<String> = state.players.iter().map(|p| p.name.clone()).collect();
    render_name_rows(frame, list_area, &names, state.selected);
}

fn render_input_form(frame: &mut Frame, area: Rect, state: &AppState, title: &str, hint: &str) {
    let (text, style) = if state.input_active {
        (
            format!("{}_", state.pending_input),
            Style::default().fg(Color::White),
        )
    } else if state.pending_input.is_empty() {
        (hint.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (state.pending_input.clone(), Style::default())
    };

    let form = Paragraph::new(text)
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(form, area);
}

fn render_team_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = Vec::new();
    for team in [Team::A, Team::B] {
        let style = if team == state.team {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", team.label()), style));
        spans.push(Span::raw("  "));
    }
    let count = if state.is_loading() {
        "...".to_string()
    } else {
        format!("{} players", state.players.len())
    };
    spans.push(Span::styled(count, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_name_rows(frame: &mut Frame, area: Rect, names: &[String], selected: usize) {
    if area.height == 0 {
        return;
    }

    let visible = area.height as usize;
    let (start, end) = visible_range(selected, names.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        };

        let is_selected = idx == selected;
        let row_style = if is_selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if is_selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let prefix = if is_selected { "> " } else { "  " };
        let row = Paragraph::new(format!("{prefix}{}", names[idx])).style(row_style);
        frame.render_widget(row, row_area);
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

fn console_text(state: &AppState) -> String {
    match state.logs.back() {
        Some(line) => line.clone(),
        None => "No messages yet".to_string(),
    }
}

fn render_confirm_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let group = state.current_group().unwrap_or_default();
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let text = format!(
        "Remove the group \"{group}\" and all its players?\n\ny / Enter  Confirm\nany other  Cancel"
    );
    let confirm = Paragraph::new(text)
        .block(Block::default().title("Remove group").borders(Borders::ALL));
    frame.render_widget(confirm, popup_area);
}

fn render_alert_overlay(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let text = format!("{message}\n\npress any key");
    let alert = Paragraph::new(text).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL),
    );
    frame.render_widget(alert, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Roster Terminal - Help",
        "",
        "Groups:",
        "  n            New group",
        "  Enter        Open group",
        "",
        "Players:",
        "  a            New player (Enter submits, Esc cancels)",
        "  1 / 2 / t    Team filter",
        "  x / d        Remove selected player",
        "  R            Remove group (asks to confirm)",
        "  b / Esc      Back to groups",
        "",
        "Global:",
        "  j/k or ↑/↓   Move",
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
