// SPDX-License-Identifier: MIT
//! Full-screen ratatui interface for the task list.
//!
//! Layout: header, task list (at most 10 rows), input line, help line.
//! While the initial collection query is pending the whole screen shows a
//! loading message; if it fails, an error message replaces everything.
//!
//! Focus model: Tab switches between the input line and the list.
//!   - Input: printable chars append, Backspace pops, Enter submits.
//!   - List: Up/Down (or k/j) move, Space toggles, d/Delete deletes.
//! Ctrl+C or Esc quits; in-flight requests are dropped with the runtime.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::{Focus, LoadState, TaskApp};

/// ratatui-based interactive task list.
pub struct TaskUi {
    app: TaskApp,
}

impl TaskUi {
    pub fn new(app: TaskApp) -> Self {
        Self { app }
    }

    /// Start the interactive TUI loop.
    pub async fn run(mut self) -> Result<()> {
        // Set up terminal.
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("create terminal")?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal regardless of result.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            // Apply resolved API calls, then refetch if the cache went stale.
            self.app.pump();
            self.app.ensure_fresh();

            terminal.draw(|f| draw_ui(f, &self.app))?;

            // Poll for terminal events (non-blocking, 50ms timeout).
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match (key.code, key.modifiers) {
                        (KeyCode::Char('c'), KeyModifiers::CONTROL) => break,
                        (KeyCode::Esc, _) => break,
                        (KeyCode::Tab, _) | (KeyCode::BackTab, _) => self.app.toggle_focus(),
                        _ => match self.app.focus() {
                            Focus::Input => match key.code {
                                KeyCode::Enter => self.app.submit_input(),
                                KeyCode::Backspace => self.app.backspace(),
                                KeyCode::Char(c) => self.app.push_char(c),
                                _ => {}
                            },
                            Focus::List => match key.code {
                                KeyCode::Up | KeyCode::Char('k') => self.app.select_prev(),
                                KeyCode::Down | KeyCode::Char('j') => self.app.select_next(),
                                KeyCode::Char(' ') => self.app.toggle_selected(),
                                KeyCode::Char('d') | KeyCode::Delete => self.app.delete_selected(),
                                _ => {}
                            },
                        },
                    }
                }
            }
        }

        Ok(())
    }
}

// ─── UI rendering ─────────────────────────────────────────────────────────────

fn draw_ui(f: &mut ratatui::Frame, app: &TaskApp) {
    let area = f.area();

    // The collection query's state replaces the whole view until Ready.
    match app.load_state() {
        LoadState::Loading => {
            let msg = Paragraph::new("Loading tasks…").style(Style::default().fg(Color::DarkGray));
            f.render_widget(msg, area);
            return;
        }
        LoadState::Failed(message) => {
            let msg = Paragraph::new(format!("Error: {message}"))
                .style(Style::default().fg(Color::Red));
            f.render_widget(msg, area);
            return;
        }
        LoadState::Ready => {}
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(3),    // task list
            Constraint::Length(3), // input area
            Constraint::Length(1), // help line
        ])
        .split(area);

    render_header(f, chunks[0], app);
    render_tasks(f, chunks[1], app);
    render_input(f, chunks[2], app);
    render_help(f, chunks[3]);
}

fn render_header(f: &mut ratatui::Frame, area: Rect, app: &TaskApp) {
    let mut status = format!(" taskdeck  {} tasks", app.tasks().len());
    if app.is_update_pending() {
        status.push_str("  updating…");
    }
    if app.is_fetching() {
        status.push_str("  refreshing…");
    }
    let header =
        Paragraph::new(status).style(Style::default().bg(Color::Rgb(28, 28, 40)).fg(Color::White));
    f.render_widget(header, area);
}

fn render_tasks(f: &mut ratatui::Frame, area: Rect, app: &TaskApp) {
    let list_focused = app.focus() == Focus::List;

    let items: Vec<ListItem> = app
        .visible_tasks()
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let checkbox = if task.completed { "[x] " } else { "[ ] " };

            let mut title_style = Style::default().fg(Color::White);
            if task.completed {
                title_style = Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT);
            }

            let mut spans = vec![
                Span::styled(checkbox, Style::default().fg(Color::Cyan)),
                Span::styled(task.title.clone(), title_style),
            ];
            if app.is_delete_pending_for(task.id) {
                spans.push(Span::styled(
                    "  deleting…",
                    Style::default().fg(Color::Red),
                ));
            }

            let item = ListItem::new(Line::from(spans));
            if list_focused && i == app.selected() {
                item.style(Style::default().bg(Color::Rgb(40, 40, 56)))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .style(Style::default().fg(Color::White));

    f.render_widget(list, area);
}

fn render_input(f: &mut ratatui::Frame, area: Rect, app: &TaskApp) {
    let title = if app.is_create_pending() {
        "New task (adding…)"
    } else {
        "New task"
    };

    let border_style = if app.focus() == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text = Paragraph::new(format!("> {}▌", app.input()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(text, area);
}

fn render_help(f: &mut ratatui::Frame, area: Rect) {
    let help = Paragraph::new(
        " Tab: switch focus  |  Enter: add  |  Space: toggle  |  d: delete  |  ↑/↓: move  |  Esc: quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}
