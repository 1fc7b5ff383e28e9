use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{stdout, Stdout};
use tracing::warn;
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::{
    app::{App, Focus, Form},
    countdown::Phase,
};

pub struct TerminalApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalApp {
    pub fn new() -> Result<Self> {
        let mut stdout = stdout();
        enable_raw_mode().context("could not enable raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("could not enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        Ok(Self { terminal })
    }

    pub fn draw(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|f| draw(f, app))?;
        Ok(())
    }
}

impl Drop for TerminalApp {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            warn!(%err, "could not disable raw mode");
        }
        if let Err(err) = execute!(stdout(), LeaveAlternateScreen) {
            warn!(%err, "could not leave alternate screen");
        }
        if let Err(err) = self.terminal.show_cursor() {
            warn!(%err, "could not show cursor");
        }
    }
}

fn draw<B: Backend>(f: &mut Frame<B>, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)].as_ref())
        .split(f.size());
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ]
            .as_ref(),
        )
        .split(rows[0]);

    draw_timer(f, app, panels[0]);
    draw_spinner(f, app, panels[1]);
    draw_bingo(f, app, panels[2]);

    let help = Paragraph::new(Span::styled(
        "Tab switch panel  q quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(help, rows[1]);
}

fn panel<'a>(title: &'a str, focused: bool) -> Block<'a> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn draw_timer<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let countdown = &app.countdown;
    let (status, color) = match countdown.phase() {
        Phase::Idle => ("paused", Color::White),
        Phase::Running => ("running", Color::Green),
        Phase::Expired => ("time's up", Color::Red),
    };

    let mut lines = vec![
        Spans::from(""),
        Spans::from(Span::styled(
            countdown.formatted(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::raw(status)),
        Spans::from(""),
        Spans::from("Space start/pause  r reset  s settings"),
    ];
    if app.show_settings {
        lines.push(Spans::from(""));
        lines.push(Spans::from(vec![
            Span::raw("Set HHMMSS: "),
            Span::styled(countdown.digits().grouped(), Style::default().fg(Color::Cyan)),
        ]));
        lines.push(Spans::from("digits type, Backspace deletes, c clears"));
    }

    let timer = Paragraph::new(lines)
        .block(panel("Timer", app.focus == Focus::Timer))
        .wrap(Wrap { trim: true });
    f.render_widget(timer, area);
}

fn draw_spinner<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let block = panel(
        if app.spinner.edit_mode() {
            "Chance Spinner [edit]"
        } else {
            "Chance Spinner"
        },
        app.focus == Focus::Spinner,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(inner);

    let now = app.now();
    let pointer = app.spinner.pointer_index(now);
    let headline = if app.spinner.is_spinning() {
        let label = pointer
            .and_then(|i| app.spinner.choices().get(i))
            .map(|c| c.label.as_str())
            .unwrap_or("");
        Span::styled(
            format!("Spinning... {}", label),
            Style::default().fg(Color::Yellow),
        )
    } else {
        match app.spinner.result() {
            Some(result) => Span::styled(
                format!("Result: {}", result),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            None => Span::raw("Press Enter to try your luck!"),
        }
    };
    f.render_widget(Paragraph::new(headline), parts[0]);

    let weights = app.spinner.displayed_weights();
    let items: Vec<ListItem> = app
        .spinner
        .choices()
        .iter()
        .zip(weights.iter())
        .enumerate()
        .map(|(i, (choice, weight))| {
            let marker = if app.spinner.is_spinning() && pointer == Some(i) {
                "▶ "
            } else {
                "  "
            };
            ListItem::new(format!("{}{:<20} {}%", marker, choice.label, weight))
        })
        .collect();
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.selected));
    }
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, parts[1], &mut state);

    let footer = match &app.form {
        Some(Form::AddLabel(label)) => format!("Choice name: {}_", label),
        Some(Form::AddWeight { label, weight }) => {
            format!("% chance for {}: {}_", label, weight)
        }
        Some(Form::EditWeight { weight, .. }) => format!("New weight: {}_", weight),
        None if app.spinner.edit_mode() => {
            String::from("Enter spin  a add  d remove  w weight  e done")
        }
        None => String::from("Enter spin  a add  d remove  e edit weights"),
    };
    f.render_widget(Paragraph::new(footer).wrap(Wrap { trim: true }), parts[2]);
}

fn draw_bingo<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let bingo = &app.bingo;
    let block = panel("Bingo", app.focus == Focus::Bingo);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);

    let current = match bingo.last_drawn() {
        Some(item) => Span::styled(
            bingo.asset_path(item).display().to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        None => Span::raw("Nothing drawn yet"),
    };
    let summary = Paragraph::new(vec![
        Spans::from(format!(
            "Drawn {}/{}, {} left",
            bingo.drawn().len(),
            bingo.universe().len(),
            bingo.remaining().len()
        )),
        Spans::from(current),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(summary, parts[0]);

    let history: Vec<ListItem> = bingo
        .drawn()
        .iter()
        .rev()
        .skip(1)
        .map(|item| ListItem::new(item.as_str()))
        .collect();
    f.render_widget(List::new(history), parts[1]);

    let footer = if bingo.can_draw() {
        Span::raw("Enter draw  r reset")
    } else {
        Span::styled("All drawn, r reset", Style::default().fg(Color::DarkGray))
    };
    f.render_widget(Paragraph::new(footer), parts[2]);
}
