use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

use crate::highlight::Highlighter;
use crate::render::filtered_lines;
use crate::session::{CommentSink, ReviewSession};

/// Outcome of the last publish attempt, shown in the commentary pane.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PublishStatus {
    Pushed,
    Failed(String),
}

/// Application state for the interactive review loop.
pub struct App<S: CommentSink> {
    session: ReviewSession,
    sink: S,
    highlighter: Highlighter,
    file_ext: String,
    should_quit: bool,
    show_help: bool,
    // Set by the `y` key; the network call runs only after a frame showing
    // the pending indicator has been drawn.
    pending_publish: bool,
    status: Option<PublishStatus>,
}

impl<S: CommentSink> App<S> {
    pub fn new(session: ReviewSession, sink: S, file_ext: &str) -> Self {
        let should_quit = session.is_done();
        Self {
            session,
            sink,
            highlighter: Highlighter::new(),
            file_ext: file_ext.to_string(),
            should_quit,
            show_help: false,
            pending_publish: false,
            status: None,
        }
    }

    /// Handle one keypress. At most one session transition per call.
    fn handle_input(&mut self, key: event::KeyEvent) {
        if self.show_help {
            // Any key closes help
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char('n') => {
                self.status = None;
                self.session.advance();
                if self.session.is_done() {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('y') => {
                if !self.session.is_done() {
                    self.status = None;
                    self.pending_publish = true;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.session.scroll_down();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.session.scroll_up();
            }
            _ => {}
        }
    }

    /// Run the publish transition armed by the `y` key. On failure the
    /// cursor stays on the current annotation so the reviewer can retry.
    fn finish_publish(&mut self) {
        self.pending_publish = false;
        match self.session.publish(&mut self.sink) {
            Ok(()) => {
                self.status = Some(PublishStatus::Pushed);
                if self.session.is_done() {
                    self.should_quit = true;
                }
            }
            Err(err) => {
                self.status = Some(PublishStatus::Failed(format!("{err:#}")));
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        if self.show_help {
            self.render_help(frame);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.render_commentary(frame, chunks[0]);
        self.render_file(frame, chunks[1]);
        self.render_status_bar(frame, chunks[2]);
    }

    /// Render the annotation detail pane: file:line header, sanitized text,
    /// the yes/no prompt, and the last publish outcome.
    fn render_commentary(&self, frame: &mut Frame, area: Rect) {
        let Some((record, ann)) = self.session.current() else {
            let paragraph = Paragraph::new("All comments handled")
                .block(Block::default().borders(Borders::ALL).title("Commentary"));
            frame.render_widget(paragraph, area);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                "Push this comment? [y/n]",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("File: {}:{}", record.path.display(), ann.line),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
        ];
        for text_line in ann.text.lines() {
            lines.push(Line::from(text_line.to_string()));
        }

        match &self.status {
            Some(PublishStatus::Pushed) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Comment pushed",
                    Style::default().fg(Color::Green),
                )));
            }
            Some(PublishStatus::Failed(msg)) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Push failed: {msg}"),
                    Style::default().fg(Color::Red),
                )));
            }
            None => {}
        }
        if self.pending_publish {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Pushing...",
                Style::default().fg(Color::Yellow),
            )));
        }

        let paragraph = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("Commentary"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    /// Render the file pane: the body filtered through the redaction map,
    /// renumbered, with the current annotation's anchor line highlighted.
    fn render_file(&self, frame: &mut Frame, area: Rect) {
        let Some((file_idx, ann_idx)) = self.session.cursor() else {
            frame.render_widget(Block::default().borders(Borders::ALL), area);
            return;
        };
        let record = &self.session.files()[file_idx];

        let mut fh = self.highlighter.for_file(&self.file_ext);
        let mut lines = Vec::new();
        for display in filtered_lines(record, ann_idx) {
            let number = Span::styled(
                format!("{:3} ", display.number),
                Style::default().fg(Color::DarkGray),
            );
            let line = if display.selected {
                Line::from(vec![
                    number,
                    Span::styled(
                        display.text.to_string(),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let mut spans = vec![number];
                spans.extend(fh.highlight_line(display.text));
                Line::from(spans)
            };
            lines.push(line);
        }

        let title = format!("{} ─ j/k/Up/Down to scroll", record.path.display());
        let paragraph = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((self.session.scroll().min(u16::MAX as usize) as u16, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let progress = match self.session.cursor() {
            Some((file_idx, ann_idx)) => {
                let files = self.session.files();
                format!(
                    "file {}/{} · comment {}/{}",
                    file_idx + 1,
                    files.len(),
                    ann_idx + 1,
                    files[file_idx].annotations.len()
                )
            }
            None => "done".to_string(),
        };

        let status_text = format!(
            "{progress} | Keys: y=push n=skip j/k=scroll ?=help q=quit"
        );
        let paragraph = Paragraph::new(status_text)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let help_text = vec![
            "cr-review - Keyboard Shortcuts",
            "",
            "Actions:",
            "  y             - Push current comment to the merge request",
            "  n             - Skip to the next comment",
            "",
            "Navigation:",
            "  j / Down      - Scroll file down",
            "  k / Up        - Scroll file up",
            "",
            "Other:",
            "  ?             - Show this help",
            "  q / Esc       - Quit",
            "",
            "Press any key to close this help",
        ];

        let text = Text::from(help_text.iter().map(|&s| Line::from(s)).collect::<Vec<_>>());
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });

        let area = centered_rect(60, 80, frame.area());
        frame.render_widget(paragraph, area);
    }
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Setup the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Launch the interactive review interface and drive it to completion.
///
/// Strictly request/response: each keypress triggers at most one state
/// transition and one re-render. An armed publish runs after the pending
/// frame is drawn; no input is consumed while the call is outstanding.
pub fn run_tui<S: CommentSink>(mut app: App<S>) -> Result<()> {
    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;

    let result = (|| -> Result<()> {
        loop {
            terminal
                .draw(|f| app.render(f))
                .context("Failed to draw frame")?;

            if app.should_quit {
                break;
            }

            if app.pending_publish {
                app.finish_publish();
                continue;
            }

            if event::poll(Duration::from_millis(200)).context("Failed to poll events")?
                && let Event::Key(key) = event::read().context("Failed to read event")?
            {
                // Ignore key release events
                if key.kind == event::KeyEventKind::Press {
                    app.handle_input(key);
                }
            }
        }
        Ok(())
    })();

    // Restore terminal in all cases
    restore_terminal(&mut terminal)?;

    result
}
