use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tracing::info;

use crate::app::{App, AppMode, RenderState};
use crate::speech::SpeechPort;
use crate::ui::reader::view::{
    render_command_deck, render_context_left, render_context_right, render_overlay,
    render_placeholder, render_progress_bar, render_sentence, render_status_line,
    render_word_display,
};
use crate::ui::terminal_guard::TerminalGuard;
use crate::ui::theme::Theme;

const RENDER_TICK: Duration = Duration::from_millis(1000 / 60);

pub struct TuiManager {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
    _guard: TerminalGuard,
}

impl TuiManager {
    pub fn new(theme: Theme) -> Result<Self, io::Error> {
        let guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        Ok(TuiManager {
            terminal,
            theme,
            _guard: guard,
        })
    }

    /// Runs until the app quits. Blocks on terminal input no longer than the
    /// next word deadline or one render tick, whichever is sooner.
    pub fn run_event_loop<S: SpeechPort>(&mut self, app: &mut App<S>) -> io::Result<()> {
        self.render_frame(app)?;

        loop {
            if app.mode() == AppMode::Quit {
                info!("quitting");
                return Ok(());
            }

            let mut force_render = false;
            if event::poll(app.poll_timeout(Instant::now(), RENDER_TICK))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
                    Event::Resize(_, _) => force_render = true,
                    _ => {}
                }
            }

            app.tick(Instant::now());

            if app.take_dirty() || force_render {
                self.render_frame(app)?;
            }
        }
    }

    pub fn render_frame<S: SpeechPort>(&mut self, app: &App<S>) -> io::Result<()> {
        let state = app.render_state();
        let theme = self.theme;
        self.terminal.draw(|frame| draw(frame, &state, &theme))?;
        Ok(())
    }
}

fn draw(frame: &mut Frame, state: &RenderState, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(area);
    let (main_area, progress_area, status_area, deck_area) = (rows[0], rows[1], rows[2], rows[3]);

    let word_row = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(main_area)[1];

    if let Some(word) = &state.current_word {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(30),
                Constraint::Percentage(35),
            ])
            .split(word_row);

        frame.render_widget(render_context_left(&state.context_left, theme), columns[0]);
        frame.render_widget(render_word_display(word, columns[1].width, theme), columns[1]);
        frame.render_widget(render_context_right(&state.context_right, theme), columns[2]);
    } else if let Some(sentence) = &state.current_sentence {
        frame.render_widget(render_sentence(sentence, theme), sentence_rows(main_area));
    } else if state.progress.1 == 0 {
        frame.render_widget(render_placeholder(theme), sentence_rows(main_area));
    }

    let bar_width = (progress_area.width as usize).saturating_sub(4);
    frame.render_widget(render_progress_bar(state.progress, bar_width, theme), progress_area);
    frame.render_widget(render_status_line(state, theme), status_area);
    render_command_deck(frame, deck_area, state, theme);

    if let Some(lines) = &state.overlay {
        render_overlay(frame, main_area, lines, theme);
    }
}

/// Middle band of the reader for multi-line content.
fn sentence_rows(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Min(3),
            Constraint::Percentage(35),
        ])
        .split(area)[1]
}
