use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{AppMode, PivotWord, RenderState};
use crate::ui::theme::Theme;

/// Spaces needed so the pivot letter lands on the middle column of `width`.
pub fn pivot_padding(left: &str, width: u16) -> usize {
    (width as usize / 2).saturating_sub(left.width())
}

pub fn render_word_display(word: &PivotWord, width: u16, theme: &Theme) -> Paragraph<'static> {
    let text_style = Style::default().fg(theme.text).add_modifier(Modifier::BOLD);
    let anchor_style = Style::default().fg(theme.anchor).add_modifier(Modifier::BOLD);

    let spans = vec![
        Span::raw(" ".repeat(pivot_padding(&word.left, width))),
        Span::styled(word.left.clone(), text_style),
        Span::styled(word.pivot.clone(), anchor_style),
        Span::styled(word.right.clone(), text_style),
    ];

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Left)
        .style(Style::default().bg(theme.background))
}

pub fn render_sentence(sentence: &str, theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(sentence.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.text).bg(theme.background))
}

pub fn render_progress_bar(progress: (usize, usize), width: usize, theme: &Theme) -> Line<'static> {
    let (current, total) = progress;
    let filled_len = if total == 0 {
        0
    } else {
        (current.min(total) * width) / total
    };
    let empty_len = width - filled_len;

    Line::from(vec![
        Span::styled("─".repeat(filled_len), Style::default().fg(theme.anchor)),
        Span::styled("─".repeat(empty_len), Style::default().fg(theme.dimmed)),
    ])
    .alignment(Alignment::Center)
}

/// `42.5% | 3 mins read | 500 wpm`
pub fn progress_summary(state: &RenderState) -> String {
    format!("{:.1}% | {} | {}", state.percent, state.eta, state.rate_label)
}

pub fn render_status_line(state: &RenderState, theme: &Theme) -> Paragraph<'static> {
    let line = Line::from(vec![
        Span::styled(state.title.clone(), Style::default().fg(theme.text)),
        Span::raw("  "),
        Span::styled(progress_summary(state), Style::default().fg(theme.dimmed)),
    ]);

    Paragraph::new(line)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.background))
}

pub fn render_context_left(words: &[String], theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(words.join(" "))
        .alignment(Alignment::Right)
        .style(Style::default().fg(theme.dimmed).bg(theme.background))
}

pub fn render_context_right(words: &[String], theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(words.join(" "))
        .alignment(Alignment::Left)
        .style(Style::default().fg(theme.dimmed).bg(theme.background))
}

pub fn render_placeholder(theme: &Theme) -> Paragraph<'static> {
    let text = "Type @filename to load a file\nOr @@ to load from clipboard\n:h for help, :q to quit";
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.dimmed).bg(theme.background))
}

/// What the command deck shows: the line being typed, else the last status,
/// else a hint.
pub fn command_deck_text(state: &RenderState) -> String {
    let input = match (&state.command_line, &state.status) {
        (Some(line), _) => format!("{}█", line),
        (None, Some(status)) => status.clone(),
        (None, None) => "space play | : command | @file | :h help".to_string(),
    };
    format!(" {} | {}", state.mode.label(), input)
}

pub fn render_command_deck(frame: &mut Frame, area: Rect, state: &RenderState, theme: &Theme) {
    frame.render_widget(Clear, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let accent = match state.mode {
        AppMode::Command => theme.anchor,
        _ => theme.dimmed,
    };
    let accent_bar = Paragraph::new("▌").style(Style::default().fg(accent).bg(theme.surface));
    frame.render_widget(accent_bar, layout[0]);

    let input_widget = Paragraph::new(command_deck_text(state))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.dimmed)),
        )
        .style(Style::default().fg(theme.text).bg(theme.surface));
    frame.render_widget(input_widget, layout[1]);
}

/// Centred box listing `lines`, drawn over the reader.
pub fn render_overlay(frame: &mut Frame, area: Rect, lines: &[String], theme: &Theme) {
    let widest = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let width = widest.saturating_add(4).min(area.width);
    let height = (lines.len() as u16).saturating_add(2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let text: Vec<Line> = lines.iter().map(|l| Line::from(l.clone())).collect();
    let widget = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.dimmed))
                .title(" Esc to close "),
        )
        .style(Style::default().fg(theme.text).bg(theme.surface));

    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}
