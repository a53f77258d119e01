use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen};
use crate::input::PlayMode;
use crate::progress::position_label;
use crate::render_model::RenderModel;
use crate::timer::Clock;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

const EDITOR_PLACEHOLDER: &str = "Type or paste some text. Ctrl+L loads a sample.";
const EMPTY_WORD: &str = "—";

fn help_line(keys: &[(&str, &str)]) -> String {
    keys.iter()
        .map(|(key, what)| format!("({key}) {what}"))
        .join(" / ")
}

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Editor => render_editor(self, area, buf),
            Screen::Reader => render_reader(self, area, buf),
        }
    }
}

fn render_editor<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let error_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("RSVP Reader", bold_style),
        Span::styled(format!("   {} wpm", app.wpm()), dim_style),
    ]));
    title.render(chunks[0], buf);

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(chunks[1]);
    block.render(chunks[1], buf);

    if app.editor.text().is_empty() {
        Paragraph::new(Span::styled(EDITOR_PLACEHOLDER, dim_style))
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    } else {
        let scroll = wrapped_height(app.editor.text(), inner.width).saturating_sub(inner.height);
        Paragraph::new(app.editor.text())
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(inner, buf);
    }

    if let Some(error) = app.error() {
        Paragraph::new(Span::styled(error, error_style)).render(chunks[2], buf);
    }

    let legend = Paragraph::new(Span::styled(
        help_line(&[
            ("ctrl+r", "read"),
            ("ctrl+l", "sample"),
            ("ctrl+u", "clear"),
            ("esc", "quit"),
        ]),
        italic_style,
    ));
    legend.render(chunks[3], buf);
}

/// Rows `text` takes when wrapped at `width`, so the newest line stays visible.
fn wrapped_height(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let width = usize::from(width);
    let rows: usize = text
        .split('\n')
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn render_reader<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let highlight_style = Style::default()
        .fg(Color::LightRed)
        .add_modifier(Modifier::BOLD);

    let presenter = &app.presenter;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("RSVP Reader", bold_style),
        Span::styled(format!("   {}", presenter.phase()), dim_style),
    ]));
    header.render(chunks[0], buf);
    Paragraph::new(Span::styled(
        position_label(presenter.index(), presenter.len()),
        dim_style,
    ))
    .alignment(Alignment::Right)
    .render(chunks[0], buf);

    let center = chunks[3].x + chunks[3].width / 2;
    let guide = |row: Rect, buf: &mut Buffer| {
        if row.width > 0 {
            buf.set_string(center, row.y, "│", dim_style);
        }
    };

    if presenter.is_finished() {
        Paragraph::new(Span::styled("Finished", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    } else if let Some(model) = presenter.current_model() {
        guide(chunks[2], buf);
        guide(chunks[4], buf);
        render_word(&model, chunks[3], center, highlight_style, buf);
    } else {
        Paragraph::new(EMPTY_WORD)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    let hint = match (presenter.is_playing(), app.keys.mode()) {
        (true, PlayMode::Hold) => "release space to pause",
        (true, PlayMode::Toggle) => "space to pause",
        (false, PlayMode::Hold) => "hold space to read",
        (false, PlayMode::Toggle) => "space to read",
    };
    let status = match app.wpm_entry() {
        Some(entry) => Line::from(vec![
            Span::styled("wpm: ", bold_style),
            Span::raw(format!("{entry}_")),
            Span::styled("  (enter) set / (esc) cancel", italic_style),
        ]),
        None => Line::from(Span::styled(hint, italic_style)),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    app.set_progress_area(chunks[7]);
    render_progress(presenter.progress(), chunks[7], buf);

    Paragraph::new(Span::styled(format!("{} wpm", presenter.wpm()), bold_style))
        .render(chunks[8], buf);
    Paragraph::new(Span::styled(
        format!("{:.0}%", presenter.progress()),
        dim_style,
    ))
    .alignment(Alignment::Right)
    .render(chunks[8], buf);

    let legend = Paragraph::new(Span::styled(
        help_line(&[
            ("←/→", "step"),
            ("↑/↓", "speed"),
            ("w", "type wpm"),
            ("home/end", "seek"),
            ("esc", "edit"),
            ("q", "quit"),
        ]),
        italic_style,
    ));
    legend.render(chunks[9], buf);
}

/// Draw the word with its highlighted grapheme on the `center` column.
fn render_word(model: &RenderModel, row: Rect, center: u16, highlight: Style, buf: &mut Buffer) {
    let before = center.saturating_sub(row.x);
    let prefix_width = u16::try_from(model.prefix.width()).unwrap_or(u16::MAX);
    let pad = before.saturating_sub(prefix_width);

    let line = Line::from(vec![
        Span::raw(" ".repeat(usize::from(pad))),
        Span::raw(model.prefix.as_str()),
        Span::styled(model.highlight.as_str(), highlight),
        Span::raw(model.suffix.as_str()),
    ]);
    Paragraph::new(line).render(row, buf);
}

fn render_progress(percent: f64, area: Rect, buf: &mut Buffer) {
    if area.width == 0 {
        return;
    }
    let filled = ((percent / 100.0) * f64::from(area.width)).round() as u16;
    let filled = filled.min(area.width);

    let line = Line::from(vec![
        Span::styled(
            "━".repeat(usize::from(filled)),
            Style::default().fg(Color::LightRed),
        ),
        Span::styled(
            "─".repeat(usize::from(area.width - filled)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    Paragraph::new(line).render(area, buf);
}
