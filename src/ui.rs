pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use linetype::session::{CharState, TypingSession};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
// sample row, input row, spacer
const ROWS_PER_LINE: u16 = 3;

/// Index of the first line pair to draw so the active line stays on screen.
pub fn first_visible_line(session: &TypingSession, visible: usize) -> usize {
    let focus = session
        .active_line()
        .unwrap_or_else(|| session.line_count().saturating_sub(1));
    if visible == 0 || focus < visible {
        0
    } else {
        focus + 1 - visible
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let dim_bold_style = Style::default().patch(bold_style).patch(dim_style);
        let cursor_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Min(1),    // line pairs
                Constraint::Length(1), // stats
                Constraint::Length(1), // help
            ])
            .split(area);

        Paragraph::new(Span::styled(
            self.source.label(&self.catalogue),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let body = chunks[1];
        let widest = session
            .lines()
            .iter()
            .map(|l| l.width())
            .max()
            .unwrap_or(0);
        let widest = u16::try_from(widest).unwrap_or(u16::MAX);
        let left_pad = body.width.saturating_sub(widest.saturating_add(2)) / 2;
        let visible = (body.height / ROWS_PER_LINE) as usize;
        let first = first_visible_line(session, visible);

        for (row, index) in (first..session.line_count()).take(visible).enumerate() {
            let sample = &session.lines()[index];
            let Some(input) = session.input(index) else {
                continue;
            };
            let is_active = session.active_line() == Some(index);

            let sample_spans = sample
                .chars()
                .zip(session.line_states(index))
                .map(|(c, state)| match state {
                    CharState::Correct => Span::styled(c.to_string(), green_bold_style),
                    CharState::Incorrect => Span::styled(
                        match c {
                            ' ' => "·".to_owned(),
                            c => c.to_string(),
                        },
                        red_bold_style,
                    ),
                    CharState::Untyped => Span::styled(c.to_string(), dim_bold_style),
                })
                .collect::<Vec<Span>>();

            let mut input_spans = vec![Span::styled(
                if is_active { "> " } else { "  " },
                Style::default().fg(Color::Magenta),
            )];
            if input.completed {
                input_spans.push(Span::styled(input.typed.clone(), dim_style.fg(Color::Green)));
            } else if input.locked {
                input_spans.push(Span::styled("·".repeat(sample.chars().count()), dim_style));
            } else {
                input_spans.push(Span::styled(input.typed.clone(), bold_style));
                input_spans.push(Span::styled(" ", cursor_style));
            }

            let top = body.y + row as u16 * ROWS_PER_LINE;
            let sample_area = Rect::new(
                body.x.saturating_add(left_pad).saturating_add(2),
                top,
                body.width.saturating_sub(left_pad.saturating_add(2)),
                1,
            );
            let input_area = Rect::new(
                body.x.saturating_add(left_pad),
                top + 1,
                body.width.saturating_sub(left_pad),
                1,
            );
            Paragraph::new(Line::from(sample_spans)).render(sample_area, buf);
            Paragraph::new(Line::from(input_spans)).render(input_area, buf);
        }

        let board = session.scoreboard();
        let stats_style = if session.is_finished() {
            green_bold_style
        } else {
            bold_style
        };
        let stats = match &self.final_metrics {
            Some(done) => format!(
                "{}s   {} wpm   {}% acc   done ({}/{} chars)",
                done.elapsed_secs,
                board.wpm,
                done.accuracy,
                done.correct_chars,
                done.typed_chars
            ),
            None => format!(
                "{}s   {} wpm   {}% acc",
                board.elapsed_secs, board.wpm, board.accuracy
            ),
        };
        Paragraph::new(Span::styled(stats, stats_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            "(ctrl+r) restart / (tab) articles / (esc) quit",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }
}

/// Article list shown by the picker screen.
pub fn render_picker(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "Choose an article",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let lines = app
        .catalogue
        .titles()
        .enumerate()
        .map(|(i, title)| {
            if i == app.picker.selected {
                Line::from(Span::styled(
                    format!("> {}. {}", i + 1, title),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {}. {}", i + 1, title))
            }
        })
        .collect::<Vec<Line>>();

    Paragraph::new(lines)
        .alignment(Alignment::Left)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "(up/down) move / (enter) start / (esc) back",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);
}
