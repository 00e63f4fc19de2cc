use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthStr;

use lifespy_core::console::Console;
use lifespy_core::logging::LogLevel;

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Green,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Trace => Color::DarkGray,
    }
}

/// Rows `[start, end)` of `total` lines to show in `height` rows, `offset` rows up from the bottom.
fn visible_range(total: usize, height: usize, offset: usize) -> (usize, usize) {
    let end = total.saturating_sub(offset);
    (end.saturating_sub(height), end)
}

/// Render the console as an overlay over the top half of `area`.
///
/// Title bar, scrollable output, then the input line with the cursor.
pub fn render_console(f: &mut Frame, area: Rect, console: &Console, tracked: usize) {
    let height = (area.height / 2).max(3).min(area.height);
    let overlay = Rect { height, ..area };

    f.render_widget(Clear, overlay);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title bar
            Constraint::Min(1),    // output
            Constraint::Length(1), // input line
        ])
        .split(overlay);

    let title = Line::from(vec![
        Span::styled(
            " CONSOLE ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  events: {}  ", tracked)),
        Span::styled("` to close, 'help' for commands", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray).fg(Color::White)),
        chunks[0],
    );

    let lines = console.lines();
    let (start, end) = visible_range(
        lines.len(),
        chunks[1].height as usize,
        console.scroll_offset(),
    );
    let rows: Vec<Line> = lines
        .range(start..end)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!(" {:5} ", entry.level),
                    Style::default()
                        .fg(level_color(entry.level))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("[{}] ", entry.target),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.message.as_str()),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(rows)
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::RIGHT)
                    .style(Style::default().bg(Color::Black)),
            )
            .wrap(Wrap { trim: false }),
        chunks[1],
    );

    let input_line = Line::from(vec![
        Span::styled(
            "> ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(console.input_buffer.as_str()),
    ]);
    f.render_widget(
        Paragraph::new(input_line).style(Style::default().bg(Color::Black).fg(Color::White)),
        chunks[2],
    );

    let col = console.input_buffer[..console.cursor_pos].width() as u16;
    f.set_cursor_position((chunks[2].x + 2 + col, chunks[2].y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_shows_tail_when_not_scrolled() {
        assert_eq!(visible_range(10, 4, 0), (6, 10));
        assert_eq!(visible_range(3, 4, 0), (0, 3));
    }

    #[test]
    fn range_moves_up_with_offset() {
        assert_eq!(visible_range(10, 4, 3), (3, 7));
        assert_eq!(visible_range(10, 4, 9), (0, 1));
        assert_eq!(visible_range(0, 4, 0), (0, 0));
    }
}
