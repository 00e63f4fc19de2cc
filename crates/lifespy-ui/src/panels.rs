use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use lifespy_core::presenter::{PresenterView, StatusLine};

use crate::layout::TrackerRects;

pub struct ShellView<'a> {
    pub status_line: &'a str,
    pub view: &'a PresenterView,
    /// History entries dropped by the tracker's ring buffer.
    pub evicted: u64,
    pub hints: &'a [(&'a str, &'a str)],
}

fn label_color(label: &str) -> Color {
    match label {
        "resumed" => Color::Green,
        "created" | "started" | "restarted" => Color::Cyan,
        "paused" => Color::Yellow,
        "stopped" => Color::DarkGray,
        "destroyed" => Color::Red,
        _ => Color::Magenta,
    }
}

fn status_line(status: &StatusLine) -> Line<'_> {
    Line::from(vec![
        Span::raw(format!("{}: ", status.key)),
        Span::styled(
            status.label.as_str(),
            Style::default()
                .fg(label_color(&status.label))
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

pub fn render_shell(f: &mut Frame, rects: TrackerRects, shell: ShellView<'_>) {
    let top = Paragraph::new(Line::from(format!("LIFESPY | {}", shell.status_line)))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(top, rects.top);

    // Newest first; only what fits is drawn.
    let visible = rects.methods.height.saturating_sub(2) as usize;
    let methods: Vec<Line> = shell
        .view
        .methods
        .iter()
        .take(visible)
        .map(|m| Line::from(m.as_str()))
        .collect();
    let title = if shell.evicted > 0 {
        format!("METHOD LIST ({}, {} evicted)", shell.view.methods.len(), shell.evicted)
    } else {
        format!("METHOD LIST ({})", shell.view.methods.len())
    };
    f.render_widget(
        Paragraph::new(methods).block(Block::default().borders(Borders::ALL).title(title)),
        rects.methods,
    );

    let statuses: Vec<Line> = shell.view.statuses.iter().map(status_line).collect();
    f.render_widget(
        Paragraph::new(statuses).block(Block::default().borders(Borders::ALL).title("STATUS")),
        rects.statuses,
    );

    let mut spans = Vec::new();
    for (key, action) in shell.hints {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::raw(format!(" {}  ", action)));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP)),
        rects.hints,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tracker_layout;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn renders_methods_and_statuses() {
        let view = PresenterView {
            methods: vec!["A.onPause()".into(), "A.onResume()".into()],
            statuses: vec![StatusLine {
                key: "A".into(),
                label: "paused".into(),
            }],
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| {
                let rects = tracker_layout(f.area(), 40);
                render_shell(
                    f,
                    rects,
                    ShellView {
                        status_line: "FRONT: A",
                        view: &view,
                        evicted: 0,
                        hints: &[("n", "new")],
                    },
                );
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("LIFESPY | FRONT: A"));
        assert!(text.contains("METHOD LIST (2)"));
        assert!(text.contains("A.onPause()"));
        assert!(text.contains("A: paused"));
        assert!(text.contains(" n  new"));
        // Newest entry is drawn above the older one.
        assert!(text.find("A.onPause()") < text.find("A.onResume()"));
    }

    #[test]
    fn colors_by_label() {
        assert_eq!(label_color("resumed"), Color::Green);
        assert_eq!(label_color("destroyed"), Color::Red);
        assert_eq!(label_color("unknown (onFoo)"), Color::Magenta);
    }
}
