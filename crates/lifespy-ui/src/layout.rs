use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct TrackerRects {
    pub top: Rect,
    pub methods: Rect,
    pub statuses: Rect,
    pub hints: Rect,
}

/// Top bar, method list and status panel side by side, key hints at the bottom.
pub fn tracker_layout(area: Rect, status_width_pct: u16) -> TrackerRects {
    let status_width_pct = status_width_pct.clamp(20, 80);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // top bar + rule
            Constraint::Min(3),    // panels
            Constraint::Length(3), // hints
        ])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(100 - status_width_pct),
            Constraint::Percentage(status_width_pct),
        ])
        .split(rows[1]);

    TrackerRects {
        top: rows[0],
        methods: cols[0],
        statuses: cols[1],
        hints: rows[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panels_fill_the_middle() {
        let area = Rect::new(0, 0, 100, 30);
        let r = tracker_layout(area, 40);
        assert_eq!(r.top.height, 2);
        assert_eq!(r.hints.height, 3);
        assert_eq!(r.methods.height, 25);
        assert_eq!(r.methods.width + r.statuses.width, 100);
        assert_eq!(r.statuses.width, 40);
        assert_eq!(r.statuses.x, r.methods.x + r.methods.width);
    }

    #[test]
    fn width_is_clamped() {
        let r = tracker_layout(Rect::new(0, 0, 100, 30), 5);
        assert_eq!(r.statuses.width, 20);
    }
}
