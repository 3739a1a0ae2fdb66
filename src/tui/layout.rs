use ratatui::layout::{Rect, Layout as RatLayout, Direction, Constraint};

pub struct Layout {
    pub inner_area: Rect,  // Area inside the outer border
    pub header_area: Rect,
    pub timer_area: Rect,
    pub tasks_area: Rect,
    pub review_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions (inside the outer border)
    pub const MIN_WIDTH: u16 = 60;
    pub const MIN_HEIGHT: u16 = 20;

    /// Timer panel: border, mode tabs, countdown, gauge, label, count
    const TIMER_HEIGHT: u16 = 8;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Date header
                Constraint::Min(1),    // Body
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        // Left column: timer over tasks. Right column: review.
        let columns = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(vertical[1]);

        let left = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(Self::TIMER_HEIGHT), Constraint::Min(3)])
            .split(columns[0]);

        Self {
            inner_area,
            header_area: vertical[0],
            timer_area: left[0],
            tasks_area: left[1],
            review_area: columns[1],
            status_area: vertical[2],
        }
    }
}
