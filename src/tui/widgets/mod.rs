pub mod color;
pub mod date_header;
pub mod end_session;
pub mod help;
pub mod input_line;
pub mod mode_tabs;
pub mod mood_picker;
pub mod review_view;
pub mod status_bar;
pub mod task_list;
pub mod timer_panel;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered rect covering a percentage of `area`, for modal popups
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
