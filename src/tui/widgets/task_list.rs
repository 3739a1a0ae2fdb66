use ratatui::widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget, Scrollbar, ScrollbarState, ScrollbarOrientation};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use ratatui::text::{Line, Span};
use crate::models::Task;
use crate::Config;
use crate::tui::widgets::color::parse_color;

fn truncate(text: String, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text
    }
}

/// One line per task: status mark, text, then the session time range
pub fn task_line(task: &Task, max_width: usize) -> Line<'static> {
    let status_indicator = if task.completed { "✓" } else { "○" };
    let range = task.time_range().map(|r| format!("  {}", r)).unwrap_or_default();
    let text_width = max_width.saturating_sub(range.chars().count() + 2);
    let text = truncate(task.text.clone(), text_width);

    let text_style = if task.completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{} ", status_indicator)),
        Span::styled(text, text_style),
        Span::styled(range, Style::default().add_modifier(Modifier::DIM)),
    ])
}

pub fn render_task_list(f: &mut Frame, area: Rect, tasks: &[Task], list_state: &mut ListState, config: &Config) {
    let max_width = area.width.saturating_sub(4) as usize; // 2 for borders, 2 for padding

    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);

    let items: Vec<ListItem> = if tasks.is_empty() {
        vec![ListItem::new(Span::styled(
            "No tasks yet",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        tasks.iter().map(|task| ListItem::new(task_line(task, max_width))).collect()
    };

    // Split area to reserve space for scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // Scrollbar
        ])
        .split(area);

    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let done = tasks.iter().filter(|t| t.completed).count();
    let title = format!("Tasks ({}/{} done)", done, tasks.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(parse_color(&active_theme.fg)))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
        );

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let visible_items = list_area.height.saturating_sub(2) as usize;
    if tasks.len() > visible_items && visible_items > 0 && scrollbar_area.width > 0 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1, // Start after top border
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        let selected_index = list_state.selected().unwrap_or(0);
        let scroll_position = selected_index.saturating_sub(visible_items - 1);

        let mut scrollbar_state = ScrollbarState::new(tasks.len())
            .viewport_content_length(visible_items)
            .position(scroll_position);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_task_shows_range_and_mark() {
        let mut task = Task::timed("Draft report".to_string(), "09:00".to_string(), "09:25".to_string());
        let line = task_line(&task, 40);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "○ Draft report  09:00 - 09:25");

        task.completed = true;
        let text: String = task_line(&task, 40).spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.starts_with("✓ "));
    }

    #[test]
    fn long_text_is_truncated_before_range() {
        let task = Task::timed("x".repeat(50), "09:00".to_string(), "09:25".to_string());
        let text: String = task_line(&task, 30).spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("..."));
        assert!(text.ends_with("09:00 - 09:25"));
    }
}
