use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use ratatui::text::{Line, Span};
use crate::Config;
use crate::timer::{format_countdown, EARLY_END_REASONS};
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::popup_area;

/// Reason picker shown when a running work session is ended early.
/// The countdown keeps running underneath, so the remaining time is shown.
pub fn render_end_session(
    f: &mut Frame,
    area: Rect,
    task_text: &str,
    seconds_left: u32,
    selection: usize,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);
    let normal = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 50, 45);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled("Why are you ending this session?", normal)),
        Line::from(""),
        Line::from(Span::styled(task_text.to_string(), normal)),
        Line::from(Span::styled(format!("{} left", format_countdown(seconds_left)), normal)),
        Line::from(""),
    ];

    for (index, reason) in EARLY_END_REASONS.iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            normal
        };
        lines.push(Line::from(Span::styled(format!("{}{}. {}", prefix, index + 1, reason), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑↓ or 1-4 to choose, Enter to end session, Esc to keep going",
        normal,
    )));

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("End Session Early")
            .title_alignment(Alignment::Center)
            .style(normal))
        .style(normal)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
