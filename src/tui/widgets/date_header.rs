use ratatui::widgets::Paragraph;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::models::Mood;
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::utils::parse_date;

/// `2026-02-16 Mon (today)   Mood: 很棒   Mei`
pub fn header_line(date: &str, is_today: bool, mood: Option<Mood>, name: &str) -> Line<'static> {
    let weekday = parse_date(date)
        .map(|d| d.format(" %a").to_string())
        .unwrap_or_default();
    let today = if is_today { " (today)" } else { "" };
    let mood_text = mood.map(|m| m.label()).unwrap_or("-");

    Line::from(vec![
        Span::styled(format!("{}{}{}", date, weekday, today), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("   Mood: {}", mood_text)),
        Span::styled(format!("   {}", name), Style::default().add_modifier(Modifier::DIM)),
    ])
}

pub fn render_date_header(
    f: &mut Frame,
    area: Rect,
    date: &str,
    is_today: bool,
    mood: Option<Mood>,
    name: &str,
    config: &Config,
) {
    let fg_color = parse_color(&config.get_active_theme().fg);
    let paragraph = Paragraph::new(header_line(date, is_today, mood, name))
        .style(Style::default().fg(fg_color));
    f.render_widget(paragraph, area);
}
