use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use ratatui::text::{Line, Span};
use crate::Config;
use crate::models::Mood;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::popup_area;

pub fn render_mood_picker(f: &mut Frame, area: Rect, selection: usize, current: Option<Mood>, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);
    let normal = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 50, 30);
    f.render_widget(Clear, popup_area);

    // Moods laid out worst to best, left to right
    let mut choices = Vec::new();
    for (index, mood) in Mood::ALL.iter().enumerate() {
        let mut style = if index == selection {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            normal
        };
        if current == Some(*mood) {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        choices.push(Span::styled(format!(" {} {} ", index + 1, mood.label()), style));
        choices.push(Span::styled(" ", normal));
    }

    let lines = vec![
        Line::from(Span::styled("How was your day?", normal)),
        Line::from(""),
        Line::from(choices),
        Line::from(""),
        Line::from(Span::styled("←→ or 1-5 to choose, Enter to save, Esc to cancel", normal)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Mood")
            .title_alignment(Alignment::Center)
            .style(normal))
        .style(normal)
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
