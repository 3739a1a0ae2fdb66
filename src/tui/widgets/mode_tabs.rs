use ratatui::widgets::Tabs;
use ratatui::style::{Style, Modifier};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::timer::Mode;
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

/// One tab per timer mode, current one highlighted
pub fn render_mode_tabs(f: &mut Frame, area: Rect, current: Mode, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let accent = parse_color(&active_theme.accent);
    let accent_fg = get_contrast_text_color(accent);

    let titles: Vec<Line> = Mode::ALL
        .iter()
        .map(|mode| Line::from(vec![Span::raw(" "), Span::raw(mode.label()), Span::raw(" ")]))
        .collect();

    let selected = Mode::ALL.iter().position(|m| *m == current).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(accent_fg)
                .bg(accent)
                .add_modifier(Modifier::BOLD)
        )
        .divider(" ")
        .padding("", "");

    f.render_widget(tabs, area);
}
