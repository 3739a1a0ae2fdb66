use ratatui::widgets::Paragraph;
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

/// Join as many hints as fit in `max_width`, ending with "..." when some are dropped
pub fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    let mut hints_text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let current_len = hints_text.chars().count();
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            current_len + SEPARATOR.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            let truncate_to = max_width.saturating_sub(ELLIPSIS.len());
            if i == 0 {
                hints_text = hint.chars().take(truncate_to).collect();
            } else if current_len + ELLIPSIS.len() > max_width {
                hints_text = hints_text.chars().take(truncate_to).collect();
            }
            hints_text.push_str(ELLIPSIS);
            break;
        }

        if i > 0 {
            hints_text.push_str(SEPARATOR);
        }
        hints_text.push_str(hint);
    }
    hints_text
}

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&str>,
    key_hints: &[String],
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let max_width = area.width as usize;

    let (content, style) = match message {
        Some(msg) => {
            let msg_fg = get_contrast_text_color(highlight_bg);
            let content = if msg.chars().count() > max_width {
                msg.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect::<String>() + ELLIPSIS
            } else {
                msg.to_string()
            };
            (content, Style::default().fg(msg_fg).bg(highlight_bg).add_modifier(Modifier::BOLD))
        }
        None => (fit_hints(key_hints, max_width), Style::default().fg(fg_color).bg(bg_color)),
    };

    let paragraph = Paragraph::new(content)
        .style(style)
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> Vec<String> {
        vec!["s: Start".to_string(), "a: Add".to_string(), "q: Quit".to_string()]
    }

    #[test]
    fn all_hints_fit() {
        assert_eq!(fit_hints(&hints(), 80), "s: Start • a: Add • q: Quit");
    }

    #[test]
    fn overflow_ends_with_ellipsis() {
        let text = fit_hints(&hints(), 20);
        assert_eq!(text, "s: Start • a: Add...");
        assert!(text.chars().count() <= 20);
    }
}
