use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::text::Line;
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;

/// Single-line text field with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    text: String,
    /// Cursor position in chars, 0..=len
    cursor: usize,
}

impl LineInput {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

pub fn render_input_line(f: &mut Frame, area: Rect, title: &str, hint: &str, input: &LineInput, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let style = Style::default().fg(fg_color).bg(bg_color);

    let popup = popup_area(area, 60, 20);
    let popup = Rect { height: popup.height.max(5), ..popup };
    f.render_widget(Clear, popup);

    let inner_width = popup.width.saturating_sub(2) as usize;
    // Scroll horizontally so the cursor stays visible
    let offset = input.cursor().saturating_sub(inner_width.saturating_sub(1));
    let visible: String = input.text().chars().skip(offset).take(inner_width).collect();

    let paragraph = Paragraph::new(vec![
        Line::from(visible),
        Line::from(""),
        Line::from(hint.to_string()),
    ])
    .block(Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_alignment(Alignment::Center)
        .style(style))
    .style(style);
    f.render_widget(paragraph, popup);

    // Rough width: three-byte glyphs (CJK) take two cells
    let cursor_cells: usize = input
        .text()
        .chars()
        .skip(offset)
        .take(input.cursor() - offset)
        .map(|c| if c.len_utf8() >= 3 { 2 } else { 1 })
        .sum();
    let x = popup.x + 1 + (cursor_cells as u16).min(popup.width.saturating_sub(3));
    f.set_cursor_position(Position::new(x, popup.y + 1));
}
