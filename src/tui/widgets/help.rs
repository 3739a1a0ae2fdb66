use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Timer:\n");
    text.push_str(&format!("  {}: Start / pause\n", key(&kb.start_pause)));
    text.push_str(&format!("  {} / {} / {}: Work / short break / long break\n",
        key(&kb.work_mode), key(&kb.short_break), key(&kb.long_break)));
    text.push_str(&format!("  {}: Edit what you are focusing on\n", key(&kb.edit_label)));
    text.push_str(&format!("  {}: End work session early\n", key(&kb.end_early)));
    text.push('\n');

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {}: Add task\n", key(&kb.add_task)));
    text.push_str(&format!("  {}: Toggle done\n", key(&kb.toggle_task)));
    text.push_str(&format!("  {}: Delete task\n", key(&kb.delete_task)));
    text.push_str(&format!("  {} / {}: Move selection\n", key(&kb.list_up), key(&kb.list_down)));
    text.push('\n');

    text.push_str("Day:\n");
    text.push_str(&format!("  {} / {}: Previous / next day\n", key(&kb.prev_day), key(&kb.next_day)));
    text.push_str(&format!("  {}: Jump to today\n", key(&kb.today)));
    text.push_str(&format!("  {}: Go to date\n", key(&kb.goto_date)));
    text.push_str(&format!("  {}: Set mood\n", key(&kb.set_mood)));
    text.push('\n');

    text.push_str("Review:\n");
    text.push_str(&format!("  {}: Generate end-of-day review\n", key(&kb.review)));
    text.push_str(&format!("  {}: Copy review to clipboard\n", key(&kb.copy_review)));
    text.push_str("  PageUp / PageDown: Scroll review\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));

    text
}
