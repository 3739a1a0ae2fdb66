use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use crate::timer::{format_countdown, FocusTimer, Mode};
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::mode_tabs::render_mode_tabs;

pub fn render_timer_panel(f: &mut Frame, area: Rect, timer: &FocusTimer, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let accent = parse_color(&active_theme.accent);

    let state = if timer.is_active() { "running" } else { "paused" };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Timer ({})", state))
        .style(Style::default().fg(fg_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Mode tabs
            Constraint::Length(1), // Countdown
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Focus label
            Constraint::Min(0),    // Pomodoro count
        ])
        .split(inner);

    render_mode_tabs(f, rows[0], timer.mode(), config);

    let countdown = Paragraph::new(Line::from(Span::styled(
        format_countdown(timer.seconds_left()),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(countdown, rows[1]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(accent))
        .ratio(timer.progress().clamp(0.0, 1.0))
        .label("");
    f.render_widget(gauge, rows[2]);

    let label = match timer.mode() {
        Mode::Work if timer.task_text().trim().is_empty() => {
            Span::styled(
                format!(
                    "What are you focusing on? (press {})",
                    crate::utils::format_key_binding_for_display(&config.key_bindings.edit_label)
                ),
                Style::default().add_modifier(Modifier::DIM),
            )
        }
        Mode::Work => Span::raw(format!("Focus: {}", timer.task_text())),
        Mode::ShortBreak | Mode::LongBreak => Span::raw("Take a breather"),
    };
    f.render_widget(Paragraph::new(Line::from(label)).alignment(Alignment::Center), rows[3]);

    let count = Paragraph::new(format!("Pomodoros: {}", timer.pomodoros_completed()))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM));
    f.render_widget(count, rows[4]);
}
