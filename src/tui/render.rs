use ratatui::Frame;
use ratatui::widgets::{Block, Borders};
use ratatui::style::Style;
use crate::tui::{App, Layout};
use crate::tui::app::Mode;
use crate::tui::widgets::{
    color::parse_color,
    date_header::render_date_header,
    end_session::render_end_session,
    help::render_help,
    input_line::render_input_line,
    mood_picker::render_mood_picker,
    review_view::render_review_view,
    status_bar::render_status_bar,
    task_list::render_task_list,
    timer_panel::render_timer_panel,
};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("focuslog")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_date_header(
        f,
        layout.header_area,
        &app.selected_date,
        app.is_today(),
        app.log.mood,
        &app.profile.name,
        &app.config,
    );
    render_timer_panel(f, layout.timer_area, &app.timer, &app.config);
    render_task_list(f, layout.tasks_area, &app.log.tasks, &mut app.ui.list_state, &app.config);
    render_review_view(
        f,
        layout.review_area,
        &app.review,
        &key(&app.config.key_bindings.review),
        &app.config,
        app.ui.review_scroll,
    );

    // Overlays go on top of the normal content
    match app.ui.mode {
        Mode::View => {}
        Mode::Help => render_help(f, f.area(), &app.config),
        Mode::Input(purpose) => {
            render_input_line(f, f.area(), purpose.title(), "Enter: Save • Esc: Cancel", &app.input, &app.config);
        }
        Mode::EndEarly => render_end_session(
            f,
            f.area(),
            app.timer.task_text(),
            app.timer.seconds_left(),
            app.ui.reason_selection,
            &app.config,
        ),
        Mode::MoodPicker => render_mood_picker(f, f.area(), app.ui.mood_selection, app.log.mood, &app.config),
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_deref(), &key_hints, &app.config);
}

pub fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&kb.help))],
        Mode::Input(_) => vec!["Enter: Save".to_string(), "Esc: Cancel".to_string()],
        Mode::EndEarly => vec![
            "↑/↓: Choose reason".to_string(),
            "Enter: End session".to_string(),
            "Esc: Keep going".to_string(),
        ],
        Mode::MoodPicker => vec![
            "←/→: Choose mood".to_string(),
            "Enter: Save".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => {
            let start_label = if app.timer.is_active() { "Pause" } else { "Start" };
            let mut hints = vec![
                format!("{}: {}", key(&kb.start_pause), start_label),
            ];
            if app.timer.is_active() && app.timer.mode() == crate::timer::Mode::Work {
                hints.push(format!("{}: End early", key(&kb.end_early)));
            } else {
                hints.push(format!("{}: Focus label", key(&kb.edit_label)));
            }
            hints.push(format!("{}: Add", key(&kb.add_task)));
            hints.push(format!("{}: Done", key(&kb.toggle_task)));
            hints.push(format!("{}: Mood", key(&kb.set_mood)));
            hints.push(format!("{}: Review", key(&kb.review)));
            hints.push(format!("{}/{}: Day", key(&kb.prev_day), key(&kb.next_day)));
            hints.push(format!("{}: Help", key(&kb.help)));
            hints.push(format!("{}: Quit", key(&kb.quit)));
            hints
        }
    }
}
