use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};
use crate::models::Mood;
use crate::timer::{self, EARLY_END_REASONS};
use crate::tui::app::{InputPurpose, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::App;
use crate::utils::parse_key_binding;

/// How long to wait for input before redrawing; keeps the countdown smooth
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lines moved by PageUp/PageDown in the review panel
const REVIEW_PAGE: usize = 5;

/// Restores the terminal even on panic, otherwise the user's shell is left in raw mode
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check size before entering the alternate screen so the error is readable
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    tracing::info!(date = %app.selected_date, "tui started");

    loop {
        app.check_status_message_timeout();
        app.on_tick(Instant::now());

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events; Windows also reports Release
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    if app.timer.is_active() {
        tracing::info!(seconds_left = app.timer.seconds_left(), "quit with timer running; session discarded");
    }
    guard.restore()?;

    Ok(())
}

/// Returns true when the user asked to quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Ok(true);
    }

    match app.ui.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Input(_) => handle_input_mode(app, key_event),
        Mode::EndEarly => handle_end_early_mode(app, key_event),
        Mode::MoodPicker => handle_mood_picker_mode(app, key_event),
        Mode::View => handle_global_key_bindings(app, key_event),
    }
}

fn pressed(binding: &str, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let parsed = parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
    Ok(parsed.matches(key_event))
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc
        || key_event.code == KeyCode::Char('?')
        || pressed(&app.config.key_bindings.help, &key_event)?
    {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_input_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.home(),
        KeyCode::End => app.input.end(),
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => app.input.insert(c),
        _ => {}
    }
    Ok(false)
}

fn handle_end_early_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let count = EARLY_END_REASONS.len();
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.ui.reason_selection = (app.ui.reason_selection + count - 1) % count;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.ui.reason_selection = (app.ui.reason_selection + 1) % count;
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            if index < count {
                app.ui.reason_selection = index;
            }
        }
        KeyCode::Enter => app.confirm_end_early(),
        KeyCode::Esc => app.cancel_end_early(),
        _ => {}
    }
    Ok(false)
}

fn handle_mood_picker_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let count = Mood::ALL.len();
    match key_event.code {
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h') => {
            app.ui.mood_selection = app.ui.mood_selection.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Down | KeyCode::Char('l') => {
            app.ui.mood_selection = (app.ui.mood_selection + 1).min(count - 1);
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            if index < count {
                app.ui.mood_selection = index;
            }
        }
        KeyCode::Enter => app.confirm_mood(),
        KeyCode::Esc => app.ui.mode = Mode::View,
        _ => {}
    }
    Ok(false)
}

fn handle_global_key_bindings(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if pressed(&kb.quit, &key_event)? {
        return Ok(true);
    }
    if pressed(&kb.help, &key_event)? || key_event.code == KeyCode::Char('?') {
        app.enter_help_mode();
        return Ok(false);
    }

    // Timer
    if pressed(&kb.start_pause, &key_event)? {
        app.toggle_timer();
    } else if pressed(&kb.work_mode, &key_event)? {
        app.switch_timer_mode(timer::Mode::Work);
    } else if pressed(&kb.short_break, &key_event)? {
        app.switch_timer_mode(timer::Mode::ShortBreak);
    } else if pressed(&kb.long_break, &key_event)? {
        app.switch_timer_mode(timer::Mode::LongBreak);
    } else if pressed(&kb.edit_label, &key_event)? {
        app.begin_input(InputPurpose::FocusLabel);
    } else if pressed(&kb.end_early, &key_event)? {
        app.open_end_early();
    }
    // Tasks
    else if pressed(&kb.add_task, &key_event)? {
        app.begin_input(InputPurpose::NewTask);
    } else if pressed(&kb.toggle_task, &key_event)? {
        app.toggle_selected_task();
    } else if pressed(&kb.delete_task, &key_event)? {
        app.delete_selected_task();
    } else if pressed(&kb.list_up, &key_event)? || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if pressed(&kb.list_down, &key_event)? || key_event.code == KeyCode::Down {
        app.move_selection_down();
    }
    // Day
    else if pressed(&kb.prev_day, &key_event)? {
        app.shift_day(-1)?;
    } else if pressed(&kb.next_day, &key_event)? {
        app.shift_day(1)?;
    } else if pressed(&kb.today, &key_event)? {
        app.goto_today()?;
    } else if pressed(&kb.goto_date, &key_event)? {
        app.begin_input(InputPurpose::GotoDate);
    } else if pressed(&kb.set_mood, &key_event)? {
        app.open_mood_picker();
    }
    // Review
    else if pressed(&kb.review, &key_event)? {
        app.request_review();
    } else if pressed(&kb.copy_review, &key_event)? {
        app.copy_review();
    } else if key_event.code == KeyCode::PageUp {
        app.scroll_review_up(REVIEW_PAGE);
    } else if key_event.code == KeyCode::PageDown {
        app.scroll_review_down(REVIEW_PAGE);
    }

    Ok(false)
}
