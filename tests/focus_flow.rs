use chrono::NaiveDateTime;
use focuslog::journal::Journal;
use focuslog::models::{CommunicationStyle, Mood, UserProfile};
use focuslog::review::{self, ReviewError, ReviewGenerator, ReviewOutcome};
use focuslog::store::InMemoryLogStore;
use focuslog::timer::{FocusTimer, Mode, TimerEvent};
use std::sync::Mutex;

const DAY: &str = "2026-02-16";

fn at(time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{DAY} {time}"), "%Y-%m-%d %H:%M:%S").expect("time")
}

/// Remembers every prompt it was given
#[derive(Default)]
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
}

impl ReviewGenerator for RecordingGenerator {
    fn generate(&self, prompt: &str) -> Result<String, ReviewError> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        Ok("## 今日回顧\n\n做得好".to_string())
    }
}

fn profile() -> UserProfile {
    UserProfile {
        name: "Mei".to_string(),
        role: "Engineer".to_string(),
        goals: "Ship the release".to_string(),
        challenges: "Context switching".to_string(),
        communication_style: CommunicationStyle::Direct,
    }
}

fn persist(journal: &Journal<InMemoryLogStore>, event: &TimerEvent) {
    if let Some(record) = event.finalization().and_then(|f| f.record.clone()) {
        journal.record_session(DAY, record).expect("record");
    }
}

#[test]
fn full_day_of_focus_sessions_then_review() {
    let journal = Journal::new(InMemoryLogStore::new());
    let mut timer = FocusTimer::new();

    // Natural completion: 09:00 start, 1500 ticks
    timer.set_task_text("Draft report").expect("label");
    timer.toggle(at("09:00:00")).expect("start");
    let mut finished = None;
    for _ in 0..1500 {
        if let Some(event) = timer.tick(at("09:25:00")) {
            finished = Some(event);
        }
    }
    let finished = finished.expect("work finished");
    assert!(matches!(finished, TimerEvent::WorkFinished(_)));
    persist(&journal, &finished);
    assert_eq!(timer.mode(), Mode::ShortBreak);

    // Break runs out and hands control back to work
    timer.toggle(at("09:25:00")).expect("start break");
    let break_events: Vec<_> = (0..300).filter_map(|_| timer.tick(at("09:30:00"))).collect();
    assert_eq!(break_events, vec![TimerEvent::BreakFinished]);
    assert_eq!(timer.mode(), Mode::Work);
    assert!(!timer.is_active());

    // Early end with a reason
    timer.set_task_text("Review PRs").expect("label");
    timer.toggle(at("09:30:00")).expect("start");
    timer.request_early_end().expect("prompt");
    let ended = timer.confirm_early_end("要做別的事情", at("09:41:00")).expect("end");
    persist(&journal, &ended);

    // A manual task and the mood
    journal.add_task(DAY, "Reply to emails").expect("add");
    journal.set_mood(DAY, Mood::Good).expect("mood");

    let log = journal.log(DAY).expect("log");
    let rows: Vec<(String, Option<String>)> = log
        .tasks
        .iter()
        .map(|t| (t.text.clone(), t.time_range()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Draft report".to_string(), Some("09:00 - 09:25".to_string())),
            ("Review PRs (要做別的事情)".to_string(), Some("09:30 - 09:41".to_string())),
            ("Reply to emails".to_string(), None),
        ]
    );
    assert_eq!(timer.pomodoros_completed(), 2);

    let generator = RecordingGenerator::default();
    let profile = profile();
    let outcome = review::request_review(&generator, &log.tasks, log.mood, Some(&profile));
    assert_eq!(outcome, ReviewOutcome::Generated("## 今日回顧\n\n做得好".to_string()));

    let prompts = generator.prompts.lock().expect("lock");
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Draft report"));
    assert!(prompts[0].contains("09:00 - 09:25"));
    assert!(prompts[0].contains(Mood::Good.description()));
    assert!(prompts[0].contains("Mei"));
}

#[test]
fn fourth_early_ended_session_earns_long_break() {
    let journal = Journal::new(InMemoryLogStore::new());
    let mut timer = FocusTimer::new();

    for round in 1..=4 {
        timer.set_task_text(&format!("Block {round}")).expect("label");
        timer.toggle(at("10:00:00")).expect("start");
        timer.request_early_end().expect("prompt");
        let event = timer.confirm_early_end("提前完成", at("10:05:00")).expect("end");
        persist(&journal, &event);
        if round < 4 {
            timer.switch_mode(Mode::Work);
        }
    }

    assert_eq!(timer.mode(), Mode::LongBreak);
    assert_eq!(timer.pomodoros_completed(), 4);
    let texts: Vec<String> = journal.log(DAY).expect("log").tasks.into_iter().map(|t| t.text).collect();
    assert_eq!(texts, (1..=4).map(|n| format!("Block {n} (提前完成)")).collect::<Vec<_>>());
}

#[test]
fn empty_day_review_never_reaches_the_service() {
    let journal = Journal::new(InMemoryLogStore::new());
    let generator = RecordingGenerator::default();
    let log = journal.log(DAY).expect("log");

    let outcome = review::request_review(&generator, &log.tasks, log.mood, None);
    assert_eq!(outcome.message(), review::NOTHING_TO_REVIEW);
    assert!(generator.prompts.lock().expect("lock").is_empty());
    assert!(journal.store().is_empty());
}
