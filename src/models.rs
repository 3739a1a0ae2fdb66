use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>, // HH:MM, focus sessions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl Task {
    /// A manually added task, without a time range
    pub fn new(text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            completed: false,
            created_at: now_timestamp(),
            start_time: None,
            end_time: None,
        }
    }

    /// A task produced by a finished focus session
    pub fn timed(text: String, start_time: String, end_time: String) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Self::new(text)
        }
    }

    /// `start - end` when the task came from a focus session
    pub fn time_range(&self) -> Option<String> {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => Some(format!("{} - {}", start, end)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("task.id must not be empty".to_string());
        }
        if self.text.trim().is_empty() {
            return Err("task.text must not be empty".to_string());
        }
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => {
                validate_hhmm(start, "task.start_time")?;
                validate_hhmm(end, "task.end_time")?;
            }
            (None, None) => {}
            _ => {
                return Err("task.start_time and task.end_time must be set together".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Rad,
    Good,
    Okay,
    Bad,
    Awful,
}

impl Mood {
    /// Picker order, worst to best
    pub const ALL: [Mood; 5] = [Mood::Awful, Mood::Bad, Mood::Okay, Mood::Good, Mood::Rad];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Rad => "rad",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Bad => "bad",
            Mood::Awful => "awful",
        }
    }

    /// Short label shown in the mood picker
    pub fn label(self) -> &'static str {
        match self {
            Mood::Rad => "很棒",
            Mood::Good => "不錯",
            Mood::Okay => "普通",
            Mood::Bad => "不太好",
            Mood::Awful => "糟透了",
        }
    }

    /// Sentence fed to the review prompt
    pub fn description(self) -> &'static str {
        match self {
            Mood::Rad => "心情很棒",
            Mood::Good => "心情不錯",
            Mood::Okay => "心情普通",
            Mood::Bad => "心情不太好",
            Mood::Awful => "心情糟透了",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "rad" => Ok(Mood::Rad),
            "good" => Ok(Mood::Good),
            "okay" => Ok(Mood::Okay),
            "bad" => Ok(Mood::Bad),
            "awful" => Ok(Mood::Awful),
            other => Err(format!(
                "unknown mood '{}' (expected rad, good, okay, bad or awful)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    pub tasks: Vec<Task>,
    pub mood: Option<Mood>,
}

impl DailyLog {
    pub fn push_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Flip `completed` on the task with this id. Returns false if no such task.
    pub fn toggle_task(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Remove the task with this id, keeping the order of the others
    pub fn remove_task(&mut self, id: &str) -> bool {
        match self.tasks.iter().position(|task| task.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = Some(mood);
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.mood.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Direct,
    Supportive,
    Formal,
}

impl CommunicationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            CommunicationStyle::Direct => "direct",
            CommunicationStyle::Supportive => "supportive",
            CommunicationStyle::Formal => "formal",
        }
    }

    /// Tone description used in the review prompt
    pub fn description(self) -> &'static str {
        match self {
            CommunicationStyle::Direct => "直接坦率",
            CommunicationStyle::Supportive => "溫暖鼓勵",
            CommunicationStyle::Formal => "嚴謹專業",
        }
    }
}

impl FromStr for CommunicationStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "direct" => Ok(CommunicationStyle::Direct),
            "supportive" => Ok(CommunicationStyle::Supportive),
            "formal" => Ok(CommunicationStyle::Formal),
            other => Err(format!(
                "unknown communication style '{}' (expected direct, supportive or formal)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub role: String,
    pub goals: String,
    pub challenges: String,
    pub communication_style: CommunicationStyle,
}

impl UserProfile {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("profile.name must not be empty".to_string());
        }
        if self.role.trim().is_empty() {
            return Err("profile.role must not be empty".to_string());
        }
        Ok(())
    }
}

fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn validate_hhmm(value: &str, field_name: &str) -> Result<(), String> {
    let valid = value.len() == 5
        && chrono::NaiveTime::parse_from_str(value, "%H:%M").is_ok();
    if !valid {
        return Err(format!("{field_name} must be HH:MM"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_log() -> DailyLog {
        let mut log = DailyLog::default();
        log.push_task(Task::new("Write tests".to_string()));
        log.push_task(Task::timed(
            "Draft report".to_string(),
            "09:00".to_string(),
            "09:25".to_string(),
        ));
        log.push_task(Task::new("Reply to email".to_string()));
        log
    }

    #[test]
    fn manual_task_has_no_time_range() {
        let task = Task::new("Buy milk".to_string());
        assert!(!task.completed);
        assert!(task.start_time.is_none() && task.end_time.is_none());
        assert!(task.time_range().is_none());
        assert!(task.validate().is_ok());
    }

    #[test]
    fn timed_task_validates_both_times() {
        let task = Task::timed("Focus".to_string(), "09:00".to_string(), "09:25".to_string());
        assert_eq!(task.time_range().as_deref(), Some("09:00 - 09:25"));
        assert!(task.validate().is_ok());
    }

    #[test]
    fn validate_rejects_mixed_time_fields() {
        let mut task = Task::new("Focus".to_string());
        task.start_time = Some("09:00".to_string());
        assert!(task.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_time() {
        let task = Task::timed("Focus".to_string(), "9:00".to_string(), "09:25".to_string());
        assert!(task.validate().is_err());
        let task = Task::timed("Focus".to_string(), "09:00".to_string(), "24:10".to_string());
        assert!(task.validate().is_err());
    }

    #[test]
    fn task_ids_are_unique() {
        let a = Task::new("a".to_string());
        let b = Task::new("a".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn remove_task_keeps_order_of_the_rest() {
        let mut log = sample_log();
        let removed_id = log.tasks[1].id.clone();
        let remaining: Vec<String> = vec![log.tasks[0].id.clone(), log.tasks[2].id.clone()];

        assert!(log.remove_task(&removed_id));
        let ids: Vec<String> = log.tasks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, remaining);
        assert!(!log.remove_task(&removed_id));
    }

    #[test]
    fn toggle_unknown_id_is_reported() {
        let mut log = sample_log();
        assert!(!log.toggle_task("missing"));
    }

    #[test]
    fn mood_parses_case_insensitively() {
        assert_eq!("RAD".parse::<Mood>(), Ok(Mood::Rad));
        assert_eq!(" okay ".parse::<Mood>(), Ok(Mood::Okay));
        assert!("meh".parse::<Mood>().is_err());
    }

    #[test]
    fn daily_log_serializes_with_camel_case_fields() {
        let log = sample_log();
        let json = serde_json::to_string(&log).expect("serialize log");
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"startTime\":\"09:00\""));
        let roundtrip: DailyLog = serde_json::from_str(&json).expect("deserialize log");
        assert_eq!(roundtrip, log);
    }

    proptest! {
        #[test]
        fn toggling_twice_restores_completion(index in 0usize..3, initially_done in any::<bool>()) {
            let mut log = sample_log();
            log.tasks[index].completed = initially_done;
            let id = log.tasks[index].id.clone();

            prop_assert!(log.toggle_task(&id));
            prop_assert_eq!(log.tasks[index].completed, !initially_done);
            prop_assert!(log.toggle_task(&id));
            prop_assert_eq!(log.tasks[index].completed, initially_done);
        }
    }
}
