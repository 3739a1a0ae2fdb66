//! End-of-day review: prompt construction and the generative-text call.

use serde::Deserialize;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;
use thiserror::Error;

use crate::config::ReviewConfig;
use crate::models::{Mood, Task, UserProfile};

pub const NOTHING_TO_REVIEW: &str = "沒有可供複盤的工作紀錄。請先新增一些今天完成的任務。";
pub const REVIEW_FAILED: &str = "抱歉，分析您的工作紀錄時發生錯誤。請稍後再試。";

const PROMPT_PREAMBLE: &str = "\
你是一位專業、有同理心的生產力教練與顧問。
請根據使用者今天完成的工作任務清單（包含時間）、他的心情、以及他的個人簡介，提供一個簡潔、正面且具建設性的複盤反饋。

你的反饋應該包含：
1. 開頭先根據使用者的稱呼，親切地打招呼。
2. 分析今天的工作模式，例如任務是否集中在特定領域，或是處理了多樣化的事務。如果提供了時間，請分析時間分配。
3. **結合使用者的心情、工作目標與挑戰進行深度分析。** 嘗試找出工作成就與心情的關聯性，並根據其挑戰提供支持。
4. 提出1-2個具體的、可操作的建議。這些建議必須與使用者的**角色、目標和挑戰**高度相關。
5. 結尾再次給予鼓勵。

請嚴格遵守使用者偏好的**溝通風格**來撰寫你的回覆，並使用 Markdown 格式化，讓重點更清晰。";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("API key not set (checked environment variable {0})")]
    MissingApiKey(String),
    #[error("Review request failed: {0}")]
    Transport(String),
    #[error("Review service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Could not decode review response: {0}")]
    Decode(String),
    #[error("Review response contained no text")]
    EmptyResponse,
}

/// Anything that can turn a prompt into review text
pub trait ReviewGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, ReviewError>;
}

/// What the user sees after asking for a review
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    NothingToReview,
    Generated(String),
    Failed,
}

impl ReviewOutcome {
    pub fn message(&self) -> &str {
        match self {
            ReviewOutcome::NothingToReview => NOTHING_TO_REVIEW,
            ReviewOutcome::Generated(text) => text,
            ReviewOutcome::Failed => REVIEW_FAILED,
        }
    }
}

/// Gemini `generateContent` over HTTP
pub struct GeminiClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    /// Build from config; the key is read from the configured environment
    /// variable, falling back to `API_KEY`. A missing key only fails at call time.
    pub fn from_config(config: &ReviewConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl ReviewGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ReviewError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ReviewError::MissingApiKey(self.api_key_env.clone()))?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .agent
            .post(&self.url())
            .query("key", api_key)
            .send_json(body)
            .map_err(|error| match error {
                ureq::Error::Status(status, response) => ReviewError::Status {
                    status,
                    body: response.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(transport) => ReviewError::Transport(transport.to_string()),
            })?;

        let decoded: GenerateResponse = response
            .into_json()
            .map_err(|e| ReviewError::Decode(e.to_string()))?;

        let text: String = decoded
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ReviewError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Assemble the coaching prompt for one day's log
pub fn build_prompt(tasks: &[Task], mood: Option<Mood>, profile: Option<&UserProfile>) -> String {
    let task_lines = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| match task.time_range() {
            Some(range) => format!("{}. {} (時間: {})", index + 1, task.text, range),
            None => format!("{}. {}", index + 1, task.text),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::from(PROMPT_PREAMBLE);
    prompt.push_str("\n\n");

    if let Some(profile) = profile {
        prompt.push_str("---\n");
        prompt.push_str("使用者個人簡介（請務必參考此資訊，以更個人化的方式提供回饋）：\n");
        prompt.push_str(&format!("- 稱呼: {}\n", profile.name));
        prompt.push_str(&format!("- 職位/角色: {}\n", profile.role));
        prompt.push_str(&format!("- 主要工作目標: {}\n", profile.goals));
        prompt.push_str(&format!("- 目前最大的挑戰: {}\n", profile.challenges));
        prompt.push_str(&format!(
            "- 偏好的溝通風格: {} (請根據此風格調整你的語氣)\n",
            profile.communication_style.description()
        ));
        prompt.push_str("---\n\n");
    }

    prompt.push_str("今日工作任務清單：\n");
    prompt.push_str(&task_lines);
    prompt.push('\n');

    if let Some(mood) = mood {
        prompt.push_str(&format!("\n使用者今天的心情是：「{}」。\n", mood.description()));
    }
    prompt
}

/// One attempt at a review. Never calls the generator for an empty log.
pub fn request_review(
    generator: &dyn ReviewGenerator,
    tasks: &[Task],
    mood: Option<Mood>,
    profile: Option<&UserProfile>,
) -> ReviewOutcome {
    if tasks.is_empty() {
        return ReviewOutcome::NothingToReview;
    }

    let prompt = build_prompt(tasks, mood, profile);
    tracing::info!(tasks = tasks.len(), "requesting work review");
    match generator.generate(&prompt) {
        Ok(text) => ReviewOutcome::Generated(text),
        Err(error) => {
            tracing::error!(%error, "work review failed");
            ReviewOutcome::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewStatus {
    Pending,
    Ready(ReviewOutcome),
}

/// A review running on a worker thread, polled from the event loop
pub struct ReviewJob {
    receiver: Receiver<ReviewOutcome>,
    delivered: bool,
}

impl ReviewJob {
    pub fn spawn(
        generator: Arc<dyn ReviewGenerator>,
        tasks: Vec<Task>,
        mood: Option<Mood>,
        profile: Option<UserProfile>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        if tasks.is_empty() {
            let _ = sender.send(ReviewOutcome::NothingToReview);
        } else {
            std::thread::spawn(move || {
                let outcome = request_review(generator.as_ref(), &tasks, mood, profile.as_ref());
                // Receiver may be gone if the app quit mid-request
                let _ = sender.send(outcome);
            });
        }
        Self {
            receiver,
            delivered: false,
        }
    }

    /// `Ready` is returned exactly once
    pub fn poll(&mut self) -> ReviewStatus {
        if self.delivered {
            return ReviewStatus::Pending;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.delivered = true;
                ReviewStatus::Ready(outcome)
            }
            Err(TryRecvError::Empty) => ReviewStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("review worker exited without a result");
                self.delivered = true;
                ReviewStatus::Ready(ReviewOutcome::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommunicationStyle;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeGenerator {
        calls: AtomicUsize,
        reply: Result<String, String>,
        last_prompt: Mutex<Option<String>>,
    }

    impl FakeGenerator {
        fn replying(reply: Result<&str, &str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: reply.map(str::to_string).map_err(str::to_string),
                last_prompt: Mutex::new(None),
            }
        }
    }

    impl ReviewGenerator for FakeGenerator {
        fn generate(&self, prompt: &str) -> Result<String, ReviewError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().expect("lock") = Some(prompt.to_string());
            self.reply.clone().map_err(ReviewError::Transport)
        }
    }

    fn sample_profile() -> UserProfile {
        UserProfile {
            name: "Mei".to_string(),
            role: "Engineer".to_string(),
            goals: "Ship v2".to_string(),
            challenges: "Context switching".to_string(),
            communication_style: CommunicationStyle::Supportive,
        }
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::timed("Draft report".to_string(), "09:00".to_string(), "09:25".to_string()),
            Task::new("Email team".to_string()),
        ]
    }

    #[test]
    fn empty_log_makes_no_call() {
        let generator = FakeGenerator::replying(Ok("unused"));
        let outcome = request_review(&generator, &[], Some(Mood::Good), None);
        assert_eq!(outcome, ReviewOutcome::NothingToReview);
        assert_eq!(outcome.message(), NOTHING_TO_REVIEW);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn success_returns_text_verbatim() {
        let generator = FakeGenerator::replying(Ok("## 做得好\n繼續保持"));
        let outcome = request_review(&generator, &sample_tasks(), None, None);
        assert_eq!(outcome.message(), "## 做得好\n繼續保持");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_yields_fixed_message_after_one_attempt() {
        let generator = FakeGenerator::replying(Err("connection reset"));
        let outcome = request_review(&generator, &sample_tasks(), None, None);
        assert_eq!(outcome, ReviewOutcome::Failed);
        assert_eq!(outcome.message(), REVIEW_FAILED);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prompt_numbers_tasks_and_shows_times() {
        let prompt = build_prompt(&sample_tasks(), None, None);
        assert!(prompt.contains("1. Draft report (時間: 09:00 - 09:25)"));
        assert!(prompt.contains("2. Email team\n"));
        assert!(!prompt.contains("使用者個人簡介"));
        assert!(!prompt.contains("心情是"));
    }

    #[test]
    fn prompt_includes_mood_and_profile() {
        let profile = sample_profile();
        let prompt = build_prompt(&sample_tasks(), Some(Mood::Bad), Some(&profile));
        assert!(prompt.contains("使用者今天的心情是：「心情不太好」。"));
        assert!(prompt.contains("- 稱呼: Mei"));
        assert!(prompt.contains("- 目前最大的挑戰: Context switching"));
        assert!(prompt.contains("- 偏好的溝通風格: 溫暖鼓勵 (請根據此風格調整你的語氣)"));
    }

    #[test]
    fn job_delivers_outcome_once() {
        let generator = Arc::new(FakeGenerator::replying(Ok("review")));
        let mut job = ReviewJob::spawn(generator.clone(), sample_tasks(), None, None);

        let outcome = loop {
            match job.poll() {
                ReviewStatus::Pending => std::thread::sleep(Duration::from_millis(5)),
                ReviewStatus::Ready(outcome) => break outcome,
            }
        };
        assert_eq!(outcome, ReviewOutcome::Generated("review".to_string()));
        assert_eq!(job.poll(), ReviewStatus::Pending);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        let prompt = generator.last_prompt.lock().expect("lock").clone().expect("prompt");
        assert!(prompt.contains("Draft report"));
    }

    #[test]
    fn job_for_empty_log_is_ready_immediately() {
        let generator = Arc::new(FakeGenerator::replying(Ok("unused")));
        let mut job = ReviewJob::spawn(generator.clone(), Vec::new(), None, None);
        assert_eq!(job.poll(), ReviewStatus::Ready(ReviewOutcome::NothingToReview));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let config = ReviewConfig {
            api_key_env: "FOCUSLOG_TEST_UNSET_KEY".to_string(),
            ..ReviewConfig::default()
        };
        let mut client = GeminiClient::from_config(&config);
        client.api_key = None;
        assert!(matches!(
            client.generate("prompt"),
            Err(ReviewError::MissingApiKey(name)) if name == "FOCUSLOG_TEST_UNSET_KEY"
        ));
        assert!(client.url().ends_with(":generateContent"));
    }
}
