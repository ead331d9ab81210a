//! Natural-language summaries
//!
//! Optional collaborator that turns safety metrics into short prose. Every
//! failure is returned as an error; callers substitute templated text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{top_side_effects, TOP_EFFECTS};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fda::AdverseEvents;
use crate::models::ComparisonItem;

const OPENAI_SERVICE: &str = "openai";
/// Reports inspected when listing reactions in the prompt.
const PROMPT_SAMPLE: usize = 20;
const SUMMARY_TOKENS: u32 = 150;
const RECOMMENDATION_TOKENS: u32 = 200;

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a medical safety expert who provides clear, factual drug safety summaries.";
const COMPARISON_SYSTEM_PROMPT: &str =
    "You are a medical expert who provides practical drug safety comparisons.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short patient-friendly safety summary for one drug.
    async fn safety_summary(&self, drug_name: &str, events: &AdverseEvents) -> Result<String>;

    /// Which of the compared drugs is safest, and for whom.
    async fn comparison_recommendation(&self, items: &[ComparisonItem]) -> Result<String>;
}

// == Wire types ==

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// == OpenAI client ==

/// Chat-completions backed summarizer.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Builds a summarizer when an API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(key) = config.openai_api_key.as_deref() else {
            return Ok(None);
        };
        Self::new(
            key,
            config.openai_base_url.clone(),
            config.openai_model.clone(),
            config.fda_timeout(),
        )
        .map(Some)
    }

    async fn complete(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_completion_tokens: max_tokens,
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                service: OPENAI_SERVICE.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AppError::Upstream {
                service: OPENAI_SERVICE.to_string(),
                message: "empty completion".to_string(),
            });
        }
        debug!("Completion of {} chars from {}", text.len(), self.model);
        Ok(text)
    }
}

fn summary_prompt(drug_name: &str, events: &AdverseEvents) -> String {
    let effects = top_side_effects(&events.reports, PROMPT_SAMPLE, TOP_EFFECTS).join(", ");
    format!(
        "Analyze the following drug safety data for {drug_name} and provide a brief, clear \
         2-3 sentence safety summary:\n\n\
         Total Adverse Events Reported: {total}\n\
         Top Side Effects: {effects}\n\n\
         Provide a concise, patient-friendly summary that highlights the main safety concerns \
         and who should be careful. Be factual and avoid overstating risks. \
         Format: Start with the drug name and main concerns.",
        total = events.total_count,
    )
}

fn comparison_prompt(items: &[ComparisonItem]) -> String {
    let lines = items
        .iter()
        .map(|item| {
            format!(
                "- {}: Safety Score {}, Main Concern: {}",
                item.drug_name, item.safety_score, item.top_concern
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Compare the following drugs and provide a brief recommendation (2-3 sentences) on \
         which is safest and for whom:\n\n{lines}\n\n\
         Be practical and mention specific use cases or patient populations."
    )
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn safety_summary(&self, drug_name: &str, events: &AdverseEvents) -> Result<String> {
        let prompt = summary_prompt(drug_name, events);
        self.complete(SUMMARY_SYSTEM_PROMPT, &prompt, SUMMARY_TOKENS)
            .await
    }

    async fn comparison_recommendation(&self, items: &[ComparisonItem]) -> Result<String> {
        let prompt = comparison_prompt(items);
        self.complete(COMPARISON_SYSTEM_PROMPT, &prompt, RECOMMENDATION_TOKENS)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fda::{AdverseEventReport, Patient, Reaction};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summarizer(base: String) -> OpenAiSummarizer {
        OpenAiSummarizer::new("sk-test", base, "gpt-5-nano", Duration::from_secs(5)).unwrap()
    }

    fn events() -> AdverseEvents {
        let report = AdverseEventReport {
            safetyreportid: None,
            patient: Some(Patient {
                patientonsetage: None,
                reaction: vec![Reaction {
                    reactionmeddrapt: Some("Nausea".to_string()),
                }],
            }),
        };
        AdverseEvents {
            reports: vec![report],
            total_count: 4200,
        }
    }

    #[test]
    fn test_summary_prompt_lists_totals_and_effects() {
        let prompt = summary_prompt("Aspirin", &events());
        assert!(prompt.contains("data for Aspirin"));
        assert!(prompt.contains("Total Adverse Events Reported: 4200"));
        assert!(prompt.contains("Top Side Effects: Nausea"));
    }

    #[test]
    fn test_comparison_prompt_lists_every_drug() {
        let items = vec![
            ComparisonItem {
                drug_name: "Advil".into(),
                safety_score: 90.0,
                top_concern: "Watch for Nausea".into(),
            },
            ComparisonItem {
                drug_name: "Tylenol".into(),
                safety_score: 85.5,
                top_concern: "Monitor for side effects".into(),
            },
        ];
        let prompt = comparison_prompt(&items);
        assert!(prompt.contains("- Advil: Safety Score 90, Main Concern: Watch for Nausea"));
        assert!(prompt.contains("- Tylenol: Safety Score 85.5"));
    }

    #[tokio::test]
    async fn test_safety_summary_posts_chat_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-5-nano",
                "max_completion_tokens": 150
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  Aspirin is generally safe.  "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = summarizer(server.uri())
            .safety_summary("Aspirin", &events())
            .await
            .unwrap();
        assert_eq!(text, "Aspirin is generally safe.");
    }

    #[tokio::test]
    async fn test_error_status_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = summarizer(server.uri())
            .comparison_recommendation(&[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_empty_choices_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = summarizer(server.uri())
            .safety_summary("Aspirin", &events())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Config::default();
        assert!(OpenAiSummarizer::from_config(&config).unwrap().is_none());

        let config = Config {
            openai_api_key: Some("sk".into()),
            ..Config::default()
        };
        assert!(OpenAiSummarizer::from_config(&config).unwrap().is_some());
    }
}
