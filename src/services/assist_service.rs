use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::dto::assist_dto::ParsedJobFields;

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

const DRAFT_UNAVAILABLE: &str = "AI 服務目前不可用，請手動輸入描述。";
const DRAFT_EMPTY: &str = "無法生成描述，請稍後再試。";
const TIPS_UNAVAILABLE: &str = "無法連線至 AI 安全顧問。";
const TIPS_EMPTY: &str = "無法取得安全建議。";

/// Text-to-structured-data helper around the posting flow. Failures never
/// cross this boundary: callers get a human-readable fallback string or
/// `None`, and the posting flow keeps working without the adapter.
#[async_trait]
pub trait AssistAdapter: Send + Sync {
    async fn draft_description(
        &self,
        crop: &str,
        task: &str,
        pay: &str,
        owner_name: &str,
    ) -> String;

    async fn safety_tips(&self, task: &str) -> String;

    async fn parse_job_request(&self, input: &str) -> Option<ParsedJobFields>;
}

pub struct GeminiAssist {
    client: Client,
    api_key: String,
}

impl GeminiAssist {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    async fn generate(&self, payload: JsonValue) -> anyhow::Result<String> {
        let res = self
            .client
            .post(GEMINI_ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API Error {}: {}", status, text);
        }

        let body: JsonValue = res.json().await?;
        body.get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response format"))
    }
}

#[async_trait]
impl AssistAdapter for GeminiAssist {
    async fn draft_description(
        &self,
        crop: &str,
        task: &str,
        pay: &str,
        owner_name: &str,
    ) -> String {
        let prompt = format!(
            "You are a professional agricultural job recruiter in Taiwan. \
             Write a short, attractive, and clear job posting (in Traditional Chinese) for a farm worker. \
             Details: Crop: {}, Task: {}, Pay: {}, Recruiter: {}. \
             Tone: friendly. Keep under 100 words. Include emoji.",
            crop, task, pay, owner_name
        );
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        match self.generate(payload).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => DRAFT_EMPTY.to_string(),
            Err(err) => {
                tracing::error!(error = ?err, "description drafting failed");
                DRAFT_UNAVAILABLE.to_string()
            }
        }
    }

    async fn safety_tips(&self, task: &str) -> String {
        let prompt = format!(
            "Give me 3 brief, critical safety tips (in Traditional Chinese) for an \
             agricultural worker performing: \"{}\". Format as a bulleted list.",
            task
        );
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        match self.generate(payload).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => TIPS_EMPTY.to_string(),
            Err(err) => {
                tracing::error!(error = ?err, "safety tips failed");
                TIPS_UNAVAILABLE.to_string()
            }
        }
    }

    async fn parse_job_request(&self, input: &str) -> Option<ParsedJobFields> {
        let today = Utc::now().date_naive();
        let prompt = format!(
            "Extract agricultural job details from input (Traditional Chinese). \
             Context: Today is {}. Input: \"{}\"",
            today, input
        );
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "crop": { "type": "STRING" },
                        "task": { "type": "STRING" },
                        "location_district": { "type": "STRING" },
                        "salary_type": { "type": "STRING" },
                        "salary_amount": { "type": "NUMBER" },
                        "required_workers": { "type": "NUMBER" },
                        "date": { "type": "STRING" },
                        "time": { "type": "STRING" },
                        "terrain": { "type": "STRING", "enum": ["flat", "slope"] },
                        "notes_summary": { "type": "STRING" }
                    },
                    "required": ["crop", "task", "location_district", "salary_amount"]
                }
            }
        });

        match self.generate(payload).await {
            Ok(text) => match serde_json::from_str::<ParsedJobFields>(&text) {
                Ok(fields) => Some(fields),
                Err(err) => {
                    tracing::error!(error = ?err, "could not parse extraction output");
                    None
                }
            },
            Err(err) => {
                tracing::error!(error = ?err, "job request parsing failed");
                None
            }
        }
    }
}

/// Null-object fallback used when no API key is configured. Callers see the
/// same sentinel strings a failed remote call produces.
pub struct NullAssist;

#[async_trait]
impl AssistAdapter for NullAssist {
    async fn draft_description(&self, _: &str, _: &str, _: &str, _: &str) -> String {
        DRAFT_UNAVAILABLE.to_string()
    }

    async fn safety_tips(&self, _: &str) -> String {
        TIPS_UNAVAILABLE.to_string()
    }

    async fn parse_job_request(&self, _: &str) -> Option<ParsedJobFields> {
        None
    }
}
