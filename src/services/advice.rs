use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{config::Config, services::metrics::ADVICE_COUNTER};

/// Answer returned when no API key is configured.
pub const NOT_CONFIGURED: &str = "AI not configured. Set GEMINI_API_KEY to use the AI features.";

/// Prefix of every answer that reports a failed call.
pub const ERROR_PREFIX: &str = "Error calling AI: ";

const PERSONA: &str = "You are NutriCare+, a friendly AI nutritionist for children. Answer simply: ";

/// Backend that turns one prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Gemini `generateContent` over REST.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Join the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini returned {}: {}", status, text);
        }

        let body: GenerateResponse = response.json().await?;
        extract_text(body).ok_or_else(|| anyhow::anyhow!("Gemini returned no text"))
    }
}

/// Forwards caregiver questions to the text generator. `ask` always yields a
/// displayable answer: failures come back as [`ERROR_PREFIX`] strings.
pub struct AdviceService {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AdviceService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Returns an unconfigured service if no API key is set.
    pub fn from_config(config: &Config) -> Self {
        let generator = config.gemini_api_key.clone().map(|key| {
            Arc::new(GeminiClient::new(
                key,
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )) as Arc<dyn TextGenerator>
        });
        Self::new(generator)
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Ask a question in the NutriCare+ persona.
    pub async fn ask(&self, question: &str) -> String {
        self.complete(&format!("{PERSONA}{question}")).await
    }

    /// Send `prompt` as-is.
    pub async fn complete(&self, prompt: &str) -> String {
        let Some(generator) = &self.generator else {
            return NOT_CONFIGURED.to_string();
        };

        match generator.generate(prompt).await {
            Ok(text) => {
                ADVICE_COUNTER.with_label_values(&["ok"]).inc();
                text
            }
            Err(e) => {
                tracing::warn!("Advice call failed: {:#}", e);
                ADVICE_COUNTER.with_label_values(&["error"]).inc();
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }
}
