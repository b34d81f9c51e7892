//! Optional brand mission summary from an external text-generation API.

use crate::error::SummaryError;
use crate::utils::truncate_chars;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TOKENS: u32 = 150;
const HOMEPAGE_PROMPT_CAP: usize = 2000;
const ABOUT_PROMPT_CAP: usize = 1500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait BrandSummarizer: Send + Sync {
    /// A short mission statement, or `None` when one can't be produced
    async fn summarize(
        &self,
        business_name: &str,
        tagline: Option<&str>,
        homepage_text: &str,
        about_text: Option<&str>,
    ) -> Option<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Chat-completions backed summarizer
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self, SummaryError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Key read from `OPENAI_API_KEY`; without one every summary is `None`
    pub fn from_env(model: impl Into<String>) -> Result<Self, SummaryError> {
        Self::new(std::env::var("OPENAI_API_KEY").ok(), model)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn complete(&self, api_key: &str, prompt: String) -> Result<Option<String>, SummaryError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt),
            }],
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SummaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("null"));
        Ok(reply)
    }
}

#[async_trait]
impl BrandSummarizer for OpenAiSummarizer {
    async fn summarize(
        &self,
        business_name: &str,
        tagline: Option<&str>,
        homepage_text: &str,
        about_text: Option<&str>,
    ) -> Option<String> {
        let api_key = self.api_key.as_deref()?;
        let prompt = mission_prompt(business_name, tagline, homepage_text, about_text);

        match self.complete(api_key, prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                ::log::warn!("Brand summary for {} failed: {}", business_name, e);
                None
            }
        }
    }
}

/// Summarizer for runs without an API key
pub struct NoopSummarizer;

#[async_trait]
impl BrandSummarizer for NoopSummarizer {
    async fn summarize(
        &self,
        _business_name: &str,
        _tagline: Option<&str>,
        _homepage_text: &str,
        _about_text: Option<&str>,
    ) -> Option<String> {
        None
    }
}

fn mission_prompt(
    business_name: &str,
    tagline: Option<&str>,
    homepage_text: &str,
    about_text: Option<&str>,
) -> String {
    let mut prompt = String::from(
        "You are a brand strategist. Based on the following website content, write a concise 1-2 sentence brand mission statement.\n\n",
    );
    prompt.push_str(&format!("Business name: {}\n", business_name));
    if let Some(tagline) = tagline {
        prompt.push_str(&format!("Tagline: {}\n", tagline));
    }
    prompt.push_str(&format!(
        "\nHomepage text (first {} chars):\n{}\n\n",
        HOMEPAGE_PROMPT_CAP,
        truncate_chars(homepage_text, HOMEPAGE_PROMPT_CAP)
    ));
    if let Some(about) = about_text {
        prompt.push_str(&format!(
            "About page text (first {} chars):\n{}\n\n",
            ABOUT_PROMPT_CAP,
            truncate_chars(about, ABOUT_PROMPT_CAP)
        ));
    }
    prompt.push_str(
        "Respond with ONLY the mission statement text, no quotes, no preamble. If you cannot determine a mission, respond with exactly: null",
    );
    prompt
}
