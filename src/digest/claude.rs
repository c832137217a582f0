use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::digest::enrichment::TextEnrichment;
use crate::digest::parser::parse_enrichment;
use crate::digest::prompt::{enrichment_prompt, SYSTEM_PROMPT};
use crate::error::{Error, Result};
use crate::models::{ActivityDigest, ActivitySummary, Enrichment};

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

pub struct ClaudeEnricher {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

impl ClaudeEnricher {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl TextEnrichment for ClaudeEnricher {
    async fn enrich(
        &self,
        summary: &ActivitySummary,
        baseline: &ActivityDigest,
    ) -> Result<Enrichment> {
        let prompt = enrichment_prompt(summary, baseline);
        tracing::debug!("Requesting enrichment for {}", summary.subject);

        let request_body = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Enrichment(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Enrichment(format!(
                "Enrichment API error ({}): {}",
                status, body
            )));
        }

        let result: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::Enrichment(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = result.error {
            return Err(Error::Enrichment(error.message));
        }

        let text = result
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(Error::Enrichment("Empty enrichment response".to_string()));
        }

        parse_enrichment(&text)
    }

    fn name(&self) -> &str {
        "Claude"
    }
}
