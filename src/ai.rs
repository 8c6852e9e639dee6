use reqwest::blocking::Client;
use serde_json::{json, Value};

use crate::config::AiConfig;
use crate::error::{ReportError, Result};
use crate::types::Takeaway;

const DEFAULT_TAKEAWAY_PROMPT: &str = "Based on the event description given, identify exactly five key problem-focused takeaways related to social service and substance abuse. Keep it a line or two each. Focus on the specific difficulties, dilemmas, and impacts discussed, rather than just general event outcomes. Format each takeaway with a title and description separated by a colon, without any asterisks (use numbers). Do not include the phrase 'Key Takeaways'. Example format:
Takeaway Title: Takeaway";

/// Text generation used while assembling a report.
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String>;
    fn takeaways(&self, text: &str, prompt_override: Option<&str>) -> Result<Vec<Takeaway>>;
}

/// Gemini `generateContent` client. Without a key every call passes through.
pub struct GeminiSummarizer {
    api_key: Option<String>,
    config: AiConfig,
    client: Client,
}

impl GeminiSummarizer {
    pub fn new(api_key: Option<String>, config: AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReportError::Ai(format!("Could not create HTTP client: {}", e)))?;
        Ok(GeminiSummarizer {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            config,
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
    }

    fn generate(&self, key: &str, prompt: &str) -> std::result::Result<String, String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        log::info!("Requesting completion from {}", self.config.model);

        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    "Check your internet connection and try again.".to_string()
                } else {
                    format!("Network error: {}", e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(format!(
                "Request failed ({}): {}",
                status,
                if body.is_empty() { "Invalid API key or model?" } else { body.as_str() }
            ));
        }
        let json: Value = response.json().map_err(|e| format!("Invalid JSON: {}", e))?;
        extract_text(&json)
    }

    fn summary_prompt(&self, text: &str) -> String {
        format!(
            "I'm going to give you the details of an event by {org}. Write a report for it made of 2 paragraphs (do not label them paragraph 1, paragraph 2 etc.) of about 200 words in total, each with a few lines about what took place and what was discussed, and mention {org}. Here are the details: {text}",
            org = self.config.organization,
            text = text
        )
    }
}

impl Summarizer for GeminiSummarizer {
    fn summarize(&self, text: &str) -> Result<String> {
        let Some(key) = self.api_key.as_deref() else {
            log::debug!("No API key configured, using description as summary");
            return Ok(text.to_string());
        };
        self.generate(key, &self.summary_prompt(text))
            .map(|s| s.trim().to_string())
            .map_err(|e| ReportError::Ai(format!("Error in text summarization: {}", e)))
    }

    fn takeaways(&self, text: &str, prompt_override: Option<&str>) -> Result<Vec<Takeaway>> {
        let Some(key) = self.api_key.as_deref() else {
            log::debug!("No API key configured, skipping takeaways");
            return Ok(Vec::new());
        };
        let prompt = prompt_override
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_TAKEAWAY_PROMPT);
        let prompt = format!("{}\nEvent Description: {}", prompt, text);
        let raw = self
            .generate(key, &prompt)
            .map_err(|e| ReportError::Ai(format!("Error generating takeaways: {}", e)))?;
        let takeaways = parse_takeaways(&raw);
        if takeaways.len() != 5 {
            log::warn!("Expected 5 takeaways, model returned {}", takeaways.len());
        }
        Ok(takeaways)
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(json: &Value) -> std::result::Result<String, String> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| format!("API error: {}", m))
                .unwrap_or_else(|| "No candidates in response".to_string())
        })?;
    Ok(parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .concat())
}

/// Non-empty lines not starting with a bullet, with asterisks removed.
pub fn parse_takeaway_lines(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(&['•', '-', '*'][..]))
        .map(|line| line.replace('*', "").trim().to_string())
        .collect()
}

pub fn parse_takeaways(raw: &str) -> Vec<Takeaway> {
    parse_takeaway_lines(raw)
        .iter()
        .map(|line| Takeaway::parse(line))
        .collect()
}
