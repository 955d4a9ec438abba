// src/llm_address.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{LlmConfig, secret_from_env};
use crate::error::{Error, Result};
use crate::normalize::address::ParsedAddress;
use crate::normalize::states;

/// Instructs the model to split one address fragment.
const SYSTEM_PROMPT: &str = r#"You split U.S. and Indian postal address fragments.
Given text containing a city, state and ZIP/PIN code, return ONLY valid JSON:

{
  "City": "string or null",
  "State": "two-letter state abbreviation or null (e.g. CA for California, NY for New York)",
  "Zip Code": "string or null"
}

Use null for parts you cannot determine. No markdown fences, no commentary."#;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Reply schema, keyed the way the prompt asks.
#[derive(Debug, Deserialize)]
struct AddressReply {
    #[serde(rename = "City", default)]
    city: Option<String>,
    #[serde(rename = "State", default)]
    state: Option<String>,
    #[serde(rename = "Zip Code", default)]
    zip_code: Option<String>,
}

/// Chat-completions backed address splitter.
pub struct LlmAddressResolver {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl LlmAddressResolver {
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = if cfg.api_key_env.is_empty() {
            None
        } else {
            Some(secret_from_env(&cfg.api_key_env)?)
        };
        info!(url = %cfg.base_url, model = %cfg.model, "Using LLM address resolution");

        Ok(Self {
            client: Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }

    /// Split `fragment`. Any failure comes back as all-`None`.
    pub async fn resolve(&self, fragment: &str) -> ParsedAddress {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return ParsedAddress::default();
        }

        match self.request(fragment).await {
            Ok(parsed) => {
                info!(?parsed, "Extracted City/State/Zip");
                parsed
            }
            Err(e) => {
                error!(error = %e, "Error extracting City, State, Zip Code");
                ParsedAddress::default()
            }
        }
    }

    async fn request(&self, fragment: &str) -> Result<ParsedAddress> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Extract and separate City, State, and Zip Code from the following address:\n\n{fragment}"
                    ),
                },
            ],
            temperature: 0.2,
            max_tokens: 200,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(self.timeout)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ServiceStatus { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| Error::MalformedResult("empty response from LLM".to_string()))?;

        parse_reply(content)
    }
}

/// Turn the model's reply into a [`ParsedAddress`].
///
/// Tolerates code fences and leading reasoning text. A full state name is
/// abbreviated; an unrecognized state is kept but logged.
pub fn parse_reply(content: &str) -> Result<ParsedAddress> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let json_str = extract_json_object(trimmed)?;
    let reply: AddressReply = serde_json::from_str(json_str)?;

    let state = non_blank(reply.state).map(|s| states::normalize_state(&s));
    if let Some(code) = state.as_deref() {
        match states::full_name(code) {
            Some(name) => debug!(state = %code, name, "LLM state resolved"),
            None if !states::is_known(code) => {
                warn!(state = %code, "LLM returned an unrecognized state")
            }
            None => {}
        }
    }

    Ok(ParsedAddress {
        city: non_blank(reply.city),
        state,
        zip_code: non_blank(reply.zip_code),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The outermost `{...}` of a reply that may carry surrounding text.
fn extract_json_object(s: &str) -> Result<&str> {
    let malformed = |why: &str| Error::MalformedResult(format!("{why} in LLM response"));
    let start = s.find('{').ok_or_else(|| malformed("no '{'"))?;
    let end = s.rfind('}').ok_or_else(|| malformed("no '}'"))?;
    if end <= start {
        return Err(malformed("unbalanced JSON"));
    }
    Ok(&s[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply() {
        let parsed = parse_reply(r#"{"City": "Austin", "State": "TX", "Zip Code": "78701"}"#).unwrap();
        assert_eq!(parsed.city.as_deref(), Some("Austin"));
        assert_eq!(parsed.state.as_deref(), Some("TX"));
        assert_eq!(parsed.zip_code.as_deref(), Some("78701"));
    }

    #[test]
    fn test_fenced_reply_with_full_state_name() {
        let reply = "```json\n{\"City\": \"Raleigh\", \"State\": \"North Carolina\", \"Zip Code\": \"27601\"}\n```";
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.state.as_deref(), Some("NC"));
    }

    #[test]
    fn test_indian_and_unknown_states_kept() {
        let parsed = parse_reply(r#"{"City": "Pune", "State": "Maharashtra", "Zip Code": "411001"}"#).unwrap();
        assert_eq!(parsed.state.as_deref(), Some("MH"));
        assert_eq!(states::full_name("MH"), None);

        let parsed = parse_reply(r#"{"City": "Toronto", "State": "Ontario", "Zip Code": null}"#).unwrap();
        assert_eq!(parsed.state.as_deref(), Some("Ontario"));
    }

    #[test]
    fn test_reasoning_prefix_and_nulls() {
        let reply = "<think>no zip here</think>\n{\"City\": \"Pune\", \"State\": \"\", \"Zip Code\": null}";
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(
            parsed,
            ParsedAddress {
                city: Some("Pune".into()),
                state: None,
                zip_code: None,
            }
        );
    }

    #[test]
    fn test_garbage_reply_is_error() {
        assert!(parse_reply("I cannot help with that").is_err());
        assert!(parse_reply("} {").is_err());
        assert!(parse_reply("{\"City\": 5}").is_err());
    }

    #[test]
    fn test_blank_key_env_means_no_auth() {
        let cfg = LlmConfig {
            api_key_env: String::new(),
            ..LlmConfig::default()
        };
        let resolver = LlmAddressResolver::from_config(&cfg).unwrap();
        assert!(resolver.api_key.is_none());
        assert_eq!(resolver.base_url, "http://localhost:11434/v1");
    }

    #[tokio::test]
    async fn test_blank_fragment_skips_request() {
        let cfg = LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key_env: String::new(),
            ..LlmConfig::default()
        };
        let resolver = LlmAddressResolver::from_config(&cfg).unwrap();
        assert_eq!(resolver.resolve("   ").await, ParsedAddress::default());
    }
}
