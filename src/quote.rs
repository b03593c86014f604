//! Quote API client
//! Request payloads, response interpretation and the HTTP backend

use crate::config::ApiConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Route of the generator on the quote service
pub const GENERATE_PATH: &str = "/api/quotes/generate";

// ============================================================================
// Request
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Motivation,
    Inspiration,
    Wisdom,
    Humor,
    Love,
    Success,
    Life,
    Friendship,
    Happiness,
    Random,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Motivation,
        Category::Inspiration,
        Category::Wisdom,
        Category::Humor,
        Category::Love,
        Category::Success,
        Category::Life,
        Category::Friendship,
        Category::Happiness,
        Category::Random,
    ];

    /// Wire tag
    pub fn tag(self) -> &'static str {
        match self {
            Category::Motivation => "motivation",
            Category::Inspiration => "inspiration",
            Category::Wisdom => "wisdom",
            Category::Humor => "humor",
            Category::Love => "love",
            Category::Success => "success",
            Category::Life => "life",
            Category::Friendship => "friendship",
            Category::Happiness => "happiness",
            Category::Random => "random",
        }
    }

    /// Capitalized tag for the picker
    pub fn label(self) -> String {
        let tag = self.tag();
        let mut chars = tag.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "العربية (Arabic)",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteLength {
    #[default]
    Medium,
}

/// Body of `POST /api/quotes/generate`
#[derive(Clone, PartialEq, Serialize, Debug)]
pub struct QuoteRequest {
    pub category: Category,
    pub length: QuoteLength,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Editable form state behind the controls
#[derive(Clone, Debug, Default)]
pub struct QuoteForm {
    pub category: Category,
    pub topic: String,
    pub style: String,
    pub language: Language,
}

impl QuoteForm {
    /// Snapshot the form; blank optional fields are dropped, the rest trimmed
    pub fn to_request(&self) -> QuoteRequest {
        QuoteRequest {
            category: self.category,
            length: QuoteLength::Medium,
            language: self.language,
            topic: non_blank(&self.topic),
            style: non_blank(&self.style),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// Response
// ============================================================================

#[derive(Clone, Deserialize, Debug)]
pub struct QuoteResponse {
    pub quote: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// What the display shows
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn from_response(response: QuoteResponse, fallback_author: &str) -> Self {
        let author = response
            .author
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| fallback_author.to_string());
        Self {
            text: response.quote,
            author,
        }
    }

    /// Clipboard form: `"<quote>" - <author>`
    pub fn clipboard_text(&self) -> String {
        format!("\"{}\" - {}", self.text, self.author)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{}", status_message(.status, .detail))]
    Status { status: u16, detail: Option<String> },

    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

fn status_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("HTTP {status}"),
    }
}

/// Turn a raw status + body into a parsed response
pub fn interpret_response(status: u16, body: &str) -> Result<QuoteResponse, QuoteError> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .unwrap_or_default()
            .detail
            .map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
        return Err(QuoteError::Status { status, detail });
    }

    Ok(serde_json::from_str(body)?)
}

/// Collapse any outcome into something displayable; failures are logged, never shown
pub fn resolve(result: Result<QuoteResponse, QuoteError>, api: &ApiConfig) -> Quote {
    match result {
        Ok(response) => Quote::from_response(response, &api.fallback_author),
        Err(e) => {
            log::error!("Error generating quote: {}", e);
            Quote {
                text: api.failure_quote.clone(),
                author: api.fallback_author.clone(),
            }
        }
    }
}

// ============================================================================
// Backends
// ============================================================================

/// Something that can turn a request into a quote, blocking the caller
pub trait QuoteBackend: Send + Sync {
    fn generate(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError>;
}

pub struct HttpQuoteBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpQuoteBackend {
    pub fn new(api: &ApiConfig) -> Result<Self, QuoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint_url(&api.base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH)
}

impl QuoteBackend for HttpQuoteBackend {
    fn generate(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError> {
        log::debug!("POST {} {:?}", self.endpoint, request);
        let response = self.client.post(&self.endpoint).json(request).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        interpret_response(status, &body)
    }
}
