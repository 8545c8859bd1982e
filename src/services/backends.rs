use std::time::Duration;

use quick_xml::escape::unescape;
use regex::Regex;
use reqwest::blocking::{Client, Response};
use serde_json::Value;
use thiserror::Error;

const GTX_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const WEB_ENDPOINT: &str = "https://translate.google.com/m";
const USER_AGENT: &str = concat!("po-autotranslate/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("service returned an empty translation")]
    Empty,

    #[error("no translation backend configured")]
    NoBackend,
}

/// A translation service able to turn `text` from `source` into `target`.
pub trait TranslationBackend: Send + Sync {
    fn name(&self) -> &str;

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, BackendError>;
}

/// Primary then secondary Google Translate endpoints sharing one HTTP client.
pub fn default_backends(timeout: Duration) -> Result<Vec<Box<dyn TranslationBackend>>, BackendError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;

    let primary: Box<dyn TranslationBackend> = Box::new(GoogleApiBackend::new(client.clone()));
    let secondary: Box<dyn TranslationBackend> = Box::new(GoogleWebBackend::new(client)?);
    Ok(vec![primary, secondary])
}

/// The public `translate_a/single` JSON endpoint (`client=gtx`).
pub struct GoogleApiBackend {
    client: Client,
    endpoint: String,
}

impl GoogleApiBackend {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, GTX_ENDPOINT)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        GoogleApiBackend {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl TranslationBackend for GoogleApiBackend {
    fn name(&self) -> &str {
        "google-api"
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, BackendError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?;

        let body = read_body(resp)?;
        parse_gtx_response(&body)
    }
}

/// Scrapes the mobile web page of Google Translate.
pub struct GoogleWebBackend {
    client: Client,
    endpoint: String,
    result_re: Regex,
}

impl GoogleWebBackend {
    pub fn new(client: Client) -> Result<Self, BackendError> {
        Self::with_endpoint(client, WEB_ENDPOINT)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Result<Self, BackendError> {
        Ok(GoogleWebBackend {
            client,
            endpoint: endpoint.into(),
            result_re: result_container_regex()?,
        })
    }
}

impl TranslationBackend for GoogleWebBackend {
    fn name(&self) -> &str {
        "google-web"
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, BackendError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("sl", source), ("tl", target), ("hl", target), ("q", text)])
            .send()?;

        let body = read_body(resp)?;
        extract_web_result(&self.result_re, &body)
    }
}

fn read_body(resp: Response) -> Result<String, BackendError> {
    let status = resp.status();

    // Read as text first so a failed status still carries the service's message.
    let text = resp.text()?;

    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            message: extract_error_message(&text),
        });
    }

    Ok(text)
}

fn extract_error_message(body_text: &str) -> String {
    // { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body_text.trim();
    match trimmed.char_indices().nth(400) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn non_empty(text: String) -> Result<String, BackendError> {
    if text.trim().is_empty() {
        Err(BackendError::Empty)
    } else {
        Ok(text)
    }
}

/// Joins the translated segments of a `translate_a/single` reply:
/// `[[["Bonjour","Hello",null,null,10]],null,"en",...]`.
fn parse_gtx_response(body: &str) -> Result<String, BackendError> {
    let v: Value =
        serde_json::from_str(body).map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

    let segments = v
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| BackendError::InvalidResponse("missing sentence array".into()))?;

    let mut out = String::new();
    for seg in segments {
        if let Some(t) = seg.get(0).and_then(|t| t.as_str()) {
            out.push_str(t);
        }
    }

    non_empty(out)
}

fn result_container_regex() -> Result<Regex, regex::Error> {
    Regex::new(r#"(?s)<div class="result-container">(?P<text>.*?)</div>"#)
}

fn extract_web_result(re: &Regex, html: &str) -> Result<String, BackendError> {
    let caps = re
        .captures(html)
        .ok_or_else(|| BackendError::InvalidResponse("result container not found".into()))?;

    let raw = caps.name("text").map(|m| m.as_str()).unwrap_or_default();
    let text = unescape(raw.trim())
        .map_err(|err| BackendError::InvalidResponse(format!("bad entity in result: {err}")))?;
    non_empty(text.into_owned())
}
