//! HTTP probe primitive: one client, sequential requests, faults as values.

use std::time::Duration;

use anyhow::Result;
use chrono::DateTime;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// A network-level fault observed while probing. These are recorded as
/// failed results, never propagated to abort the run.
#[derive(Debug, Error)]
pub enum ProbeFault {
    #[error("request timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("connection error - server may not be running ({0})")]
    ConnectionFailed(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outcome of a single probe.
#[derive(Debug)]
pub enum ProbeOutcome {
    Response { status: StatusCode, body: String },
    Fault(ProbeFault),
}

impl ProbeOutcome {
    /// Parse the response body as JSON, if there is one and it parses.
    pub fn json(&self) -> Option<Value> {
        match self {
            ProbeOutcome::Response { body, .. } => serde_json::from_str(body).ok(),
            ProbeOutcome::Fault(_) => None,
        }
    }
}

/// HTTP client bound to one base URL. All calls are blocking from the
/// harness's point of view: one request in flight at a time.
pub struct ProbeClient {
    client: Client,
    base_url: String,
}

impl ProbeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, timeout: Duration) -> ProbeOutcome {
        self.send(Method::GET, path, None, None, timeout).await
    }

    pub async fn put(&self, path: &str, timeout: Duration) -> ProbeOutcome {
        self.send(Method::PUT, path, None, None, timeout).await
    }

    pub async fn post_json(&self, path: &str, payload: &Value, timeout: Duration) -> ProbeOutcome {
        self.send(Method::POST, path, Some(payload), None, timeout)
            .await
    }

    /// POST a raw (deliberately non-JSON) body with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &str, timeout: Duration) -> ProbeOutcome {
        self.send(Method::POST, path, None, Some(body.to_string()), timeout)
            .await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        json: Option<&Value>,
        raw: Option<String>,
        timeout: Duration,
    ) -> ProbeOutcome {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url).timeout(timeout);
        if let Some(payload) = json {
            request = request.json(payload);
        }
        if let Some(body) = raw {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return ProbeOutcome::Fault(classify_transport(e, timeout)),
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => ProbeOutcome::Response { status, body },
            Err(e) => ProbeOutcome::Fault(classify_transport(e, timeout)),
        }
    }
}

fn classify_transport(error: reqwest::Error, timeout: Duration) -> ProbeFault {
    if error.is_timeout() {
        ProbeFault::TimedOut(timeout)
    } else if error.is_connect() {
        ProbeFault::ConnectionFailed(error.to_string())
    } else {
        ProbeFault::Transport(error.to_string())
    }
}

/// Return the subset of `required` keys absent from `body`.
/// Empty result means the shape is valid.
pub fn missing_fields<'a>(body: &Value, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .filter(|field| body.get(**field).is_none())
        .copied()
        .collect()
}

/// Return the subset of `fields` present in `body`.
pub fn present_fields<'a>(body: &Value, fields: &[&'a str]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|field| body.get(**field).is_some())
        .copied()
        .collect()
}

/// Check newest-first ordering of a date-sorted listing.
///
/// Only the first two items are compared, not the full sequence. Items carry
/// the timestamp in `date` or `createdAt` (RFC 3339). Returns None when
/// fewer than two items, or either timestamp is missing or unparseable.
pub fn newest_first(items: &[Value]) -> Option<bool> {
    let first = item_timestamp(items.first()?)?;
    let second = item_timestamp(items.get(1)?)?;
    Some(first >= second)
}

fn item_timestamp(item: &Value) -> Option<DateTime<chrono::FixedOffset>> {
    let raw = item
        .get("date")
        .and_then(Value::as_str)
        .or_else(|| item.get("createdAt").and_then(Value::as_str))?;
    DateTime::parse_from_rfc3339(raw).ok()
}
