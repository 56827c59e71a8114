use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{build_http_client, status_error, Provider, RateLimiter};
use crate::errors::ProviderError;

/// Client for the public Google Translate web endpoint (`client=gtx`)
#[derive(Debug)]
pub struct GoogleTranslate {
    /// Base URL, e.g. `https://translate.googleapis.com`
    endpoint: String,
    /// HTTP client for making requests
    client: Client,
    /// Longest text accepted in a single request
    max_chars_per_request: usize,
    /// Optional pacing in requests per minute
    rate_limiter: Option<RateLimiter>,
}

impl GoogleTranslate {
    pub fn new(
        endpoint: impl Into<String>,
        timeout_secs: u64,
        max_chars_per_request: usize,
        rate_limit: Option<u32>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_http_client(timeout_secs)?,
            max_chars_per_request,
            rate_limiter: rate_limit.and_then(RateLimiter::per_minute),
        })
    }

    /// Build the request URL for one translation
    pub fn request_url(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Url, ProviderError> {
        let base = format!("{}/translate_a/single", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("client", "gtx"),
                ("sl", source_language),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", base, e)))
    }

    /// Extract the translation from the endpoint's nested-array JSON.
    ///
    /// The first element holds one `[translated, original, ...]` segment per
    /// sentence; the translation is their concatenation.
    pub fn parse_response(body: &str) -> Result<String, ProviderError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ProviderError::ParseError(format!("Invalid JSON: {}", e)))?;

        let segments = match value.get(0) {
            Some(Value::Array(segments)) => segments,
            Some(Value::Null) => return Ok(String::new()),
            _ => {
                return Err(ProviderError::ParseError(
                    "Response does not contain translation segments".to_string(),
                ));
            }
        };

        let mut translated = String::new();
        for segment in segments {
            match segment.get(0) {
                Some(Value::String(part)) => translated.push_str(part),
                Some(Value::Null) | None => {}
                Some(other) => {
                    return Err(ProviderError::ParseError(format!(
                        "Unexpected segment content: {}",
                        other
                    )));
                }
            }
        }

        Ok(translated)
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    fn name(&self) -> &str {
        "Google Translate"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let length = text.chars().count();
        if length > self.max_chars_per_request {
            return Err(ProviderError::RequestFailed(format!(
                "Text of {} characters exceeds the {} character request limit",
                length, self.max_chars_per_request
            )));
        }

        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let url = self.request_url(text, source_language, target_language)?;
        debug!("Google request for {} characters", length);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, body));
        }

        Self::parse_response(&body)
    }
}
