/*!
 * Provider implementations for different translation backends.
 *
 * This module contains client implementations for the supported backends:
 * - Google: public Google Translate web endpoint
 * - Ollama: local LLM server
 * - Mock: deterministic in-process backend for tests
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod google;
pub mod mock;
pub mod ollama;

/// Common trait for all translation backends
///
/// The pipeline only ever sees this interface, so backends can be swapped
/// without touching masking, scheduling or cancellation.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Human readable backend name used in log lines
    fn name(&self) -> &str;

    /// Translate `text` from `source_language` to `target_language`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or the backend failure
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Client-side request pacing shared by all tasks using one provider
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    /// Limiter for `requests_per_minute`; `None` when the limit is disabled (0)
    pub fn per_minute(requests_per_minute: u32) -> Option<Self> {
        if requests_per_minute == 0 {
            return None;
        }
        Some(Self {
            interval: Duration::from_millis(60_000 / u64::from(requests_per_minute)),
            next_slot: Mutex::new(Instant::now()),
        })
    }

    /// Wait until the next request slot is available
    pub async fn acquire(&self) {
        let wait = {
            let mut next_slot = self.next_slot.lock();
            let now = Instant::now();
            let slot = (*next_slot).max(now);
            *next_slot = slot + self.interval;
            slot - now
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

/// Build the configured backend
pub fn create_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::Google => Arc::new(google::GoogleTranslate::new(
            config.get_endpoint(),
            config.get_timeout_secs(),
            config.get_max_chars_per_request(),
            config.get_rate_limit(),
        )?),
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(
            config.get_endpoint(),
            config.get_model(),
            config.common.system_prompt.clone(),
            config.common.temperature,
            config.get_timeout_secs(),
            config.get_rate_limit(),
        )?),
    };
    Ok(provider)
}

/// Shared HTTP client construction for the network providers
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))
}

/// Map a non-success HTTP status to a provider error
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimitExceeded(body)
    } else {
        ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        }
    }
}
