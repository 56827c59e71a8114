/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::identity()` - Returns the text unchanged
 * - `MockProvider::tagged()` - Prefixes the text with the target language
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::fail_on(..)` - Fails only for text containing a marker
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Echo the input
    Identity,
    /// Return `[<target>] <text>`
    Tagged,
    /// Always fail with an API error
    Failing,
    /// Fail when the text contains the marker, otherwise behave like `Tagged`
    FailOn(String),
    /// Behave like `Tagged` after a delay
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    pub fn tagged() -> Self {
        Self::new(MockBehavior::Tagged)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_on(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOn(marker.into()))
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of translate calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn tag(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Identity => Ok(text.to_string()),
            MockBehavior::Tagged => Ok(Self::tag(text, target_language)),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated API failure".to_string(),
            }),
            MockBehavior::FailOn(marker) => {
                if text.contains(marker.as_str()) {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated failure for text containing '{}'",
                        marker
                    )))
                } else {
                    Ok(Self::tag(text, target_language))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(Self::tag(text, target_language))
            }
        }
    }
}
