/*!
 * Core translation service implementation.
 *
 * `TranslationService` composes fragment masking with whichever backend was
 * injected at startup: mask, translate the remainder, unmask.
 */

use log::{debug, warn};
use std::sync::Arc;

use super::cache::truncate_text;
use super::masking::{mask, unmask};
use crate::errors::{MaskRestoreMismatch, TranslationError};
use crate::providers::Provider;

/// Longest excerpt of the offending text carried by a backend error
pub const ERROR_SNIPPET_CHARS: usize = 80;

/// Result of translating one piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    /// Translated text with surrounding whitespace of the input preserved.
    /// Empty when the backend produced nothing.
    pub text: String,
    /// Placeholders that could not be restored
    pub mismatches: Vec<MaskRestoreMismatch>,
    /// Whether the backend was consulted at all
    pub backend_called: bool,
}

impl TranslatedText {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            mismatches: Vec::new(),
            backend_called: false,
        }
    }
}

/// Translation service shared by every document task of a run
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<dyn Provider>,
}

impl TranslationService {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Translate `text`, leaving protected fragments untouched.
    ///
    /// Empty and whitespace-only text, and text that is nothing but protected
    /// fragments and punctuation, comes back unchanged without a backend call.
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslatedText, TranslationError> {
        let core = text.trim();
        if core.is_empty() {
            return Ok(TranslatedText::unchanged(text));
        }

        let leading_end = text.len() - text.trim_start().len();
        let trailing_start = leading_end + core.len();
        let (leading, trailing) = (&text[..leading_end], &text[trailing_start..]);

        let masked = mask(core);
        if !masked.has_translatable_content() {
            debug!("Nothing to translate in '{}'", truncate_text(core, 30));
            return Ok(TranslatedText::unchanged(text));
        }

        let raw = self
            .provider
            .translate(&masked.text, source_language, target_language)
            .await
            .map_err(|source| TranslationError::Backend {
                snippet: truncate_text(core, ERROR_SNIPPET_CHARS),
                source,
            })?;

        let raw = raw.trim();
        if raw.is_empty() {
            warn!(
                "{} returned an empty translation for '{}'",
                self.provider.name(),
                truncate_text(core, 30)
            );
            return Ok(TranslatedText {
                text: String::new(),
                mismatches: Vec::new(),
                backend_called: true,
            });
        }

        let restored = unmask(raw, &masked.map);
        Ok(TranslatedText {
            text: format!("{}{}{}", leading, restored.text, trailing),
            mismatches: restored.mismatches,
            backend_called: true,
        })
    }
}
