/*!
 * Translation caching functionality.
 *
 * A cache lives for the duration of one document and is owned by the worker
 * translating it, so repeated text nodes (navigation labels, headings) cost a
 * single backend call per page.
 */

use log::debug;
use std::collections::HashMap;

/// Translation cache for storing and retrieving translations
#[derive(Debug, Default)]
pub struct TranslationCache {
    /// Source text → translated text
    entries: HashMap<String, String>,

    hits: usize,

    misses: usize,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a translation from the cache
    pub fn get(&mut self, source_text: &str) -> Option<String> {
        match self.entries.get(source_text) {
            Some(translation) => {
                self.hits += 1;
                debug!("Cache hit for '{}'", truncate_text(source_text, 30));
                Some(translation.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a translation in the cache
    pub fn store(&mut self, source_text: &str, translation: &str) {
        self.entries
            .insert(source_text.to_string(), translation.to_string());
    }

    /// (hits, misses)
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

/// Truncate text for log output, respecting char boundaries
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
