/*!
 * Document translation.
 *
 * Walks a parsed page, sends each eligible text node through the
 * `TranslationService`, and writes the re-serialized page atomically.
 */

use log::{debug, warn};
use serde::Serialize;
use std::path::Path;

use super::model::DocumentTree;
use crate::cancellation::CancellationController;
use crate::errors::{DocumentError, FilesystemError};
use crate::file_utils::FileManager;
use crate::translation::cache::TranslationCache;
use crate::translation::core::TranslationService;

/// What happened to one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// Text nodes replaced with backend output
    pub translated_nodes: usize,
    /// Text nodes under script/style/code/pre, left verbatim
    pub protected_nodes: usize,
    /// Eligible nodes kept as-is (blank, nothing translatable, empty result)
    pub unchanged_nodes: usize,
    /// Nodes answered from the per-document cache
    pub cache_hits: usize,
    /// Placeholders the backend mangled; they remain in the output verbatim
    pub unrestored_placeholders: usize,
    pub xml_declaration_stripped: bool,
}

/// Translates whole documents with a shared service and cancellation flag
#[derive(Debug, Clone)]
pub struct DocumentTranslator {
    service: TranslationService,
    cancellation: CancellationController,
}

impl DocumentTranslator {
    pub fn new(service: TranslationService, cancellation: CancellationController) -> Self {
        Self {
            service,
            cancellation,
        }
    }

    /// Translate `tree` in place.
    ///
    /// The cancellation flag is polled before every text node; once raised the
    /// document is abandoned with `DocumentError::Cancelled`. A backend failure
    /// on any node abandons the whole document.
    pub async fn translate_tree(
        &self,
        tree: &mut DocumentTree,
        source_language: &str,
        target_language: &str,
    ) -> Result<DocumentReport, DocumentError> {
        let mut report = DocumentReport {
            xml_declaration_stripped: tree.strip_leading_xml_declaration(),
            ..Default::default()
        };
        let mut cache = TranslationCache::new();

        for node in tree.text_nodes() {
            if node.protected {
                report.protected_nodes += 1;
                continue;
            }
            if self.cancellation.is_shutting_down() {
                return Err(DocumentError::Cancelled);
            }

            let Some(original) = tree.text(node.id).map(str::to_string) else {
                continue;
            };

            if let Some(cached) = cache.get(&original) {
                report.cache_hits += 1;
                report.translated_nodes += 1;
                tree.set_text(node.id, cached);
                continue;
            }

            let translated = self
                .service
                .translate(&original, source_language, target_language)
                .await?;

            for mismatch in &translated.mismatches {
                warn!("{}", mismatch);
            }
            report.unrestored_placeholders += translated.mismatches.len();

            if !translated.backend_called || translated.text.is_empty() {
                report.unchanged_nodes += 1;
                continue;
            }

            cache.store(&original, &translated.text);
            tree.set_text(node.id, translated.text);
            report.translated_nodes += 1;
        }

        Ok(report)
    }

    /// Parse, translate and re-serialize an HTML byte stream
    pub async fn translate_html(
        &self,
        html: &[u8],
        source_language: &str,
        target_language: &str,
    ) -> Result<(Vec<u8>, DocumentReport), DocumentError> {
        let mut tree = DocumentTree::parse(html)?;
        let report = self
            .translate_tree(&mut tree, source_language, target_language)
            .await?;
        let output = tree.to_html().map_err(DocumentError::Serialize)?;
        Ok((output, report))
    }

    /// Translate `source` into `destination`.
    ///
    /// Nothing is written unless the whole document succeeded; the output is
    /// renamed into place so readers never observe a partial file.
    pub async fn translate_file(
        &self,
        source: &Path,
        destination: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<DocumentReport, DocumentError> {
        let read_error = |source_error| FilesystemError::Read {
            path: source.to_path_buf(),
            source: source_error,
        };
        let html = tokio::fs::read(source).await.map_err(read_error)?;
        let permissions = tokio::fs::metadata(source)
            .await
            .map_err(read_error)?
            .permissions();

        let (output, report) = self
            .translate_html(&html, source_language, target_language)
            .await?;

        let destination_path = destination.to_path_buf();
        tokio::task::spawn_blocking(move || {
            FileManager::write_atomically(&destination_path, &output, Some(permissions))
        })
        .await
        .map_err(|e| FilesystemError::Write {
            path: destination.to_path_buf(),
            source: std::io::Error::other(e),
        })??;

        debug!(
            "{:?}: {} translated, {} protected, {} unchanged, {} cache hits",
            source,
            report.translated_nodes,
            report.protected_nodes,
            report.unchanged_nodes,
            report.cache_hits
        );
        Ok(report)
    }
}
