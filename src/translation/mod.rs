/*!
 * Translation of HTML documentation pages.
 *
 * This module is split into several submodules:
 *
 * - `masking`: protects code spans, URLs and file names from the backend
 * - `core`: the text translator built on masking and a `Provider`
 * - `cache`: per-document cache of repeated text
 * - `document`: document tree model and the document translator
 */

pub use self::core::{TranslatedText, TranslationService};
pub use self::document::{DocumentReport, DocumentTranslator, DocumentTree};

pub mod cache;
pub mod core;
pub mod document;
pub mod masking;
