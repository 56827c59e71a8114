/*!
 * # doctrans - documentation tree mirror and translator
 *
 * Mirrors a directory of HTML documentation into a second tree, translating
 * the prose of every page while copying all other files verbatim.
 *
 * ## Features
 *
 * - Markup, `script`/`style`/`code`/`pre` content, inline code spans, URLs
 *   and file names are never sent for translation
 * - Two ordered phases (copy assets, then translate pages) on a bounded
 *   worker pool
 * - Cooperative Ctrl-C cancellation that never leaves a half-written file
 * - Interchangeable backends:
 *   - Google Translate web endpoint
 *   - Ollama (local LLM)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: masking, text translation and HTML document translation:
 *   - `translation::masking`: protected fragment masking
 *   - `translation::core`: the text translator
 *   - `translation::cache`: per-document translation cache
 *   - `translation::document`: document tree model and translator
 * - `replicator`: source tree enumeration and work item creation
 * - `scheduler`: two-phase bounded-concurrency execution
 * - `cancellation`: the run's cancellation flag and interrupt wiring
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: translation backend clients
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod cancellation;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod replicator;
pub mod scheduler;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use cancellation::{CancellationController, RunState};
pub use errors::{DocumentError, FilesystemError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use replicator::{TreeReplicator, WorkItem};
pub use scheduler::{PipelineScheduler, RunStatus, RunSummary, TaskOutcome};
pub use translation::TranslationService;
