/*!
 * HTML document handling.
 *
 * - `model`: arena document tree with html5ever parse/serialize
 * - `translator`: per-document translation over that tree
 */

pub mod model;
pub mod translator;

pub use model::{DocumentTree, NodeData, NodeId, TextNode, PROTECTED_TAGS};
pub use translator::{DocumentReport, DocumentTranslator};
