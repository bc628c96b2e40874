// Hierarchical event extraction: node tree, depth-first walker, and the
// portal HTML adapter.

pub mod html;
pub mod tree;
pub mod walker;

pub use tree::{EventNode, EventSection, Link};
pub use walker::{extract_events, Extraction};
