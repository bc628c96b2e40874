// Depth-first event extraction.
//
// Every leaf becomes one EventRecord carrying the context that applied at
// that point in the tree: the current category, the tag labels of every
// enclosing group (outermost first), the internal links collected along the
// way, and the leaf's own links split into internal and citation sets.
//
// Context travels down the recursion by value. A group hands its children an
// extended copy, so nothing a group adds can leak to its siblings and there
// is no stack to unwind.
//
// Unexpected shapes are skipped and reported in `Extraction::skipped`. One
// bad subtree costs its own events, not the whole day.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::tree::{EventNode, EventSection};
use crate::db::models::EventRecord;
use crate::error::ChronicleError;

/// Records extracted from one section, plus anything that had to be skipped.
#[derive(Debug, Default)]
pub struct Extraction {
    pub events: Vec<EventRecord>,
    pub skipped: Vec<ChronicleError>,
}

/// Inherited context for a subtree.
#[derive(Debug, Clone, Default)]
struct Context {
    tags: Vec<String>,
    refs: BTreeSet<String>,
}

impl Context {
    fn extended(&self, tag: &str, refs: impl IntoIterator<Item = String>) -> Self {
        let mut next = self.clone();
        next.tags.push(tag.to_string());
        next.refs.extend(refs);
        next
    }
}

struct Walker {
    date: NaiveDate,
    category: String,
    out: Extraction,
}

/// Extract every event in `section`, in document order.
pub fn extract_events(section: &EventSection) -> Extraction {
    let mut walker = Walker {
        date: section.date,
        category: String::new(),
        out: Extraction::default(),
    };

    for (i, node) in section.nodes.iter().enumerate() {
        let path = format!("/{i}");
        match node {
            EventNode::Marker { text } => {
                walker.category = strip_line_terminator(text).to_string();
                debug!(category = %walker.category, "Category marker");
            }
            EventNode::List { items } => {
                let root = Context::default();
                for (j, item) in items.iter().enumerate() {
                    walker.walk(item, &root, format!("{path}/{j}"));
                }
            }
            EventNode::Item { .. } => walker.skip(path, "list item outside of a list"),
        }
    }

    debug!(
        date = %section.date,
        events = walker.out.events.len(),
        skipped = walker.out.skipped.len(),
        "Section extracted"
    );
    walker.out
}

impl Walker {
    fn walk(&mut self, node: &EventNode, ctx: &Context, path: String) {
        match node {
            EventNode::Item {
                text,
                links,
                nested: Some(children),
            } => {
                // Every link on a group label is an internal tag reference,
                // whatever its citation flag says.
                let inner = ctx.extended(text, links.iter().map(|l| l.href.clone()));
                for (j, child) in children.iter().enumerate() {
                    self.walk(child, &inner, format!("{path}/{j}"));
                }
            }
            EventNode::Item {
                text,
                links,
                nested: None,
            } => {
                let mut internal_refs = ctx.refs.clone();
                let mut external_refs = BTreeSet::new();
                for link in links {
                    if link.citation {
                        external_refs.insert(link.href.clone());
                    } else {
                        internal_refs.insert(link.href.clone());
                    }
                }
                self.out.events.push(EventRecord {
                    id: -1,
                    date: self.date,
                    category: self.category.clone(),
                    tags: ctx.tags.clone(),
                    text: text.clone(),
                    internal_refs,
                    external_refs,
                });
            }
            EventNode::Marker { .. } => self.skip(path, "category marker below the top level"),
            EventNode::List { .. } => self.skip(path, "list nested directly inside a list"),
        }
    }

    fn skip(&mut self, path: String, reason: &str) {
        warn!(date = %self.date, path = %path, reason, "Skipping malformed subtree");
        self.out.skipped.push(ChronicleError::structural(path, reason));
    }
}

fn strip_line_terminator(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}
