// Event document tree: the closed set of node shapes the extractor walks.
//
// A day's section is a flat run of category markers and lists. Lists hold
// items; an item either carries a nested list (a tag group whose own text
// and links label everything beneath it) or is an event leaf.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An outgoing link on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    /// True for citation links (news sources), false for same-corpus links.
    #[serde(default)]
    pub citation: bool,
}

impl Link {
    pub fn internal(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            citation: false,
        }
    }

    pub fn citation(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            citation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventNode {
    /// Category heading; only meaningful directly under the section.
    Marker { text: String },
    /// A list of items.
    List { items: Vec<EventNode> },
    /// A list item. `nested` is `Some` for tag groups, `None` for events.
    Item {
        text: String,
        #[serde(default)]
        links: Vec<Link>,
        #[serde(default)]
        nested: Option<Vec<EventNode>>,
    },
}

impl EventNode {
    pub fn marker(text: impl Into<String>) -> Self {
        EventNode::Marker { text: text.into() }
    }

    pub fn list(items: Vec<EventNode>) -> Self {
        EventNode::List { items }
    }

    pub fn leaf(text: impl Into<String>, links: Vec<Link>) -> Self {
        EventNode::Item {
            text: text.into(),
            links,
            nested: None,
        }
    }

    pub fn group(label: impl Into<String>, links: Vec<Link>, nested: Vec<EventNode>) -> Self {
        EventNode::Item {
            text: label.into(),
            links,
            nested: Some(nested),
        }
    }
}

/// One day's worth of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSection {
    pub date: NaiveDate,
    pub nodes: Vec<EventNode>,
}

impl EventSection {
    pub fn new(date: NaiveDate, nodes: Vec<EventNode>) -> Self {
        Self { date, nodes }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
