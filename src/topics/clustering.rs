// Incremental topic clustering over a date-ordered document stream.
//
// Each document either joins the most similar existing topic or opens a new
// one. A topic is a candidate only if
//
//   1. cosine(document, centroid) is strictly above the threshold, and
//   2. admitting the document keeps the topic's entropy rising over time:
//      no earlier member date may average a higher entropy, and no later
//      member date a lower one.
//
// The highest-similarity candidate wins (earliest topic on ties). Joining
// replaces the centroid with the average of the old centroid and the new
// vector, so a topic follows the drift of its most recent members.
//
// Documents must arrive in non-decreasing date order. The monotonicity check
// is only meaningful under that order, so an older document is refused
// rather than reordered.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::vector::WeightedVector;
use crate::error::ChronicleError;

/// Default cosine similarity a document must exceed to join a topic.
pub const DEFAULT_THRESHOLD: f64 = 0.35;

/// A clustering input: one scored event.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub date: NaiveDate,
    pub vector: WeightedVector,
    pub entropy: f64,
}

/// What a topic remembers about each member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicMember {
    pub date: NaiveDate,
    pub entropy: f64,
}

/// A group of related documents with a running centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub members: BTreeMap<i64, TopicMember>,
    pub centroid: WeightedVector,
}

impl Topic {
    /// Open a topic seeded by its first member.
    pub fn seeded(doc: &Document) -> Self {
        let mut members = BTreeMap::new();
        members.insert(
            doc.id,
            TopicMember {
                date: doc.date,
                entropy: doc.entropy,
            },
        );
        Self {
            members,
            centroid: doc.vector.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Average entropy per member date.
    ///
    /// Same-date values fold pairwise, `(avg + next) / 2`, in ascending id
    /// order, so later members of a date weigh more than a true mean would
    /// give them.
    pub fn entropy_by_date(&self) -> BTreeMap<NaiveDate, f64> {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for member in self.members.values() {
            by_date
                .entry(member.date)
                .and_modify(|avg| *avg = (*avg + member.entropy) / 2.0)
                .or_insert(member.entropy);
        }
        by_date
    }

    /// Would admitting a member with this date and entropy keep the topic's
    /// entropy non-decreasing over time?
    pub fn admits(&self, date: NaiveDate, entropy: f64) -> bool {
        self.entropy_by_date().into_iter().all(|(member_date, avg)| {
            if member_date < date {
                avg <= entropy
            } else if member_date > date {
                avg >= entropy
            } else {
                true
            }
        })
    }

    /// Add a member and move the centroid halfway toward its vector.
    fn absorb(&mut self, doc: &Document) {
        let previous = self.members.insert(
            doc.id,
            TopicMember {
                date: doc.date,
                entropy: doc.entropy,
            },
        );
        if previous.is_some() {
            warn!(id = doc.id, "Document already in topic, replacing its entry");
        }
        self.centroid = self.centroid.average_with(&doc.vector);
    }
}

/// Where a document ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment {
    /// Opened a new topic at this index.
    Opened { topic: usize },
    /// Joined the existing topic at this index.
    Joined { topic: usize, similarity: f64 },
}

impl Assignment {
    pub fn topic(&self) -> usize {
        match *self {
            Assignment::Opened { topic } | Assignment::Joined { topic, .. } => topic,
        }
    }
}

/// Single-writer owner of the topic collection for one clustering run.
#[derive(Debug, Clone)]
pub struct TopicClusterer {
    threshold: f64,
    topics: Vec<Topic>,
    latest: Option<NaiveDate>,
}

impl Default for TopicClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl TopicClusterer {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            topics: Vec::new(),
            latest: None,
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn into_topics(self) -> Vec<Topic> {
        self.topics
    }

    /// Score `doc` against every topic, then commit it to the best candidate
    /// or to a new topic.
    pub fn assign(&mut self, doc: &Document) -> Result<Assignment, ChronicleError> {
        if let Some(latest) = self.latest {
            if doc.date < latest {
                return Err(ChronicleError::OrderingViolation {
                    id: doc.id,
                    date: doc.date,
                    latest,
                });
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, topic) in self.topics.iter().enumerate() {
            let similarity = doc.vector.cosine(&topic.centroid);
            if similarity <= self.threshold {
                continue;
            }
            if best.is_some_and(|(_, s)| similarity <= s) {
                continue;
            }
            if !topic.admits(doc.date, doc.entropy) {
                debug!(
                    id = doc.id,
                    topic = idx,
                    similarity,
                    "Candidate rejected: entropy would decrease over time"
                );
                continue;
            }
            best = Some((idx, similarity));
        }

        self.latest = Some(doc.date);

        let assignment = match best {
            Some((idx, similarity)) => {
                self.topics[idx].absorb(doc);
                Assignment::Joined {
                    topic: idx,
                    similarity,
                }
            }
            None => {
                self.topics.push(Topic::seeded(doc));
                Assignment::Opened {
                    topic: self.topics.len() - 1,
                }
            }
        };

        debug!(id = doc.id, date = %doc.date, ?assignment, "Document assigned");
        Ok(assignment)
    }
}

/// Cluster a date-ordered sequence of documents.
pub fn cluster<'a, I>(documents: I, threshold: f64) -> Result<Vec<Topic>, ChronicleError>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut clusterer = TopicClusterer::new(threshold);
    for doc in documents {
        clusterer.assign(doc)?;
    }
    Ok(clusterer.into_topics())
}
