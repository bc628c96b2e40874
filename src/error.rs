// Domain error taxonomy.
//
// Application glue keeps using anyhow::Result. These variants exist for the
// places where a caller has to tell the failure modes apart: structural
// problems are recovered inside extraction, storage failures abort the
// current item, upstream failures degrade a record, and ordering violations
// are refused by the clustering engine.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChronicleError {
    /// A document tree node had a shape the extractor does not expect.
    #[error("malformed node at {path}: {reason}")]
    Structural { path: String, reason: String },

    /// The storage backend could not be reached or rejected the query.
    #[error("storage lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),

    /// An entity-extraction or term-weighting service failed.
    #[error("{service} failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// A document arrived dated before one that was already clustered.
    #[error("document {id} dated {date} arrived after documents dated {latest}")]
    OrderingViolation {
        id: i64,
        date: NaiveDate,
        latest: NaiveDate,
    },
}

impl ChronicleError {
    pub fn structural(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Structural {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn upstream(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: err.to_string(),
        }
    }
}
