// Entity extraction: salient terms used by entropy scoring.

pub mod keyword;
pub mod tagme;
pub mod traits;

pub use keyword::KeywordEntityExtractor;
pub use tagme::{TagMeClient, DEFAULT_TAGME_URL};
pub use traits::{salient_spots, EntityExtractor, SalientTerm, DEFAULT_CONFIDENCE_FLOOR};
