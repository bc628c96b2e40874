// Topic modeling: term vectors, TF-IDF weighting, entropy scoring, and
// incremental clustering.

pub mod clustering;
pub mod entropy;
pub mod tfidf;
pub mod traits;
pub mod vector;
