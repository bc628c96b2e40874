// Chronicle: current-events extraction and incremental topic clustering
//
// This is the library root. Each module corresponds to a stage of the
// pipeline: scrape the portal, extract events, store them with their
// references, enrich them for clustering, and group them into topics.

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod interchange;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod text;
pub mod topics;
pub mod wiki;
