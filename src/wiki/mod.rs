// Retrieval: portal month pages, same-corpus articles, and cited news pages.

pub mod client;
pub mod pages;
pub mod rate_limiter;
pub mod traits;

pub use client::{WikiClient, DEFAULT_PORTAL_URL};
pub use traits::ArticleSource;
