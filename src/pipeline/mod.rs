// Pipeline stages: scrape, resolve references, refetch, export, cluster.

pub mod cluster;
pub mod export;
pub mod references;
pub mod refetch;
pub mod scrape;
