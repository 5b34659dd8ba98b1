pub mod analysis;
pub mod config;
pub mod content;
pub mod export;
pub mod extractor;
pub mod fetcher;
pub mod ingest;
