pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod activity;
pub mod scoring;
pub mod digest;
pub mod pipeline;
pub mod storage;
pub mod chain;

pub use config::{Config, FetchConfig};
pub use error::{Error, Result};
pub use github::{GitHubClient, SourcePlatform};
pub use activity::ActivityFetcher;
pub use scoring::ScoreEngine;
pub use digest::{ClaudeEnricher, SummaryFormatter, TextEnrichment};
pub use pipeline::ScorePipeline;
pub use storage::Storage;
pub use chain::{Ledger, MockChain};
