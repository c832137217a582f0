use std::sync::Arc;

use chrono::Utc;

use crate::activity::ActivityFetcher;
use crate::digest::{compose_digest, TextEnrichment};
use crate::error::Result;
use crate::models::ScoredActivity;
use crate::scoring::ScoreEngine;
use crate::storage::Storage;

/// End-to-end scoring run: fetch → score → digest → persist. Engagement
/// units come from the caller; the source platform has no notion of them.
pub struct ScorePipeline {
    fetcher: ActivityFetcher,
    engine: ScoreEngine,
    enricher: Option<Arc<dyn TextEnrichment>>,
    storage: Storage,
}

impl ScorePipeline {
    pub fn new(fetcher: ActivityFetcher, storage: Storage) -> Self {
        Self {
            fetcher,
            engine: ScoreEngine::new(),
            enricher: None,
            storage,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn TextEnrichment>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub async fn run(&self, subject: &str, engagement_units: u64) -> Result<ScoredActivity> {
        let report = self.fetcher.fetch(subject).await?;

        for diagnostic in &report.diagnostics {
            tracing::warn!("degraded fetch ({}): {}", diagnostic.scope, diagnostic.message);
        }

        let summary = report.summary;
        let score = self.engine.score(
            summary.commits.total,
            summary.pull_requests.total,
            summary.issues.total,
            engagement_units,
        );

        let digest = compose_digest(&summary, self.enricher.as_deref()).await;

        let scored = ScoredActivity {
            subject: subject.to_string(),
            summary,
            score,
            digest,
            diagnostics: report.diagnostics,
            scored_at: Utc::now(),
        };

        self.storage.save(&scored)?;
        tracing::info!(
            "Scored {}: {} ({})",
            subject,
            scored.score.total,
            scored.score.tier
        );

        Ok(scored)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}
