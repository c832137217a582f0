use async_trait::async_trait;

use crate::digest::formatter::SummaryFormatter;
use crate::error::Result;
use crate::models::{ActivityDigest, ActivitySummary, Enrichment};

/// Capability-optional narrative enrichment. Implementations either return
/// a value or signal unavailability; the formatter's own output is the
/// fallback either way.
#[async_trait]
pub trait TextEnrichment: Send + Sync {
    async fn enrich(
        &self,
        summary: &ActivitySummary,
        baseline: &ActivityDigest,
    ) -> Result<Enrichment>;

    fn name(&self) -> &str;
}

/// Builds the deterministic digest, then lets an enricher (when present)
/// override the narrative fields. A failed enrichment and a missing one
/// produce the same result.
pub async fn compose_digest(
    summary: &ActivitySummary,
    enricher: Option<&dyn TextEnrichment>,
) -> ActivityDigest {
    let mut digest = SummaryFormatter::new().build(summary);

    let Some(enricher) = enricher else {
        return digest;
    };

    match enricher.enrich(summary, &digest).await {
        Ok(enrichment) if !enrichment.summary.is_empty() => {
            digest.summary = enrichment.summary;
            if !enrichment.insights.is_empty() {
                digest.insights = enrichment.insights;
            }
            digest.enriched = true;
        }
        Ok(_) => {
            tracing::warn!("{} returned an empty narrative, keeping fallback", enricher.name());
        }
        Err(e) => {
            tracing::warn!("{} enrichment failed, keeping fallback: {}", enricher.name(), e);
        }
    }

    digest
}
