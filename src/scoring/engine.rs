//! Bounded reputation scoring. Pure and total: any combination of counts
//! maps to a score in [0, 1000].

use crate::models::{Score, Tier};

/// Asserted product values, preserved as-is. The per-category caps bound
/// how far any single gamed metric can push the total, independent of the
/// global cap.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub commit: u64,
    pub pull_request: u64,
    pub issue: u64,
    pub engagement: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            commit: 2,
            pull_request: 5,
            issue: 3,
            engagement: 0.5,
        }
    }
}

const COMMIT_CAP: u64 = 400;
const PULL_REQUEST_CAP: u64 = 250;
const ISSUE_CAP: u64 = 150;
const ENGAGEMENT_CAP: f64 = 200.0;
const MAX_TOTAL: f64 = 1000.0;

pub struct ScoreEngine {
    weights: ScoreWeights,
}

impl ScoreEngine {
    pub fn new() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }

    /// Per-category linear points with independent caps, then a global cap.
    /// The engagement term stays fractional until the final sum is floored;
    /// the two cap levels are intentional and must not be collapsed.
    pub fn score(
        &self,
        commits: u64,
        pull_requests: u64,
        issues: u64,
        engagement_units: u64,
    ) -> Score {
        let commit_points = (commits.saturating_mul(self.weights.commit)).min(COMMIT_CAP);
        let pr_points =
            (pull_requests.saturating_mul(self.weights.pull_request)).min(PULL_REQUEST_CAP);
        let issue_points = (issues.saturating_mul(self.weights.issue)).min(ISSUE_CAP);
        let engagement_points =
            (engagement_units as f64 * self.weights.engagement).min(ENGAGEMENT_CAP);

        let sum = (commit_points + pr_points + issue_points) as f64 + engagement_points;
        let total = sum.floor().min(MAX_TOTAL) as u32;

        Score {
            commits: commit_points as u32,
            pull_requests: pr_points as u32,
            issues: issue_points as u32,
            engagement: engagement_points.floor() as u32,
            total,
            tier: Tier::from_total(total),
        }
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}
