use serde::{Deserialize, Serialize};

/// Score breakdown for one scoring event. Derived, stateless, recomputed
/// on demand; a persisted row is a snapshot, never the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub commits: u32,
    pub pull_requests: u32,
    pub issues: u32,
    pub engagement: u32,
    pub total: u32,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Newcomer,
    Junior,
    Mid,
    Senior,
    Elite,
}

impl Tier {
    /// Half-open bands ascending; 1000 itself is Elite.
    pub fn from_total(total: u32) -> Self {
        match total {
            0..=199 => Tier::Newcomer,
            200..=399 => Tier::Junior,
            400..=599 => Tier::Mid,
            600..=799 => Tier::Senior,
            _ => Tier::Elite,
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Newcomer" => Some(Tier::Newcomer),
            "Junior Developer" => Some(Tier::Junior),
            "Mid Developer" => Some(Tier::Mid),
            "Senior Developer" => Some(Tier::Senior),
            "Elite Developer" => Some(Tier::Elite),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Newcomer => write!(f, "Newcomer"),
            Tier::Junior => write!(f, "Junior Developer"),
            Tier::Mid => write!(f, "Mid Developer"),
            Tier::Senior => write!(f, "Senior Developer"),
            Tier::Elite => write!(f, "Elite Developer"),
        }
    }
}
