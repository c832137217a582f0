use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::chain::MintReceipt;
use crate::error::Result;
use crate::models::{Score, ScoredActivity, Tier};

pub struct Storage {
    conn: Connection,
}

/// One persisted scoring event.
#[derive(Debug, Clone)]
pub struct ScoreSnapshot {
    pub score: Score,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub login: String,
    pub name: Option<String>,
    pub total: u32,
    pub tier: Tier,
    pub has_badge: bool,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY,
                login TEXT UNIQUE NOT NULL,
                name TEXT,
                bio TEXT,
                location TEXT,
                followers INTEGER,
                following INTEGER,
                public_repos INTEGER,
                current_score INTEGER NOT NULL DEFAULT 0,
                badge_token_id TEXT,
                badge_tx_hash TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS score_snapshots (
                id INTEGER PRIMARY KEY,
                subject_id INTEGER NOT NULL REFERENCES subjects(id),
                commits INTEGER NOT NULL,
                pull_requests INTEGER NOT NULL,
                issues INTEGER NOT NULL,
                engagement INTEGER NOT NULL,
                total INTEGER NOT NULL,
                tier TEXT NOT NULL,
                digest_json TEXT,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_snapshots_subject_id
                ON score_snapshots(subject_id);
            "#,
        )?;

        Ok(())
    }

    /// Upserts the subject row and appends one score snapshot.
    pub fn save(&self, scored: &ScoredActivity) -> Result<()> {
        let profile = &scored.summary.profile;

        self.conn.execute(
            r#"
            INSERT INTO subjects (login, name, bio, location, followers, following, public_repos, current_score, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(login) DO UPDATE SET
                name = excluded.name,
                bio = excluded.bio,
                location = excluded.location,
                followers = excluded.followers,
                following = excluded.following,
                public_repos = excluded.public_repos,
                current_score = excluded.current_score,
                updated_at = excluded.updated_at
            "#,
            params![
                profile.login,
                profile.name,
                profile.bio,
                profile.location,
                profile.followers,
                profile.following,
                profile.public_repos,
                scored.score.total,
                scored.scored_at.to_rfc3339(),
            ],
        )?;

        let subject_id: i64 = self.conn.query_row(
            "SELECT id FROM subjects WHERE login = ?1",
            params![profile.login],
            |row| row.get(0),
        )?;

        let digest_json = serde_json::to_string(&scored.digest)?;
        self.conn.execute(
            r#"
            INSERT INTO score_snapshots (subject_id, commits, pull_requests, issues, engagement, total, tier, digest_json, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                subject_id,
                scored.score.commits,
                scored.score.pull_requests,
                scored.score.issues,
                scored.score.engagement,
                scored.score.total,
                scored.score.tier.to_string(),
                digest_json,
                scored.scored_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    pub fn latest_score(&self, login: &str) -> Result<Option<ScoreSnapshot>> {
        let mut history = self.score_history(login, 1)?;
        Ok(history.pop())
    }

    /// Most recent snapshots first.
    pub fn score_history(&self, login: &str, limit: usize) -> Result<Vec<ScoreSnapshot>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT ss.commits, ss.pull_requests, ss.issues, ss.engagement, ss.total, ss.tier, ss.recorded_at
            FROM score_snapshots ss
            JOIN subjects s ON ss.subject_id = s.id
            WHERE s.login = ?1
            ORDER BY ss.recorded_at DESC, ss.id DESC
            LIMIT ?2
            "#,
        )?;

        let snapshots = stmt.query_map(params![login, limit as i64], |row| {
            let total: u32 = row.get(4)?;
            let tier_str: String = row.get(5)?;
            let recorded_at_str: String = row.get(6)?;

            Ok(ScoreSnapshot {
                score: Score {
                    commits: row.get(0)?,
                    pull_requests: row.get(1)?,
                    issues: row.get(2)?,
                    engagement: row.get(3)?,
                    total,
                    tier: Tier::parse(&tier_str).unwrap_or_else(|| Tier::from_total(total)),
                },
                recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        snapshots
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Subjects ranked by their current score, highest first. Zero scores
    /// stay off the board.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT login, name, current_score, badge_token_id
            FROM subjects
            WHERE current_score > 0
            ORDER BY current_score DESC, login ASC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let login: String = row.get(0)?;
            let name: Option<String> = row.get(1)?;
            let total: u32 = row.get(2)?;
            let badge: Option<String> = row.get(3)?;
            Ok((login, name, total, badge))
        })?;

        let mut entries = Vec::new();
        for (rank, row) in rows.enumerate() {
            let (login, name, total, badge) = row?;
            entries.push(LeaderboardEntry {
                rank: rank + 1,
                login,
                name,
                total,
                tier: Tier::from_total(total),
                has_badge: badge.is_some(),
            });
        }

        Ok(entries)
    }

    pub fn record_mint(&self, login: &str, receipt: &MintReceipt) -> Result<()> {
        self.conn.execute(
            "UPDATE subjects SET badge_token_id = ?1, badge_tx_hash = ?2 WHERE login = ?3",
            params![receipt.token_id, receipt.tx_hash, login],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivityDigest, ActivitySummary, ActivityWindow, CommitAggregate, DevelopmentStyle,
        IssueAggregate, PullRequestAggregate, RepositoryOverview, StarredOverview, SubjectProfile,
    };

    fn scored(login: &str, total: u32) -> ScoredActivity {
        ScoredActivity {
            subject: login.to_string(),
            summary: ActivitySummary {
                subject: login.to_string(),
                profile: SubjectProfile {
                    login: login.to_string(),
                    name: Some("Dev".to_string()),
                    avatar_url: None,
                    bio: None,
                    location: None,
                    followers: 1,
                    following: 1,
                    public_repos: 2,
                },
                commits: CommitAggregate::default(),
                pull_requests: PullRequestAggregate::default(),
                issues: IssueAggregate::default(),
                repositories: RepositoryOverview::default(),
                starred: StarredOverview::default(),
                window: ActivityWindow::trailing(90),
                fetched_at: Utc::now(),
            },
            score: Score {
                commits: total.min(400),
                pull_requests: 0,
                issues: 0,
                engagement: 0,
                total,
                tier: Tier::from_total(total),
            },
            digest: ActivityDigest {
                summary: "summary".to_string(),
                insights: vec!["insight".to_string()],
                languages: Vec::new(),
                top_projects: Vec::new(),
                contribution_areas: vec!["General Development".to_string()],
                development_style: DevelopmentStyle::Balanced,
                enriched: false,
            },
            diagnostics: Vec::new(),
            scored_at: Utc::now(),
        }
    }

    #[test]
    fn latest_score_round_trips() {
        let storage = Storage::in_memory().unwrap();
        storage.save(&scored("alice", 420)).unwrap();

        let snapshot = storage.latest_score("alice").unwrap().unwrap();
        assert_eq!(snapshot.score.total, 420);
        assert_eq!(snapshot.score.tier, Tier::Mid);

        assert!(storage.latest_score("nobody").unwrap().is_none());
    }

    #[test]
    fn history_keeps_every_snapshot() {
        let storage = Storage::in_memory().unwrap();
        storage.save(&scored("alice", 100)).unwrap();
        storage.save(&scored("alice", 250)).unwrap();

        let history = storage.score_history("alice", 10).unwrap();
        assert_eq!(history.len(), 2);
        // Newest first; the subject row carries the newest total.
        let latest = storage.latest_score("alice").unwrap().unwrap();
        assert_eq!(latest.score.total, 250);
    }

    #[test]
    fn leaderboard_ranks_by_total_descending() {
        let storage = Storage::in_memory().unwrap();
        storage.save(&scored("alice", 300)).unwrap();
        storage.save(&scored("bob", 700)).unwrap();
        storage.save(&scored("carol", 0)).unwrap();

        let board = storage.leaderboard(10).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].login, "bob");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].tier, Tier::Senior);
        assert_eq!(board[1].login, "alice");
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn minting_marks_the_subject() {
        let storage = Storage::in_memory().unwrap();
        storage.save(&scored("alice", 500)).unwrap();
        storage
            .record_mint(
                "alice",
                &MintReceipt {
                    token_id: "ABCDEF0123456789".to_string(),
                    tx_hash: "ff".repeat(32),
                    network: "testnet".to_string(),
                    minted_at: Utc::now(),
                },
            )
            .unwrap();

        let board = storage.leaderboard(10).unwrap();
        assert!(board[0].has_badge);
    }
}
