pub mod sqlite;

pub use sqlite::{LeaderboardEntry, ScoreSnapshot, Storage};
