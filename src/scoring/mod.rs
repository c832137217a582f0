pub mod engine;

pub use engine::{ScoreEngine, ScoreWeights};
