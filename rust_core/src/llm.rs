//! Scoring oracle interface.
//!
//! The pipeline's contract ends at handing the oracle two well-formed
//! fighter profiles; model choice, prompting, and calibration live behind
//! this trait. `NoopOracle` keeps sink-less runs and tests wired.

use crate::types::{Fight, Fighter};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Inputs the oracle sees for one bout.
#[derive(Clone, Debug, Serialize)]
pub struct ScoreRequest {
    pub event_name: String,
    pub fight: Fight,
    pub fighter1: Fighter,
    pub fighter2: Fighter,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FightScore {
    /// Probability the bout ends inside the distance, 0.0..=1.0.
    pub finish_probability: f64,
    /// Watchability rating, 0.0..=10.0.
    pub fun_score: f64,
    pub reasoning: String,
}

#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn score_fight(&self, request: &ScoreRequest) -> Result<FightScore>;
}

/// Oracle that scores nothing. Stands in wherever no model is configured.
#[derive(Debug, Default)]
pub struct NoopOracle;

#[async_trait]
impl ScoringOracle for NoopOracle {
    async fn score_fight(&self, _request: &ScoreRequest) -> Result<FightScore> {
        Ok(FightScore {
            finish_probability: 0.0,
            fun_score: 0.0,
            reasoning: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_oracle_returns_neutral_score() {
        let request = ScoreRequest {
            event_name: "UFC 312".into(),
            fight: Fight {
                id: "ufc-312:jon-jones:tom-aspinall".into(),
                event_id: "ufc-312".into(),
                fighter1_id: "jon-jones".into(),
                fighter2_id: "tom-aspinall".into(),
                weight_class: crate::types::WeightClass::Heavyweight,
                scheduled_rounds: 5,
                card_position: crate::types::CardPosition::Main,
                status: crate::types::FightStatus::Scheduled,
            },
            fighter1: crate::synth::synthesize("Jon Jones"),
            fighter2: crate::synth::synthesize("Tom Aspinall"),
        };
        let score = NoopOracle.score_fight(&request).await.unwrap();
        assert_eq!(score.finish_probability, 0.0);
        assert!(score.reasoning.is_empty());
    }
}
