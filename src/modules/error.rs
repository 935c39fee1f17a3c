use std::io;

use thiserror::Error;

use crate::modules::slot::{AgentId, N_SLOTS};

/// Usage errors surfaced by the engine. None of these are recovered internally.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid action {action} for {agent}: slot must be in 0..{}", N_SLOTS)]
    InvalidAction { agent: AgentId, action: usize },

    #[error("episode finished at step {i_step}; call reset before stepping again")]
    EpisodeFinished { i_step: u64 },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
