//! Errors returned by host-facing arena calls.

use thiserror::Error;

use armada_core::config::ConfigError;
use armada_core::types::{AgentId, FormationId};

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("unknown agent {0:?}")]
    UnknownAgent(AgentId),

    #[error("unknown formation {0:?}")]
    UnknownFormation(FormationId),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}
