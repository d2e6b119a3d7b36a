use thiserror::Error;

use crate::model::BeatMapError;

use super::session::SessionPhase;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot change the beat map while the session is {0:?}")]
    SessionInProgress(SessionPhase),

    #[error(transparent)]
    BeatMap(#[from] BeatMapError),
}
