use thiserror::Error;

use crate::core::types::{SessionId, Team};

#[derive(Error, Debug)]
pub enum SiegeError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("session is full")]
    SessionFull,

    #[error("team slot already claimed: {0:?}")]
    SlotTaken(Team),

    #[error("unknown team slot: {0}")]
    UnknownSlot(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SiegeError>;
