//! Wire protocol between the two peers of a Pong session
//!
//! Uses postcard for compact binary serialization. The mirror peer only ever
//! sends [`ToHost`]; the authoritative host only ever sends [`ToMirror`].

use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] postcard::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] postcard::Error),
}

// ============================================================================
// Mirror -> Host
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToHost {
    /// Paddle intent change: -1 = up, 0 = stop, 1 = down.
    /// Only sent when the intent changes; there is no sequence number.
    Intent { paddle_dir: i8 },

    /// The mirror's player ended the game
    Quit,
}

// ============================================================================
// Host -> Mirror
// ============================================================================

/// Full replicated state at one host tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Strictly increasing per session
    pub seq: u32,
    pub ball_x: f32,
    pub ball_y: f32,
    pub ball_vx: f32,
    pub ball_vy: f32,
    pub paddle_left_y: f32,
    pub paddle_right_y: f32,
    pub score_left: u8,
    pub score_right: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCode {
    ScoreLimitReached,
    PlayerEnd,
    PlayerDisconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ToMirror {
    State(StateSnapshot),

    /// Terminal message, sent once
    GameOver {
        reason: EndCode,
        winner: Option<u8>, // 0 = left, 1 = right
    },

    /// The host paused or resumed; no snapshots arrive while paused
    Pause { paused: bool },
}

// ============================================================================
// Serialization Helpers
// ============================================================================

impl ToHost {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtoError> {
        to_allocvec(self).map_err(ProtoError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtoError> {
        from_bytes(bytes).map_err(ProtoError::Decode)
    }
}

impl ToMirror {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtoError> {
        to_allocvec(self).map_err(ProtoError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtoError> {
        from_bytes(bytes).map_err(ProtoError::Decode)
    }
}
