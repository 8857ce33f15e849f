//! Conversions between match types and their wire form

use game_core::{EndReason, Score, Side, SyncState};
use glam::Vec2;
use proto::{EndCode, StateSnapshot};

pub fn side_to_wire(side: Side) -> u8 {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

pub fn side_from_wire(side: u8) -> Option<Side> {
    match side {
        0 => Some(Side::Left),
        1 => Some(Side::Right),
        _ => None,
    }
}

pub fn reason_to_wire(reason: EndReason) -> EndCode {
    match reason {
        EndReason::ScoreLimitReached => EndCode::ScoreLimitReached,
        EndReason::PlayerEnd => EndCode::PlayerEnd,
        EndReason::PlayerDisconnect => EndCode::PlayerDisconnect,
    }
}

pub fn reason_from_wire(code: EndCode) -> EndReason {
    match code {
        EndCode::ScoreLimitReached => EndReason::ScoreLimitReached,
        EndCode::PlayerEnd => EndReason::PlayerEnd,
        EndCode::PlayerDisconnect => EndReason::PlayerDisconnect,
    }
}

pub fn snapshot(seq: u32, sync: &SyncState) -> StateSnapshot {
    StateSnapshot {
        seq,
        ball_x: sync.ball_pos.x,
        ball_y: sync.ball_pos.y,
        ball_vx: sync.ball_vel.x,
        ball_vy: sync.ball_vel.y,
        paddle_left_y: sync.left_paddle_y,
        paddle_right_y: sync.right_paddle_y,
        score_left: sync.score.left,
        score_right: sync.score.right,
    }
}

pub fn sync_state(snapshot: &StateSnapshot) -> SyncState {
    SyncState {
        ball_pos: Vec2::new(snapshot.ball_x, snapshot.ball_y),
        ball_vel: Vec2::new(snapshot.ball_vx, snapshot.ball_vy),
        left_paddle_y: snapshot.paddle_left_y,
        right_paddle_y: snapshot.paddle_right_y,
        score: Score {
            left: snapshot.score_left,
            right: snapshot.score_right,
        },
    }
}
