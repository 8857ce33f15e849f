//! Whole-match read snapshots for render and audio contexts

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Board, MatchState, Piece, Score, Side};

/// Copy of everything a presentation layer reads, taken between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tick: u64,
    pub state: MatchState,
    pub board: Board,
    pub ball: Piece,
    pub left_paddle: Piece,
    pub right_paddle: Piece,
    pub score: Score,
}

impl Frame {
    pub fn paddle(&self, side: Side) -> &Piece {
        match side {
            Side::Left => &self.left_paddle,
            Side::Right => &self.right_paddle,
        }
    }
}

/// Single-writer, many-reader handle to the latest [`Frame`].
///
/// The match replaces the whole frame once per tick, so readers on other
/// threads never observe a half-applied tick.
#[derive(Debug, Clone)]
pub struct SharedFrame(Arc<RwLock<Frame>>);

impl SharedFrame {
    pub fn new(frame: Frame) -> Self {
        Self(Arc::new(RwLock::new(frame)))
    }

    pub fn load(&self) -> Frame {
        *self.0.read()
    }

    pub(crate) fn store(&self, frame: Frame) {
        *self.0.write() = frame;
    }
}
