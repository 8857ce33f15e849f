use glam::Vec2;

use crate::Aabb;

/// Which half of the board a paddle guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Horizontal sign pointing from the board center toward this side
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Edge or center line of a piece, for side-relative coordinate queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

/// Axis-aligned rectangle with a velocity. Y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Piece {
    pub pos: Vec2, // Center
    pub size: Vec2,
    pub vel: Vec2,
}

impl Piece {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
        }
    }

    /// Coordinate of the given edge: X for left/right, Y for top/bottom,
    /// and the center Y for [`Edge::Center`].
    pub fn edge(&self, edge: Edge) -> f32 {
        let half = self.size * 0.5;
        match edge {
            Edge::Left => self.pos.x - half.x,
            Edge::Right => self.pos.x + half.x,
            Edge::Top => self.pos.y - half.y,
            Edge::Bottom => self.pos.y + half.y,
            Edge::Center => self.pos.y,
        }
    }

    pub fn left(&self) -> f32 {
        self.edge(Edge::Left)
    }

    pub fn right(&self) -> f32 {
        self.edge(Edge::Right)
    }

    pub fn top(&self) -> f32 {
        self.edge(Edge::Top)
    }

    pub fn bottom(&self) -> f32 {
        self.edge(Edge::Bottom)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.pos, self.size)
    }
}

/// Paddle component - the side it guards and its current action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paddle {
    pub side: Side,
    pub action: Action,
}

impl Paddle {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            action: Action::Stop,
        }
    }
}

/// Ball component - the magnitude its velocity is rebuilt with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub speed: f32,
}

impl Ball {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }
}

/// Discrete paddle intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    MoveUp,
    MoveDown,
    #[default]
    Stop,
}

/// A paddle direction outside `-1..=1` arrived from the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid paddle direction {0}")]
pub struct InvalidAction(pub i8);

impl Action {
    /// -1 = up, 0 = stop, 1 = down
    pub fn dir(self) -> i8 {
        match self {
            Action::MoveUp => -1,
            Action::Stop => 0,
            Action::MoveDown => 1,
        }
    }
}

impl TryFrom<i8> for Action {
    type Error = InvalidAction;

    fn try_from(dir: i8) -> Result<Self, Self::Error> {
        match dir {
            -1 => Ok(Action::MoveUp),
            0 => Ok(Action::Stop),
            1 => Ok(Action::MoveDown),
            other => Err(InvalidAction(other)),
        }
    }
}
