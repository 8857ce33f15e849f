use crate::{Action, GameEvent, Side};

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    pub dt: f32,  // Delta time for this step
    pub now: f32, // Total elapsed time
}

impl Time {
    pub fn new(dt: f32, now: f32) -> Self {
        Self { dt, now }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt: 1.0 / crate::Params::FRAME_RATE,
            now: 0.0,
        }
    }
}

/// Game score tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u8,  // Left player score
    pub right: u8, // Right player score
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Left => self.left = self.left.saturating_add(1),
            Side::Right => self.right = self.right.saturating_add(1),
        }
    }

    pub fn has_winner(&self, score_limit: u8) -> Option<Side> {
        if self.left >= score_limit {
            Some(Side::Left)
        } else if self.right >= score_limit {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Side with strictly more points
    pub fn leader(&self) -> Option<Side> {
        match self.left.cmp(&self.right) {
            std::cmp::Ordering::Greater => Some(Side::Left),
            std::cmp::Ordering::Less => Some(Side::Right),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Events raised during the current tick, in the order they happened
#[derive(Debug, Clone, Default)]
pub struct Events {
    pending: Vec<GameEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    pub fn count(&self, event: &GameEvent) -> usize {
        self.pending.iter().filter(|e| *e == event).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }
}

/// Paddle actions waiting to be applied at the start of the next tick
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    pub actions: Vec<(Side, Action)>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, side: Side, action: Action) {
        self.actions.push((side, action));
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn take(&mut self) -> Vec<(Side, Action)> {
        std::mem::take(&mut self.actions)
    }
}
