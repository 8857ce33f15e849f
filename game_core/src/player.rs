//! The contract every paddle controller implements
//!
//! Keyboard, bot and network players differ only in how they decide on an
//! [`Action`]; the match sees them through [`PongPlayer`] alone.

use std::any::Any;

use crossbeam_channel::Sender;
use hecs::Entity;

use crate::{Action, Frame, Side};

/// Channel end registered by the match to receive a player's action changes
#[derive(Debug, Clone)]
pub struct ActionSink {
    side: Side,
    tx: Sender<(Side, Action)>,
}

impl ActionSink {
    pub(crate) fn new(side: Side, tx: Sender<(Side, Action)>) -> Self {
        Self { side, tx }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    fn send(&self, action: Action) {
        // The receiver only disappears with the match; nothing to do then
        let _ = self.tx.send((self.side, action));
    }
}

/// Edge-triggered action output: repeated identical actions are swallowed
#[derive(Debug, Clone, Default)]
pub struct ActionEmitter {
    last: Option<Action>,
    sink: Option<ActionSink>,
}

impl ActionEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, sink: ActionSink) {
        self.sink = Some(sink);
        self.last = None;
    }

    pub fn disconnect(&mut self) {
        self.sink = None;
        self.last = None;
    }

    /// Returns true if the action differed from the previous one
    pub fn emit(&mut self, action: Action) -> bool {
        if self.last == Some(action) {
            return false;
        }
        self.last = Some(action);
        if let Some(sink) = &self.sink {
            sink.send(action);
        }
        true
    }

    pub fn last(&self) -> Option<Action> {
        self.last
    }
}

/// State every player variant carries
#[derive(Debug, Clone, Default)]
pub struct Seat {
    name: Option<String>,
    side: Option<Side>,
    points: u8,
    paddle: Option<Entity>,
    pub emitter: ActionEmitter,
}

impl Seat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Explicit name, or one derived from the side
    pub fn name(&self) -> String {
        match (&self.name, self.side) {
            (Some(name), _) => name.clone(),
            (None, Some(Side::Left)) => "Left Player".to_string(),
            (None, Some(Side::Right)) => "Right Player".to_string(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// A controller for one paddle.
///
/// The paddle itself lives in the match's world; a player only keeps its
/// [`Entity`] handle.
pub trait PongPlayer: Any + Send {
    fn seat(&self) -> &Seat;

    fn seat_mut(&mut self) -> &mut Seat;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Called once per tick before actions are collected
    fn game_updated(&mut self, _frame: &Frame) {}

    fn name(&self) -> String {
        self.seat().name()
    }

    fn set_on_action_changed(&mut self, sink: ActionSink) {
        self.seat_mut().emitter.connect(sink);
    }

    fn side(&self) -> Option<Side> {
        self.seat().side
    }

    fn set_side(&mut self, side: Side) {
        self.seat_mut().side = Some(side);
    }

    fn add_point(&mut self) {
        let seat = self.seat_mut();
        seat.points = seat.points.saturating_add(1);
    }

    fn points(&self) -> u8 {
        self.seat().points
    }

    fn set_points(&mut self, points: u8) {
        self.seat_mut().points = points;
    }

    fn paddle(&self) -> Option<Entity> {
        self.seat().paddle
    }

    fn set_paddle(&mut self, paddle: Entity) {
        self.seat_mut().paddle = Some(paddle);
    }
}
