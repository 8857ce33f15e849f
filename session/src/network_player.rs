use std::any::Any;

use crossbeam_channel::{unbounded, Receiver, Sender};
use game_core::{Action, Frame, PongPlayer, Seat};

/// Player whose paddle follows intents received from the remote peer
#[derive(Debug)]
pub struct NetworkPlayer {
    seat: Seat,
    intents: Receiver<Action>,
}

/// Feed the driver pushes decoded remote intents into
#[derive(Debug, Clone)]
pub struct RemoteIntents(Sender<Action>);

impl RemoteIntents {
    pub fn push(&self, action: Action) {
        // The player only goes away with the match
        let _ = self.0.send(action);
    }
}

impl NetworkPlayer {
    pub fn new() -> (Self, RemoteIntents) {
        Self::with_seat(Seat::new())
    }

    pub fn named(name: impl Into<String>) -> (Self, RemoteIntents) {
        Self::with_seat(Seat::named(name))
    }

    fn with_seat(seat: Seat) -> (Self, RemoteIntents) {
        let (tx, rx) = unbounded();
        (Self { seat, intents: rx }, RemoteIntents(tx))
    }
}

impl PongPlayer for NetworkPlayer {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    /// Only the latest intent since the previous tick counts
    fn game_updated(&mut self, _frame: &Frame) {
        if let Some(action) = self.intents.try_iter().last() {
            self.seat.emitter.emit(action);
        }
    }
}
