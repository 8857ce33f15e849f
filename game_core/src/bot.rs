use std::any::Any;

use crate::{Action, Frame, PongPlayer, Seat, Side};

/// Decision policy plugged into a [`BotPlayer`]
pub trait BotPolicy: Send + 'static {
    fn decide(&mut self, frame: &Frame, side: Side) -> Action;
}

/// Chase the predicted intercept while the ball approaches, recentre otherwise
#[derive(Debug, Clone, Copy)]
pub struct TrackingPolicy {
    /// Distance from target within which the paddle holds still
    pub dead_zone: f32,
}

impl Default for TrackingPolicy {
    fn default() -> Self {
        Self { dead_zone: 8.0 }
    }
}

impl BotPolicy for TrackingPolicy {
    fn decide(&mut self, frame: &Frame, side: Side) -> Action {
        let ball = &frame.ball;
        let paddle = frame.paddle(side);

        let approaching = ball.vel.x * side.sign() > 0.0;
        let target_y = if approaching {
            let time_to_reach = (paddle.pos.x - ball.pos.x) / ball.vel.x;
            let predicted = ball.pos.y + ball.vel.y * time_to_reach.max(0.0);
            fold_into(predicted, frame.board.height)
        } else {
            frame.board.height / 2.0
        };

        let diff = target_y - paddle.pos.y;
        if diff > self.dead_zone {
            Action::MoveDown
        } else if diff < -self.dead_zone {
            Action::MoveUp
        } else {
            Action::Stop
        }
    }
}

/// Mirror a straight-line prediction back onto the board, as wall bounces would
fn fold_into(y: f32, height: f32) -> f32 {
    let period = 2.0 * height;
    let wrapped = y.rem_euclid(period);
    if wrapped > height {
        period - wrapped
    } else {
        wrapped
    }
}

/// Computer-controlled player
pub struct BotPlayer<P: BotPolicy = TrackingPolicy> {
    seat: Seat,
    policy: P,
}

impl BotPlayer<TrackingPolicy> {
    pub fn tracking() -> Self {
        Self::new(TrackingPolicy::default())
    }
}

impl<P: BotPolicy> BotPlayer<P> {
    pub fn new(policy: P) -> Self {
        Self {
            seat: Seat::named("Bot"),
            policy,
        }
    }

    pub fn named(name: impl Into<String>, policy: P) -> Self {
        Self {
            seat: Seat::named(name),
            policy,
        }
    }
}

impl<P: BotPolicy> PongPlayer for BotPlayer<P> {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn game_updated(&mut self, frame: &Frame) {
        let Some(side) = self.side() else {
            return;
        };
        let action = self.policy.decide(frame, side);
        self.seat.emitter.emit(action);
    }
}
