use crate::{Ball, Board, Config, Events, GameEvent, GameRng, Piece, Score, Side};
use glam::Vec2;
use hecs::World;
use rand::Rng;

/// Check if the ball fully crossed a goal line.
///
/// Returns the side that scored. The ball is re-served from the center at
/// base speed toward the side that conceded.
pub fn check_scoring(
    world: &mut World,
    board: &Board,
    score: &mut Score,
    events: &mut Events,
    rng: &mut GameRng,
    config: &Config,
) -> Option<Side> {
    for (_entity, (piece, ball)) in world.query_mut::<(&mut Piece, &mut Ball)>() {
        let conceded = if piece.right() < 0.0 {
            Side::Left
        } else if piece.left() > board.width {
            Side::Right
        } else {
            continue;
        };

        let scorer = conceded.opponent();
        score.increment(scorer);
        events.push(GameEvent::PlayerScored { side: scorer });
        tracing::debug!(
            ?scorer,
            left = score.left,
            right = score.right,
            "Point scored"
        );

        let angle = serve_angle(rng, config.serve_angle_spread);
        serve(piece, ball, board, config.ball_speed_initial, conceded, angle);
        return Some(scorer);
    }
    None
}

/// Random serve angle in `[-spread, spread]`
pub fn serve_angle(rng: &mut GameRng, spread: f32) -> f32 {
    if spread > 0.0 {
        rng.0.gen_range(-spread..=spread)
    } else {
        0.0
    }
}

/// Reset the ball to the board center heading toward `toward`
pub fn serve(piece: &mut Piece, ball: &mut Ball, board: &Board, speed: f32, toward: Side, angle: f32) {
    ball.speed = speed;
    piece.pos = board.center();
    piece.vel = Vec2::new(toward.sign() * angle.cos(), angle.sin()) * speed;
}
