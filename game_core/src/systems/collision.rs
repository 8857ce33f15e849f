use crate::{Ball, Board, Config, Events, GameEvent, Paddle, Piece, Side};
use glam::Vec2;
use hecs::World;

/// Check ball collisions with walls, then paddles
pub fn check_collisions(world: &mut World, board: &Board, config: &Config, events: &mut Events) {
    check_wall_collisions(world, board, events);
    check_paddle_collisions(world, config, events);
}

/// Reflect the ball off the top and bottom walls
pub fn check_wall_collisions(world: &mut World, board: &Board, events: &mut Events) {
    for (_entity, (piece, _ball)) in world.query_mut::<(&mut Piece, &Ball)>() {
        let half_height = piece.size.y / 2.0;

        // Only reflect while heading into the wall, so one crossing is one event
        if piece.top() <= 0.0 && piece.vel.y < 0.0 {
            piece.vel.y = -piece.vel.y;
            piece.pos.y = half_height;
            events.push(GameEvent::BallHitTopWall);
        } else if piece.bottom() >= board.height && piece.vel.y > 0.0 {
            piece.vel.y = -piece.vel.y;
            piece.pos.y = board.height - half_height;
            events.push(GameEvent::BallHitBottomWall);
        }
    }
}

/// Bounce the ball off any paddle it overlaps while moving toward it
pub fn check_paddle_collisions(world: &mut World, config: &Config, events: &mut Events) {
    // Collect paddle data without holding borrows
    let paddles: Vec<(Side, Piece)> = world
        .query::<(&Piece, &Paddle)>()
        .iter()
        .map(|(_e, (piece, paddle))| (paddle.side, *piece))
        .collect();

    for (_entity, (piece, ball)) in world.query_mut::<(&mut Piece, &mut Ball)>() {
        for (side, paddle) in &paddles {
            let side = *side;
            if !piece.aabb().intersects(&paddle.aabb()) {
                continue;
            }

            // Moving toward the paddle and still in front of its center line
            let approaching = piece.vel.x * side.sign() > 0.0;
            let in_front = (piece.pos.x - paddle.pos.x) * side.sign() <= 0.0;
            if !approaching || !in_front {
                continue;
            }

            // Contact offset from -1 (top edge) to 1 (bottom edge)
            let reach = (paddle.size.y + piece.size.y) / 2.0;
            let offset = ((piece.pos.y - paddle.pos.y) / reach).clamp(-1.0, 1.0);
            let angle = offset * config.max_bounce_angle;

            ball.speed = (ball.speed + config.ball_speed_increment).min(config.ball_speed_max);
            let away = side.opponent().sign();
            piece.vel = Vec2::new(away * angle.cos(), angle.sin()) * ball.speed;

            // Push ball flush against the paddle face
            let half_width = piece.size.x / 2.0;
            piece.pos.x = match side {
                Side::Left => paddle.right() + half_width,
                Side::Right => paddle.left() - half_width,
            };

            tracing::trace!(?side, speed = ball.speed, offset, "Ball hit paddle");
            events.push(GameEvent::BallHitPaddle { side });
            return;
        }
    }
}
