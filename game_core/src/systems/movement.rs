use crate::{Ball, Board, Config, Paddle, Piece, Side, Time};
use hecs::World;

/// Apply paddle movement based on actions
pub fn move_paddles(world: &mut World, time: &Time, board: &Board, config: &Config) {
    for (_entity, (piece, paddle)) in world.query_mut::<(&mut Piece, &Paddle)>() {
        advance_paddle(piece, paddle, time, board, config);
    }
}

/// Move only the paddle guarding `side`
pub fn move_paddle(world: &mut World, side: Side, time: &Time, board: &Board, config: &Config) {
    for (_entity, (piece, paddle)) in world.query_mut::<(&mut Piece, &Paddle)>() {
        if paddle.side == side {
            advance_paddle(piece, paddle, time, board, config);
        }
    }
}

fn advance_paddle(piece: &mut Piece, paddle: &Paddle, time: &Time, board: &Board, config: &Config) {
    piece.vel.y = paddle.action.dir() as f32 * config.paddle_speed;
    if piece.vel.y == 0.0 {
        return;
    }

    let target = piece.pos.y + piece.vel.y * time.dt;
    let clamped = board.clamp_y(target, piece.size.y / 2.0);
    if clamped != target {
        // Flush against a wall
        piece.vel.y = 0.0;
    }
    piece.pos.y = clamped;
}

/// Move ball based on velocity
pub fn move_ball(world: &mut World, time: &Time) {
    for (_entity, (piece, _ball)) in world.query_mut::<(&mut Piece, &Ball)>() {
        piece.pos += piece.vel * time.dt;
    }
}
