pub mod bot;
pub mod components;
pub mod config;
pub mod events;
pub mod frame;
pub mod game;
pub mod input;
pub mod map;
pub mod params;
pub mod player;
pub mod resources;
pub mod systems;

pub use bot::*;
pub use components::*;
pub use config::*;
pub use events::*;
pub use frame::*;
pub use game::*;
pub use input::*;
pub use map::*;
pub use params::*;
pub use player::*;
pub use resources::*;

use glam::Vec2;
use hecs::{Entity, World};
use systems::*;

/// Run one fixed step of the Pong simulation.
///
/// Returns the side that scored during this step, if any. Events are
/// appended to `events`; the caller drains them.
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut World,
    time: &mut Time,
    board: &Board,
    config: &Config,
    score: &mut Score,
    events: &mut Events,
    actions: &mut ActionQueue,
    rng: &mut GameRng,
) -> Option<Side> {
    // 1. Ingest actions (latest per paddle)
    ingest_actions(world, actions);

    // 2. Move paddles, clamped to the board
    move_paddles(world, time, board, config);

    // 3. Move ball
    move_ball(world, time);

    // 4. Walls, then paddles
    check_collisions(world, board, config, events);

    // 5. Goal lines
    let scorer = check_scoring(world, board, score, events, rng, config);

    time.now += time.dt;
    scorer
}

/// Helper to create a paddle entity centred on its side of the board
pub fn create_paddle(world: &mut World, config: &Config, side: Side) -> Entity {
    let pos = Vec2::new(config.paddle_x(side), config.board_height / 2.0);
    let size = Vec2::new(config.paddle_width, config.paddle_height);
    world.spawn((Piece::new(pos, size), Paddle::new(side)))
}

/// Helper to create the ball entity; its speed is the magnitude of `vel`
pub fn create_ball(world: &mut World, config: &Config, pos: Vec2, vel: Vec2) -> Entity {
    let mut piece = Piece::new(pos, Vec2::splat(config.ball_size));
    piece.vel = vel;
    world.spawn((piece, Ball::new(vel.length())))
}
