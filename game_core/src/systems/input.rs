use hecs::World;

use crate::components::*;
use crate::resources::*;

/// Apply queued actions to the paddles they target; the latest action per side wins
pub fn ingest_actions(world: &mut World, queue: &mut ActionQueue) {
    for (side, action) in queue.take() {
        for (_entity, paddle) in world.query_mut::<&mut Paddle>() {
            if paddle.side == side {
                paddle.action = action;
            }
        }
    }
}
