//! The match state machine
//!
//! A [`Match`] owns the world (ball and both paddles), the score and the
//! players, and moves through `Created -> Initialized -> Running -> Ended`.
//! Drivers call [`Match::tick`] on a fixed timer whatever the phase; ticks
//! outside `Running` do nothing.

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::Vec2;
use hecs::{Entity, World};

use crate::systems::{ingest_actions, move_paddle, serve};
use crate::{
    create_ball, create_paddle, step, Action, ActionQueue, ActionSink, Ball, Board, Config,
    EndReason, EventBus, Events, Frame, GameEvent, GameRng, ListenerId, Paddle, Piece, PongPlayer,
    Score, SharedFrame, Side, Time,
};

/// Seed used by [`Match::new`]
pub const DEFAULT_SEED: u64 = 12345;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchState {
    Created,
    Initialized,
    Running,
    Paused,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("both players must be set before initializing")]
    PlayersNotBound,
    #[error("both players claim the {0:?} side")]
    SideConflict(Side),
    #[error("cannot {op} while {state:?}")]
    InvalidState { op: &'static str, state: MatchState },
}

/// The replicated part of a match: what a mirror needs to show the host's game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncState {
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub left_paddle_y: f32,
    pub right_paddle_y: f32,
    pub score: Score,
}

pub struct Match {
    world: World,
    ball: Entity,
    paddles: [Entity; 2],
    board: Board,
    config: Config,
    time: Time,
    score: Score,
    events: Events,
    actions: ActionQueue,
    seed: u64,
    rng: GameRng,
    bus: EventBus,
    state: MatchState,
    end_reason: Option<EndReason>,
    decided_winner: Option<Option<Side>>,
    players: [Option<Box<dyn PongPlayer>>; 2],
    action_tx: Sender<(Side, Action)>,
    action_rx: Receiver<(Side, Action)>,
    tick: u64,
    shared: Option<SharedFrame>,
}

impl Match {
    pub fn new(config: Config) -> Self {
        Self::with_seed(config, DEFAULT_SEED)
    }

    pub fn with_seed(config: Config, seed: u64) -> Self {
        let mut world = World::new();
        let board = config.board();
        let ball = create_ball(&mut world, &config, board.center(), Vec2::ZERO);
        let paddles = Side::BOTH.map(|side| create_paddle(&mut world, &config, side));
        let (action_tx, action_rx) = unbounded();

        Self {
            world,
            ball,
            paddles,
            board,
            time: Time::new(config.step(), 0.0),
            config,
            score: Score::new(),
            events: Events::new(),
            actions: ActionQueue::new(),
            seed,
            rng: GameRng::new(seed),
            bus: EventBus::new(),
            state: MatchState::Created,
            end_reason: None,
            decided_winner: None,
            players: [None, None],
            action_tx,
            action_rx,
            tick: 0,
            shared: None,
        }
    }

    /// Supply the two players. Sides are settled by [`Match::initialize`].
    pub fn set_players(
        &mut self,
        first: Box<dyn PongPlayer>,
        second: Box<dyn PongPlayer>,
    ) -> Result<(), MatchError> {
        self.require(
            "set players",
            &[MatchState::Created, MatchState::Initialized],
        )?;
        self.players = [Some(first), Some(second)];
        self.state = MatchState::Created;
        Ok(())
    }

    /// Assign sides and paddles and start listening to both players.
    ///
    /// A player without a side takes whatever the other one left; if neither
    /// has one, the first plays left.
    pub fn initialize(&mut self) -> Result<(), MatchError> {
        self.require(
            "initialize",
            &[MatchState::Created, MatchState::Initialized],
        )?;
        let [Some(mut first), Some(mut second)] = std::mem::take(&mut self.players) else {
            return Err(MatchError::PlayersNotBound);
        };

        let sides = match (first.side(), second.side()) {
            (Some(a), Some(b)) if a == b => {
                self.players = [Some(first), Some(second)];
                return Err(MatchError::SideConflict(a));
            }
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => (a, a.opponent()),
            (None, Some(b)) => (b.opponent(), b),
            (None, None) => (Side::Left, Side::Right),
        };

        for (player, side) in [(&mut first, sides.0), (&mut second, sides.1)] {
            player.set_side(side);
            player.set_paddle(self.paddles[side.index()]);
            player.set_on_action_changed(ActionSink::new(side, self.action_tx.clone()));
        }

        let (left, right) = if sides.0 == Side::Left {
            (first, second)
        } else {
            (second, first)
        };
        tracing::info!(left = %left.name(), right = %right.name(), "Match initialized");
        self.players = [Some(left), Some(right)];
        self.state = MatchState::Initialized;
        self.publish_frame();
        Ok(())
    }

    /// Serve and start running. Calling it again while running does nothing.
    pub fn begin(&mut self) -> Result<(), MatchError> {
        match self.state {
            MatchState::Running => return Ok(()),
            MatchState::Initialized => {}
            state => return Err(MatchError::InvalidState { op: "begin", state }),
        }

        if let Ok((piece, ball)) = self.world.query_one_mut::<(&mut Piece, &mut Ball)>(self.ball) {
            serve(piece, ball, &self.board, self.config.ball_speed_initial, Side::Right, 0.0);
        }
        self.state = MatchState::Running;
        tracing::info!(score_limit = self.config.score_limit, "Match started");
        self.publish_frame();
        Ok(())
    }

    /// Advance the full simulation by one fixed step
    pub fn tick(&mut self) {
        if self.state != MatchState::Running {
            return;
        }
        self.tick += 1;
        self.notify_players();
        for (side, action) in self.action_rx.try_iter() {
            self.actions.push(side, action);
        }

        let scorer = step(
            &mut self.world,
            &mut self.time,
            &self.board,
            &self.config,
            &mut self.score,
            &mut self.events,
            &mut self.actions,
            &mut self.rng,
        );

        if let Some(side) = scorer {
            if let Some(player) = self.player_mut(side) {
                player.add_point();
            }
            if self.score.has_winner(self.config.score_limit).is_some() {
                self.finish(EndReason::ScoreLimitReached);
            }
        }

        self.flush_events();
        self.publish_frame();
    }

    /// Tick for a peer that does not own the physics.
    ///
    /// Collects the players' action changes and hands them back for
    /// forwarding. If `predict` names a side, that paddle is moved locally so
    /// it responds before the next authoritative state arrives.
    pub fn tick_local(&mut self, predict: Option<Side>) -> Vec<(Side, Action)> {
        if self.state != MatchState::Running {
            return Vec::new();
        }
        self.tick += 1;
        self.notify_players();
        let changed: Vec<_> = self.action_rx.try_iter().collect();

        if let Some(side) = predict {
            for &(_, action) in changed.iter().filter(|(s, _)| *s == side) {
                self.actions.push(side, action);
            }
            ingest_actions(&mut self.world, &mut self.actions);
            move_paddle(&mut self.world, side, &self.time, &self.board, &self.config);
        }
        self.time.now += self.time.dt;

        self.publish_frame();
        changed
    }

    /// Stop the match. Returns false if it had already ended.
    pub fn end(&mut self, reason: EndReason) -> bool {
        if self.state == MatchState::Ended {
            return false;
        }
        self.finish(reason);
        self.flush_events();
        self.publish_frame();
        true
    }

    /// Stop the match with a winner decided elsewhere, such as by the host
    /// of a mirrored match. Returns false if it had already ended.
    pub fn end_with_winner(&mut self, reason: EndReason, winner: Option<Side>) -> bool {
        if self.state == MatchState::Ended {
            return false;
        }
        self.decided_winner = Some(winner);
        self.end(reason)
    }

    fn finish(&mut self, reason: EndReason) {
        self.state = MatchState::Ended;
        self.end_reason = Some(reason);
        let winner = self.winner();
        tracing::info!(
            ?reason,
            ?winner,
            left = self.score.left,
            right = self.score.right,
            "Match ended"
        );
        self.events.push(GameEvent::GameEnded { reason, winner });
    }

    pub fn pause(&mut self) -> Result<(), MatchError> {
        match self.state {
            MatchState::Paused => Ok(()),
            MatchState::Running => {
                self.state = MatchState::Paused;
                tracing::info!("Match paused");
                self.publish_frame();
                Ok(())
            }
            state => Err(MatchError::InvalidState { op: "pause", state }),
        }
    }

    pub fn resume(&mut self) -> Result<(), MatchError> {
        match self.state {
            MatchState::Running => Ok(()),
            MatchState::Paused => {
                self.state = MatchState::Running;
                tracing::info!("Match resumed");
                self.publish_frame();
                Ok(())
            }
            state => Err(MatchError::InvalidState { op: "resume", state }),
        }
    }

    /// Throw away the board, pieces, score and players and start over.
    /// Event listeners stay registered.
    pub fn reset(&mut self) {
        let bus = std::mem::take(&mut self.bus);
        let shared = self.shared.take();
        *self = Self::with_seed(self.config.clone(), self.seed);
        self.bus = bus;
        self.shared = shared;
        tracing::info!("Match reset");
        self.publish_frame();
    }

    /// The side that reached the score limit, otherwise the one ahead.
    /// A winner passed to [`Match::end_with_winner`] takes precedence.
    pub fn winner(&self) -> Option<Side> {
        if let Some(winner) = self.decided_winner {
            return winner;
        }
        self.score
            .has_winner(self.config.score_limit)
            .or_else(|| self.score.leader())
    }

    pub fn sync_state(&self) -> SyncState {
        let ball = self.ball();
        SyncState {
            ball_pos: ball.pos,
            ball_vel: ball.vel,
            left_paddle_y: self.paddle(Side::Left).pos.y,
            right_paddle_y: self.paddle(Side::Right).pos.y,
            score: self.score,
        }
    }

    /// Overwrite the replicated state with the host's.
    ///
    /// `keep` names a paddle whose local position should survive. Score
    /// increases raise [`GameEvent::PlayerScored`] just as a local goal would.
    /// Without a goal in between, a flipped velocity component is taken as
    /// a bounce and raises the matching hit event.
    pub fn apply_sync_state(&mut self, sync: &SyncState, keep: Option<Side>) {
        if sync.score == self.score {
            let old = self.ball().vel;
            let new = sync.ball_vel;
            if old.x * new.x < 0.0 {
                let side = if new.x > 0.0 { Side::Left } else { Side::Right };
                self.events.push(GameEvent::BallHitPaddle { side });
            }
            if old.y * new.y < 0.0 {
                self.events.push(if new.y > 0.0 {
                    GameEvent::BallHitTopWall
                } else {
                    GameEvent::BallHitBottomWall
                });
            }
        }

        if let Ok((piece, ball)) = self.world.query_one_mut::<(&mut Piece, &mut Ball)>(self.ball) {
            piece.pos = sync.ball_pos;
            piece.vel = sync.ball_vel;
            ball.speed = sync.ball_vel.length();
        }

        for side in Side::BOTH {
            if keep == Some(side) {
                continue;
            }
            let y = match side {
                Side::Left => sync.left_paddle_y,
                Side::Right => sync.right_paddle_y,
            };
            if let Ok(piece) = self.world.query_one_mut::<&mut Piece>(self.paddles[side.index()]) {
                piece.pos.y = self.config.clamp_paddle_y(y);
            }
        }

        for side in Side::BOTH {
            let (old, new) = (self.score.get(side), sync.score.get(side));
            for _ in old..new {
                self.events.push(GameEvent::PlayerScored { side });
            }
            if old != new {
                if let Some(player) = self.player_mut(side) {
                    player.set_points(new);
                }
            }
        }
        self.score = sync.score;

        self.flush_events();
        self.publish_frame();
    }

    pub fn add_event_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Copy of the current state for readers outside the tick
    pub fn frame(&self) -> Frame {
        Frame {
            tick: self.tick,
            state: self.state,
            board: self.board,
            ball: self.ball(),
            left_paddle: self.paddle(Side::Left),
            right_paddle: self.paddle(Side::Right),
            score: self.score,
        }
    }

    /// Handle that always holds the frame published by the latest tick
    pub fn share_frame(&mut self) -> SharedFrame {
        let frame = self.frame();
        self.shared
            .get_or_insert_with(|| SharedFrame::new(frame))
            .clone()
    }

    pub fn ball(&self) -> Piece {
        self.piece(self.ball)
    }

    pub fn paddle(&self, side: Side) -> Piece {
        self.piece(self.paddles[side.index()])
    }

    pub fn left_paddle(&self) -> Piece {
        self.paddle(Side::Left)
    }

    pub fn right_paddle(&self) -> Piece {
        self.paddle(Side::Right)
    }

    pub fn paddle_entity(&self, side: Side) -> Entity {
        self.paddles[side.index()]
    }

    /// Action the paddle is currently following
    pub fn paddle_action(&self, side: Side) -> Action {
        self.world
            .get::<&Paddle>(self.paddles[side.index()])
            .map(|paddle| paddle.action)
            .unwrap_or_default()
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn player(&self, side: Side) -> Option<&dyn PongPlayer> {
        self.players
            .iter()
            .flatten()
            .find(|player| player.side() == Some(side))
            .map(|player| &**player)
    }

    pub fn left_player(&self) -> Option<&dyn PongPlayer> {
        self.player(Side::Left)
    }

    pub fn right_player(&self) -> Option<&dyn PongPlayer> {
        self.player(Side::Right)
    }

    fn player_mut(&mut self, side: Side) -> Option<&mut Box<dyn PongPlayer>> {
        self.players
            .iter_mut()
            .flatten()
            .find(|player| player.side() == Some(side))
    }

    /// Concrete access to the player on `side`, e.g. to feed it key state
    pub fn player_as_mut<T: PongPlayer>(&mut self, side: Side) -> Option<&mut T> {
        self.player_mut(side)?.as_any_mut().downcast_mut::<T>()
    }

    fn require(&self, op: &'static str, allowed: &[MatchState]) -> Result<(), MatchError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(MatchError::InvalidState {
                op,
                state: self.state,
            })
        }
    }

    fn piece(&self, entity: Entity) -> Piece {
        self.world
            .get::<&Piece>(entity)
            .map(|piece| *piece)
            .unwrap_or_default()
    }

    fn notify_players(&mut self) {
        let frame = self.frame();
        for player in self.players.iter_mut().flatten() {
            player.game_updated(&frame);
        }
    }

    fn flush_events(&mut self) {
        for event in self.events.drain() {
            self.bus.dispatch(&event);
        }
    }

    fn publish_frame(&self) {
        if let Some(shared) = &self.shared {
            shared.store(self.frame());
        }
    }
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("state", &self.state)
            .field("tick", &self.tick)
            .field("score", &self.score)
            .field("end_reason", &self.end_reason)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BotPlayer, KeyBindings, KeyboardPlayer};
    use std::sync::{Arc, Mutex};

    fn keyboard_match(config: Config) -> Match {
        let mut game = Match::new(config);
        game.set_players(
            Box::new(KeyboardPlayer::new(KeyBindings::arrows())),
            Box::new(KeyboardPlayer::new(KeyBindings::qa())),
        )
        .unwrap();
        game.initialize().unwrap();
        game
    }

    fn record_events(game: &mut Match) -> Arc<Mutex<Vec<GameEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        game.add_event_listener(move |event| sink.lock().unwrap().push(*event));
        seen
    }

    #[test]
    fn test_initialize_requires_players() {
        let mut game = Match::new(Config::new());
        assert_eq!(game.initialize(), Err(MatchError::PlayersNotBound));
        assert_eq!(game.state(), MatchState::Created);
    }

    #[test]
    fn test_initialize_assigns_sides_in_order() {
        let game = keyboard_match(Config::new());
        assert_eq!(game.state(), MatchState::Initialized);
        assert_eq!(game.left_player().unwrap().name(), "Left Player");
        assert_eq!(game.right_player().unwrap().name(), "Right Player");
        assert_eq!(
            game.left_player().unwrap().paddle(),
            Some(game.paddle_entity(Side::Left))
        );
    }

    #[test]
    fn test_initialize_respects_preset_side() {
        let mut game = Match::new(Config::new());
        let mut bot = BotPlayer::tracking();
        bot.set_side(Side::Left);
        game.set_players(
            Box::new(KeyboardPlayer::new(KeyBindings::arrows())),
            Box::new(bot),
        )
        .unwrap();
        game.initialize().unwrap();
        assert_eq!(game.left_player().unwrap().name(), "Bot");
        assert!(game
            .player_as_mut::<KeyboardPlayer>(Side::Right)
            .is_some());
    }

    #[test]
    fn test_initialize_rejects_side_conflict() {
        let mut game = Match::new(Config::new());
        let mut a = KeyboardPlayer::new(KeyBindings::arrows());
        let mut b = KeyboardPlayer::new(KeyBindings::qa());
        a.set_side(Side::Right);
        b.set_side(Side::Right);
        game.set_players(Box::new(a), Box::new(b)).unwrap();
        assert_eq!(game.initialize(), Err(MatchError::SideConflict(Side::Right)));
        assert_eq!(game.state(), MatchState::Created);
    }

    #[test]
    fn test_begin_serves_right_and_is_idempotent() {
        let mut game = keyboard_match(Config::new());
        game.begin().unwrap();
        game.begin().unwrap();
        assert_eq!(game.state(), MatchState::Running);
        let ball = game.ball();
        assert_eq!(ball.pos, game.board().center());
        assert_eq!(ball.vel, Vec2::new(game.config().ball_speed_initial, 0.0));
    }

    #[test]
    fn test_begin_before_initialize_fails() {
        let mut game = Match::new(Config::new());
        assert_eq!(
            game.begin(),
            Err(MatchError::InvalidState {
                op: "begin",
                state: MatchState::Created
            })
        );
    }

    #[test]
    fn test_tick_outside_running_is_ignored() {
        let mut game = keyboard_match(Config::new());
        let before = game.frame();
        game.tick();
        assert_eq!(game.frame(), before);
    }

    #[test]
    fn test_keyboard_action_moves_paddle() {
        let mut game = keyboard_match(Config::new());
        game.begin().unwrap();
        game.player_as_mut::<KeyboardPlayer>(Side::Left)
            .unwrap()
            .set_keys_down(&["ArrowDown"]);
        game.tick();

        assert_eq!(game.paddle_action(Side::Left), Action::MoveDown);
        assert!(game.left_paddle().pos.y > game.board().height / 2.0);
        assert_eq!(game.right_paddle().pos.y, game.board().height / 2.0);
    }

    #[test]
    fn test_pause_freezes_the_ball() {
        let mut game = keyboard_match(Config::new());
        game.begin().unwrap();
        game.tick();
        game.pause().unwrap();
        let frozen = game.ball();
        game.tick();
        assert_eq!(game.ball(), frozen);

        game.resume().unwrap();
        game.tick();
        assert!(game.ball().pos.x > frozen.pos.x);
    }

    #[test]
    fn test_end_emits_once() {
        let mut game = keyboard_match(Config::new());
        let seen = record_events(&mut game);
        game.begin().unwrap();

        assert!(game.end(EndReason::PlayerEnd));
        assert!(!game.end(EndReason::PlayerDisconnect));

        assert_eq!(game.end_reason(), Some(EndReason::PlayerEnd));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![GameEvent::GameEnded {
                reason: EndReason::PlayerEnd,
                winner: None
            }]
        );
    }

    #[test]
    fn test_goal_credits_player_and_emits_in_tick() {
        let config = Config {
            serve_angle_spread: 0.0,
            ..Config::new()
        };
        let mut game = keyboard_match(config);
        let seen = record_events(&mut game);
        game.begin().unwrap();
        game.player_as_mut::<KeyboardPlayer>(Side::Right)
            .unwrap()
            .set_keys_down(&["q"]);

        while game.score().left == 0 {
            game.tick();
            assert!(game.tick_count() < 1_000);
        }

        assert_eq!(game.left_player().unwrap().points(), 1);
        assert_eq!(game.ball().pos, game.board().center());
        assert!(seen
            .lock()
            .unwrap()
            .contains(&GameEvent::PlayerScored { side: Side::Left }));
    }

    #[test]
    fn test_sync_state_round_trip_raises_scores() {
        let mut host = keyboard_match(Config::new());
        host.begin().unwrap();
        for _ in 0..10 {
            host.tick();
        }
        let mut sync = host.sync_state();
        sync.score = Score { left: 2, right: 1 };
        sync.left_paddle_y = 120.0;

        let mut mirror = keyboard_match(Config::new());
        let seen = record_events(&mut mirror);
        mirror.begin().unwrap();
        mirror.apply_sync_state(&sync, None);

        assert_eq!(mirror.sync_state(), sync);
        assert_eq!(mirror.left_player().unwrap().points(), 2);
        let scored = seen.lock().unwrap();
        assert_eq!(scored.len(), 3);
        assert_eq!(
            scored
                .iter()
                .filter(|e| **e == GameEvent::PlayerScored { side: Side::Left })
                .count(),
            2
        );
    }

    #[test]
    fn test_apply_sync_state_keeps_named_paddle() {
        let mut game = keyboard_match(Config::new());
        game.begin().unwrap();
        let mut sync = game.sync_state();
        sync.left_paddle_y = 100.0;
        sync.right_paddle_y = 100.0;

        game.apply_sync_state(&sync, Some(Side::Left));

        assert_eq!(game.left_paddle().pos.y, 300.0);
        assert_eq!(game.right_paddle().pos.y, 100.0);
    }

    #[test]
    fn test_velocity_flips_raise_hit_events() {
        let mut game = keyboard_match(Config::new());
        let seen = record_events(&mut game);
        game.begin().unwrap();

        let mut sync = game.sync_state();
        sync.ball_vel = Vec2::new(240.0, -60.0);
        game.apply_sync_state(&sync, None);
        assert!(seen.lock().unwrap().is_empty(), "No flip from a level serve");

        sync.ball_vel = Vec2::new(-260.0, 60.0);
        game.apply_sync_state(&sync, None);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                GameEvent::BallHitPaddle { side: Side::Right },
                GameEvent::BallHitTopWall
            ]
        );

        // A goal re-serves, so a flip alongside it is not a bounce
        seen.lock().unwrap().clear();
        sync.ball_vel = Vec2::new(240.0, -60.0);
        sync.score = Score { left: 1, right: 0 };
        game.apply_sync_state(&sync, None);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![GameEvent::PlayerScored { side: Side::Left }]
        );
    }

    #[test]
    fn test_end_with_winner_overrides_local_score() {
        let mut game = keyboard_match(Config::new());
        let seen = record_events(&mut game);
        game.begin().unwrap();
        let mut sync = game.sync_state();
        sync.score = Score { left: 2, right: 0 };
        game.apply_sync_state(&sync, None);
        seen.lock().unwrap().clear();

        assert!(game.end_with_winner(EndReason::ScoreLimitReached, Some(Side::Right)));
        assert!(!game.end_with_winner(EndReason::PlayerEnd, None));

        assert_eq!(game.winner(), Some(Side::Right));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![GameEvent::GameEnded {
                reason: EndReason::ScoreLimitReached,
                winner: Some(Side::Right)
            }]
        );
        game.reset();
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_tick_local_forwards_and_predicts() {
        let mut game = keyboard_match(Config::new());
        game.begin().unwrap();
        let ball = game.ball();
        game.player_as_mut::<KeyboardPlayer>(Side::Left)
            .unwrap()
            .set_keys_down(&["ArrowUp"]);

        let sent = game.tick_local(Some(Side::Left));

        assert_eq!(sent, vec![(Side::Left, Action::MoveUp)]);
        assert!(game.left_paddle().pos.y < 300.0);
        assert_eq!(game.ball(), ball, "No physics on the mirror");
        assert!(game.tick_local(Some(Side::Left)).is_empty());
    }

    #[test]
    fn test_reset_keeps_listeners_and_drops_players() {
        let mut game = keyboard_match(Config::new());
        let seen = record_events(&mut game);
        game.begin().unwrap();
        game.reset();

        assert_eq!(game.state(), MatchState::Created);
        assert!(game.left_player().is_none());
        assert_eq!(game.initialize(), Err(MatchError::PlayersNotBound));

        game.set_players(
            Box::new(KeyboardPlayer::new(KeyBindings::arrows())),
            Box::new(KeyboardPlayer::new(KeyBindings::qa())),
        )
        .unwrap();
        game.initialize().unwrap();
        game.begin().unwrap();
        game.end(EndReason::PlayerEnd);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_shared_frame_follows_ticks() {
        let mut game = keyboard_match(Config::new());
        let shared = game.share_frame();
        game.begin().unwrap();
        game.tick();
        game.tick();

        let frame = shared.load();
        assert_eq!(frame.tick, 2);
        assert_eq!(frame.state, MatchState::Running);
        assert_eq!(frame.ball, game.ball());
    }
}
