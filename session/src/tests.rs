use crate::inbox::{self, Delivery};
use crate::*;
use game_core::{
    Action, BotPlayer, Config, EndReason, GameEvent, KeyBindings, KeyboardPlayer, Match,
    MatchState, Score, Side,
};
use parking_lot::Mutex;
use proto::{EndCode, StateSnapshot, ToHost, ToMirror};
use std::sync::Arc;

#[derive(Clone, Default)]
struct MockTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Transport for MockTransport {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().push(bytes.to_vec());
        Ok(())
    }
}

impl MockTransport {
    fn to_mirror(&self) -> Vec<ToMirror> {
        self.sent
            .lock()
            .iter()
            .map(|bytes| ToMirror::from_bytes(bytes).unwrap())
            .collect()
    }

    fn to_host(&self) -> Vec<ToHost> {
        self.sent
            .lock()
            .iter()
            .map(|bytes| ToHost::from_bytes(bytes).unwrap())
            .collect()
    }
}

fn start(role: Role, session_config: &SessionConfig) -> (Session, Delivery, MockTransport) {
    let (delivery, inbox) = inbox::channel(role, session_config.inbox_capacity);
    let transport = MockTransport::default();
    let link = Link::new(Box::new(transport.clone()), inbox);
    let session = Session::start(
        role,
        Match::new(Config::new()),
        Box::new(KeyboardPlayer::new(KeyBindings::arrows())),
        link,
        session_config,
    )
    .unwrap();
    (session, delivery, transport)
}

fn snapshot(seq: u32, ball_x: f32, score_left: u8, score_right: u8) -> StateSnapshot {
    StateSnapshot {
        seq,
        ball_x,
        ball_y: 300.0,
        ball_vx: 240.0,
        ball_vy: 0.0,
        paddle_left_y: 300.0,
        paddle_right_y: 200.0 + seq as f32,
        score_left,
        score_right,
    }
}

fn send_to_mirror(delivery: &Delivery, msg: ToMirror) {
    assert!(delivery.deliver(&msg.to_bytes().unwrap()));
}

fn send_to_host(delivery: &Delivery, msg: ToHost) {
    assert!(delivery.deliver(&msg.to_bytes().unwrap()));
}

fn count_ended(session: &mut Session) -> Arc<Mutex<Vec<GameEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    session.game_mut().add_event_listener(move |event| {
        if matches!(event, GameEvent::GameEnded { .. }) {
            sink.lock().push(*event);
        }
    });
    seen
}

#[test]
fn test_session_roles_and_sides() {
    let (host, _, _) = start(Role::Authoritative, &SessionConfig::default());
    assert_eq!(host.role(), Role::Authoritative);
    assert_eq!(host.game().state(), MatchState::Running);
    assert_eq!(host.game().left_player().unwrap().name(), "Remote Player");

    let (mirror, _, _) = start(Role::Mirror, &SessionConfig::default());
    assert_eq!(mirror.role(), Role::Mirror);
    assert_eq!(mirror.game().state(), MatchState::Initialized);
    assert_eq!(mirror.game().right_player().unwrap().name(), "Remote Player");
}

#[test]
fn test_out_of_order_snapshot_is_ignored() {
    let config = SessionConfig::default();
    let (mut shuffled, to_shuffled, _) = start(Role::Mirror, &config);
    let (mut ordered, to_ordered, _) = start(Role::Mirror, &config);

    for (seq, x, l, r) in [(3, 100.0, 0, 0), (5, 200.0, 1, 0), (4, 150.0, 0, 0), (6, 250.0, 1, 1)] {
        send_to_mirror(&to_shuffled, ToMirror::State(snapshot(seq, x, l, r)));
        shuffled.tick();
    }
    for (seq, x, l, r) in [(3, 100.0, 0, 0), (5, 200.0, 1, 0), (6, 250.0, 1, 1)] {
        send_to_mirror(&to_ordered, ToMirror::State(snapshot(seq, x, l, r)));
        ordered.tick();
    }

    assert_eq!(shuffled.game().sync_state(), ordered.game().sync_state());
    assert_eq!(shuffled.game().ball().pos.x, 250.0);
    assert_eq!(shuffled.game().score(), Score { left: 1, right: 1 });
    assert_eq!(shuffled.game().right_paddle().pos.y, 206.0);
}

#[test]
fn test_only_newest_snapshot_in_a_tick_applies() {
    let (mut mirror, delivery, _) = start(Role::Mirror, &SessionConfig::default());
    for (seq, x) in [(7, 100.0), (9, 300.0), (8, 200.0)] {
        send_to_mirror(&delivery, ToMirror::State(snapshot(seq, x, 0, 0)));
    }
    mirror.tick();
    assert_eq!(mirror.game().ball().pos.x, 300.0);

    // Anything at or below the applied sequence stays ignored
    send_to_mirror(&delivery, ToMirror::State(snapshot(9, 50.0, 0, 0)));
    mirror.tick();
    assert_eq!(mirror.game().ball().pos.x, 300.0);
}

#[test]
fn test_repeated_intent_is_sent_once() {
    let (mut mirror, delivery, transport) = start(Role::Mirror, &SessionConfig::default());

    // Pressed before the first snapshot; forwarded once the match runs
    mirror
        .game_mut()
        .player_as_mut::<KeyboardPlayer>(Side::Left)
        .unwrap()
        .set_keys_down(&["ArrowUp"]);
    mirror.tick();
    assert!(transport.to_host().is_empty());

    send_to_mirror(&delivery, ToMirror::State(snapshot(1, 400.0, 0, 0)));
    mirror.tick();
    for _ in 0..3 {
        mirror
            .game_mut()
            .player_as_mut::<KeyboardPlayer>(Side::Left)
            .unwrap()
            .set_keys_down(&["ArrowUp", "Shift"]);
        mirror.tick();
    }
    assert_eq!(transport.to_host(), vec![ToHost::Intent { paddle_dir: -1 }]);

    mirror
        .game_mut()
        .player_as_mut::<KeyboardPlayer>(Side::Left)
        .unwrap()
        .set_keys_down::<&str>(&[]);
    mirror.tick();
    assert_eq!(
        transport.to_host(),
        vec![
            ToHost::Intent { paddle_dir: -1 },
            ToHost::Intent { paddle_dir: 0 }
        ]
    );
}

#[test]
fn test_host_applies_remote_intent() {
    let (mut host, delivery, _) = start(Role::Authoritative, &SessionConfig::default());
    send_to_host(&delivery, ToHost::Intent { paddle_dir: 1 });
    host.tick();

    assert_eq!(host.game().paddle_action(Side::Left), Action::MoveDown);
    assert!(host.game().left_paddle().pos.y > 300.0);
    assert_eq!(host.game().paddle_action(Side::Right), Action::Stop);
}

#[test]
fn test_host_snapshots_follow_interval_with_rising_seq() {
    let config = SessionConfig {
        snapshot_interval: 2,
        ..SessionConfig::default()
    };
    let (mut host, _, transport) = start(Role::Authoritative, &config);
    for _ in 0..6 {
        host.tick();
    }

    let seqs: Vec<u32> = transport
        .to_mirror()
        .into_iter()
        .map(|msg| match msg {
            ToMirror::State(snapshot) => snapshot.seq,
            other => panic!("Unexpected {other:?}"),
        })
        .collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[test]
fn test_host_disconnect_ends_once() {
    let (mut host, delivery, transport) = start(Role::Authoritative, &SessionConfig::default());
    let ended = count_ended(&mut host);

    delivery.connection_lost();
    host.tick();
    delivery.connection_lost();
    host.tick();

    assert_eq!(host.game().end_reason(), Some(EndReason::PlayerDisconnect));
    assert_eq!(ended.lock().len(), 1);
    assert!(transport.to_mirror().is_empty(), "Nothing is sent to a gone peer");
}

#[test]
fn test_game_over_follows_final_snapshot_once() {
    let (mut host, _, transport) = start(Role::Authoritative, &SessionConfig::default());
    host.tick();
    host.tick();
    host.game_mut().end(EndReason::PlayerEnd);
    for _ in 0..3 {
        host.tick();
    }

    let sent = transport.to_mirror();
    assert_eq!(sent.len(), 4);
    assert!(matches!(sent[2], ToMirror::State(StateSnapshot { seq: 3, .. })));
    assert_eq!(
        sent[3],
        ToMirror::GameOver {
            reason: EndCode::PlayerEnd,
            winner: None
        }
    );
}

#[test]
fn test_mirror_quit_ends_host_match() {
    let (mut host, delivery, transport) = start(Role::Authoritative, &SessionConfig::default());
    send_to_host(&delivery, ToHost::Quit);
    host.tick();

    assert_eq!(host.game().end_reason(), Some(EndReason::PlayerEnd));
    assert!(transport.to_mirror().contains(&ToMirror::GameOver {
        reason: EndCode::PlayerEnd,
        winner: None
    }));
}

#[test]
fn test_mirror_sends_quit_once() {
    let (mut mirror, delivery, transport) = start(Role::Mirror, &SessionConfig::default());
    send_to_mirror(&delivery, ToMirror::State(snapshot(1, 400.0, 0, 0)));
    mirror.tick();

    mirror.game_mut().end(EndReason::PlayerEnd);
    mirror.tick();
    mirror.tick();

    let quits = transport
        .to_host()
        .into_iter()
        .filter(|msg| *msg == ToHost::Quit)
        .count();
    assert_eq!(quits, 1);
}

#[test]
fn test_mirror_does_not_echo_host_game_over() {
    let (mut mirror, delivery, transport) = start(Role::Mirror, &SessionConfig::default());
    let ended = count_ended(&mut mirror);
    send_to_mirror(&delivery, ToMirror::State(snapshot(1, 400.0, 2, 3)));
    send_to_mirror(
        &delivery,
        ToMirror::GameOver {
            reason: EndCode::PlayerEnd,
            winner: Some(1),
        },
    );
    mirror.tick();
    mirror.tick();

    assert_eq!(mirror.game().state(), MatchState::Ended);
    assert_eq!(mirror.game().score(), Score { left: 2, right: 3 });
    assert_eq!(
        *ended.lock(),
        vec![GameEvent::GameEnded {
            reason: EndReason::PlayerEnd,
            winner: Some(Side::Right)
        }]
    );
    assert!(transport.to_host().is_empty());
}

#[test]
fn test_mirror_disconnect_ends_match() {
    let (mut mirror, delivery, _) = start(Role::Mirror, &SessionConfig::default());
    delivery.connection_lost();
    mirror.tick();
    assert_eq!(mirror.game().end_reason(), Some(EndReason::PlayerDisconnect));
}

#[test]
fn test_local_paddle_survives_snapshots_without_reconcile() {
    let config = SessionConfig {
        reconcile_local_paddle: false,
        ..SessionConfig::default()
    };
    let (mut mirror, delivery, _) = start(Role::Mirror, &config);
    let mut snap = snapshot(1, 400.0, 0, 0);
    snap.paddle_left_y = 100.0;
    send_to_mirror(&delivery, ToMirror::State(snap));
    mirror.tick();

    assert_eq!(mirror.game().left_paddle().pos.y, 300.0);
    assert_eq!(mirror.game().right_paddle().pos.y, 201.0);
}

fn loopback_pair(config: Config) -> (Session, Session, LoopbackTransport) {
    let session_config = SessionConfig::default();
    let (host_end, mirror_end) = LoopbackTransport::pair(session_config.inbox_capacity);
    let closer = host_end.transport.clone();

    let host = Session::start(
        Role::Authoritative,
        Match::new(config.clone()),
        Box::new(BotPlayer::tracking()),
        host_end.into_link(),
        &session_config,
    )
    .unwrap();
    let mut mirror = Session::start(
        Role::Mirror,
        Match::new(config),
        Box::new(KeyboardPlayer::new(KeyBindings::arrows())),
        mirror_end.into_link(),
        &session_config,
    )
    .unwrap();
    // The mirror's player hides in the top corner
    mirror
        .game_mut()
        .player_as_mut::<KeyboardPlayer>(Side::Left)
        .unwrap()
        .set_keys_down(&["ArrowUp"]);

    (host, mirror, closer)
}

#[test]
fn test_loopback_match_runs_to_score_limit() {
    let config = Config {
        serve_angle_spread: 0.0,
        ..Config::new()
    };
    let (mut host, mut mirror, _) = loopback_pair(config);

    for _ in 0..20_000 {
        host.tick();
        mirror.tick();
        if mirror.game().state() == MatchState::Ended {
            break;
        }
    }

    let final_score = Score { left: 0, right: 5 };
    assert_eq!(host.game().end_reason(), Some(EndReason::ScoreLimitReached));
    assert_eq!(host.game().score(), final_score);
    assert_eq!(host.game().winner(), Some(Side::Right));
    assert_eq!(mirror.game().end_reason(), Some(EndReason::ScoreLimitReached));
    assert_eq!(mirror.game().score(), final_score);
    assert_eq!(mirror.game().right_player().unwrap().points(), 5);
    assert!(mirror.game().left_paddle().top() <= 1.0);
}

#[test]
fn test_closing_loopback_disconnects_both_peers() {
    let (mut host, mut mirror, closer) = loopback_pair(Config::new());
    for _ in 0..10 {
        host.tick();
        mirror.tick();
    }

    closer.close();
    assert!(!closer.is_open());
    host.tick();
    mirror.tick();

    assert_eq!(host.game().end_reason(), Some(EndReason::PlayerDisconnect));
    assert_eq!(mirror.game().end_reason(), Some(EndReason::PlayerDisconnect));
}

#[test]
fn test_stalled_mirror_still_sees_latest_state_and_game_over() {
    let session_config = SessionConfig {
        inbox_capacity: 4,
        ..SessionConfig::default()
    };
    let (host_end, mirror_end) = LoopbackTransport::pair(session_config.inbox_capacity);
    let mut host = Session::start(
        Role::Authoritative,
        Match::new(Config::new()),
        Box::new(BotPlayer::tracking()),
        host_end.into_link(),
        &session_config,
    )
    .unwrap();
    let mut mirror = Session::start(
        Role::Mirror,
        Match::new(Config::new()),
        Box::new(KeyboardPlayer::new(KeyBindings::arrows())),
        mirror_end.into_link(),
        &session_config,
    )
    .unwrap();

    for _ in 0..10 {
        host.tick();
    }
    host.game_mut().end(EndReason::PlayerEnd);
    host.tick();
    mirror.tick();

    assert_eq!(mirror.game().state(), MatchState::Ended);
    assert_eq!(mirror.game().end_reason(), Some(EndReason::PlayerEnd));
    assert_eq!(mirror.game().ball(), host.game().ball());
}

#[test]
fn test_loopback_reports_rejected_message() {
    let (host_end, _mirror_end) = LoopbackTransport::pair(4);
    assert_eq!(
        host_end.transport.send_bytes(&[0xff, 0xff, 0xff]),
        Err(TransportError::Rejected)
    );
    let ok = ToMirror::Pause { paused: false }.to_bytes().unwrap();
    assert_eq!(host_end.transport.send_bytes(&ok), Ok(()));
}

#[test]
fn test_mirror_takes_winner_from_host() {
    let (mut mirror, delivery, _) = start(Role::Mirror, &SessionConfig::default());
    let ended = count_ended(&mut mirror);
    send_to_mirror(&delivery, ToMirror::State(snapshot(1, 400.0, 2, 0)));
    mirror.tick();
    send_to_mirror(
        &delivery,
        ToMirror::GameOver {
            reason: EndCode::ScoreLimitReached,
            winner: Some(1),
        },
    );
    mirror.tick();

    assert_eq!(mirror.game().winner(), Some(Side::Right));
    assert_eq!(
        *ended.lock(),
        vec![GameEvent::GameEnded {
            reason: EndReason::ScoreLimitReached,
            winner: Some(Side::Right)
        }]
    );
}

#[test]
fn test_host_pause_reaches_mirror() {
    let (mut host, _, transport) = start(Role::Authoritative, &SessionConfig::default());
    host.tick();
    host.game_mut().pause().unwrap();
    host.tick();
    host.tick();
    host.game_mut().resume().unwrap();
    host.tick();

    let sent = transport.to_mirror();
    let pauses: Vec<_> = sent
        .iter()
        .filter(|msg| matches!(msg, ToMirror::Pause { .. }))
        .copied()
        .collect();
    assert_eq!(
        pauses,
        vec![
            ToMirror::Pause { paused: true },
            ToMirror::Pause { paused: false }
        ]
    );
    assert_eq!(sent.len(), 4, "No snapshots while paused");

    let (mut mirror, delivery, _) = start(Role::Mirror, &SessionConfig::default());
    send_to_mirror(&delivery, ToMirror::State(snapshot(1, 400.0, 0, 0)));
    send_to_mirror(&delivery, ToMirror::Pause { paused: true });
    mirror.tick();
    assert_eq!(mirror.game().state(), MatchState::Paused);

    send_to_mirror(&delivery, ToMirror::Pause { paused: false });
    mirror.tick();
    assert_eq!(mirror.game().state(), MatchState::Running);
}
