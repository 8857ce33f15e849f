//! Headless bot-vs-bot match between a host and a mirror over an in-memory link

use game_core::{BotPlayer, Config, Match, MatchState, TrackingPolicy};
use session::{LoopbackTransport, Role, Session, SessionConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Give up on matches that never finish
const MAX_TICKS: u64 = 60 * 60 * 10;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Pong loopback v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default();
    config.validate()?;
    let session_config = SessionConfig::load_or_default();
    info!(
        score_limit = config.score_limit,
        frame_rate = config.frame_rate,
        snapshot_interval = session_config.snapshot_interval,
        "Configuration loaded"
    );

    let (host_end, mirror_end) = LoopbackTransport::pair(session_config.inbox_capacity);

    let mut host = Session::start(
        Role::Authoritative,
        Match::new(config.clone()),
        Box::new(BotPlayer::named("Host Bot", TrackingPolicy::default())),
        host_end.into_link(),
        &session_config,
    )?;
    let mut mirror = Session::start(
        Role::Mirror,
        Match::new(config),
        // A looser bot so rallies end
        Box::new(BotPlayer::named(
            "Mirror Bot",
            TrackingPolicy { dead_zone: 40.0 },
        )),
        mirror_end.into_link(),
        &session_config,
    )?;

    mirror.game_mut().add_event_listener(|event| {
        tracing::debug!(?event, "Mirror saw event");
    });
    let view = mirror.game_mut().share_frame();

    let mut ticks = 0;
    while mirror.game().state() != MatchState::Ended && ticks < MAX_TICKS {
        host.tick();
        mirror.tick();
        ticks += 1;

        if ticks % 600 == 0 {
            let frame = view.load();
            info!(
                tick = frame.tick,
                left = frame.score.left,
                right = frame.score.right,
                "Mirror view"
            );
        }
    }

    if mirror.game().state() != MatchState::Ended {
        host.game_mut().end(game_core::EndReason::PlayerEnd);
        host.tick();
        mirror.tick();
    }

    let game = host.game();
    info!(
        ticks,
        reason = ?game.end_reason(),
        winner = ?game.winner(),
        left = game.score().left,
        right = game.score().right,
        mirror_left = mirror.game().score().left,
        mirror_right = mirror.game().score().right,
        "Match over"
    );

    Ok(())
}
