use game_core::{Action, EndReason, Match, MatchState, Side};
use proto::{StateSnapshot, ToHost};

use crate::inbox::PeerEvent;
use crate::{wire, Link, Role, SessionConfig, SimulationDriver};

/// Shows the host's game: applies its snapshots and forwards local intents.
///
/// No physics runs here and nothing is extrapolated between snapshots, so the
/// ball moves in steps of the host's snapshot interval.
#[derive(Debug)]
pub struct MirrorDriver {
    link: Link,
    local: Side,
    reconcile_local_paddle: bool,
    last_seq: Option<u32>,
    last_sent: Option<Action>,
    ended_by_host: bool,
    disconnected: bool,
    quit_sent: bool,
}

impl MirrorDriver {
    pub fn new(link: Link, local: Side, config: &SessionConfig) -> Self {
        Self {
            link,
            local,
            reconcile_local_paddle: config.reconcile_local_paddle,
            last_seq: None,
            last_sent: None,
            ended_by_host: false,
            disconnected: false,
            quit_sent: false,
        }
    }

    /// Sequence number of the newest snapshot applied
    pub fn last_seq(&self) -> Option<u32> {
        self.last_seq
    }

    fn is_newer(&self, seq: u32) -> bool {
        self.last_seq.map_or(true, |last| seq > last)
    }

    fn apply(&mut self, snapshot: &StateSnapshot, game: &mut Match) {
        if game.state() == MatchState::Ended {
            return;
        }
        if game.state() == MatchState::Initialized {
            if let Err(e) = game.begin() {
                tracing::warn!(error = %e, "Could not start mirrored match");
                return;
            }
        }
        let keep = (!self.reconcile_local_paddle).then_some(self.local);
        game.apply_sync_state(&wire::sync_state(snapshot), keep);
        self.last_seq = Some(snapshot.seq);
    }

    fn send(&self, msg: &ToHost) {
        if self.disconnected {
            return;
        }
        match msg.to_bytes() {
            Ok(bytes) => {
                if let Err(e) = self.link.transport.send_bytes(&bytes) {
                    tracing::warn!(error = %e, "Failed to send to host");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode message for host"),
        }
    }
}

impl SimulationDriver for MirrorDriver {
    fn role(&self) -> Role {
        Role::Mirror
    }

    fn tick(&mut self, game: &mut Match) {
        // Only the newest snapshot is applied; it is flushed before a pause
        // or anything that ends the match so the final score lands first
        let mut pending: Option<StateSnapshot> = None;
        for event in self.link.inbox.drain() {
            match event {
                PeerEvent::Snapshot(snapshot) => {
                    let newest = pending.map_or(self.last_seq, |p| Some(p.seq));
                    if newest.map_or(true, |last| snapshot.seq > last) {
                        pending = Some(snapshot);
                    } else {
                        tracing::trace!(seq = snapshot.seq, ?newest, "Discarding stale snapshot");
                    }
                }
                PeerEvent::Paused(paused) => {
                    if let Some(snapshot) = pending.take() {
                        self.apply(&snapshot, game);
                    }
                    let result = if paused { game.pause() } else { game.resume() };
                    if let Err(e) = result {
                        tracing::warn!(error = %e, paused, "Could not follow host pause");
                    }
                }
                PeerEvent::GameOver { reason, winner } => {
                    if let Some(snapshot) = pending.take() {
                        self.apply(&snapshot, game);
                    }
                    if game.end_with_winner(reason, winner) {
                        self.ended_by_host = true;
                        tracing::info!(?reason, ?winner, "Host ended the match");
                    }
                }
                PeerEvent::Disconnected => {
                    if let Some(snapshot) = pending.take() {
                        self.apply(&snapshot, game);
                    }
                    if !self.disconnected {
                        self.disconnected = true;
                        tracing::warn!("Host disconnected");
                        game.end(EndReason::PlayerDisconnect);
                    }
                }
                PeerEvent::Intent(_) | PeerEvent::Quit => {
                    tracing::warn!(?event, "Ignoring mirror-bound message from host");
                }
            }
        }
        if let Some(snapshot) = pending {
            if self.is_newer(snapshot.seq) {
                self.apply(&snapshot, game);
            }
        }

        for (side, action) in game.tick_local(Some(self.local)) {
            if side != self.local || self.last_sent == Some(action) {
                continue;
            }
            self.last_sent = Some(action);
            self.send(&ToHost::Intent {
                paddle_dir: action.dir(),
            });
        }

        let quit_locally = game.state() == MatchState::Ended
            && game.end_reason() == Some(EndReason::PlayerEnd)
            && !self.ended_by_host;
        if quit_locally && !self.quit_sent {
            self.quit_sent = true;
            tracing::info!("Telling host we quit");
            self.send(&ToHost::Quit);
        }
    }
}
