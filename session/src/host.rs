use game_core::{EndReason, Match, MatchState};
use proto::ToMirror;

use crate::inbox::PeerEvent;
use crate::{wire, Link, RemoteIntents, Role, SessionConfig, SimulationDriver};

/// Runs the real simulation and publishes it to the mirror
#[derive(Debug)]
pub struct HostDriver {
    link: Link,
    remote: RemoteIntents,
    snapshot_interval: u32,
    ticks_since_snapshot: u32,
    seq: u32,
    disconnected: bool,
    paused_sent: bool,
    game_over_sent: bool,
}

impl HostDriver {
    pub fn new(link: Link, remote: RemoteIntents, config: &SessionConfig) -> Self {
        Self {
            link,
            remote,
            snapshot_interval: config.snapshot_interval.max(1),
            ticks_since_snapshot: 0,
            seq: 0,
            disconnected: false,
            paused_sent: false,
            game_over_sent: false,
        }
    }

    /// Sequence number of the last snapshot sent
    pub fn last_seq(&self) -> u32 {
        self.seq
    }

    fn handle(&mut self, event: PeerEvent, game: &mut Match) {
        match event {
            PeerEvent::Intent(action) => self.remote.push(action),
            PeerEvent::Quit => {
                if game.end(EndReason::PlayerEnd) {
                    tracing::info!("Mirror quit");
                }
            }
            PeerEvent::Disconnected => {
                if !self.disconnected {
                    self.disconnected = true;
                    tracing::warn!("Mirror disconnected");
                    game.end(EndReason::PlayerDisconnect);
                }
            }
            PeerEvent::Snapshot(_) | PeerEvent::GameOver { .. } | PeerEvent::Paused(_) => {
                tracing::warn!(?event, "Ignoring host-bound message from mirror");
            }
        }
    }

    fn send_snapshot(&mut self, game: &Match) {
        self.seq += 1;
        self.ticks_since_snapshot = 0;
        let snapshot = wire::snapshot(self.seq, &game.sync_state());
        self.send(&ToMirror::State(snapshot));
    }

    fn send(&self, msg: &ToMirror) {
        if self.disconnected {
            return;
        }
        match msg.to_bytes() {
            Ok(bytes) => {
                if let Err(e) = self.link.transport.send_bytes(&bytes) {
                    tracing::warn!(error = %e, "Failed to send to mirror");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode message for mirror"),
        }
    }
}

impl SimulationDriver for HostDriver {
    fn role(&self) -> Role {
        Role::Authoritative
    }

    fn tick(&mut self, game: &mut Match) {
        for event in self.link.inbox.drain() {
            self.handle(event, game);
        }

        let was_running = game.state() == MatchState::Running;
        game.tick();

        if game.state() == MatchState::Ended {
            if !self.game_over_sent {
                self.game_over_sent = true;
                self.send_snapshot(game);
                let reason = game.end_reason().unwrap_or(EndReason::PlayerEnd);
                self.send(&ToMirror::GameOver {
                    reason: wire::reason_to_wire(reason),
                    winner: game.winner().map(wire::side_to_wire),
                });
                tracing::debug!(seq = self.seq, ?reason, "Sent game over");
            }
            return;
        }

        let paused = game.state() == MatchState::Paused;
        if paused != self.paused_sent {
            self.paused_sent = paused;
            self.send(&ToMirror::Pause { paused });
            tracing::debug!(paused, "Sent pause state");
        }

        if was_running {
            self.ticks_since_snapshot += 1;
            if self.ticks_since_snapshot >= self.snapshot_interval {
                self.send_snapshot(game);
            }
        }
    }
}
