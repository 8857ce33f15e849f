//! Tick-safe handoff from the transport's delivery context
//!
//! The transport calls [`Delivery::deliver`] from whatever thread it reads
//! on; the driver drains the matching [`Inbox`] at the start of a tick.
//! Decoding and validation happen on the delivery side, so the simulation
//! only ever sees well-formed events.
//!
//! Only intents go through the bounded queue, and a full queue evicts its
//! oldest intent. Snapshots share one slot holding the newest sequence
//! number. Pause state, game over, quit and disconnect are latched and never
//! dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use game_core::{Action, EndReason, Side};
use parking_lot::Mutex;
use proto::{StateSnapshot, ToHost, ToMirror};

use crate::wire;
use crate::Role;

/// Something the remote peer did, already decoded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeerEvent {
    Intent(Action),
    Quit,
    Snapshot(StateSnapshot),
    GameOver {
        reason: EndReason,
        winner: Option<Side>,
    },
    Paused(bool),
    Disconnected,
}

/// State both ends of the handoff share besides the intent queue
#[derive(Debug, Default)]
struct Latched {
    snapshot: Mutex<Option<StateSnapshot>>,
    paused: Mutex<Option<bool>>,
    game_over: Mutex<Option<(EndReason, Option<Side>)>>,
    quit: AtomicBool,
    lost: AtomicBool,
}

/// Create the delivery handle for a peer playing `role` and its inbox
pub fn channel(role: Role, capacity: usize) -> (Delivery, Inbox) {
    let (tx, rx) = bounded(capacity.max(1));
    let latched = Arc::new(Latched::default());
    (
        Delivery {
            role,
            tx,
            evict: rx.clone(),
            latched: latched.clone(),
        },
        Inbox { rx, latched },
    )
}

/// Transport-side handle; cheap to clone
#[derive(Debug, Clone)]
pub struct Delivery {
    role: Role,
    tx: Sender<Action>,
    evict: Receiver<Action>,
    latched: Arc<Latched>,
}

impl Delivery {
    /// Decode one message and hold it for the next tick.
    ///
    /// Returns false if the message was malformed or the inbox is gone.
    pub fn deliver(&self, bytes: &[u8]) -> bool {
        match self.decode(bytes) {
            Some(event) => self.push(event),
            None => false,
        }
    }

    /// The transport noticed the peer is gone. Never dropped by backpressure.
    pub fn connection_lost(&self) {
        self.latched.lost.store(true, Ordering::Release);
    }

    fn decode(&self, bytes: &[u8]) -> Option<PeerEvent> {
        match self.role {
            Role::Authoritative => match ToHost::from_bytes(bytes) {
                Ok(ToHost::Intent { paddle_dir }) => match Action::try_from(paddle_dir) {
                    Ok(action) => Some(PeerEvent::Intent(action)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping intent");
                        None
                    }
                },
                Ok(ToHost::Quit) => Some(PeerEvent::Quit),
                Err(e) => {
                    tracing::warn!(error = %e, len = bytes.len(), "Dropping malformed message");
                    None
                }
            },
            Role::Mirror => match ToMirror::from_bytes(bytes) {
                Ok(ToMirror::State(snapshot)) => Some(PeerEvent::Snapshot(snapshot)),
                Ok(ToMirror::Pause { paused }) => Some(PeerEvent::Paused(paused)),
                Ok(ToMirror::GameOver { reason, winner }) => {
                    let winner = match winner.map(wire::side_from_wire) {
                        None => None,
                        Some(Some(side)) => Some(side),
                        Some(None) => {
                            tracing::warn!(?winner, "Dropping game over with unknown winner");
                            return None;
                        }
                    };
                    Some(PeerEvent::GameOver {
                        reason: wire::reason_from_wire(reason),
                        winner,
                    })
                }
                Err(e) => {
                    tracing::warn!(error = %e, len = bytes.len(), "Dropping malformed message");
                    None
                }
            },
        }
    }

    fn push(&self, event: PeerEvent) -> bool {
        match event {
            PeerEvent::Intent(action) => self.push_intent(action),
            PeerEvent::Snapshot(snapshot) => {
                let mut slot = self.latched.snapshot.lock();
                match *slot {
                    Some(held) if held.seq >= snapshot.seq => {
                        tracing::trace!(seq = snapshot.seq, held = held.seq, "Superseded snapshot");
                    }
                    _ => *slot = Some(snapshot),
                }
                true
            }
            PeerEvent::GameOver { reason, winner } => {
                self.latched
                    .game_over
                    .lock()
                    .get_or_insert((reason, winner));
                true
            }
            PeerEvent::Paused(paused) => {
                *self.latched.paused.lock() = Some(paused);
                true
            }
            PeerEvent::Quit => {
                self.latched.quit.store(true, Ordering::Release);
                true
            }
            PeerEvent::Disconnected => {
                self.connection_lost();
                true
            }
        }
    }

    fn push_intent(&self, mut action: Action) -> bool {
        loop {
            match self.tx.try_send(action) {
                Ok(()) => return true,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(oldest) = self.evict.try_recv() {
                        tracing::debug!(?oldest, "Inbox full, evicting oldest intent");
                    }
                    action = rejected;
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::debug!("Inbox gone, dropping intent");
                    return false;
                }
            }
        }
    }
}

/// Simulation-side end, drained once per tick
#[derive(Debug)]
pub struct Inbox {
    rx: Receiver<Action>,
    latched: Arc<Latched>,
}

impl Inbox {
    /// Everything held since the last drain: intents in arrival order, the
    /// newest snapshot, the latest pause state, then game over, quit and a
    /// lost connection. Never blocks.
    pub fn drain(&self) -> Vec<PeerEvent> {
        let mut events: Vec<_> = self.rx.try_iter().map(PeerEvent::Intent).collect();
        if let Some(snapshot) = self.latched.snapshot.lock().take() {
            events.push(PeerEvent::Snapshot(snapshot));
        }
        if let Some(paused) = self.latched.paused.lock().take() {
            events.push(PeerEvent::Paused(paused));
        }
        if let Some((reason, winner)) = self.latched.game_over.lock().take() {
            events.push(PeerEvent::GameOver { reason, winner });
        }
        if self.latched.quit.swap(false, Ordering::AcqRel) {
            events.push(PeerEvent::Quit);
        }
        if self.latched.lost.swap(false, Ordering::AcqRel) {
            events.push(PeerEvent::Disconnected);
        }
        events
    }
}
