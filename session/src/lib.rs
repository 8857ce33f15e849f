//! Host-authoritative sync between two peers of one Pong match
//!
//! The host runs the real simulation and sends snapshots; the mirror applies
//! them and sends back its player's intents.

pub mod config;
pub mod driver;
pub mod host;
pub mod inbox;
pub mod mirror;
pub mod network_player;
pub mod transport;
pub mod wire;

#[cfg(test)]
mod tests;

pub use config::SessionConfig;
pub use driver::{Link, Role, Session, SimulationDriver};
pub use host::HostDriver;
pub use inbox::{Delivery, Inbox, PeerEvent};
pub use mirror::MirrorDriver;
pub use network_player::{NetworkPlayer, RemoteIntents};
pub use transport::{LoopbackEnd, LoopbackTransport, Transport, TransportError};
