//! The byte channel to the single remote peer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::inbox::{self, Delivery, Inbox};
use crate::{Link, Role};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
    #[error("peer rejected the message")]
    Rejected,
    #[error("transport I/O failed: {0}")]
    Io(String),
}

/// Ordered, reliable delivery of whole messages to the peer.
///
/// Sends never block the tick; whatever happens after the bytes are handed
/// over is the transport's concern.
pub trait Transport: Send {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// In-memory transport handing bytes straight to the peer's [`Delivery`]
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    peer: Delivery,
    local: Delivery,
    open: Arc<AtomicBool>,
}

impl LoopbackTransport {
    /// Connected host and mirror ends sharing one open/closed state
    pub fn pair(capacity: usize) -> (LoopbackEnd, LoopbackEnd) {
        let (host_delivery, host_inbox) = inbox::channel(Role::Authoritative, capacity);
        let (mirror_delivery, mirror_inbox) = inbox::channel(Role::Mirror, capacity);
        let open = Arc::new(AtomicBool::new(true));

        let to_mirror = LoopbackTransport {
            peer: mirror_delivery.clone(),
            local: host_delivery.clone(),
            open: open.clone(),
        };
        let to_host = LoopbackTransport {
            peer: host_delivery,
            local: mirror_delivery,
            open,
        };

        (
            LoopbackEnd {
                transport: to_mirror,
                inbox: host_inbox,
            },
            LoopbackEnd {
                transport: to_host,
                inbox: mirror_inbox,
            },
        )
    }

    /// Drop the link; both ends see a disconnect
    pub fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            tracing::info!("Loopback link closed");
            self.peer.connection_lost();
            self.local.connection_lost();
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// One peer's side of a loopback pair
#[derive(Debug)]
pub struct LoopbackEnd {
    pub transport: LoopbackTransport,
    pub inbox: Inbox,
}

impl LoopbackEnd {
    pub fn into_link(self) -> Link {
        Link::new(Box::new(self.transport), self.inbox)
    }
}

impl Transport for LoopbackTransport {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        if self.peer.deliver(bytes) {
            Ok(())
        } else {
            Err(TransportError::Rejected)
        }
    }
}
