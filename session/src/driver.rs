use game_core::{Match, MatchError, PongPlayer, Side};

use crate::inbox::Inbox;
use crate::transport::Transport;
use crate::{HostDriver, MirrorDriver, NetworkPlayer, SessionConfig};

/// Which peer owns the physics. Fixed for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Authoritative,
    Mirror,
}

impl Role {
    /// The host defends the right goal, the mirror the left
    pub fn local_side(self) -> Side {
        match self {
            Role::Authoritative => Side::Right,
            Role::Mirror => Side::Left,
        }
    }
}

/// Established connection to the remote peer
pub struct Link {
    pub transport: Box<dyn Transport>,
    pub inbox: Inbox,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>, inbox: Inbox) -> Self {
        Self { transport, inbox }
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("inbox", &self.inbox)
            .finish_non_exhaustive()
    }
}

/// One strategy for advancing a networked match by a tick
pub trait SimulationDriver: Send {
    fn role(&self) -> Role;

    fn tick(&mut self, game: &mut Match);
}

/// A match plus the driver chosen for this peer's role
pub struct Session {
    game: Match,
    driver: Box<dyn SimulationDriver>,
}

impl Session {
    /// Seat `local` and a network player for the peer, then pick the driver.
    ///
    /// The host begins immediately; the mirror begins on its first snapshot.
    pub fn start(
        role: Role,
        mut game: Match,
        mut local: Box<dyn PongPlayer>,
        link: Link,
        config: &SessionConfig,
    ) -> Result<Self, MatchError> {
        let local_side = role.local_side();
        let (mut remote, intents) = NetworkPlayer::named("Remote Player");
        local.set_side(local_side);
        remote.set_side(local_side.opponent());

        game.set_players(local, Box::new(remote))?;
        game.initialize()?;

        let driver: Box<dyn SimulationDriver> = match role {
            Role::Authoritative => {
                game.begin()?;
                Box::new(HostDriver::new(link, intents, config))
            }
            Role::Mirror => Box::new(MirrorDriver::new(link, local_side, config)),
        };
        tracing::info!(?role, ?local_side, "Session started");

        Ok(Self::new(game, driver))
    }

    pub fn new(game: Match, driver: Box<dyn SimulationDriver>) -> Self {
        Self { game, driver }
    }

    pub fn tick(&mut self) {
        self.driver.tick(&mut self.game);
    }

    pub fn role(&self) -> Role {
        self.driver.role()
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Match {
        &mut self.game
    }

    pub fn into_match(self) -> Match {
        self.game
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role())
            .field("game", &self.game)
            .finish()
    }
}
