//! The role registry: who holds White, who holds Black, who is watching.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use rand::Rng;
use rookline_protocol::Role;
use rookline_transport::ConnectionId;

use crate::{RegistryConfig, RegistryError, Seat, SeatState};

/// The outcome of admitting a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub role: Role,
    /// Token the client presents to reclaim `role` after a disconnect.
    pub token: String,
    /// `true` when a reconnection token restored a previous role.
    pub reclaimed: bool,
    /// The connection that held the role until this admission took it
    /// over. It is no longer registered.
    pub displaced: Option<ConnectionId>,
}

#[derive(Debug, Clone)]
struct Member {
    role: Role,
    token: String,
}

/// Tracks every live connection of one session and the two player roles.
///
/// Invariant: at most one connection holds `White` and at most one holds
/// `Black`. Spectators are kept in connection-id order.
pub struct RoleRegistry {
    members: BTreeMap<ConnectionId, Member>,
    seats: HashMap<String, Seat>,
    white: Option<ConnectionId>,
    black: Option<ConnectionId>,
    config: RegistryConfig,
}

impl RoleRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            members: BTreeMap::new(),
            seats: HashMap::new(),
            white: None,
            black: None,
            config,
        }
    }

    /// Admits a new connection in assignment order: the first vacant of
    /// `White`, then `Black`, then `Spectator`.
    pub fn connect(&mut self, conn_id: ConnectionId) -> Result<Admission, RegistryError> {
        if self.members.contains_key(&conn_id) {
            return Err(RegistryError::AlreadyConnected(conn_id));
        }
        self.expire_stale();
        self.cleanup_expired();

        let role = self.next_role();
        Ok(self.bind(conn_id, role, generate_token(), false))
    }

    /// Admits a returning connection that presents a reconnection token.
    ///
    /// If the token's role is a color that is still vacant, the connection
    /// gets it back under the same token. If someone else took it, or the
    /// token belonged to a spectator, the token is spent and the connection
    /// goes through normal assignment.
    ///
    /// A color seat still held by another connection is taken over: the old
    /// holder is unregistered and reported in [`Admission::displaced`]. A
    /// half-open socket never notices it is gone, so the returning player
    /// has to be able to evict it.
    pub fn reconnect(
        &mut self,
        conn_id: ConnectionId,
        token: &str,
    ) -> Result<Admission, RegistryError> {
        if self.members.contains_key(&conn_id) {
            return Err(RegistryError::AlreadyConnected(conn_id));
        }
        let grace = self.config.grace();
        let seat = self.seats.get_mut(token).ok_or(RegistryError::InvalidToken)?;

        let displaced = match seat.state {
            SeatState::Held(holder) if seat.role.is_player() => Some(holder),
            SeatState::Held(holder) => return Err(RegistryError::AlreadyConnected(holder)),
            SeatState::Expired => return Err(RegistryError::SeatExpired),
            SeatState::Vacated { .. } if seat.is_stale(grace) => {
                seat.state = SeatState::Expired;
                return Err(RegistryError::SeatExpired);
            }
            SeatState::Vacated { .. } => None,
        };

        let role = seat.role;
        if let Some(holder) = displaced {
            self.members.remove(&holder);
            tracing::info!(%conn_id, %holder, %role, "seat taken over by returning client");
            let mut admission = self.bind(conn_id, role, token.to_string(), true);
            admission.displaced = Some(holder);
            return Ok(admission);
        }

        let vacant = match role {
            Role::White => self.white.is_none(),
            Role::Black => self.black.is_none(),
            Role::Spectator => false,
        };
        if vacant {
            tracing::info!(%conn_id, %role, "role reclaimed");
            return Ok(self.bind(conn_id, role, token.to_string(), true));
        }

        self.seats.remove(token);
        tracing::debug!(%conn_id, previous = %role, "seat not reclaimable, assigning afresh");
        self.connect(conn_id)
    }

    /// Admits `conn_id`, trying `token` first and falling back to normal
    /// assignment when the token cannot be honored.
    pub fn admit(
        &mut self,
        conn_id: ConnectionId,
        token: Option<&str>,
    ) -> Result<Admission, RegistryError> {
        match token {
            Some(token) => match self.reconnect(conn_id, token) {
                Ok(admission) => Ok(admission),
                Err(RegistryError::AlreadyConnected(id)) if id == conn_id => {
                    Err(RegistryError::AlreadyConnected(id))
                }
                Err(e) => {
                    tracing::info!(%conn_id, error = %e, "reconnect token refused");
                    self.connect(conn_id)
                }
            },
            None => self.connect(conn_id),
        }
    }

    /// Releases `conn_id`. A player's color becomes free immediately; the
    /// seat stays reclaimable for the grace period.
    pub fn disconnect(&mut self, conn_id: ConnectionId) -> Result<Role, RegistryError> {
        let member = self
            .members
            .remove(&conn_id)
            .ok_or(RegistryError::NotFound(conn_id))?;

        if self.white == Some(conn_id) {
            self.white = None;
        }
        if self.black == Some(conn_id) {
            self.black = None;
        }
        if let Some(seat) = self.seats.get_mut(&member.token) {
            seat.state = SeatState::Vacated {
                since: Instant::now(),
            };
        }

        tracing::info!(%conn_id, role = %member.role, "connection released");
        Ok(member.role)
    }

    /// Marks every vacated seat past its grace period as expired and
    /// returns the roles those seats named.
    pub fn expire_stale(&mut self) -> Vec<Role> {
        let grace = self.config.grace();
        let mut expired = Vec::new();

        for seat in self.seats.values_mut() {
            if seat.is_stale(grace) {
                seat.state = SeatState::Expired;
                expired.push(seat.role);
                tracing::debug!(role = %seat.role, "seat expired");
            }
        }

        expired
    }

    /// Forgets expired seats and their tokens.
    pub fn cleanup_expired(&mut self) {
        self.seats
            .retain(|_, seat| !matches!(seat.state, SeatState::Expired));
    }

    pub fn role_of(&self, conn_id: ConnectionId) -> Option<Role> {
        self.members.get(&conn_id).map(|m| m.role)
    }

    pub fn white(&self) -> Option<ConnectionId> {
        self.white
    }

    pub fn black(&self) -> Option<ConnectionId> {
        self.black
    }

    /// Spectator connections in connection-id order.
    pub fn spectators(&self) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|(_, m)| m.role == Role::Spectator)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every live connection with its role, in connection-id order.
    pub fn members(&self) -> impl Iterator<Item = (ConnectionId, Role)> + '_ {
        self.members.iter().map(|(id, m)| (*id, m.role))
    }

    /// Every live connection, in connection-id order.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.keys().copied()
    }

    pub fn seat(&self, token: &str) -> Option<&Seat> {
        self.seats.get(token)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn next_role(&self) -> Role {
        if self.white.is_none() {
            Role::White
        } else if self.black.is_none() {
            Role::Black
        } else {
            Role::Spectator
        }
    }

    fn bind(
        &mut self,
        conn_id: ConnectionId,
        role: Role,
        token: String,
        reclaimed: bool,
    ) -> Admission {
        match role {
            Role::White => self.white = Some(conn_id),
            Role::Black => self.black = Some(conn_id),
            Role::Spectator => {}
        }
        self.seats.insert(
            token.clone(),
            Seat {
                role,
                state: SeatState::Held(conn_id),
                token: token.clone(),
            },
        );
        self.members.insert(
            conn_id,
            Member {
                role,
                token: token.clone(),
            },
        );

        if !reclaimed {
            tracing::info!(%conn_id, %role, "role assigned");
        }
        Admission {
            role,
            token,
            reclaimed,
            displaced: None,
        }
    }
}

fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
