//! Seat Registry: binds the two playing seats to live connections.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rookery_rules::Side;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one transport-level client link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a connection ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a connection may do, derived from seat occupancy at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Bound to the seat of the given side.
    Player(Side),
    /// Observes only.
    Spectator,
}

impl Role {
    /// The seat side, if this is a player.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::Player(side) => Some(side),
            Self::Spectator => None,
        }
    }
}

/// One of the two fixed playing positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    side: Side,
    occupant: Option<ConnectionId>,
    display_name: Option<String>,
    reconnect_deadline: Option<DateTime<Utc>>,
    resume_token: Option<Uuid>,
}

impl Seat {
    fn new(side: Side) -> Self {
        Self {
            side,
            occupant: None,
            display_name: None,
            reconnect_deadline: None,
            resume_token: None,
        }
    }

    /// The side this seat plays.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// The bound connection, if any. Still set while a reconnect grace
    /// window is open.
    #[must_use]
    pub const fn occupant(&self) -> Option<ConnectionId> {
        self.occupant
    }

    /// Name generated when the seat was bound.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// End of the open grace window, if the occupant is disconnected.
    #[must_use]
    pub const fn reconnect_deadline(&self) -> Option<DateTime<Utc>> {
        self.reconnect_deadline
    }

    /// Token the occupant presents to reclaim the seat after a disconnect.
    #[must_use]
    pub const fn resume_token(&self) -> Option<Uuid> {
        self.resume_token
    }

    /// No connection is bound.
    #[must_use]
    pub const fn is_vacant(&self) -> bool {
        self.occupant.is_none()
    }

    /// The occupant disconnected and the seat is held for it.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.occupant.is_some() && self.reconnect_deadline.is_some()
    }

    /// The occupant is bound and its connection is live.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.occupant.is_some() && self.reconnect_deadline.is_none()
    }
}

/// Public view of a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    /// Generated display name.
    pub display_name: String,
    /// False while the occupant is inside its reconnect grace window.
    pub connected: bool,
}

/// Who is at the board and how many are watching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    /// The white seat, absent when vacant.
    pub white: Option<SeatView>,
    /// The black seat, absent when vacant.
    pub black: Option<SeatView>,
    /// Number of connected spectators.
    pub spectators: usize,
}

/// Owns both seats and the spectator set.
///
/// Mutators are crate-private: seat state only ever changes by applying a
/// session event, so the registry is always the fold of the event stream.
#[derive(Debug, Clone)]
pub struct SeatRegistry {
    white: Seat,
    black: Seat,
    spectators: BTreeSet<ConnectionId>,
}

impl Default for SeatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SeatRegistry {
    /// Two vacant seats, no spectators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            white: Seat::new(Side::White),
            black: Seat::new(Side::Black),
            spectators: BTreeSet::new(),
        }
    }

    /// The seat for `side`.
    #[must_use]
    pub const fn seat(&self, side: Side) -> &Seat {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    fn seat_mut(&mut self, side: Side) -> &mut Seat {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    /// Pure lookup of the role a connection currently holds.
    #[must_use]
    pub fn role_of(&self, connection_id: ConnectionId) -> Role {
        Side::ALL
            .into_iter()
            .find(|side| self.seat(*side).occupant == Some(connection_id))
            .map_or(Role::Spectator, Role::Player)
    }

    /// The seat a new connection would get: white first, then black.
    #[must_use]
    pub fn next_vacant(&self) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.seat(*side).is_vacant())
    }

    /// The reserved seat whose resume token matches, if any.
    #[must_use]
    pub fn reserved_for_token(&self, token: Uuid) -> Option<Side> {
        Side::ALL.into_iter().find(|side| {
            let seat = self.seat(*side);
            seat.is_reserved() && seat.resume_token == Some(token)
        })
    }

    /// Both occupants are bound and live.
    #[must_use]
    pub fn both_connected(&self) -> bool {
        self.white.is_connected() && self.black.is_connected()
    }

    /// The connection is registered as a spectator.
    #[must_use]
    pub fn is_spectator(&self, connection_id: ConnectionId) -> bool {
        self.spectators.contains(&connection_id)
    }

    /// Number of registered spectators.
    #[must_use]
    pub fn spectator_count(&self) -> usize {
        self.spectators.len()
    }

    /// Snapshot of seat occupancy for clients.
    #[must_use]
    pub fn roster(&self) -> Roster {
        let view = |seat: &Seat| {
            seat.occupant.map(|_| SeatView {
                display_name: seat.display_name.clone().unwrap_or_default(),
                connected: seat.is_connected(),
            })
        };
        Roster {
            white: view(&self.white),
            black: view(&self.black),
            spectators: self.spectators.len(),
        }
    }

    pub(crate) fn bind(
        &mut self,
        side: Side,
        connection_id: ConnectionId,
        display_name: String,
        resume_token: Uuid,
    ) {
        let seat = self.seat_mut(side);
        seat.occupant = Some(connection_id);
        seat.display_name = Some(display_name);
        seat.reconnect_deadline = None;
        seat.resume_token = Some(resume_token);
    }

    pub(crate) fn reserve(&mut self, side: Side, deadline: DateTime<Utc>) {
        self.seat_mut(side).reconnect_deadline = Some(deadline);
    }

    pub(crate) fn rebind(&mut self, side: Side, connection_id: ConnectionId) {
        let seat = self.seat_mut(side);
        seat.occupant = Some(connection_id);
        seat.reconnect_deadline = None;
    }

    pub(crate) fn vacate(&mut self, side: Side) {
        *self.seat_mut(side) = Seat::new(side);
    }

    pub(crate) fn add_spectator(&mut self, connection_id: ConnectionId) {
        self.spectators.insert(connection_id);
    }

    pub(crate) fn remove_spectator(&mut self, connection_id: ConnectionId) {
        self.spectators.remove(&connection_id);
    }
}
