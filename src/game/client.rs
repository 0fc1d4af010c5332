use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Instant;

use crate::flood::FloodGuard;
use crate::game::constants::entity::DEFAULT_HEALTH;
use crate::game::constants::info::MAX_USERINFO_STRING;
use crate::game::constants::net::{FRAME_RATE_WEIGHT, LATENCY_SAMPLES};
use crate::info::InfoStore;

/// Slot connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Slot is free
    Unconnected,
    /// Handshake done, not yet in the world
    Connecting,
    /// Fully joined and playing
    Spawned,
    /// Dropped, kept briefly before the slot is reused
    Zombie,
}

/// Movement mode of a client's entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveType {
    #[default]
    Walk,
    Noclip,
}

/// Gameplay fields of the entity a client controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edict {
    pub flags: u32,
    pub movetype: MoveType,
    /// Weapon bitmask
    pub items: u32,
    pub ammo_shells: i32,
    pub ammo_nails: i32,
    pub ammo_rockets: i32,
    pub ammo_cells: i32,
    pub health: i32,
    pub frags: i32,
}

impl Default for Edict {
    fn default() -> Self {
        Self {
            flags: 0,
            movetype: MoveType::Walk,
            items: 0,
            ammo_shells: 0,
            ammo_nails: 0,
            ammo_rockets: 0,
            ammo_cells: 0,
            health: DEFAULT_HEALTH,
            frags: 0,
        }
    }
}

/// Per-connection transport statistics
#[derive(Debug, Clone)]
pub struct NetChanStats {
    pub remote_addr: SocketAddr,
    pub qport: u16,
    pub incoming_sequence: u32,
    pub outgoing_sequence: u32,
    pub drop_count: u32,
    /// Exponentially averaged seconds between received packets
    pub frame_interval: f64,
    /// Round-trip samples in seconds, indexed by acknowledged sequence
    latency: [Option<f32>; LATENCY_SAMPLES],
}

impl NetChanStats {
    pub fn new(remote_addr: SocketAddr, qport: u16) -> Self {
        Self {
            remote_addr,
            qport,
            incoming_sequence: 0,
            outgoing_sequence: 0,
            drop_count: 0,
            frame_interval: 0.0,
            latency: [None; LATENCY_SAMPLES],
        }
    }

    /// Record a received sequence number, counting any gap as dropped
    pub fn receive(&mut self, sequence: u32) {
        if sequence <= self.incoming_sequence {
            return;
        }
        self.drop_count += sequence - self.incoming_sequence - 1;
        self.incoming_sequence = sequence;
    }

    /// Record the round trip for an acknowledged outgoing sequence
    pub fn record_latency(&mut self, acked_sequence: u32, rtt_secs: f32) {
        self.latency[acked_sequence as usize % LATENCY_SAMPLES] = Some(rtt_secs);
    }

    /// Fold a packet interval into the running average
    pub fn record_frame_interval(&mut self, secs: f64) {
        if self.frame_interval == 0.0 {
            self.frame_interval = secs;
        } else {
            self.frame_interval =
                self.frame_interval * (1.0 - FRAME_RATE_WEIGHT) + secs * FRAME_RATE_WEIGHT;
        }
    }

    /// Average round trip in milliseconds, 0 without samples
    pub fn ping_ms(&self) -> i32 {
        let (sum, count) = self
            .latency
            .iter()
            .flatten()
            .filter(|s| **s >= 0.0)
            .fold((0.0f32, 0u32), |(sum, n), s| (sum + s, n + 1));
        if count == 0 {
            return 0;
        }
        (sum / count as f32 * 1000.0).round() as i32
    }

    /// Drop percentage, `None` until the first packet has arrived
    pub fn packet_loss_percent(&self) -> Option<f64> {
        if self.incoming_sequence == 0 {
            return None;
        }
        Some(100.0 * self.drop_count as f64 / self.incoming_sequence as f64)
    }

    /// Messages per second derived from the averaged interval
    pub fn send_rate(&self) -> f64 {
        if self.frame_interval <= 0.0 {
            0.0
        } else {
            1.0 / self.frame_interval
        }
    }
}

impl Default for NetChanStats {
    fn default() -> Self {
        Self::new(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)), 0)
    }
}

/// One roster slot
#[derive(Debug, Clone)]
pub struct Client {
    pub state: ClientState,
    pub name: String,
    pub userid: i32,
    pub spectator: bool,
    pub userinfo: InfoStore,
    pub netchan: NetChanStats,
    pub edict: Edict,
    pub flood: FloodGuard,
    /// When the slot became a zombie
    pub drop_time: Option<Instant>,
}

impl Client {
    pub fn empty() -> Self {
        Self {
            state: ClientState::Unconnected,
            name: String::new(),
            userid: 0,
            spectator: false,
            userinfo: InfoStore::new(MAX_USERINFO_STRING),
            netchan: NetChanStats::default(),
            edict: Edict::default(),
            flood: FloodGuard::new(),
            drop_time: None,
        }
    }

    /// Slot holds a client in any state
    pub fn in_use(&self) -> bool {
        self.state != ClientState::Unconnected
    }

    /// Connecting or spawned
    pub fn is_active(&self) -> bool {
        matches!(self.state, ClientState::Connecting | ClientState::Spawned)
    }

    pub fn is_spawned(&self) -> bool {
        self.state == ClientState::Spawned
    }

    pub fn spawn(&mut self) {
        self.state = ClientState::Spawned;
    }

    /// Back to connecting with a fresh entity, as after a level change
    pub fn respawn_pending(&mut self) {
        self.state = ClientState::Connecting;
        self.edict = Edict::default();
    }

    pub fn drop_to_zombie(&mut self, now: Instant) {
        self.state = ClientState::Zombie;
        self.drop_time = Some(now);
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::empty()
    }
}
