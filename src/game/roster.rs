//! Fixed-capacity client roster
//!
//! Slots are addressed by a stable `SlotId`. A userid index gives O(1)
//! lookup and holds exactly the slots that are in use.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tracing::debug;

use crate::game::client::{Client, ClientState, NetChanStats};
use crate::game::constants::clients::MAX_CLIENTS;

/// Stable index of a roster slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Server is full")]
    Full,
}

pub struct Roster {
    slots: Vec<Client>,
    by_userid: HashMap<i32, SlotId>,
    last_userid: i32,
}

impl Roster {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_CLIENTS);
        Self {
            slots: (0..capacity).map(|_| Client::empty()).collect(),
            by_userid: HashMap::new(),
            last_userid: 0,
        }
    }

    /// Place a newly accepted connection in the first free slot
    pub fn connect(
        &mut self,
        name: &str,
        remote_addr: SocketAddr,
        qport: u16,
    ) -> Result<SlotId, RosterError> {
        let index = self
            .slots
            .iter()
            .position(|c| !c.in_use())
            .ok_or(RosterError::Full)?;

        self.last_userid += 1;
        let userid = self.last_userid;

        let client = &mut self.slots[index];
        client.clear();
        client.state = ClientState::Connecting;
        client.name = name.to_string();
        client.userid = userid;
        client.netchan = NetChanStats::new(remote_addr, qport);
        // A name the info store refuses stays out of userinfo
        if let Err(e) = client.userinfo.set("name", name) {
            debug!("Userinfo name for userid {} not stored: {}", userid, e);
        }

        let slot = SlotId(index);
        self.by_userid.insert(userid, slot);
        Ok(slot)
    }

    pub fn get(&self, slot: SlotId) -> Option<&Client> {
        self.slots.get(slot.0)
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Client> {
        self.slots.get_mut(slot.0)
    }

    /// Slot holding `userid`, in any non-free state
    pub fn find_by_userid(&self, userid: i32) -> Option<SlotId> {
        self.by_userid.get(&userid).copied()
    }

    /// Slots in use, in slot order
    pub fn in_use(&self) -> impl Iterator<Item = (SlotId, &Client)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, c)| c.in_use())
            .map(|(i, c)| (SlotId(i), c))
    }

    /// Connecting or spawned slots, in slot order
    pub fn active(&self) -> impl Iterator<Item = (SlotId, &Client)> {
        self.in_use().filter(|(_, c)| c.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Mark a client dropped. The slot stays reserved until reaped.
    pub fn drop_client(&mut self, slot: SlotId, now: Instant) {
        if let Some(client) = self.slots.get_mut(slot.0) {
            if client.in_use() {
                client.drop_to_zombie(now);
            }
        }
    }

    /// Free zombie slots older than `zombie_time`, returning how many
    pub fn reap_zombies(&mut self, now: Instant, zombie_time: Duration) -> usize {
        let mut reaped = 0;
        for client in self.slots.iter_mut() {
            if client.state != ClientState::Zombie {
                continue;
            }
            let expired = client
                .drop_time
                .map(|t| now.duration_since(t) >= zombie_time)
                .unwrap_or(true);
            if expired {
                self.by_userid.remove(&client.userid);
                client.clear();
                reaped += 1;
            }
        }
        reaped
    }
}
