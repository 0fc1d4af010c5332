//! Server-wide state shared by every operator command
//!
//! All of it lives in one `ServerContext`. Handlers take `&mut ServerContext`,
//! so a command always runs to completion before anything else (a frame, a
//! disconnect) can touch the roster.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::commands::CommandError;
use crate::config::ServerConfig;
use crate::cvar::CvarTable;
use crate::flood::{FloodPolicy, FloodVerdict};
use crate::game::client::Client;
use crate::game::constants::info::{MAX_LOCALINFO_STRING, MAX_SERVERINFO_STRING};
use crate::game::roster::{Roster, SlotId};
use crate::game::world::{GameFs, World, WorldError};
use crate::info::{InfoError, InfoStore};
use crate::net::master::MasterServers;
use crate::net::protocol::{PrintLevel, ServerMessage};
use crate::net::stats::ServerStats;
use crate::net::transport::{Peer, Transport};
use crate::util::text::leading_int;

/// Permission for cheat-class commands, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheatGate {
    enabled: bool,
}

impl CheatGate {
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Open the gate and publish `*cheats` so clients can see it
    pub fn enable(serverinfo: &mut InfoStore) -> Result<Self, InfoError> {
        serverinfo.set_star("*cheats", "ON")?;
        Ok(Self { enabled: true })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub struct ServerContext {
    pub config: ServerConfig,
    pub roster: Roster,
    /// Replicated to every client
    pub serverinfo: InfoStore,
    /// Never leaves the server
    pub localinfo: InfoStore,
    pub cvars: CvarTable,
    pub flood: FloodPolicy,
    cheats: CheatGate,
    pub masters: MasterServers,
    pub stats: ServerStats,
    /// Currently running level
    pub level: Option<String>,
    pub local_addr: SocketAddr,
    /// Client picked by the last successful userid lookup
    pub target: Option<SlotId>,
    shutdown_requested: bool,
    pub transport: Box<dyn Transport>,
    pub world: Box<dyn World>,
    pub fs: Box<dyn GameFs>,
}

impl ServerContext {
    pub fn new(
        config: ServerConfig,
        local_addr: SocketAddr,
        transport: Box<dyn Transport>,
        world: Box<dyn World>,
        mut fs: Box<dyn GameFs>,
    ) -> Self {
        let mut serverinfo = InfoStore::new(MAX_SERVERINFO_STRING);
        let mut cvars = CvarTable::new();

        cvars.register("hostname", &config.hostname, true);
        cvars.register("maxclients", &config.max_clients.to_string(), true);
        cvars.register("deathmatch", "1", true);
        cvars.register("timelimit", "0", true);
        cvars.register("fraglimit", "0", true);
        cvars.register("teamplay", "0", true);
        for var in cvars.serverinfo_vars() {
            if let Err(e) = serverinfo.set(&var.name, &var.value) {
                warn!("Cannot publish {} into serverinfo: {}", var.name, e);
            }
        }

        if let Err(e) = serverinfo.set_star("*version", env!("CARGO_PKG_VERSION")) {
            warn!("Cannot publish *version: {}", e);
        }
        fs.set_gamedir(&config.gamedir);
        if let Err(e) = serverinfo.set_star("*gamedir", &config.gamedir) {
            warn!("Cannot publish *gamedir: {}", e);
        }

        let cheats = if config.allow_cheats {
            match CheatGate::enable(&mut serverinfo) {
                Ok(gate) => {
                    info!("Cheats enabled");
                    gate
                }
                Err(e) => {
                    warn!("Cheats left disabled, serverinfo is full: {}", e);
                    CheatGate::disabled()
                }
            }
        } else {
            CheatGate::disabled()
        };

        Self {
            roster: Roster::new(config.max_clients),
            masters: MasterServers::new(config.heartbeat_interval),
            config,
            serverinfo,
            localinfo: InfoStore::new(MAX_LOCALINFO_STRING),
            cvars,
            flood: FloodPolicy::default(),
            cheats,
            stats: ServerStats::new(),
            level: None,
            local_addr,
            target: None,
            shutdown_requested: false,
            transport,
            world,
            fs,
        }
    }

    pub fn cheats(&self) -> CheatGate {
        self.cheats
    }

    /// Load the configured start level before any client is connected
    pub fn spawn_start_level(&mut self) -> Result<(), WorldError> {
        let level = self.config.start_map.clone();
        self.world.spawn_level(&level)?;
        self.level = Some(level);
        Ok(())
    }

    /// Slot of the in-use client with the userid in `arg`
    pub fn find_client(&self, arg: &str) -> Result<SlotId, CommandError> {
        let userid = leading_int(arg);
        i32::try_from(userid)
            .ok()
            .and_then(|id| self.roster.find_by_userid(id))
            .ok_or(CommandError::NoSuchPlayer(userid))
    }

    /// Like `find_client`, but also makes the client the current target
    pub fn set_player(&mut self, arg: &str) -> Result<SlotId, CommandError> {
        let slot = self.find_client(arg)?;
        self.target = Some(slot);
        Ok(slot)
    }

    pub fn client(&self, slot: SlotId) -> Option<&Client> {
        self.roster.get(slot)
    }

    /// Queue a message for one client
    pub fn send_to(&mut self, slot: SlotId, message: ServerMessage) {
        if let Some(client) = self.roster.get(slot) {
            let peer = Peer {
                slot,
                addr: client.netchan.remote_addr,
            };
            self.transport.enqueue(peer, message);
        }
    }

    /// Queue a message for every in-use client matching `filter`
    pub fn broadcast_where<F>(&mut self, message: ServerMessage, filter: F) -> usize
    where
        F: Fn(SlotId, &Client) -> bool,
    {
        let mut sent = 0;
        for (slot, client) in self.roster.in_use() {
            if !filter(slot, client) {
                continue;
            }
            let peer = Peer {
                slot,
                addr: client.netchan.remote_addr,
            };
            self.transport.enqueue(peer, message.clone());
            sent += 1;
        }
        sent
    }

    /// Connecting and spawned clients
    pub fn broadcast_active(&mut self, message: ServerMessage) -> usize {
        self.broadcast_where(message, |_, c| c.is_active())
    }

    /// Fully joined clients only
    pub fn broadcast_spawned(&mut self, message: ServerMessage) -> usize {
        self.broadcast_where(message, |_, c| c.is_spawned())
    }

    /// Store a serverinfo key, mirror it into a same-named cvar and tell
    /// every client. Nothing happens when the store refuses the write.
    pub fn set_serverinfo(&mut self, key: &str, value: &str) -> Result<(), InfoError> {
        self.serverinfo.set(key, value)?;
        self.cvars.set(key, value);
        self.replicate_serverinfo(key, value);
        Ok(())
    }

    /// System write of a star key, replicated like any other change
    pub fn set_serverinfo_star(&mut self, key: &str, value: &str) -> Result<(), InfoError> {
        self.serverinfo.set_star(key, value)?;
        self.replicate_serverinfo(key, value);
        Ok(())
    }

    fn replicate_serverinfo(&mut self, key: &str, value: &str) {
        // No level, no clients to tell
        if self.level.is_none() {
            return;
        }
        let sent = self.broadcast_active(ServerMessage::ServerInfo {
            key: key.to_string(),
            value: value.to_string(),
        });
        debug!("Replicated serverinfo {} to {} clients", key, sent);
    }

    /// Disconnect a client. The slot lingers as a zombie until reaped.
    pub fn drop_client(&mut self, slot: SlotId, now: Instant) {
        self.send_to(slot, ServerMessage::Disconnect);
        if let Some(client) = self.roster.get(slot) {
            info!("Dropped {} (userid {})", client.name, client.userid);
        }
        self.roster.drop_client(slot, now);
        if self.target == Some(slot) {
            self.target = None;
        }
    }

    /// Last words to every active client, pushed out immediately
    pub fn final_message(&mut self, text: &str) {
        let now = Instant::now();
        let slots: Vec<SlotId> = self.roster.active().map(|(slot, _)| slot).collect();
        for slot in slots {
            self.send_to(slot, ServerMessage::print(PrintLevel::High, text));
            self.drop_client(slot, now);
        }
        self.transport.flush_all();
    }

    /// Say goodbye to clients and masters, then flag the process to exit
    pub fn shutdown(&mut self) {
        self.final_message("server shutdown\n");
        self.masters.send_shutdown(self.transport.as_mut());
        self.shutdown_requested = true;
        info!("Server shutting down");
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Chat from a client, passed through its flood guard
    pub fn client_say(&mut self, slot: SlotId, text: &str, now: Instant) -> FloodVerdict {
        let Some(client) = self.roster.get_mut(slot) else {
            return FloodVerdict::Allowed;
        };
        let verdict = client.flood.check(&self.flood, now);
        let name = client.name.clone();

        match &verdict {
            FloodVerdict::Allowed => {
                self.broadcast_spawned(ServerMessage::print(
                    PrintLevel::Chat,
                    format!("{}: {}\n", name, text),
                ));
            }
            FloodVerdict::Silenced { remaining_secs } => {
                self.send_to(
                    slot,
                    ServerMessage::print(
                        PrintLevel::Chat,
                        format!("You can't talk for {} more seconds\n", remaining_secs),
                    ),
                );
            }
            FloodVerdict::Tripped { notice } => {
                warn!("Flood protection silenced {}", name);
                self.send_to(slot, ServerMessage::print(PrintLevel::Chat, notice.clone()));
            }
        }
        verdict
    }

    /// Per-frame housekeeping: reap zombies, heartbeat masters, flush
    /// client messages and account the frame. Returns datagrams sent.
    pub fn run_frame(&mut self, now: Instant, active: Duration, idle: Duration) -> usize {
        let reaped = self.roster.reap_zombies(now, self.config.zombie_time);
        if reaped > 0 {
            debug!("Reaped {} zombie slots", reaped);
        }

        if self.masters.heartbeat_due(now) {
            let active_clients = self.roster.active_count();
            self.masters
                .send_heartbeat(self.transport.as_mut(), active_clients, now);
        }

        let packets = self.transport.flush_all();
        self.stats.record_frame(active, idle, packets);
        packets
    }
}
