//! Test doubles for the transport, world and content lookup
//!
//! Every double appends to one shared step log so tests can assert the order
//! of effects across objects.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::commands::{self, CommandResult};
use crate::config::ServerConfig;
use crate::console::{CommandSource, Invocation};
use crate::game::roster::SlotId;
use crate::game::world::{GameFs, World, WorldError};
use crate::net::protocol::ServerMessage;
use crate::net::transport::{Peer, Transport};
use crate::server::ServerContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Enqueue { slot: SlotId, message: ServerMessage },
    Flush,
    OutOfBand { addr: SocketAddr, payload: Vec<u8> },
    Load(String),
}

pub type StepLog = Arc<Mutex<Vec<Step>>>;

pub struct RecordingTransport {
    log: StepLog,
    pending: usize,
}

impl Transport for RecordingTransport {
    fn enqueue(&mut self, peer: Peer, message: ServerMessage) {
        self.pending += 1;
        self.log.lock().push(Step::Enqueue {
            slot: peer.slot,
            message,
        });
    }

    fn flush_all(&mut self) -> usize {
        self.log.lock().push(Step::Flush);
        std::mem::take(&mut self.pending)
    }

    fn send_out_of_band(&mut self, addr: SocketAddr, payload: &[u8]) {
        self.log.lock().push(Step::OutOfBand {
            addr,
            payload: payload.to_vec(),
        });
    }
}

/// World whose loads succeed unless `fail` is set
pub struct ScriptedWorld {
    log: StepLog,
    pub fail: Arc<Mutex<bool>>,
}

impl World for ScriptedWorld {
    fn spawn_level(&mut self, level: &str) -> Result<(), WorldError> {
        self.log.lock().push(Step::Load(level.to_string()));
        if *self.fail.lock() {
            return Err(WorldError::LoadFailed {
                level: level.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

pub struct MemoryFs {
    maps: Vec<String>,
    gamedir: String,
}

impl GameFs for MemoryFs {
    fn map_exists(&self, level: &str) -> bool {
        self.maps.iter().any(|m| m == level)
    }

    fn list_maps(&self, prefix: &str) -> Vec<String> {
        let mut maps: Vec<String> = self
            .maps
            .iter()
            .filter(|m| m.starts_with(prefix))
            .cloned()
            .collect();
        maps.sort();
        maps
    }

    fn gamedir(&self) -> &str {
        &self.gamedir
    }

    fn set_gamedir(&mut self, dir: &str) {
        self.gamedir = dir.to_string();
    }
}

/// Context on level `start` with maps start, dm4, dm6 and e1m1
pub fn context(cheats: bool) -> (ServerContext, StepLog) {
    let (ctx, log, _) = context_with_world(cheats);
    (ctx, log)
}

/// Same as `context`, also returning the switch that makes loads fail
pub fn context_with_world(cheats: bool) -> (ServerContext, StepLog, Arc<Mutex<bool>>) {
    let log: StepLog = Arc::new(Mutex::new(Vec::new()));
    let fail = Arc::new(Mutex::new(false));
    let config = ServerConfig {
        max_clients: 8,
        allow_cheats: cheats,
        ..Default::default()
    };

    let transport = RecordingTransport {
        log: log.clone(),
        pending: 0,
    };
    let world = ScriptedWorld {
        log: log.clone(),
        fail: fail.clone(),
    };
    let fs = MemoryFs {
        maps: ["start", "dm4", "dm6", "e1m1"].iter().map(|m| m.to_string()).collect(),
        gamedir: String::new(),
    };

    let mut ctx = ServerContext::new(
        config,
        "127.0.0.1:27500".parse().unwrap(),
        Box::new(transport),
        Box::new(world),
        Box::new(fs),
    );
    ctx.spawn_start_level().unwrap();
    log.lock().clear();
    (ctx, log, fail)
}

/// Connect a client, spawn it and give it some traffic history
pub fn join(ctx: &mut ServerContext, name: &str) -> SlotId {
    let port = 30000 + ctx.roster.in_use().count() as u16;
    let slot = ctx
        .roster
        .connect(name, SocketAddr::from(([192, 168, 0, 10], port)), port)
        .unwrap();
    let client = ctx.roster.get_mut(slot).unwrap();
    client.spawn();
    for seq in 1..=200 {
        client.netchan.receive(seq);
    }
    client.netchan.record_frame_interval(0.05);
    client.netchan.record_latency(1, 0.040);
    slot
}

/// Connect a client that has not finished the handshake
pub fn connect_only(ctx: &mut ServerContext, name: &str) -> SlotId {
    let port = 30000 + ctx.roster.in_use().count() as u16;
    ctx.roster
        .connect(name, SocketAddr::from(([192, 168, 0, 20], port)), port)
        .unwrap()
}

pub fn userid(ctx: &ServerContext, slot: SlotId) -> i32 {
    ctx.client(slot).unwrap().userid
}

/// Run one console line
pub fn run(ctx: &mut ServerContext, line: &str) -> CommandResult {
    let inv = Invocation::parse(line, CommandSource::Console).unwrap();
    commands::execute(ctx, &inv)
}

/// Messages queued for `slot`, in order
pub fn messages_for(log: &StepLog, slot: SlotId) -> Vec<ServerMessage> {
    log.lock()
        .iter()
        .filter_map(|step| match step {
            Step::Enqueue { slot: s, message } if *s == slot => Some(message.clone()),
            _ => None,
        })
        .collect()
}
