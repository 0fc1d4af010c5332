//! Operator commands
//!
//! Each handler takes the server context and a tokenized invocation and
//! returns the text to show the operator. An `Err` means the command did
//! nothing; the one exception is a failed level load, which has already
//! dropped the clients it told to expect a new level.

pub mod chat;
pub mod cheats;
pub mod floodprot;
pub mod info;
pub mod map;
pub mod master;
pub mod players;
pub mod status;

use tracing::debug;

use crate::console::Invocation;
use crate::flood::FloodPolicyError;
use crate::game::world::WorldError;
use crate::info::InfoError;
use crate::server::ServerContext;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Userid {0} is not on the server")]
    NoSuchPlayer(i64),
    #[error("You must run the server with -cheats to enable this command.")]
    CheatsDisabled,
    #[error(transparent)]
    Info(#[from] InfoError),
    #[error(transparent)]
    FloodPolicy(#[from] FloodPolicyError),
    #[error("Gamedir should be a single filename, not a path: {0}")]
    InvalidGamedir(String),
    #[error("Can't find maps/{0}.bsp")]
    MapNotFound(String),
    #[error(transparent)]
    MapLoadFailed(#[from] WorldError),
    #[error("{0}")]
    Usage(String),
    #[error("Unknown command \"{0}\"")]
    UnknownCommand(String),
}

impl CommandError {
    pub fn usage(text: impl Into<String>) -> Self {
        CommandError::Usage(text.into())
    }
}

/// Console output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub type CommandResult = Result<Reply, CommandError>;

pub type Handler = fn(&mut ServerContext, &Invocation) -> CommandResult;

/// Registered operator commands
pub const COMMANDS: &[(&str, Handler)] = &[
    ("kick", players::kick),
    ("status", status::status),
    ("map", map::map),
    ("setmaster", master::setmaster),
    ("say", chat::say),
    ("heartbeat", master::heartbeat),
    ("quit", chat::quit),
    ("god", cheats::god),
    ("give", cheats::give),
    ("noclip", cheats::noclip),
    ("serverinfo", info::serverinfo),
    ("localinfo", info::localinfo),
    ("user", players::user),
    ("gamedir", info::gamedir),
    ("sv_gamedir", info::sv_gamedir),
    ("floodprot", floodprot::floodprot),
    ("floodprotmsg", floodprot::floodprotmsg),
];

pub fn find(name: &str) -> Option<Handler> {
    COMMANDS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, handler)| *handler)
}

/// Run an invocation against the context
pub fn execute(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    let handler =
        find(inv.name()).ok_or_else(|| CommandError::UnknownCommand(inv.name().to_string()))?;
    debug!("Executing {}", inv.name());
    handler(ctx, inv)
}

/// Network waits a command needs, done before the server is locked
pub async fn prepare(inv: Invocation) -> Invocation {
    if inv.name().eq_ignore_ascii_case("setmaster") {
        return master::resolve_hosts(inv).await;
    }
    inv
}

/// Argument completions for `name`, given the partial word being typed
pub fn complete(ctx: &ServerContext, name: &str, partial: &str) -> Vec<String> {
    if name.eq_ignore_ascii_case("map") {
        return map::complete(ctx, partial);
    }
    Vec::new()
}
