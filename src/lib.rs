//! QuakeWorld Operator Server Library
//!
//! The privileged console commands of a game server: kicking players,
//! changing levels, publishing server info, flood policy and master server
//! announcements, all working against one explicit `ServerContext`.

pub mod commands;
pub mod config;
pub mod console;
pub mod cvar;
pub mod flood;
pub mod game;
pub mod info;
pub mod net;
pub mod server;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;
