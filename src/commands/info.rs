//! serverinfo, localinfo, gamedir and sv_gamedir

use tracing::info;

use super::{CommandError, CommandResult, Reply};
use crate::config::is_plain_dir_name;
use crate::console::Invocation;
use crate::server::ServerContext;

/// `serverinfo [<key> <value>]`
pub fn serverinfo(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    match inv.argc() {
        1 => Ok(Reply::text(format!(
            "Server info settings:\n{}",
            ctx.serverinfo.render()
        ))),
        3 => {
            let (key, value) = (inv.argv(1), inv.argv(2));
            ctx.set_serverinfo(key, value)?;
            info!("serverinfo {} = \"{}\"", key, value);
            Ok(Reply::empty())
        }
        _ => Err(CommandError::usage("usage: serverinfo [ <key> <value> ]")),
    }
}

/// `localinfo [<key> <value>]`
pub fn localinfo(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    match inv.argc() {
        1 => Ok(Reply::text(format!(
            "Local info settings:\n{}",
            ctx.localinfo.render()
        ))),
        3 => {
            let (key, value) = (inv.argv(1), inv.argv(2));
            ctx.localinfo.set(key, value)?;
            info!("localinfo {} = \"{}\"", key, value);
            Ok(Reply::empty())
        }
        _ => Err(CommandError::usage("usage: localinfo [ <key> <value> ]")),
    }
}

fn checked_dir(dir: &str) -> Result<&str, CommandError> {
    if is_plain_dir_name(dir) {
        Ok(dir)
    } else {
        Err(CommandError::InvalidGamedir(dir.to_string()))
    }
}

/// `gamedir [<dir>]`: switch the content directory and advertise it
pub fn gamedir(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    match inv.argc() {
        1 => Ok(Reply::text(format!("Current gamedir: {}\n", ctx.fs.gamedir()))),
        2 => {
            let dir = checked_dir(inv.argv(1))?;
            ctx.set_serverinfo_star("*gamedir", dir)?;
            ctx.fs.set_gamedir(dir);
            info!("gamedir now {}", dir);
            Ok(Reply::empty())
        }
        _ => Err(CommandError::usage("Usage: gamedir <newdir>")),
    }
}

/// `sv_gamedir [<dir>]`: advertise a gamedir without switching content
pub fn sv_gamedir(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    match inv.argc() {
        1 => Ok(Reply::text(format!(
            "Current *gamedir: {}\n",
            ctx.serverinfo.value("*gamedir")
        ))),
        2 => {
            let dir = checked_dir(inv.argv(1))?;
            ctx.set_serverinfo_star("*gamedir", dir)?;
            info!("*gamedir now {}", dir);
            Ok(Reply::empty())
        }
        _ => Err(CommandError::usage("Usage: sv_gamedir <newgamedir>")),
    }
}
