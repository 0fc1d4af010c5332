//! setmaster and heartbeat

use std::net::SocketAddr;

use tracing::{info, warn};

use super::{CommandResult, Reply};
use crate::console::Invocation;
use crate::game::constants::net::MAX_MASTERS;
use crate::net::master::{parse_master, resolve_master};
use crate::server::ServerContext;

/// Turn `setmaster` host names into literal addresses. Runs before the
/// server lock is taken; names that do not resolve are passed through.
pub async fn resolve_hosts(inv: Invocation) -> Invocation {
    let mut line = inv.name().to_string();
    for i in 1..inv.argc() {
        let token = inv.argv(i);
        let resolved = match token {
            "none" => None,
            _ => resolve_master(token).await,
        };
        match resolved {
            Some(addr) => line.push_str(&format!(" {}", addr)),
            None => line.push_str(&format!(" \"{}\"", token)),
        }
    }
    Invocation::parse(&line, inv.source).unwrap_or(inv)
}

/// `setmaster <address>... | none`
///
/// Only literal addresses are accepted here. The list is replaced as a
/// whole. `none`, or any token that is not an address, leaves the server
/// with no masters at all.
pub fn setmaster(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    let mut resolved: Vec<SocketAddr> = Vec::with_capacity(inv.argc().saturating_sub(1));
    for i in 1..inv.argc() {
        let token = inv.argv(i);
        let addr = if token == "none" {
            None
        } else {
            parse_master(token)
        };
        match addr {
            Some(addr) => resolved.push(addr),
            None => {
                if token != "none" {
                    warn!("Not a master server address: {}", token);
                }
                ctx.masters.clear();
                info!("Master server list cleared");
                return Ok(Reply::text("Setting nomaster mode.\n"));
            }
        }
    }

    if resolved.len() > MAX_MASTERS {
        warn!(
            "Only {} master servers are kept, ignoring {}",
            MAX_MASTERS,
            resolved.len() - MAX_MASTERS
        );
    }
    ctx.masters.replace(&resolved);

    let mut reply = Reply::empty();
    for addr in ctx.masters.addrs() {
        info!("Master server at {}", addr);
        reply.push_line(&format!("Master server at {}", addr));
        reply.push_line("Sending a ping.");
    }
    ctx.masters.send_pings(ctx.transport.as_mut());
    ctx.masters.force_heartbeat();
    Ok(reply)
}

/// `heartbeat`: announce to the masters on the next frame
pub fn heartbeat(ctx: &mut ServerContext, _inv: &Invocation) -> CommandResult {
    ctx.masters.force_heartbeat();
    Ok(Reply::empty())
}
