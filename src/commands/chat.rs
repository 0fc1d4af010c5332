//! say and quit

use tracing::info;

use super::{CommandResult, Reply};
use crate::console::Invocation;
use crate::game::constants::chat::{CONSOLE_TAG, SAY_BUFFER};
use crate::net::protocol::{PrintLevel, ServerMessage};
use crate::server::ServerContext;
use crate::util::text::clip_to;

/// Operator chat line as clients see it
pub fn console_chat(raw: &str) -> String {
    let body = match raw.strip_prefix('"') {
        Some(inner) => inner.strip_suffix('"').unwrap_or(inner),
        None => raw,
    };
    // room for the newline and the terminator
    let space = SAY_BUFFER - CONSOLE_TAG.len() - 2;
    format!("{}{}\n", CONSOLE_TAG, clip_to(body, space))
}

/// `say <text>`: chat to every fully joined client
pub fn say(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    if inv.argc() < 2 {
        return Ok(Reply::empty());
    }
    let text = console_chat(inv.args());
    info!("{}", text.trim_end());
    ctx.broadcast_spawned(ServerMessage::print(PrintLevel::Chat, text));
    Ok(Reply::empty())
}

/// `quit`
pub fn quit(ctx: &mut ServerContext, _inv: &Invocation) -> CommandResult {
    ctx.shutdown();
    Ok(Reply::text("Shutting down.\n"))
}
