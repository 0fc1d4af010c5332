//! map: level transition
//!
//! Clients are warned and the warning is flushed before the world is torn
//! down. They are only told to reconnect once the new level has loaded.

use tracing::{info, warn};

use super::{CommandError, CommandResult, Reply};
use crate::console::Invocation;
use crate::game::roster::SlotId;
use crate::net::protocol::{PrintLevel, ServerMessage};
use crate::server::ServerContext;

/// `map <levelname>`
pub fn map(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    if inv.argc() != 2 {
        let mut usage = String::from("map <levelname> : continue game on a new level");
        if let Some(level) = &ctx.level {
            usage.push_str(&format!("\nCurrently on: {}", level));
        }
        return Err(CommandError::Usage(usage));
    }

    change_level(ctx, inv.argv(1))?;
    Ok(Reply::empty())
}

/// Switch the running level
pub fn change_level(ctx: &mut ServerContext, level: &str) -> Result<(), CommandError> {
    if !ctx.fs.map_exists(level) {
        return Err(CommandError::MapNotFound(level.to_string()));
    }

    info!(
        "Changing level {} -> {}",
        ctx.level.as_deref().unwrap_or("<none>"),
        level
    );
    let warned: Vec<SlotId> = ctx.roster.active().map(|(slot, _)| slot).collect();
    ctx.broadcast_active(ServerMessage::Changing);
    ctx.transport.flush_all();

    ctx.target = None;
    if let Err(e) = ctx.world.spawn_level(level) {
        warn!("{}", e);
        ctx.level = None;
        abandon_clients(ctx, &warned, level);
        return Err(e.into());
    }
    ctx.level = Some(level.to_string());

    for &slot in &warned {
        if let Some(client) = ctx.roster.get_mut(slot) {
            client.respawn_pending();
        }
    }
    ctx.broadcast_active(ServerMessage::Reconnect);
    Ok(())
}

/// Clients waiting on a level that never arrived are let go
fn abandon_clients(ctx: &mut ServerContext, warned: &[SlotId], level: &str) {
    let now = std::time::Instant::now();
    let text = format!("Server failed to load {}\n", level);
    for &slot in warned {
        ctx.send_to(slot, ServerMessage::print(PrintLevel::High, text.clone()));
        ctx.drop_client(slot, now);
    }
    ctx.transport.flush_all();
}

/// Levels starting with `partial`
pub fn complete(ctx: &ServerContext, partial: &str) -> Vec<String> {
    ctx.fs.list_maps(partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::client::{ClientState, MoveType};
    use crate::testing::{self, Step};

    #[test]
    fn test_transition_order() {
        let (mut ctx, log) = testing::context(false);
        let a = testing::join(&mut ctx, "ranger");
        let b = testing::connect_only(&mut ctx, "newbie");

        testing::run(&mut ctx, "map dm6").unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                Step::Enqueue { slot: a, message: ServerMessage::Changing },
                Step::Enqueue { slot: b, message: ServerMessage::Changing },
                Step::Flush,
                Step::Load("dm6".into()),
                Step::Enqueue { slot: a, message: ServerMessage::Reconnect },
                Step::Enqueue { slot: b, message: ServerMessage::Reconnect },
            ]
        );
        assert_eq!(ctx.level.as_deref(), Some("dm6"));
    }

    #[test]
    fn test_missing_level_changes_nothing() {
        let (mut ctx, log) = testing::context(false);
        testing::join(&mut ctx, "ranger");

        let result = testing::run(&mut ctx, "map dm99");
        assert!(matches!(result, Err(CommandError::MapNotFound(level)) if level == "dm99"));
        assert!(log.lock().is_empty());
        assert_eq!(ctx.level.as_deref(), Some("start"));
    }

    #[test]
    fn test_clients_reset_after_load() {
        let (mut ctx, _log) = testing::context(true);
        let slot = testing::join(&mut ctx, "ranger");
        let id = testing::userid(&ctx, slot);
        testing::run(&mut ctx, &format!("noclip {}", id)).unwrap();

        testing::run(&mut ctx, "map e1m1").unwrap();

        let client = ctx.client(slot).unwrap();
        assert_eq!(client.state, ClientState::Connecting);
        assert_eq!(client.edict.movetype, MoveType::Walk);
        assert_eq!(ctx.target, None);
    }

    #[test]
    fn test_failed_load_drops_instead_of_reconnect() {
        let (mut ctx, log, fail) = testing::context_with_world(false);
        let slot = testing::join(&mut ctx, "ranger");
        *fail.lock() = true;

        let result = testing::run(&mut ctx, "map dm4");
        assert!(matches!(result, Err(CommandError::MapLoadFailed(_))));

        let messages = testing::messages_for(&log, slot);
        assert!(!messages.contains(&ServerMessage::Reconnect));
        assert_eq!(messages.last(), Some(&ServerMessage::Disconnect));
        assert_eq!(ctx.client(slot).unwrap().state, ClientState::Zombie);
        assert_eq!(ctx.level, None);
    }

    #[test]
    fn test_usage_mentions_current_level() {
        let (mut ctx, _log) = testing::context(false);
        match testing::run(&mut ctx, "map") {
            Err(CommandError::Usage(text)) => assert!(text.ends_with("Currently on: start")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
