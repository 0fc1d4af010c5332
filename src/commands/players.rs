//! kick and user

use std::time::Instant;

use tracing::info;

use super::{CommandError, CommandResult, Reply};
use crate::console::Invocation;
use crate::net::protocol::{PrintLevel, ServerMessage};
use crate::server::ServerContext;

/// `kick <userid>`
pub fn kick(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    let slot = ctx.find_client(inv.argv(1))?;
    let (name, userid) = ctx
        .client(slot)
        .map(|c| (c.name.clone(), c.userid))
        .unwrap_or_default();

    // The target hears it privately; it is gone before a broadcast would arrive
    ctx.broadcast_where(
        ServerMessage::print(PrintLevel::High, format!("{} was kicked\n", name)),
        |s, c| s != slot && c.is_active(),
    );
    ctx.send_to(
        slot,
        ServerMessage::print(PrintLevel::High, "You were kicked from the game\n"),
    );
    ctx.drop_client(slot, Instant::now());

    info!("Kicked {} (userid {})", name, userid);
    Ok(Reply::empty())
}

/// `user <userid>`: print a client's userinfo
pub fn user(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    if inv.argc() != 2 {
        return Err(CommandError::usage("Usage: user <userid>"));
    }
    let slot = ctx.set_player(inv.argv(1))?;
    let text = ctx
        .client(slot)
        .map(|c| c.userinfo.render())
        .unwrap_or_default();
    Ok(Reply::text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::client::ClientState;
    use crate::testing;

    #[test]
    fn test_kick_notifies_and_drops() {
        let (mut ctx, log) = testing::context(false);
        let victim = testing::join(&mut ctx, "camper");
        let witness = testing::join(&mut ctx, "ranger");
        let id = testing::userid(&ctx, victim);

        testing::run(&mut ctx, &format!("kick {}", id)).unwrap();

        assert_eq!(ctx.client(victim).unwrap().state, ClientState::Zombie);
        assert_eq!(
            testing::messages_for(&log, victim),
            vec![
                ServerMessage::print(PrintLevel::High, "You were kicked from the game\n"),
                ServerMessage::Disconnect
            ]
        );
        assert_eq!(
            testing::messages_for(&log, witness),
            vec![ServerMessage::print(PrintLevel::High, "camper was kicked\n")]
        );
    }

    #[test]
    fn test_kick_unknown_userid() {
        let (mut ctx, log) = testing::context(false);
        let slot = testing::join(&mut ctx, "ranger");

        let result = testing::run(&mut ctx, "kick 42");
        assert!(matches!(result, Err(CommandError::NoSuchPlayer(42))));
        assert!(log.lock().is_empty());
        assert!(ctx.client(slot).unwrap().is_spawned());
    }

    #[test]
    fn test_user_prints_userinfo() {
        let (mut ctx, _log) = testing::context(false);
        let slot = testing::join(&mut ctx, "ranger");
        ctx.roster
            .get_mut(slot)
            .unwrap()
            .userinfo
            .set("team", "blue")
            .unwrap();
        let id = testing::userid(&ctx, slot);

        let reply = testing::run(&mut ctx, &format!("user {}", id)).unwrap();
        assert!(reply.text.contains("name"));
        assert!(reply.text.contains("ranger"));
        assert!(reply.text.contains("blue"));
        assert_eq!(ctx.target, Some(slot));
    }

    #[test]
    fn test_user_usage() {
        let (mut ctx, _log) = testing::context(false);
        assert!(matches!(
            testing::run(&mut ctx, "user"),
            Err(CommandError::Usage(_))
        ));
    }
}
