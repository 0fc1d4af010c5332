//! god, noclip and give
//!
//! All three are refused outright unless the server was started with cheats
//! enabled.

use tracing::info;

use super::{CommandError, CommandResult, Reply};
use crate::console::Invocation;
use crate::game::client::{Edict, MoveType};
use crate::game::constants::entity::{FL_GODMODE, IT_SHOTGUN};
use crate::game::roster::SlotId;
use crate::net::protocol::{PrintLevel, ServerMessage};
use crate::server::ServerContext;
use crate::util::text::leading_int;

/// Result of a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// A weapon bit was set
    Weapon(u32),
    /// A resource field now holds the amount
    Resource,
    /// Unknown item class; nothing was changed
    Ignored,
}

/// Gate check plus target lookup. Order matters: a closed gate reports
/// before a bad userid does.
fn cheat_target(ctx: &mut ServerContext, inv: &Invocation) -> Result<SlotId, CommandError> {
    if !ctx.cheats().is_enabled() {
        return Err(CommandError::CheatsDisabled);
    }
    ctx.set_player(inv.argv(1))
}

fn edict_mut<'a>(
    ctx: &'a mut ServerContext,
    slot: SlotId,
    inv: &Invocation,
) -> Result<&'a mut Edict, CommandError> {
    ctx.roster
        .get_mut(slot)
        .map(|c| &mut c.edict)
        .ok_or_else(|| CommandError::NoSuchPlayer(leading_int(inv.argv(1))))
}

/// `god <userid>`
pub fn god(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    let slot = cheat_target(ctx, inv)?;
    let edict = edict_mut(ctx, slot, inv)?;
    edict.flags ^= FL_GODMODE;
    let on = edict.flags & FL_GODMODE != 0;

    let text = if on { "godmode ON\n" } else { "godmode OFF\n" };
    ctx.send_to(slot, ServerMessage::print(PrintLevel::High, text));
    info!("godmode {} for userid {}", if on { "on" } else { "off" }, inv.argv(1));
    Ok(Reply::empty())
}

/// `noclip <userid>`
pub fn noclip(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    let slot = cheat_target(ctx, inv)?;
    let edict = edict_mut(ctx, slot, inv)?;
    edict.movetype = match edict.movetype {
        MoveType::Noclip => MoveType::Walk,
        _ => MoveType::Noclip,
    };
    let on = edict.movetype == MoveType::Noclip;

    let text = if on { "noclip ON\n" } else { "noclip OFF\n" };
    ctx.send_to(slot, ServerMessage::print(PrintLevel::High, text));
    info!("noclip {} for userid {}", if on { "on" } else { "off" }, inv.argv(1));
    Ok(Reply::empty())
}

/// `give <userid> <class> <amount>`
///
/// Classes `2`-`9` set weapon bits; `s`, `n`, `r`, `c` and `h` set shells,
/// nails, rockets, cells and health to the amount.
pub fn give(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    let slot = cheat_target(ctx, inv)?;
    let class = inv.argv(2).chars().next();
    let amount = leading_int(inv.argv(3)).clamp(i32::MIN as i64, i32::MAX as i64) as i32;

    let edict = edict_mut(ctx, slot, inv)?;
    match grant(edict, class, amount) {
        GrantOutcome::Ignored => Ok(Reply::text(format!(
            "ignored: unknown item class \"{}\"\n",
            inv.argv(2)
        ))),
        outcome => {
            info!("give {:?} to userid {}", outcome, inv.argv(1));
            Ok(Reply::empty())
        }
    }
}

/// Apply one grant to an entity
pub fn grant(edict: &mut Edict, class: Option<char>, amount: i32) -> GrantOutcome {
    match class {
        Some(c @ '2'..='9') => {
            let bit = IT_SHOTGUN << (c as u32 - '2' as u32);
            edict.items |= bit;
            GrantOutcome::Weapon(bit)
        }
        Some('s') => {
            edict.ammo_shells = amount;
            GrantOutcome::Resource
        }
        Some('n') => {
            edict.ammo_nails = amount;
            GrantOutcome::Resource
        }
        Some('r') => {
            edict.ammo_rockets = amount;
            GrantOutcome::Resource
        }
        Some('c') => {
            edict.ammo_cells = amount;
            GrantOutcome::Resource
        }
        Some('h') => {
            edict.health = amount;
            GrantOutcome::Resource
        }
        _ => GrantOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_cheats_disabled_blocks_everything() {
        let (mut ctx, log) = testing::context(false);
        let slot = testing::join(&mut ctx, "ranger");
        let id = testing::userid(&ctx, slot);
        let before = ctx.client(slot).unwrap().edict.clone();

        for line in [
            format!("god {}", id),
            format!("noclip {}", id),
            format!("give {} s 50", id),
        ] {
            let result = testing::run(&mut ctx, &line);
            assert!(matches!(result, Err(CommandError::CheatsDisabled)));
        }

        assert_eq!(ctx.client(slot).unwrap().edict, before);
        assert!(log.lock().is_empty());
        assert_eq!(ctx.target, None);
    }

    #[test]
    fn test_god_twice_restores_flags() {
        let (mut ctx, log) = testing::context(true);
        let slot = testing::join(&mut ctx, "ranger");
        let id = testing::userid(&ctx, slot);
        let original = ctx.client(slot).unwrap().edict.flags;

        testing::run(&mut ctx, &format!("god {}", id)).unwrap();
        assert_ne!(ctx.client(slot).unwrap().edict.flags & FL_GODMODE, 0);
        testing::run(&mut ctx, &format!("god {}", id)).unwrap();
        assert_eq!(ctx.client(slot).unwrap().edict.flags, original);

        assert_eq!(
            testing::messages_for(&log, slot),
            vec![
                ServerMessage::print(PrintLevel::High, "godmode ON\n"),
                ServerMessage::print(PrintLevel::High, "godmode OFF\n")
            ]
        );
    }

    #[test]
    fn test_god_reports_only_to_target() {
        let (mut ctx, log) = testing::context(true);
        let slot = testing::join(&mut ctx, "ranger");
        let other = testing::join(&mut ctx, "camper");
        let id = testing::userid(&ctx, slot);

        testing::run(&mut ctx, &format!("god {}", id)).unwrap();
        assert!(testing::messages_for(&log, other).is_empty());
    }

    #[test]
    fn test_noclip_toggles() {
        let (mut ctx, _log) = testing::context(true);
        let slot = testing::join(&mut ctx, "ranger");
        let id = testing::userid(&ctx, slot);

        testing::run(&mut ctx, &format!("noclip {}", id)).unwrap();
        assert_eq!(ctx.client(slot).unwrap().edict.movetype, MoveType::Noclip);
        testing::run(&mut ctx, &format!("noclip {}", id)).unwrap();
        assert_eq!(ctx.client(slot).unwrap().edict.movetype, MoveType::Walk);
    }

    #[test]
    fn test_give_shells_touches_nothing_else() {
        let (mut ctx, _log) = testing::context(true);
        let slot = testing::join(&mut ctx, "ranger");
        let id = testing::userid(&ctx, slot);
        let before = ctx.client(slot).unwrap().edict.clone();

        testing::run(&mut ctx, &format!("give {} s 50", id)).unwrap();

        let after = &ctx.client(slot).unwrap().edict;
        assert_eq!(after.ammo_shells, 50);
        let expected = Edict {
            ammo_shells: 50,
            ..before
        };
        assert_eq!(*after, expected);
    }

    #[test]
    fn test_give_weapon_sets_bit() {
        let mut edict = Edict::default();
        assert_eq!(grant(&mut edict, Some('2'), 0), GrantOutcome::Weapon(IT_SHOTGUN));
        assert_eq!(grant(&mut edict, Some('7'), 0), GrantOutcome::Weapon(IT_SHOTGUN << 5));
        assert_eq!(edict.items, IT_SHOTGUN | IT_SHOTGUN << 5);
    }

    #[test]
    fn test_give_unknown_class_is_ignored() {
        let (mut ctx, _log) = testing::context(true);
        let slot = testing::join(&mut ctx, "ranger");
        let id = testing::userid(&ctx, slot);
        let before = ctx.client(slot).unwrap().edict.clone();

        let reply = testing::run(&mut ctx, &format!("give {} x 50", id)).unwrap();
        assert!(reply.text.starts_with("ignored"));
        assert_eq!(ctx.client(slot).unwrap().edict, before);

        let mut edict = Edict::default();
        assert_eq!(grant(&mut edict, None, 10), GrantOutcome::Ignored);
    }

    #[test]
    fn test_cheat_on_missing_player() {
        let (mut ctx, _log) = testing::context(true);
        assert!(matches!(
            testing::run(&mut ctx, "god 77"),
            Err(CommandError::NoSuchPlayer(77))
        ));
    }
}
