//! floodprot and floodprotmsg

use tracing::{info, warn};

use super::{CommandError, CommandResult, Reply};
use crate::console::Invocation;
use crate::game::constants::chat::FLOOD_MSG_MAX;
use crate::server::ServerContext;
use crate::util::text::leading_int;

const FLOODPROT_USAGE: &str = "Usage: floodprot <# of messages> <per # of seconds> <seconds to silence>\n\
Use floodprotmsg to set a custom message to say to the flooder.";

/// `floodprot [<messages> <seconds> <silence>]`
pub fn floodprot(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    match inv.argc() {
        1 => {
            let mut reply = Reply::text(ctx.flood.describe());
            if !ctx.flood.is_enabled() {
                reply.push_line(FLOODPROT_USAGE);
            }
            Ok(reply)
        }
        4 => {
            ctx.flood.replace(
                leading_int(inv.argv(1)),
                leading_int(inv.argv(2)),
                leading_int(inv.argv(3)),
            )?;
            info!(
                "Flood protection: {} msgs per {}s, silence {}s",
                ctx.flood.messages, ctx.flood.window_secs, ctx.flood.silence_secs
            );
            Ok(Reply::empty())
        }
        _ => Err(CommandError::usage(FLOODPROT_USAGE)),
    }
}

/// `floodprotmsg [<text>]`
///
/// Text longer than the warning buffer is cut to fit and the operator is
/// told so.
pub fn floodprotmsg(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    match inv.argc() {
        1 => Ok(Reply::text(format!("Current msg: {}\n", ctx.flood.warning))),
        2 => {
            if ctx.flood.set_warning(inv.argv(1)) {
                warn!("Flood warning truncated to {} bytes", FLOOD_MSG_MAX);
                return Ok(Reply::text(format!(
                    "Message truncated to {} characters\n",
                    FLOOD_MSG_MAX
                )));
            }
            Ok(Reply::empty())
        }
        _ => Err(CommandError::usage("Usage: floodprotmsg \"<message>\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flood::{FloodPolicy, FloodPolicyError};
    use crate::testing;

    #[test]
    fn test_reports_current_policy() {
        let (mut ctx, _log) = testing::context(false);
        let reply = testing::run(&mut ctx, "floodprot").unwrap();
        assert_eq!(
            reply.text,
            "Current floodprot settings: \nAfter 4 msgs per 4 seconds, silence for 10 seconds\n"
        );
    }

    #[test]
    fn test_limit_of_ten_messages() {
        let (mut ctx, _log) = testing::context(false);

        let result = testing::run(&mut ctx, "floodprot 11 5 30");
        assert!(matches!(
            result,
            Err(CommandError::FloodPolicy(FloodPolicyError::PolicyLimitExceeded(11)))
        ));
        assert_eq!(ctx.flood, FloodPolicy::default());

        testing::run(&mut ctx, "floodprot 10 5 30").unwrap();
        assert_eq!(
            (ctx.flood.messages, ctx.flood.window_secs, ctx.flood.silence_secs),
            (10, 5, 30)
        );
    }

    #[test]
    fn test_non_positive_values_rejected() {
        let (mut ctx, _log) = testing::context(false);
        for line in ["floodprot 0 5 30", "floodprot 3 -1 30", "floodprot 3 5 abc"] {
            let result = testing::run(&mut ctx, line);
            assert!(matches!(
                result,
                Err(CommandError::FloodPolicy(FloodPolicyError::InvalidPolicy))
            ));
        }
        assert_eq!(ctx.flood, FloodPolicy::default());
    }

    #[test]
    fn test_wrong_arity_is_usage() {
        let (mut ctx, _log) = testing::context(false);
        assert!(matches!(
            testing::run(&mut ctx, "floodprot 3 5"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn test_floodprotmsg_sets_and_truncates() {
        let (mut ctx, _log) = testing::context(false);

        let reply = testing::run(&mut ctx, "floodprotmsg \"quiet please\"").unwrap();
        assert!(reply.is_empty());
        assert_eq!(ctx.flood.warning, "quiet please");
        assert_eq!(
            testing::run(&mut ctx, "floodprotmsg").unwrap().text,
            "Current msg: quiet please\n"
        );

        let long = "x".repeat(300);
        let reply = testing::run(&mut ctx, &format!("floodprotmsg {}", long)).unwrap();
        assert!(reply.text.contains("truncated"));
        assert_eq!(ctx.flood.warning.len(), FLOOD_MSG_MAX);
    }
}
