//! status: server load and per-client network quality

use std::fmt::Write;

use super::{CommandResult, Reply};
use crate::console::{CommandSource, Invocation};
use crate::game::client::{Client, ClientState};
use crate::server::ServerContext;

/// Output width of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Full console, one line per client
    Wide,
    /// Remote terminals of about 40 columns, two lines per client
    Narrow,
}

impl Layout {
    pub fn for_source(source: CommandSource) -> Self {
        match source {
            CommandSource::Console => Layout::Wide,
            CommandSource::Remote => Layout::Narrow,
        }
    }
}

/// Measured figures for a client that is exchanging packets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkQuality {
    pub rate: i32,
    pub ping_ms: i32,
    pub loss_percent: f64,
}

/// Marker for clients without numbers, or their measured link
pub fn link_quality(client: &Client) -> Result<LinkQuality, &'static str> {
    match client.state {
        ClientState::Zombie => return Err("ZOMBIE"),
        ClientState::Connecting => return Err("CONNECTING"),
        _ => {}
    }
    // no packet yet means no ratio
    let loss_percent = client.netchan.packet_loss_percent().ok_or("CONNECTING")?;
    Ok(LinkQuality {
        rate: client.netchan.send_rate().round() as i32,
        ping_ms: client.netchan.ping_ms(),
        loss_percent,
    })
}

/// `status`
pub fn status(ctx: &mut ServerContext, inv: &Invocation) -> CommandResult {
    Ok(Reply::text(render(ctx, Layout::for_source(inv.source))))
}

/// Build the report. Reads only.
pub fn render(ctx: &ServerContext, layout: Layout) -> String {
    let mut out = String::new();
    let stats = &ctx.stats;

    let _ = writeln!(out, "net address      : {}", ctx.local_addr);
    let _ = writeln!(out, "cpu utilization  : {:3}%", stats.cpu_percent().round() as i32);
    let _ = writeln!(out, "avg response time: {} ms", stats.avg_response_ms().round() as i32);
    let _ = writeln!(out, "packets/frame    : {:5.2}", stats.packets_per_frame());

    match layout {
        Layout::Narrow => render_narrow(ctx, &mut out),
        Layout::Wide => render_wide(ctx, &mut out),
    }
    out.push('\n');
    out
}

fn render_narrow(ctx: &ServerContext, out: &mut String) {
    out.push_str("name               userid frags\n");
    out.push_str("  address          rate ping drop\n");
    out.push_str("  ---------------- ---- ---- -----\n");

    for (_, client) in ctx.roster.in_use() {
        let _ = writeln!(
            out,
            "{:<16.16}  {:6} {:5}{}",
            client.name,
            client.userid,
            client.edict.frags,
            if client.spectator { " (s)" } else { "" }
        );
        let _ = write!(out, "  {:<16.16} ", client.netchan.remote_addr.ip().to_string());
        match link_quality(client) {
            Err(marker) => {
                let _ = writeln!(out, "{}", marker);
            }
            Ok(link) => {
                let _ = writeln!(
                    out,
                    "{:4} {:4} {:5.2}",
                    link.rate, link.ping_ms, link.loss_percent
                );
            }
        }
    }
}

fn render_wide(ctx: &ServerContext, out: &mut String) {
    out.push_str("frags userid address         name            rate ping drop  qport\n");
    out.push_str("----- ------ --------------- --------------- ---- ---- ----- -----\n");

    for (_, client) in ctx.roster.in_use() {
        let _ = write!(
            out,
            "{:5} {:6} {:<16.16} {:<16.16} ",
            client.edict.frags,
            client.userid,
            client.netchan.remote_addr.ip().to_string(),
            client.name
        );
        match link_quality(client) {
            Err(marker) => {
                let _ = writeln!(out, "{}", marker);
            }
            Ok(link) => {
                let _ = writeln!(
                    out,
                    "{:4} {:4} {:3.1} {:4}{}",
                    link.rate,
                    link.ping_ms,
                    link.loss_percent,
                    client.netchan.qport,
                    if client.spectator { " (s)" } else { "" }
                );
            }
        }
    }
}
