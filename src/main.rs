use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use qw_operator::commands;
use qw_operator::config::ServerConfig;
use qw_operator::console::{CommandSource, Invocation};
use qw_operator::game::world::{DiskFs, LevelWorld, BASE_GAME};
use qw_operator::net::transport::UdpTransport;
use qw_operator::server::ServerContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("QW Operator Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = ServerConfig::load_or_default();
    config.apply_args(std::env::args().skip(1));
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: {}:{}, max_clients={}, gamedir={}, cheats={}",
        config.bind_address, config.port, config.max_clients, config.gamedir, config.allow_cheats
    );

    let transport = UdpTransport::bind(config.bind_addr()).await?;
    let local_addr = transport.local_addr()?;
    let fs = DiskFs::new(&config.base_dir, BASE_GAME);
    let frame_duration = config.frame_duration();

    let mut server = ServerContext::new(
        config,
        local_addr,
        Box::new(transport),
        Box::new(LevelWorld::default()),
        Box::new(fs),
    );
    if let Err(e) = server.spawn_start_level() {
        warn!("No level running: {}", e);
    }
    info!("Server ready on {}", local_addr);

    let ctx = Arc::new(Mutex::new(server));

    // Frame loop
    let frame_ctx = ctx.clone();
    let frames = tokio::spawn(async move {
        let mut interval = tokio::time::interval(frame_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_end = Instant::now();
        let mut last_work = Duration::ZERO;

        loop {
            interval.tick().await;
            let start = Instant::now();
            {
                let mut ctx = frame_ctx.lock();
                if ctx.shutdown_requested() {
                    break;
                }
                ctx.run_frame(start, last_work, start.saturating_duration_since(last_end));
            }
            last_end = Instant::now();
            last_work = last_end.saturating_duration_since(start);
        }
    });

    // Operator console on stdin
    let console_ctx = ctx.clone();
    let console = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(inv) = Invocation::parse(&line, CommandSource::Console) else {
                continue;
            };
            let inv = commands::prepare(inv).await;
            let mut ctx = console_ctx.lock();
            match commands::execute(&mut ctx, &inv) {
                Ok(reply) if !reply.is_empty() => print!("{}", reply.text),
                Ok(_) => {}
                Err(e) => println!("{}", e),
            }
            if ctx.shutdown_requested() {
                break;
            }
        }
    });

    tokio::select! {
        _ = console => {
            info!("Console closed");
        }
        _ = frames => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    // Cleanup
    {
        let mut ctx = ctx.lock();
        if !ctx.shutdown_requested() {
            ctx.shutdown();
        }
    }
    info!("Server stopped");

    // The blocking stdin reader would otherwise keep the runtime alive
    std::process::exit(0);
}
