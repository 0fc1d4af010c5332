use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::game::constants::clients::MAX_CLIENTS;
use crate::game::constants::net::PORT_SERVER;
use crate::game::constants::timing::{HEARTBEAT_SECONDS, TICK_RATE, ZOMBIE_SECONDS};
use crate::game::world::BASE_GAME;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_address: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Roster size
    pub max_clients: usize,
    /// Root containing the game directories
    pub base_dir: PathBuf,
    /// Initial content directory
    pub gamedir: String,
    /// Level loaded at startup
    pub start_map: String,
    /// Published as the `hostname` serverinfo key
    pub hostname: String,
    /// How long dropped clients linger as zombies
    pub zombie_time: Duration,
    /// Interval between master heartbeats
    pub heartbeat_interval: Duration,
    /// Server frames per second
    pub tick_rate: u32,
    /// Cheat-class commands allowed
    pub allow_cheats: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: PORT_SERVER,
            max_clients: MAX_CLIENTS,
            base_dir: PathBuf::from("."),
            gamedir: BASE_GAME.to_string(),
            start_map: "start".to_string(),
            hostname: "unnamed".to_string(),
            zombie_time: Duration::from_secs(ZOMBIE_SECONDS),
            heartbeat_interval: Duration::from_secs(HEARTBEAT_SECONDS),
            tick_rate: TICK_RATE,
            allow_cheats: false,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        if let Ok(max_clients) = std::env::var("MAX_CLIENTS") {
            if let Ok(parsed) = max_clients.parse::<usize>() {
                if parsed > 0 && parsed <= MAX_CLIENTS {
                    config.max_clients = parsed;
                } else {
                    tracing::warn!("MAX_CLIENTS must be 1-{}, using default", MAX_CLIENTS);
                }
            } else {
                tracing::warn!("Invalid MAX_CLIENTS '{}', using default", max_clients);
            }
        }

        if let Ok(dir) = std::env::var("BASE_DIR") {
            config.base_dir = PathBuf::from(dir);
        }

        if let Ok(gamedir) = std::env::var("GAMEDIR") {
            if is_plain_dir_name(&gamedir) {
                config.gamedir = gamedir;
            } else {
                tracing::warn!("GAMEDIR must be a single directory name, using default");
            }
        }

        if let Ok(map) = std::env::var("START_MAP") {
            config.start_map = map;
        }

        // HOSTNAME is usually the machine name exported by the shell
        if let Ok(hostname) = std::env::var("SV_HOSTNAME") {
            config.hostname = hostname;
        }

        if let Some(secs) = env_secs("ZOMBIE_TIME_SECS") {
            config.zombie_time = secs;
        }

        if let Some(secs) = env_secs("HEARTBEAT_INTERVAL_SECS") {
            config.heartbeat_interval = secs;
        }

        if let Ok(rate) = std::env::var("TICK_RATE") {
            match rate.parse::<u32>() {
                Ok(parsed) if parsed > 0 && parsed <= 1000 => config.tick_rate = parsed,
                _ => tracing::warn!("TICK_RATE must be 1-1000, using default"),
            }
        }

        if let Ok(cheats) = std::env::var("ALLOW_CHEATS") {
            config.allow_cheats = matches!(cheats.as_str(), "1" | "true" | "yes" | "on");
        }

        config
    }

    /// Apply launch options. `-cheats` enables the cheat gate.
    pub fn apply_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if args.into_iter().any(|a| a.as_ref() == "-cheats") {
            self.allow_cheats = true;
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.max_clients == 0 || self.max_clients > MAX_CLIENTS {
            return Err(format!("max_clients must be 1-{}", MAX_CLIENTS));
        }
        if self.tick_rate == 0 {
            return Err("tick_rate must be at least 1".to_string());
        }
        if !is_plain_dir_name(&self.gamedir) {
            return Err("gamedir must be a single directory name".to_string());
        }
        Ok(())
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            None
        }
    }
}

/// A single path component: no separators, drive markers or parent references
pub fn is_plain_dir_name(dir: &str) -> bool {
    !dir.is_empty()
        && !dir.contains("..")
        && !dir.contains('/')
        && !dir.contains('\\')
        && !dir.contains(':')
}
