//! Master server directory list and heartbeat scheduling

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::game::constants::net::{A2A_PING, MAX_MASTERS, PORT_MASTER, S2M_HEARTBEAT, S2M_SHUTDOWN};
use crate::net::transport::Transport;

/// Fixed-capacity master list plus heartbeat timer
#[derive(Debug)]
pub struct MasterServers {
    addrs: SmallVec<[SocketAddr; MAX_MASTERS]>,
    /// `None` forces a heartbeat on the next frame
    last_heartbeat: Option<Instant>,
    heartbeat_sequence: u32,
    interval: Duration,
}

impl MasterServers {
    pub fn new(interval: Duration) -> Self {
        Self {
            addrs: SmallVec::new(),
            last_heartbeat: None,
            heartbeat_sequence: 0,
            interval,
        }
    }

    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn clear(&mut self) {
        self.addrs.clear();
    }

    /// Replace the whole list. Entries past capacity are ignored.
    pub fn replace(&mut self, addrs: &[SocketAddr]) -> usize {
        self.addrs.clear();
        self.addrs
            .extend(addrs.iter().copied().take(MAX_MASTERS));
        self.addrs.len()
    }

    /// Make the next frame send a heartbeat
    pub fn force_heartbeat(&mut self) {
        self.last_heartbeat = None;
    }

    pub fn heartbeat_due(&self, now: Instant) -> bool {
        match self.last_heartbeat {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    /// One-byte ping to every master
    pub fn send_pings(&self, transport: &mut dyn Transport) {
        for addr in &self.addrs {
            debug!("Pinging master {}", addr);
            transport.send_out_of_band(*addr, &[A2A_PING, 0]);
        }
    }

    /// Announce ourselves to every master and restart the timer
    pub fn send_heartbeat(&mut self, transport: &mut dyn Transport, active_clients: usize, now: Instant) {
        self.last_heartbeat = Some(now);
        if self.addrs.is_empty() {
            return;
        }

        self.heartbeat_sequence += 1;
        let payload = format!(
            "{}\n{}\n{}\n",
            S2M_HEARTBEAT as char, self.heartbeat_sequence, active_clients
        );
        for addr in &self.addrs {
            debug!("Sending heartbeat to {}", addr);
            transport.send_out_of_band(*addr, payload.as_bytes());
        }
    }

    /// Tell every master we are going away
    pub fn send_shutdown(&self, transport: &mut dyn Transport) {
        let payload = format!("{}\n", S2M_SHUTDOWN as char);
        for addr in &self.addrs {
            info!("Sending shutdown to master {}", addr);
            transport.send_out_of_band(*addr, payload.as_bytes());
        }
    }
}

fn with_default_port(mut addr: SocketAddr) -> SocketAddr {
    if addr.port() == 0 {
        addr.set_port(PORT_MASTER);
    }
    addr
}

/// Literal `ip` or `ip:port`, defaulting the port. Never touches the network.
pub fn parse_master(token: &str) -> Option<SocketAddr> {
    if let Ok(addr) = token.parse::<SocketAddr>() {
        return Some(with_default_port(addr));
    }
    token
        .parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, PORT_MASTER))
}

/// Like `parse_master`, but also looks up `host` and `host:port`
pub async fn resolve_master(token: &str) -> Option<SocketAddr> {
    if let Some(addr) = parse_master(token) {
        return Some(addr);
    }

    let (host, port) = match token.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok()?),
        None => (token, PORT_MASTER),
    };
    if host.is_empty() {
        return None;
    }

    match tokio::net::lookup_host((host, port)).await {
        Ok(mut addrs) => addrs.next().map(with_default_port),
        Err(e) => {
            debug!("Lookup of {} failed: {}", host, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_port() {
        let addr = parse_master("192.168.1.10").unwrap();
        assert_eq!(addr, "192.168.1.10:27000".parse().unwrap());

        let addr = parse_master("192.168.1.10:27001").unwrap();
        assert_eq!(addr.port(), 27001);

        let addr = parse_master("192.168.1.10:0").unwrap();
        assert_eq!(addr.port(), PORT_MASTER);

        let addr = parse_master("::1").unwrap();
        assert_eq!(addr, "[::1]:27000".parse().unwrap());
    }

    #[test]
    fn test_parse_leaves_host_names_alone() {
        assert!(parse_master("localhost").is_none());
        assert!(parse_master("master.example.net:27000").is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_garbage() {
        assert!(resolve_master("10.0.0.1:notaport").await.is_none());
        assert!(resolve_master(":27000").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_host_name() {
        let addr = resolve_master("localhost").await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), PORT_MASTER);
    }

    #[test]
    fn test_replace_caps_capacity() {
        let mut masters = MasterServers::new(Duration::from_secs(300));
        let many: Vec<SocketAddr> = (0..12)
            .map(|i| SocketAddr::from(([10, 0, 0, i as u8], 27000)))
            .collect();
        assert_eq!(masters.replace(&many), MAX_MASTERS);
        assert_eq!(masters.addrs(), &many[..MAX_MASTERS]);
    }

    #[test]
    fn test_heartbeat_timer() {
        let mut masters = MasterServers::new(Duration::from_secs(300));
        let now = Instant::now();
        assert!(masters.heartbeat_due(now));

        masters.last_heartbeat = Some(now);
        assert!(!masters.heartbeat_due(now + Duration::from_secs(10)));
        assert!(masters.heartbeat_due(now + Duration::from_secs(300)));

        masters.force_heartbeat();
        assert!(masters.heartbeat_due(now));
    }
}
