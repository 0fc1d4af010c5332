//! Outbound transport
//!
//! Handlers only enqueue; nothing here waits on the network. The UDP
//! implementation sends with `try_send_to` and drops what the socket will
//! not take right now.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, warn};

use crate::game::constants::net::{MAX_DATAGRAM_SIZE, OOB_HEADER};
use crate::game::roster::SlotId;
use crate::net::protocol::{encode, ServerMessage};

/// Destination of a client message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    pub slot: SlotId,
    pub addr: SocketAddr,
}

/// Fire-and-forget delivery to clients and master servers
pub trait Transport: Send {
    /// Queue a reliable message for one client
    fn enqueue(&mut self, peer: Peer, message: ServerMessage);
    /// Push every queued message out now. Returns datagrams sent.
    fn flush_all(&mut self) -> usize;
    /// Connectionless datagram, prefixed with the out-of-band header
    fn send_out_of_band(&mut self, addr: SocketAddr, payload: &[u8]);
}

/// UDP socket transport on the tokio reactor
pub struct UdpTransport {
    socket: UdpSocket,
    pending: BTreeMap<SlotId, (SocketAddr, Vec<ServerMessage>)>,
}

impl UdpTransport {
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        // try_send_to only succeeds once the reactor has seen the socket writable
        socket.writable().await?;
        Ok(Self {
            socket,
            pending: BTreeMap::new(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn send_raw(&self, addr: SocketAddr, data: &[u8]) -> bool {
        match self.socket.try_send_to(data, addr) {
            Ok(_) => true,
            Err(e) => {
                debug!("Send to {} failed: {}", addr, e);
                false
            }
        }
    }

    fn send_batch(&self, addr: SocketAddr, batch: &[ServerMessage]) -> usize {
        match encode(&batch) {
            Ok(data) if data.len() <= MAX_DATAGRAM_SIZE => self.send_raw(addr, &data) as usize,
            Ok(_) => batch
                .iter()
                .filter_map(|msg| encode(&std::slice::from_ref(msg)).ok())
                .filter(|data| self.send_raw(addr, data))
                .count(),
            Err(e) => {
                warn!("Dropping batch for {}: {}", addr, e);
                0
            }
        }
    }
}

impl Transport for UdpTransport {
    fn enqueue(&mut self, peer: Peer, message: ServerMessage) {
        let entry = self
            .pending
            .entry(peer.slot)
            .or_insert_with(|| (peer.addr, Vec::new()));
        entry.0 = peer.addr;
        entry.1.push(message);
    }

    fn flush_all(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        pending
            .values()
            .map(|(addr, batch)| self.send_batch(*addr, batch))
            .sum()
    }

    fn send_out_of_band(&mut self, addr: SocketAddr, payload: &[u8]) {
        let mut data = Vec::with_capacity(OOB_HEADER.len() + payload.len());
        data.extend_from_slice(&OOB_HEADER);
        data.extend_from_slice(payload);
        self.send_raw(addr, &data);
    }
}
