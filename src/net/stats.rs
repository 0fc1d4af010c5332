//! Windowed server load statistics
//!
//! Frame timings accumulate for `STATFRAMES` frames and are then latched, so
//! the status report always reads one complete window.

use std::time::Duration;

use crate::game::constants::timing::STATFRAMES;

#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    active: f64,
    idle: f64,
    packets: u32,
    frames: u32,
    pub latched_active: f64,
    pub latched_idle: f64,
    pub latched_packets: u32,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account one frame of work, idle time before it, and packets sent
    pub fn record_frame(&mut self, active: Duration, idle: Duration, packets: usize) {
        self.active += active.as_secs_f64();
        self.idle += idle.as_secs_f64();
        self.packets += packets as u32;
        self.frames += 1;

        if self.frames >= STATFRAMES {
            self.latched_active = self.active;
            self.latched_idle = self.idle;
            self.latched_packets = self.packets;
            self.active = 0.0;
            self.idle = 0.0;
            self.packets = 0;
            self.frames = 0;
        }
    }

    /// Share of the window spent working, 0-100
    pub fn cpu_percent(&self) -> f64 {
        let total = self.latched_active + self.latched_idle;
        if total > 0.0 {
            100.0 * self.latched_active / total
        } else {
            0.0
        }
    }

    /// Mean frame work time in milliseconds
    pub fn avg_response_ms(&self) -> f64 {
        1000.0 * self.latched_active / STATFRAMES as f64
    }

    pub fn packets_per_frame(&self) -> f64 {
        self.latched_packets as f64 / STATFRAMES as f64
    }
}
