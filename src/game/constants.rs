/// Info string limits
pub mod info {
    /// Maximum serialized size of the replicated serverinfo string
    pub const MAX_SERVERINFO_STRING: usize = 512;
    /// Maximum serialized size of the local (non-replicated) info string
    pub const MAX_LOCALINFO_STRING: usize = 32768;
    /// Maximum serialized size of a client's userinfo string
    pub const MAX_USERINFO_STRING: usize = 196;
    /// Keys and values must be shorter than this
    pub const MAX_INFO_KEY: usize = 64;
    /// Prefix marking a system-owned key
    pub const STAR_PREFIX: char = '*';
    /// Column width used when printing an info store
    pub const PRINT_KEY_WIDTH: usize = 20;
}

/// Client roster limits
pub mod clients {
    /// Hard upper bound on roster slots
    pub const MAX_CLIENTS: usize = 32;
}

/// Entity flag bits and item bits
pub mod entity {
    /// Godmode bit in the entity flag set
    pub const FL_GODMODE: u32 = 64;
    /// First weapon bit; weapon classes '2'..'9' shift left from here
    pub const IT_SHOTGUN: u32 = 1;
    /// Health given to a freshly spawned entity
    pub const DEFAULT_HEALTH: i32 = 100;
}

/// Network constants
pub mod net {
    /// Default master server port
    pub const PORT_MASTER: u16 = 27000;
    /// Default server port
    pub const PORT_SERVER: u16 = 27500;
    /// Maximum number of master servers
    pub const MAX_MASTERS: usize = 8;
    /// Prefix of an out-of-band (connectionless) datagram
    pub const OOB_HEADER: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
    /// Ping request sent to a master server
    pub const A2A_PING: u8 = b'k';
    /// Heartbeat announcement sent to a master server
    pub const S2M_HEARTBEAT: u8 = b'a';
    /// Shutdown notice sent to a master server
    pub const S2M_SHUTDOWN: u8 = b'C';
    /// Number of latency samples kept per connection
    pub const LATENCY_SAMPLES: usize = 64;
    /// Weight of the newest interval in the exponential frame-rate average
    pub const FRAME_RATE_WEIGHT: f64 = 0.1;
    /// Maximum encoded datagram size
    pub const MAX_DATAGRAM_SIZE: usize = 1450;
}

/// Timing constants
pub mod timing {
    /// Frames per statistics window
    pub const STATFRAMES: u32 = 100;
    /// Seconds between heartbeats
    pub const HEARTBEAT_SECONDS: u64 = 300;
    /// Seconds a dropped client is kept as a zombie
    pub const ZOMBIE_SECONDS: u64 = 2;
    /// Server frames per second
    pub const TICK_RATE: u32 = 20;
}

/// Chat constants
pub mod chat {
    /// Size of the operator chat buffer, terminator included
    pub const SAY_BUFFER: usize = 1024;
    /// Tag prefixed to operator chat
    pub const CONSOLE_TAG: &str = "console: ";
    /// Upper bound on the flood policy message count (and the guard history)
    pub const FLOOD_MAX_MESSAGES: u32 = 10;
    /// Maximum length of the custom flood warning
    pub const FLOOD_MSG_MAX: usize = 254;
}
