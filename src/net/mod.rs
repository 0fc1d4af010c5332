pub mod master;
pub mod protocol;
pub mod stats;
pub mod transport;
