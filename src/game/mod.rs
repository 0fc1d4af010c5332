pub mod client;
pub mod constants;
pub mod roster;
pub mod world;
