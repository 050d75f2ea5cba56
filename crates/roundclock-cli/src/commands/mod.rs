pub mod config;
pub mod intervals;
pub mod timer;
