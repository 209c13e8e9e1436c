pub mod config;
pub mod surface;
