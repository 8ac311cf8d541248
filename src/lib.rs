pub mod cleaning;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
