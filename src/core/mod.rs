pub mod config;
pub mod error;
pub mod types;

pub use config::SiegeConfig;
pub use error::{Result, SiegeError};
