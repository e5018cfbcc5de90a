//! Tower Siege - Effort-Driven Territory Capture
//!
//! A server-authoritative simulation where physical effort (counted reps
//! reported by a client) converts into soldiers at a team's home tower,
//! and soldiers march across a fixed 13-tower graph until one side holds
//! everything, eliminates the other, or the clock runs out.

pub mod bot;
pub mod broadcast;
pub mod core;
pub mod deploy;
pub mod economy;
pub mod map;
pub mod march;
pub mod session;
pub mod state;
