pub mod heuristic;
pub mod manual;

pub use heuristic::tick_deploy;
pub use manual::{manual_deploy, Direction};
