#![forbid(unsafe_code)]

pub mod generator;
pub mod model;
pub mod time;

pub use generator::{OperandRange, generate, range_for_difficulty};
pub use time::Clock;
