//! Core barter logic: piles, the response matrix, round state and the turn
//! loop. Keep this crate free of IO and presentation concerns.

pub mod cards;
pub mod config;
pub mod director;
pub mod events;
pub mod machine;
pub mod matrix;
pub mod neutral;
pub mod pile;
pub mod rng;

pub use cards::*;
pub use config::*;
pub use director::*;
pub use events::*;
pub use machine::*;
pub use matrix::*;
pub use neutral::*;
pub use pile::*;
pub use rng::*;
