//! Headless negotiation driver: scripted player policies over the core turn
//! loop, with a serializable trace of every round.

mod action;
mod config;
mod error;
mod policy;
mod simulator;
mod trace;

pub use action::*;
pub use config::*;
pub use error::*;
pub use policy::*;
pub use simulator::*;
pub use trace::*;
