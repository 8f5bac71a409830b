//! Loading and validation of negotiation configs and trader packs.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
