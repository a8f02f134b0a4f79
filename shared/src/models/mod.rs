//! Domain models for the Godown fulfillment engine

mod bom;
mod item;
mod order;
mod stock;

pub use bom::*;
pub use item::*;
pub use order::*;
pub use stock::*;
