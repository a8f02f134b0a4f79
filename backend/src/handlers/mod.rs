//! HTTP handlers

pub mod bom;
pub mod delivery;
pub mod dispatch;
pub mod health;
pub mod items;
pub mod orders;
pub mod payment;
pub mod production;
pub mod returns;
pub mod stock;

pub use bom::*;
pub use delivery::*;
pub use dispatch::*;
pub use health::*;
pub use items::*;
pub use orders::*;
pub use payment::*;
pub use production::*;
pub use returns::*;
pub use stock::*;
