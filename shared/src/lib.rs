//! Shared types and domain logic for the Godown fulfillment engine.
//!
//! This crate contains the types and pure computations shared between the
//! backend service and its tests. Nothing here performs I/O; every rule
//! (payment status derivation, dispatch gating, zone matching) is a plain
//! function over plain data.

pub mod models;
pub mod types;
pub mod validation;
pub mod zones;

pub use models::*;
pub use types::*;
pub use validation::*;
pub use zones::*;
