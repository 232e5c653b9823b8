//! Attribute selection drivers.
//!
//! `elimination` holds the backward-elimination controller; `kopt` sweeps the
//! neighborhood size through the same controller without removing anything.
//! `exclusion` drops user-listed attributes up front.
pub mod elimination;
pub mod exclusion;
pub mod kopt;

pub use elimination::{EliminationController, EliminationState, RemovalPolicy};
pub use exclusion::exclude_attributes;
pub use kopt::{KOptimizationDriver, KoptRange, KoptResult};
