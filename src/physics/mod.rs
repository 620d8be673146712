//! The local physics world, powered by `rapier`.
//!
//! [`LocalSimulation`] owns a complete rapier world and exposes the narrow
//! actor/joint lifecycle the volume needs. Handles are opaque outside this
//! module.

pub mod simulation;

pub use simulation::*;
