//! Local-space rigid body simulation.
//!
//! A [`SimulationVolume`] owns a secondary physics world that lives inside a
//! movable reference frame. Objects from a host scene graph are admitted into
//! the volume, simulated relative to the frame, and reconciled back into world
//! space every tick. The host is consumed through the [`SceneHost`] capability
//! trait and is never implemented here.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod core;
pub mod debug;
pub mod physics;
pub mod scene;
pub mod volume;

pub use crate::core::*;
pub use crate::debug::*;
pub use crate::physics::*;
pub use crate::scene::*;
pub use crate::volume::*;

pub use ::log;
pub use ::nalgebra;
pub use ::rapier3d;
pub use ::slotmap;
