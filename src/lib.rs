//! # Convergence
//!
//! A decorative dual-swarm particle background. Two swarms of instanced
//! meshes hover on opposite sides of a central emblem: an "AI" swarm of
//! cubes that moves in quantized, mechanical steps and a "HUMAN" swarm of
//! octahedra that swirls and breathes. Both react to the pointer in opposite
//! directions, and a scrolling grid floor and a rotating emblem with its own
//! light complete the scene.
//!
//! ## Quick Start
//!
//! ```ignore
//! use convergence::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     env_logger::init();
//!     let config = SwarmConfig::new().with_particle_count(4000);
//!     convergence::window::run(config)
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`ParticleStore`] is built once from a [`SwarmConfig`] and never
//! changes. Each [`ParticleDescriptor`] carries its group, initial position,
//! speed, size, phase and stable index.
//!
//! ### Motion
//!
//! Per-frame placement is a pure function of the descriptor, the global
//! elapsed time and the pointer offset. The two policies live in
//! [`motion::ai`] and [`motion::human`]; [`motion::compute_transform`]
//! dispatches on the particle's group.
//!
//! ### Frames
//!
//! [`FrameUpdater`] writes every particle into the [`InstanceBuffer`] through
//! a single reused [`ScratchTransform`], then marks both channels dirty once.
//! [`Engine`] drives the updater, uploads the buffer to a [`RenderSurface`]
//! and presents the [`Scene`].
//!
//! Headless use (tests, benchmarks) goes through [`HeadlessSurface`]:
//!
//! ```
//! use convergence::prelude::*;
//!
//! let config = SwarmConfig::new().with_particle_count(100);
//! let mut engine = Engine::start(HeadlessSurface::new(), config).unwrap();
//! engine.frame(0.5).unwrap();
//! engine.stop();
//! assert_eq!(engine.frame(1.0).unwrap(), FrameStatus::Stopped);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod instance;
pub mod motion;
pub mod particle;
pub mod pointer;
pub mod scene;
pub mod spawn;
pub mod surface;
pub mod time;
pub mod updater;
pub mod window;

pub use config::{GroupConfig, SceneConfig, SwarmConfig};
pub use engine::{Engine, FrameStatus};
pub use error::{ConfigError, EngineError, GpuError};
pub use glam::{Vec2, Vec3, Vec4};
pub use instance::{InstanceBuffer, ScratchTransform};
pub use motion::{compute_transform, ColorKey, FrameTransform, CONVERGENCE_POINT};
pub use particle::{Group, ParticleDescriptor, ParticleStore};
pub use pointer::PointerTracker;
pub use scene::{Scene, SceneFrame};
pub use spawn::SpawnContext;
pub use surface::{HeadlessSurface, RenderSurface};
pub use time::Time;
pub use updater::{FrameStats, FrameUpdater};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use convergence::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{GroupConfig, SceneConfig, SwarmConfig};
    pub use crate::engine::{Engine, FrameStatus};
    pub use crate::error::{ConfigError, EngineError};
    pub use crate::gpu::{Camera, GpuState};
    pub use crate::instance::InstanceBuffer;
    pub use crate::motion::{compute_transform, ColorKey, FrameTransform};
    pub use crate::particle::{Group, ParticleStore};
    pub use crate::surface::{HeadlessSurface, RenderSurface};
    pub use crate::time::Time;
    pub use crate::updater::FrameUpdater;
    pub use crate::{Vec2, Vec3, Vec4};
}
