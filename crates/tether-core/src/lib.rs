//! Tether Core - suspended-content scene engine
//!
//! Content items hang from ceiling anchors as light pendulum bodies, a
//! coherent-noise breeze keeps them drifting and a few wandering creatures
//! roam the floor, now and then knocking into them. Only one page of items
//! hangs at a time; portals at the edges of the scene page through the rest.
//!
//! # Architecture
//!
//! - **Logic** ([`tether_logic`]): pure functions for placement, wind,
//!   steering, paging and camera limits
//! - **Physics** ([`physics`]): the [`PhysicsBackend`](physics::PhysicsBackend)
//!   seam, with [`AvianPhysics`](backend::AvianPhysics) as the bundled
//!   avian3d backend
//! - **Scene** ([`engine`]): a `hecs` world of page slots and agents, driven
//!   by [`systems`] in a fixed frame order
//!
//! # Example
//!
//! ```rust,no_run
//! use tether_core::prelude::*;
//!
//! let items = vec![ContentItem::new("hello-world", "Hello, world")];
//! let mut engine = SceneEngine::with_default_physics(SceneConfig::default(), items)
//!     .expect("default config is valid");
//!
//! loop {
//!     engine.update(1.0 / 60.0);
//!     let frame = engine.snapshot();
//!     # let _ = frame;
//! }
//! ```

pub mod backend;
pub mod components;
pub mod engine;
pub mod navigation;
pub mod physics;
pub mod picking;
pub mod render;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::backend::AvianPhysics;
    pub use crate::engine::{FrameReport, PageLoad, SceneEngine};
    pub use crate::navigation::{LogNavigator, Navigator};
    pub use crate::physics::{BodyHandle, PhysicsBackend, PhysicsError};
    pub use crate::render::{FrameSnapshot, RenderSink};
    pub use tether_logic::config::SceneConfig;
    pub use tether_logic::content::ContentItem;
    pub use tether_logic::math::Vec3;
    pub use tether_logic::pagination::PortalSide;
}
