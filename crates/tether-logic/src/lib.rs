//! Pure simulation logic for the tether installation.
//!
//! Content items hang from fixed ceiling anchors as pendulum bodies, a
//! coherent-noise breeze nudges them, and a handful of wandering creatures
//! roam the floor and occasionally bump into them. This crate holds every
//! piece of that behaviour that can be expressed without a physics engine
//! or a renderer: functions take plain data and return plain data, so they
//! are unit-testable and reusable from the engine crate, the headless
//! harness and the viewer alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bounds`] | Floor/ceiling geometry, margins and derived placement limits |
//! | [`camera`] | Bounded zoom and orbit rig |
//! | [`config`] | Aggregated scene configuration, JSON loading, validation |
//! | [`content`] | Content items and intake sanitisation |
//! | [`error`] | Configuration and data error taxonomy |
//! | [`math`] | Small 3D vector type and angle helpers |
//! | [`noise`] | Seeded coherent-noise provider |
//! | [`pagination`] | Page window and portal visibility/placement |
//! | [`seed`] | Stable id hashing and stateless seeded sequences |
//! | [`suspension`] | Per-item tether parameters and wind impulse scaling |
//! | [`wander`] | Noise-driven wander steering for floor agents |
//! | [`wind`] | Time-accumulated breeze sampling |
//!
//! # Example
//!
//! ```
//! use tether_logic::bounds::SceneBounds;
//! use tether_logic::suspension::{SuspensionConfig, SuspensionParams};
//!
//! let bounds = SceneBounds::default();
//! let params = SuspensionParams::derive("hello-world", 0, 1, &bounds, &SuspensionConfig::default());
//! assert_eq!(params.slot_x, 0.0);
//! assert!((2.0..=3.5).contains(&params.tether_length));
//! ```

pub mod bounds;
pub mod camera;
pub mod config;
pub mod content;
pub mod error;
pub mod math;
pub mod noise;
pub mod pagination;
pub mod seed;
pub mod suspension;
pub mod wander;
pub mod wind;
