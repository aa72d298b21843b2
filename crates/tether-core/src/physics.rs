//! Physics backend seam.
//!
//! The scene only ever talks to physics through [`PhysicsBackend`]: create
//! fixed, dynamic and kinematic bodies, join two of them with a
//! point-to-point (spherical) constraint, push bodies with impulses, drive
//! kinematic bodies toward targets, query where things ended up and step the
//! world. Any engine that can do those things can stand in for the bundled
//! [`AvianPhysics`](crate::backend::AvianPhysics).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tether_logic::math::Vec3;

/// Opaque handle to a body owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(u64);

impl BodyHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a constraint owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintHandle(u64);

impl ConstraintHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves.
    Fixed,
    /// Integrated by the solver.
    Dynamic,
    /// Moved only by [`PhysicsBackend::set_kinematic_target`]; pushes
    /// dynamic bodies but is never pushed back.
    Kinematic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl ColliderShape {
    /// Radius of the smallest sphere around the shape's centre that covers
    /// its largest axis.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            ColliderShape::Ball { radius } => radius,
            ColliderShape::Cuboid { half_extents } => half_extents
                .x
                .max(half_extents.y)
                .max(half_extents.z),
        }
    }
}

/// Membership/filter bitmasks. Two colliders interact only when each one's
/// membership intersects the other's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionGroups {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionGroups {
    const BODY_BIT: u32 = 1 << 0;
    const AGENT_BIT: u32 = 1 << 1;

    /// Suspended content bodies: struck by agents, never by each other.
    pub const BODY: Self = Self {
        memberships: Self::BODY_BIT,
        filter: Self::AGENT_BIT,
    };

    /// Wandering agents: strike bodies, pass through each other.
    pub const AGENT: Self = Self {
        memberships: Self::AGENT_BIT,
        filter: Self::BODY_BIT,
    };

    pub const fn new(memberships: u32, filter: u32) -> Self {
        Self {
            memberships,
            filter,
        }
    }

    pub fn interacts_with(&self, other: &Self) -> bool {
        self.memberships & other.filter != 0 && other.memberships & self.filter != 0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),

    #[error("unknown constraint {0:?}")]
    UnknownConstraint(ConstraintHandle),

    #[error("body {0:?} is not kinematic")]
    NotKinematic(BodyHandle),

    #[error("non-finite position {0:?}")]
    NonFinite(Vec3),

    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f32),

    #[error("body capacity of {0} reached")]
    CapacityExhausted(usize),
}

/// Everything the scene needs from a rigid-body engine.
///
/// Removing a body also removes every constraint attached to it.
pub trait PhysicsBackend {
    fn create_fixed_body(&mut self, position: Vec3) -> Result<BodyHandle, PhysicsError>;

    fn create_dynamic_body(
        &mut self,
        position: Vec3,
        mass: f32,
        linear_damping: f32,
        angular_damping: f32,
    ) -> Result<BodyHandle, PhysicsError>;

    fn create_kinematic_body(&mut self, position: Vec3) -> Result<BodyHandle, PhysicsError>;

    /// Join `offset_a` in `a`'s frame to `offset_b` in `b`'s frame.
    fn attach_point_to_point(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
        offset_a: Vec3,
        offset_b: Vec3,
    ) -> Result<ConstraintHandle, PhysicsError>;

    fn attach_collider(
        &mut self,
        body: BodyHandle,
        shape: ColliderShape,
        groups: CollisionGroups,
    ) -> Result<(), PhysicsError>;

    /// Instantaneous change of momentum. Ignored by non-dynamic bodies.
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError>;

    /// Where a kinematic body should be after the next step.
    fn set_kinematic_target(&mut self, body: BodyHandle, position: Vec3)
        -> Result<(), PhysicsError>;

    fn translation(&self, body: BodyHandle) -> Result<Vec3, PhysicsError>;

    /// Rotation about +Y in radians.
    fn yaw(&self, body: BodyHandle) -> Result<f32, PhysicsError>;

    fn remove_constraint(&mut self, constraint: ConstraintHandle) -> Result<(), PhysicsError>;

    fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError>;

    /// Advance the world by `dt` seconds. Non-positive or non-finite `dt`
    /// leaves the world untouched.
    fn step(&mut self, dt: f32);

    fn body_count(&self) -> usize;

    fn constraint_count(&self) -> usize;
}
