//! Bundled physics backend on avian3d.
//!
//! Avian runs inside a private headless Bevy world: minimal plugins, no
//! renderer, no window. Every backend body is an entity carrying an avian
//! [`RigidBody`]; tethers are [`SphericalJoint`] entities. Handles map to
//! entities through two tables owned here, so a stale handle is reported as
//! unknown instead of reaching into whatever entity reused the slot.
//!
//! [`step`](PhysicsBackend::step) feeds the delta in through
//! [`TimeUpdateStrategy`] and runs the world's main schedule, which steps
//! avian once per slice. Kinematic bodies are driven by velocity: the
//! pending target becomes the linear velocity that reaches it over the
//! step, so avian pushes dynamic bodies out of their way.

use avian3d::prelude::{
    AngularDamping, Collider, CollisionLayers, ExternalImpulse, Gravity, LinearDamping,
    LinearVelocity, Mass, PhysicsPlugins, Position, RigidBody, Rotation, Joint, SleepingDisabled,
    SphericalJoint,
};
use bevy::app::{App, Main, PostUpdate};
use bevy::ecs::bundle::Bundle;
use bevy::ecs::entity::Entity;
use bevy::ecs::schedule::{ExecutorKind, Schedules};
use bevy::ecs::world::World;
use bevy::hierarchy::HierarchyPlugin;
use bevy::math::{EulerRot, Vec3 as AvianVec3};
use bevy::prelude::MinimalPlugins;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::components::Transform;
use bevy::transform::TransformPlugin;
use std::collections::HashMap;
use std::time::Duration;

use tether_logic::math::{normalize_angle, Vec3};

use crate::physics::{
    BodyHandle, BodyKind, ColliderShape, CollisionGroups, ConstraintHandle, PhysicsBackend,
    PhysicsError,
};

pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
/// Longest slice handed to avian in one schedule run.
const MAX_SLICE: f32 = 1.0 / 30.0;
/// Smallest collider extent avian is given.
const MIN_EXTENT: f32 = 1e-3;

fn to_avian(v: Vec3) -> AvianVec3 {
    AvianVec3::new(v.x, v.y, v.z)
}

fn from_avian(v: AvianVec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[derive(Debug, Clone, Copy)]
struct BodyRecord {
    entity: Entity,
    kind: BodyKind,
    /// Pending kinematic target for the next step.
    target: Option<Vec3>,
}

#[derive(Debug, Clone, Copy)]
struct ConstraintRecord {
    entity: Entity,
    a: BodyHandle,
    b: BodyHandle,
}

/// Rigid-body world backed by avian3d.
pub struct AvianPhysics {
    /// Only the app's world is kept; it is `Send + Sync` where `App` is not.
    world: World,
    bodies: HashMap<BodyHandle, BodyRecord>,
    constraints: HashMap<ConstraintHandle, ConstraintRecord>,
    next_handle: u64,
    capacity: Option<usize>,
}

impl AvianPhysics {
    pub fn new() -> Self {
        Self::with_gravity(DEFAULT_GRAVITY)
    }

    pub fn with_gravity(gravity: Vec3) -> Self {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            HierarchyPlugin,
            PhysicsPlugins::new(PostUpdate),
        ))
        .insert_resource(Gravity(to_avian(gravity)))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));
        app.finish();
        app.cleanup();

        let mut world = std::mem::take(app.world_mut());
        // Same inputs, same system order, same result.
        for (_, schedule) in world.resource_mut::<Schedules>().iter_mut() {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        }
        // The first run only starts the clocks and runs startup.
        world.run_schedule(Main);
        world.clear_trackers();

        Self {
            world,
            bodies: HashMap::new(),
            constraints: HashMap::new(),
            next_handle: 1,
            capacity: None,
        }
    }

    /// Refuse to create more than `max_bodies` bodies at once.
    pub fn with_capacity(mut self, max_bodies: usize) -> Self {
        self.capacity = Some(max_bodies);
        self
    }

    pub fn gravity(&self) -> Vec3 {
        self.world
            .get_resource::<Gravity>()
            .map(|g| from_avian(g.0))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        let entity = self.record(body)?.entity;
        self.world
            .get::<LinearVelocity>(entity)
            .map(|v| from_avian(v.0))
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn record(&self, body: BodyHandle) -> Result<BodyRecord, PhysicsError> {
        self.bodies
            .get(&body)
            .copied()
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn next_raw(&mut self) -> u64 {
        let raw = self.next_handle;
        self.next_handle += 1;
        raw
    }

    fn spawn_body(
        &mut self,
        position: Vec3,
        kind: BodyKind,
        extra: impl Bundle,
    ) -> Result<BodyHandle, PhysicsError> {
        if !position.is_finite() {
            return Err(PhysicsError::NonFinite(position));
        }
        if let Some(capacity) = self.capacity {
            if self.bodies.len() >= capacity {
                return Err(PhysicsError::CapacityExhausted(capacity));
            }
        }
        let rigid = match kind {
            BodyKind::Fixed => RigidBody::Static,
            BodyKind::Dynamic => RigidBody::Dynamic,
            BodyKind::Kinematic => RigidBody::Kinematic,
        };
        let at = to_avian(position);
        let entity = self
            .world
            .spawn((
                rigid,
                Position(at),
                Rotation::default(),
                Transform::from_translation(at),
                extra,
            ))
            .id();
        let handle = BodyHandle::from_raw(self.next_raw());
        self.bodies.insert(
            handle,
            BodyRecord {
                entity,
                kind,
                target: None,
            },
        );
        Ok(handle)
    }

    fn run_slice(&mut self, dt: f32) {
        self.world
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(dt)));
        self.world.run_schedule(Main);
        self.world.clear_trackers();
    }
}

impl Default for AvianPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for AvianPhysics {
    fn create_fixed_body(&mut self, position: Vec3) -> Result<BodyHandle, PhysicsError> {
        self.spawn_body(position, BodyKind::Fixed, ())
    }

    fn create_dynamic_body(
        &mut self,
        position: Vec3,
        mass: f32,
        linear_damping: f32,
        angular_damping: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        self.spawn_body(
            position,
            BodyKind::Dynamic,
            (
                Mass(mass),
                LinearDamping(linear_damping.max(0.0)),
                AngularDamping(angular_damping.max(0.0)),
                ExternalImpulse::default(),
                SleepingDisabled,
            ),
        )
    }

    fn create_kinematic_body(&mut self, position: Vec3) -> Result<BodyHandle, PhysicsError> {
        self.spawn_body(position, BodyKind::Kinematic, SleepingDisabled)
    }

    fn attach_point_to_point(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
        offset_a: Vec3,
        offset_b: Vec3,
    ) -> Result<ConstraintHandle, PhysicsError> {
        let ea = self.record(a)?.entity;
        let eb = self.record(b)?.entity;
        for offset in [offset_a, offset_b] {
            if !offset.is_finite() {
                return Err(PhysicsError::NonFinite(offset));
            }
        }
        let joint = SphericalJoint::new(ea, eb)
            .with_local_anchor_1(to_avian(offset_a))
            .with_local_anchor_2(to_avian(offset_b));
        let entity = self.world.spawn(joint).id();
        let handle = ConstraintHandle::from_raw(self.next_raw());
        self.constraints
            .insert(handle, ConstraintRecord { entity, a, b });
        Ok(handle)
    }

    fn attach_collider(
        &mut self,
        body: BodyHandle,
        shape: ColliderShape,
        groups: CollisionGroups,
    ) -> Result<(), PhysicsError> {
        let entity = self.record(body)?.entity;
        let collider = match shape {
            ColliderShape::Ball { radius } => Collider::sphere(radius.max(MIN_EXTENT)),
            ColliderShape::Cuboid { half_extents } => Collider::cuboid(
                (half_extents.x * 2.0).max(MIN_EXTENT),
                (half_extents.y * 2.0).max(MIN_EXTENT),
                (half_extents.z * 2.0).max(MIN_EXTENT),
            ),
        };
        let layers = CollisionLayers::new(groups.memberships, groups.filter);
        self.world.entity_mut(entity).insert((collider, layers));
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError> {
        if !impulse.is_finite() {
            return Err(PhysicsError::NonFinite(impulse));
        }
        let record = self.record(body)?;
        if record.kind != BodyKind::Dynamic {
            return Ok(());
        }
        if let Some(mut pending) = self.world.get_mut::<ExternalImpulse>(record.entity) {
            pending.apply_impulse(to_avian(impulse));
        }
        Ok(())
    }

    fn set_kinematic_target(
        &mut self,
        body: BodyHandle,
        position: Vec3,
    ) -> Result<(), PhysicsError> {
        if !position.is_finite() {
            return Err(PhysicsError::NonFinite(position));
        }
        let record = self
            .bodies
            .get_mut(&body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        if record.kind != BodyKind::Kinematic {
            return Err(PhysicsError::NotKinematic(body));
        }
        record.target = Some(position);
        Ok(())
    }

    fn translation(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        let entity = self.record(body)?.entity;
        self.world
            .get::<Position>(entity)
            .map(|p| from_avian(p.0))
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn yaw(&self, body: BodyHandle) -> Result<f32, PhysicsError> {
        let entity = self.record(body)?.entity;
        self.world
            .get::<Rotation>(entity)
            .map(|r| normalize_angle(r.0.to_euler(EulerRot::YXZ).0))
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) -> Result<(), PhysicsError> {
        let record = self
            .constraints
            .remove(&constraint)
            .ok_or(PhysicsError::UnknownConstraint(constraint))?;
        self.world.despawn(record.entity);
        Ok(())
    }

    fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        let record = self
            .bodies
            .remove(&body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        let attached: Vec<ConstraintHandle> = self
            .constraints
            .iter()
            .filter(|(_, c)| c.a == body || c.b == body)
            .map(|(handle, _)| *handle)
            .collect();
        for handle in attached {
            if let Some(joint) = self.constraints.remove(&handle) {
                self.world.despawn(joint.entity);
            }
        }
        self.world.despawn(record.entity);
        Ok(())
    }

    fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let inv_dt = 1.0 / dt;
        for record in self.bodies.values() {
            let Some(target) = record.target else { continue };
            let Some(from) = self.world.get::<Position>(record.entity).map(|p| p.0) else {
                continue;
            };
            if let Some(mut velocity) = self.world.get_mut::<LinearVelocity>(record.entity) {
                velocity.0 = (to_avian(target) - from) * inv_dt;
            }
        }

        let slices = (dt / MAX_SLICE).ceil().max(1.0) as u32;
        let slice = dt / slices as f32;
        for _ in 0..slices {
            self.run_slice(slice);
        }

        // Land kinematic bodies exactly and hold them until the next target.
        for record in self.bodies.values_mut() {
            let Some(target) = record.target.take() else { continue };
            if let Some(mut position) = self.world.get_mut::<Position>(record.entity) {
                position.0 = to_avian(target);
            }
            if let Some(mut velocity) = self.world.get_mut::<LinearVelocity>(record.entity) {
                velocity.0 = AvianVec3::ZERO;
            }
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn pendulum(physics: &mut AvianPhysics, length: f32) -> (BodyHandle, BodyHandle) {
        let anchor = physics.create_fixed_body(Vec3::new(0.0, 4.0, 0.0)).unwrap();
        let bob = physics
            .create_dynamic_body(Vec3::new(0.0, 4.0 - length, 0.0), 0.5, 0.8, 0.9)
            .unwrap();
        physics
            .attach_point_to_point(anchor, bob, Vec3::ZERO, Vec3::new(0.0, length, 0.0))
            .unwrap();
        (anchor, bob)
    }

    #[test]
    fn tether_holds_length_while_swinging() {
        let mut physics = AvianPhysics::new();
        let (_, bob) = pendulum(&mut physics, 3.0);
        physics.apply_impulse(bob, Vec3::new(1.0, 0.0, 0.5)).unwrap();
        let anchor = Vec3::new(0.0, 4.0, 0.0);
        for _ in 0..600 {
            physics.step(DT);
            let d = physics.translation(bob).unwrap().distance(&anchor);
            assert!((d - 3.0).abs() < 0.05, "tether stretched to {d}");
        }
    }

    #[test]
    fn impulse_sets_a_dynamic_body_moving() {
        let mut physics = AvianPhysics::with_gravity(Vec3::ZERO);
        let ball = physics.create_dynamic_body(Vec3::ZERO, 0.5, 0.0, 0.0).unwrap();
        physics.apply_impulse(ball, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        physics.step(DT);
        let v = physics.velocity(ball).unwrap();
        assert!((v.x - 2.0).abs() < 0.05, "velocity {v:?}");
        assert!(physics.translation(ball).unwrap().x > 0.0);
    }

    #[test]
    fn damping_settles_the_swing() {
        let mut physics = AvianPhysics::new();
        let (_, bob) = pendulum(&mut physics, 2.0);
        physics.apply_impulse(bob, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        for _ in 0..3_000 {
            physics.step(DT);
        }
        let p = physics.translation(bob).unwrap();
        assert!(p.x.abs() < 0.05, "still swinging at x = {}", p.x);
        assert!(physics.velocity(bob).unwrap().length() < 0.05);
    }

    #[test]
    fn fixed_body_ignores_impulses_and_gravity() {
        let mut physics = AvianPhysics::new();
        let at = Vec3::new(1.0, 2.0, 3.0);
        let anchor = physics.create_fixed_body(at).unwrap();
        physics.apply_impulse(anchor, Vec3::new(5.0, 5.0, 5.0)).unwrap();
        physics.step(DT);
        assert!(physics.translation(anchor).unwrap().distance(&at) < 1e-5);
    }

    #[test]
    fn kinematic_pushes_dynamic_and_is_not_pushed_back() {
        let mut physics = AvianPhysics::with_gravity(Vec3::ZERO);
        let walker = physics.create_kinematic_body(Vec3::new(-1.5, 0.0, 0.0)).unwrap();
        physics
            .attach_collider(walker, ColliderShape::Ball { radius: 0.5 }, CollisionGroups::AGENT)
            .unwrap();
        let ball = physics.create_dynamic_body(Vec3::ZERO, 0.5, 0.0, 0.0).unwrap();
        physics
            .attach_collider(ball, ColliderShape::Ball { radius: 0.5 }, CollisionGroups::BODY)
            .unwrap();

        let mut target = Vec3::new(-1.5, 0.0, 0.0);
        for _ in 0..60 {
            target.x += 0.02;
            physics.set_kinematic_target(walker, target).unwrap();
            physics.step(DT);
            assert!(physics.translation(walker).unwrap().distance(&target) < 1e-4);
        }

        let pushed = physics.translation(ball).unwrap();
        assert!(pushed.x > 0.3, "ball at {pushed:?}");
        assert!(physics.velocity(ball).unwrap().x > 0.0);
    }

    #[test]
    fn kinematic_body_holds_still_without_a_target() {
        let mut physics = AvianPhysics::new();
        let walker = physics.create_kinematic_body(Vec3::ZERO).unwrap();
        physics
            .set_kinematic_target(walker, Vec3::new(0.5, 0.0, 0.0))
            .unwrap();
        physics.step(DT);
        physics.step(DT);
        let at = physics.translation(walker).unwrap();
        assert!(at.distance(&Vec3::new(0.5, 0.0, 0.0)) < 1e-4, "walker at {at:?}");
    }

    #[test]
    fn bodies_in_the_same_group_pass_through() {
        let mut physics = AvianPhysics::with_gravity(Vec3::ZERO);
        let a = physics.create_dynamic_body(Vec3::ZERO, 1.0, 0.0, 0.0).unwrap();
        let b = physics
            .create_dynamic_body(Vec3::new(0.2, 0.0, 0.0), 1.0, 0.0, 0.0)
            .unwrap();
        for body in [a, b] {
            physics
                .attach_collider(body, ColliderShape::Ball { radius: 0.5 }, CollisionGroups::BODY)
                .unwrap();
        }
        physics.step(DT);
        assert!(physics.translation(a).unwrap().length() < 1e-5);
        assert!(
            physics
                .translation(b)
                .unwrap()
                .distance(&Vec3::new(0.2, 0.0, 0.0))
                < 1e-5
        );
    }

    #[test]
    fn removing_a_body_drops_its_constraints() {
        let mut physics = AvianPhysics::new();
        let (anchor, bob) = pendulum(&mut physics, 2.5);
        assert_eq!((physics.body_count(), physics.constraint_count()), (2, 1));
        physics.remove_body(bob).unwrap();
        assert_eq!((physics.body_count(), physics.constraint_count()), (1, 0));
        physics.remove_body(anchor).unwrap();
        assert_eq!(physics.body_count(), 0);
        assert_eq!(physics.translation(bob), Err(PhysicsError::UnknownBody(bob)));
        assert_eq!(physics.remove_body(bob), Err(PhysicsError::UnknownBody(bob)));
        // stepping an emptied world is harmless
        physics.step(DT);
    }

    #[test]
    fn removed_constraint_is_unknown_afterwards() {
        let mut physics = AvianPhysics::new();
        let anchor = physics.create_fixed_body(Vec3::new(0.0, 4.0, 0.0)).unwrap();
        let bob = physics
            .create_dynamic_body(Vec3::new(0.0, 2.0, 0.0), 0.5, 0.0, 0.0)
            .unwrap();
        let tether = physics
            .attach_point_to_point(anchor, bob, Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0))
            .unwrap();
        physics.remove_constraint(tether).unwrap();
        assert_eq!(physics.constraint_count(), 0);
        assert_eq!(
            physics.remove_constraint(tether),
            Err(PhysicsError::UnknownConstraint(tether))
        );
    }

    #[test]
    fn capacity_is_enforced() {
        let mut physics = AvianPhysics::new().with_capacity(1);
        physics.create_fixed_body(Vec3::ZERO).unwrap();
        assert_eq!(
            physics.create_fixed_body(Vec3::ZERO),
            Err(PhysicsError::CapacityExhausted(1))
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut physics = AvianPhysics::new();
        assert!(matches!(
            physics.create_dynamic_body(Vec3::ZERO, 0.0, 0.0, 0.0),
            Err(PhysicsError::InvalidMass(_))
        ));
        assert!(matches!(
            physics.create_fixed_body(Vec3::new(f32::NAN, 0.0, 0.0)),
            Err(PhysicsError::NonFinite(_))
        ));
        let fixed = physics.create_fixed_body(Vec3::ZERO).unwrap();
        assert_eq!(
            physics.set_kinematic_target(fixed, Vec3::ZERO),
            Err(PhysicsError::NotKinematic(fixed))
        );
        assert_eq!(physics.body_count(), 1);
    }

    #[test]
    fn zero_step_changes_nothing() {
        let mut physics = AvianPhysics::new();
        let ball = physics.create_dynamic_body(Vec3::ZERO, 1.0, 0.0, 0.0).unwrap();
        physics.step(0.0);
        physics.step(f32::NAN);
        assert_eq!(physics.translation(ball).unwrap(), Vec3::ZERO);
    }
}
