//! Hanging system - builds and releases the backend objects of a page

use hecs::World;
use tether_logic::bounds::SceneBounds;
use tether_logic::math::Vec3;
use tether_logic::suspension::{BodyTuning, SuspensionParams};
use tether_logic::wander::{WanderConfig, WanderingAgent};

use crate::components::{Agent, PageSlot, Suspended, Unhung};
use crate::physics::{
    BodyHandle, ColliderShape, CollisionGroups, PhysicsBackend, PhysicsError,
};

/// Create anchor, body, collider and tether for one item. On any failure
/// the objects created so far are removed again, so nothing leaks.
pub fn hang_item<P: PhysicsBackend + ?Sized>(
    physics: &mut P,
    params: &SuspensionParams,
    tuning: &BodyTuning,
) -> Result<Suspended, PhysicsError> {
    let anchor = physics.create_fixed_body(params.anchor)?;
    let body = match physics.create_dynamic_body(
        params.rest_position,
        tuning.mass,
        tuning.linear_damping,
        tuning.angular_damping,
    ) {
        Ok(body) => body,
        Err(e) => {
            discard(physics, &[anchor]);
            return Err(e);
        }
    };

    let shape = ColliderShape::Ball {
        radius: tuning.collider_radius,
    };
    let tether = physics
        .attach_collider(body, shape, CollisionGroups::BODY)
        .and_then(|()| {
            physics.attach_point_to_point(
                anchor,
                body,
                Vec3::ZERO,
                Vec3::Y * params.tether_length,
            )
        });
    match tether {
        Ok(tether) => Ok(Suspended {
            anchor,
            body,
            tether,
        }),
        Err(e) => {
            discard(physics, &[body, anchor]);
            Err(e)
        }
    }
}

/// Remove `bodies`, logging rather than failing on handles already gone.
pub(crate) fn discard<P: PhysicsBackend + ?Sized>(physics: &mut P, bodies: &[BodyHandle]) {
    for body in bodies {
        if let Err(e) = physics.remove_body(*body) {
            log::debug!("Cleanup of {body:?} failed: {e}");
        }
    }
}

/// Spawn page entities for `slots`. Items whose bodies fail are kept as
/// [`Unhung`] so they are still listed and clickable.
pub fn hang_page<P: PhysicsBackend + ?Sized>(
    world: &mut World,
    physics: &mut P,
    slots: Vec<PageSlot>,
    tuning: &BodyTuning,
) -> (usize, usize) {
    let mut hung = 0;
    let mut unhung = 0;
    for slot in slots {
        match hang_item(physics, &slot.params, tuning) {
            Ok(suspended) => {
                world.spawn((slot, suspended));
                hung += 1;
            }
            Err(reason) => {
                log::warn!("Could not hang {:?}: {reason}", slot.item_id);
                world.spawn((slot, Unhung { reason }));
                unhung += 1;
            }
        }
    }
    (hung, unhung)
}

/// Remove every page entity and its backend objects.
pub fn release_page<P: PhysicsBackend + ?Sized>(world: &mut World, physics: &mut P) -> usize {
    let entities: Vec<(hecs::Entity, Option<Suspended>)> = world
        .query::<(&PageSlot, Option<&Suspended>)>()
        .iter()
        .map(|(entity, (_, suspended))| (entity, suspended.copied()))
        .collect();

    for (entity, suspended) in &entities {
        if let Some(s) = suspended {
            if let Err(e) = physics.remove_constraint(s.tether) {
                log::debug!("Tether {:?} already gone: {e}", s.tether);
            }
            discard(physics, &[s.body, s.anchor]);
        }
        let _ = world.despawn(*entity);
    }
    entities.len()
}

/// Spawn an agent entity with a kinematic body. Without a body it still
/// wanders; it just cannot strike anything.
pub fn spawn_agent<P: PhysicsBackend + ?Sized>(
    world: &mut World,
    physics: &mut P,
    index: usize,
    wander: WanderingAgent,
    config: &WanderConfig,
    bounds: &SceneBounds,
) {
    let position = wander.state.translation(bounds, config);
    let shape = ColliderShape::Ball {
        radius: config.collider_radius,
    };
    let body = physics.create_kinematic_body(position).and_then(|body| {
        match physics.attach_collider(body, shape, CollisionGroups::AGENT) {
            Ok(()) => Ok(body),
            Err(e) => {
                discard(physics, &[body]);
                Err(e)
            }
        }
    });
    let body = match body {
        Ok(body) => Some(body),
        Err(e) => {
            log::warn!("Agent {index} has no body: {e}");
            None
        }
    };
    world.spawn((Agent { index, wander, body },));
}

/// Remove every agent entity and its body.
pub fn release_agents<P: PhysicsBackend + ?Sized>(world: &mut World, physics: &mut P) {
    let agents: Vec<(hecs::Entity, Option<BodyHandle>)> = world
        .query::<&Agent>()
        .iter()
        .map(|(entity, agent)| (entity, agent.body))
        .collect();
    for (entity, body) in agents {
        if let Some(body) = body {
            discard(physics, &[body]);
        }
        let _ = world.despawn(entity);
    }
}
