//! Wander system - steers agents and drives their kinematic bodies

use hecs::World;
use tether_logic::bounds::SceneBounds;
use tether_logic::wander::WanderConfig;

use crate::components::Agent;
use crate::physics::PhysicsBackend;

use super::hanging::discard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WanderReport {
    pub stepped: usize,
    pub boundary_overrides: usize,
}

/// Step every agent independently and hand its new position to physics as
/// the kinematic target for the coming step.
pub fn wander_system<P: PhysicsBackend + ?Sized>(
    world: &mut World,
    physics: &mut P,
    config: &WanderConfig,
    bounds: &SceneBounds,
    delta: f32,
) -> WanderReport {
    let mut report = WanderReport::default();
    for (_, agent) in world.query_mut::<&mut Agent>() {
        let tick = agent.wander.step(config, bounds, delta);
        report.stepped += 1;
        if tick.boundary_override {
            report.boundary_overrides += 1;
        }

        let Some(body) = agent.body else { continue };
        let target = agent.wander.state.translation(bounds, config);
        if let Err(e) = physics.set_kinematic_target(body, target) {
            // Warn once; the agent keeps wandering without a body.
            log::warn!("Agent {} lost its body: {e}", agent.index);
            discard(physics, &[body]);
            agent.body = None;
        }
    }
    report
}
