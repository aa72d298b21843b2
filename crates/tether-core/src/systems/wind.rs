//! Wind system - pushes every hanging body with this frame's breeze

use hecs::World;
use tether_logic::suspension::{wind_impulse, BodyTuning};
use tether_logic::wind::WindSample;

use crate::components::{PageSlot, Suspended};
use crate::physics::PhysicsBackend;

/// Apply one impulse per hanging body, scaled by its own sensitivity.
/// Returns how many bodies were driven; failures are logged and skipped.
pub fn wind_system<P: PhysicsBackend + ?Sized>(
    world: &World,
    physics: &mut P,
    sample: &WindSample,
    tuning: &BodyTuning,
) -> usize {
    let mut driven = 0;
    for (_, (slot, suspended)) in world.query::<(&PageSlot, &Suspended)>().iter() {
        let impulse = wind_impulse(sample, slot.params.wind_sensitivity, tuning);
        match physics.apply_impulse(suspended.body, impulse) {
            Ok(()) => driven += 1,
            Err(e) => log::warn!("Wind impulse on {:?} failed: {e}", slot.item_id),
        }
    }
    driven
}
