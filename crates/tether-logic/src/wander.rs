//! Noise-driven wander steering for floor agents.
//!
//! Algorithm per tick ("drift, fence, turn, then walk"):
//! 1. Advance the agent's private noise clock by `delta`
//! 2. Sample 1D noise at `time × frequency + offset` and integrate it into
//!    the target heading (slow random walk)
//! 3. Near any floor edge, hard-override the target to point back inside
//! 4. Take the shortest signed difference to the target, in `(-π, π]`
//! 5. Rotate toward the target by at most `turn_speed × delta`
//! 6. Gate forward speed by `max(0, cos(remaining error))`
//! 7. Integrate position along the facing direction and clamp into bounds
//!
//! The state is a small plain record and [`wander_step`] is a pure function
//! of it, so agents never share mutable state and every tick is replayable.

use serde::{Deserialize, Serialize};

use crate::bounds::SceneBounds;
use crate::error::{non_negative, ConfigError};
use crate::math::{angle_delta, heading_direction, heading_of, normalize_angle, Vec3};
use crate::noise::{CoherentNoise, PerlinNoise};

/// Steering and body tuning shared by all agents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Forward speed at full alignment (units/s).
    pub speed: f32,
    /// Maximum heading change rate (rad/s).
    pub turn_speed: f32,
    /// Noise clock multiplier for heading drift.
    pub noise_frequency: f32,
    /// Gain from noise sample to target-heading drift (rad/s at |noise| = 1).
    pub turn_gain: f32,
    /// Distance from a floor edge at which the boundary override kicks in.
    pub edge_margin: f32,
    pub collider_radius: f32,
    /// Agents stand on the floor; their centre sits this far above it.
    pub body_height: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            speed: 0.8,
            turn_speed: 1.5,
            noise_frequency: 0.3,
            turn_gain: 2.0,
            edge_margin: 1.5,
            collider_radius: 0.6,
            body_height: 1.2,
        }
    }
}

impl WanderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("wander.speed", self.speed)?;
        non_negative("wander.turn_speed", self.turn_speed)?;
        non_negative("wander.noise_frequency", self.noise_frequency)?;
        non_negative("wander.turn_gain", self.turn_gain)?;
        non_negative("wander.edge_margin", self.edge_margin)?;
        non_negative("wander.collider_radius", self.collider_radius)?;
        non_negative("wander.body_height", self.body_height)?;
        Ok(())
    }
}

/// Mutable steering state of one agent. Y is implied by the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WanderState {
    pub x: f32,
    pub z: f32,
    pub current_heading: f32,
    pub target_heading: f32,
    pub noise_time: f64,
    /// Offset into noise space that decorrelates agents sharing a seed.
    pub noise_offset: f64,
}

impl WanderState {
    pub fn new(x: f32, z: f32, heading: f32, noise_offset: f64) -> Self {
        let heading = normalize_angle(heading);
        Self {
            x,
            z,
            current_heading: heading,
            target_heading: heading,
            noise_time: 0.0,
            noise_offset,
        }
    }

    /// Centre of the agent body in scene space.
    pub fn translation(&self, bounds: &SceneBounds, config: &WanderConfig) -> Vec3 {
        Vec3::new(self.x, bounds.floor_y + config.body_height / 2.0, self.z)
    }
}

/// Result of one steering tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WanderTick {
    pub state: WanderState,
    /// Remaining signed error after turning, in `(-π, π]`.
    pub heading_error: f32,
    /// `max(0, cos(heading_error))`; scales forward speed.
    pub alignment: f32,
    /// Whether a floor edge overrode the target heading this tick.
    pub boundary_override: bool,
}

/// Heading pointing back toward the interior if `(x, z)` is within
/// `margin` of any floor edge. Corners combine both edges.
pub fn boundary_heading(x: f32, z: f32, bounds: &SceneBounds, margin: f32) -> Option<f32> {
    let bx = bounds.bound_x();
    let bz = bounds.bound_z();
    let mut push_x = 0.0f32;
    let mut push_z = 0.0f32;
    if x >= bx - margin {
        push_x -= 1.0;
    }
    if x <= -bx + margin {
        push_x += 1.0;
    }
    if z >= bz - margin {
        push_z -= 1.0;
    }
    if z <= -bz + margin {
        push_z += 1.0;
    }
    if push_x == 0.0 && push_z == 0.0 {
        None
    } else {
        Some(heading_of(push_x, push_z))
    }
}

/// Advance one agent by `delta` seconds. `delta <= 0` is a no-op.
pub fn wander_step<N: CoherentNoise + ?Sized>(
    state: &WanderState,
    config: &WanderConfig,
    bounds: &SceneBounds,
    noise: &N,
    delta: f32,
) -> WanderTick {
    if !(delta.is_finite() && delta > 0.0) {
        let heading_error = angle_delta(state.current_heading, state.target_heading);
        return WanderTick {
            state: *state,
            heading_error,
            alignment: heading_error.cos().max(0.0),
            boundary_override: false,
        };
    }

    let mut next = *state;
    next.noise_time += delta as f64;

    let drift = noise.sample_1d(
        next.noise_time * config.noise_frequency as f64 + next.noise_offset,
    );
    let mut target = next.target_heading + drift * delta * config.turn_gain;

    let fence = boundary_heading(next.x, next.z, bounds, config.edge_margin);
    if let Some(heading) = fence {
        target = heading;
    }
    next.target_heading = normalize_angle(target);

    let error = angle_delta(next.current_heading, next.target_heading);
    let max_turn = config.turn_speed * delta;
    let turn = error.clamp(-max_turn, max_turn);
    next.current_heading = normalize_angle(next.current_heading + turn);

    let heading_error = angle_delta(next.current_heading, next.target_heading);
    let alignment = heading_error.cos().max(0.0);

    let (dx, dz) = heading_direction(next.current_heading);
    let step = config.speed * alignment * delta;
    let (x, z) = bounds.clamp(next.x + dx * step, next.z + dz * step);
    next.x = x;
    next.z = z;

    WanderTick {
        state: next,
        heading_error,
        alignment,
        boundary_override: fence.is_some(),
    }
}

/// An agent together with the noise generator it owns.
#[derive(Debug, Clone)]
pub struct WanderingAgent {
    pub state: WanderState,
    noise: PerlinNoise,
}

impl WanderingAgent {
    pub fn new(seed: u32, x: f32, z: f32, heading: f32) -> Self {
        Self {
            state: WanderState::new(x, z, heading, seed as f64 * 13.37),
            noise: PerlinNoise::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.noise.seed()
    }

    pub fn step(&mut self, config: &WanderConfig, bounds: &SceneBounds, delta: f32) -> WanderTick {
        let tick = wander_step(&self.state, config, bounds, &self.noise, delta);
        self.state = tick.state;
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    struct Flat(f32);

    impl CoherentNoise for Flat {
        fn sample(&self, _x: f64, _y: f64) -> f32 {
            self.0
        }
    }

    fn bounds() -> SceneBounds {
        SceneBounds::default()
    }

    #[test]
    fn zero_delta_is_noop() {
        let s = WanderState::new(1.0, 2.0, 0.3, 0.0);
        let t = wander_step(&s, &WanderConfig::default(), &bounds(), &Flat(1.0), 0.0);
        assert_eq!(t.state, s);
        assert!(!t.boundary_override);
    }

    #[test]
    fn edge_forces_target_toward_interior() {
        let b = bounds();
        let s = WanderState::new(b.bound_x() - 0.1, 0.0, FRAC_PI_2, 0.0);
        let t = wander_step(&s, &WanderConfig::default(), &b, &Flat(0.9), 1.0 / 60.0);
        assert!(t.boundary_override);
        assert!((t.state.target_heading + FRAC_PI_2).abs() < 1e-5);
        assert!(b.contains(t.state.x, t.state.z));
    }

    #[test]
    fn corner_points_diagonally_inward() {
        let b = bounds();
        let h = boundary_heading(b.bound_x(), b.bound_z(), &b, 1.0).unwrap();
        let (dx, dz) = heading_direction(h);
        assert!(dx < 0.0 && dz < 0.0);
    }

    #[test]
    fn interior_has_no_override() {
        assert!(boundary_heading(0.0, 0.0, &bounds(), 1.5).is_none());
    }

    #[test]
    fn turning_is_rate_limited() {
        let config = WanderConfig::default();
        let mut s = WanderState::new(0.0, 0.0, 0.0, 0.0);
        s.target_heading = PI * 0.9;
        let dt = 0.1;
        let t = wander_step(&s, &config, &bounds(), &Flat(0.0), dt);
        assert!((t.state.current_heading - config.turn_speed * dt).abs() < 1e-5);
    }

    #[test]
    fn facing_away_means_standing_still() {
        let mut s = WanderState::new(0.0, 0.0, 0.0, 0.0);
        s.target_heading = PI;
        let t = wander_step(&s, &WanderConfig::default(), &bounds(), &Flat(0.0), 0.05);
        assert_eq!(t.alignment, 0.0);
        assert_eq!((t.state.x, t.state.z), (0.0, 0.0));
    }

    #[test]
    fn aligned_agent_walks_forward() {
        let s = WanderState::new(0.0, 0.0, 0.0, 0.0);
        let config = WanderConfig::default();
        let t = wander_step(&s, &config, &bounds(), &Flat(0.0), 0.5);
        assert!((t.alignment - 1.0).abs() < 1e-6);
        assert!((t.state.z - config.speed * 0.5).abs() < 1e-5);
    }

    #[test]
    fn long_run_stays_bounded_and_normalized() {
        let b = bounds();
        let config = WanderConfig::default();
        let mut agent = WanderingAgent::new(5, 0.0, 0.0, 1.0);
        for _ in 0..50_000 {
            let t = agent.step(&config, &b, 1.0 / 60.0);
            assert!(t.heading_error > -PI && t.heading_error <= PI);
            assert!(t.alignment >= 0.0);
            assert!(agent.state.current_heading > -PI && agent.state.current_heading <= PI);
            assert!(agent.state.target_heading > -PI && agent.state.target_heading <= PI);
            assert!(b.contains(agent.state.x, agent.state.z));
        }
    }
}
