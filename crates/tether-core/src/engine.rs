//! Scene engine - main entry point for running the installation

use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::f32::consts::PI;

use tether_logic::config::SceneConfig;
use tether_logic::content::{sanitize_items, ContentItem};
use tether_logic::error::{ConfigError, DataError};
use tether_logic::math::Vec3;
use tether_logic::pagination::{portals, PageWindow, Portal, PortalSide};
use tether_logic::suspension::SuspensionParams;
use tether_logic::wander::{WanderState, WanderingAgent};
use tether_logic::wind::{WindField, WindSample};

use crate::backend::AvianPhysics;
use crate::components::{Agent, PageSlot, Suspended, Unhung};
use crate::navigation::{NavigationQueue, Navigator};
use crate::physics::PhysicsBackend;
use crate::picking::pick_nearest;
use crate::render::{AgentView, BodyView, FrameSnapshot, RenderSink};
use crate::systems::*;

/// Agents spawn inside this fraction of the walkable area.
const SPAWN_SPREAD: f32 = 0.8;
/// Click radius around a portal.
pub const PORTAL_PICK_RADIUS: f32 = 0.8;

/// What one [`SceneEngine::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub wind: Vec3,
    pub wind_time: f64,
    pub bodies_driven: usize,
    pub agents_stepped: usize,
    pub boundary_overrides: usize,
}

/// Outcome of building a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageLoad {
    pub page: usize,
    pub total_pages: usize,
    pub hung: usize,
    pub unhung: usize,
    /// Items of the previous page that were torn down first.
    pub released: usize,
}

/// Owns the scene world, the physics backend and all per-session state.
///
/// Frame order is fixed: sample the wind once, push every hanging body,
/// step every agent, then step physics. Mirroring into a renderer happens
/// after [`update`](Self::update) via [`mirror`](Self::mirror).
pub struct SceneEngine<P: PhysicsBackend = AvianPhysics> {
    /// Page slots and agents. Backend objects are referenced by handle.
    world: World,
    physics: P,
    config: SceneConfig,
    items: Vec<ContentItem>,
    rejected: Vec<DataError>,
    window: PageWindow,
    wind: WindField,
    last_wind: WindSample,
    navigation: NavigationQueue,
    /// Scaled seconds since start; drives decorative portal bobbing.
    elapsed: f64,
    time_scale: f32,
    torn_down: bool,
}

impl SceneEngine<AvianPhysics> {
    /// Scene on the bundled avian3d backend.
    pub fn with_default_physics(
        config: SceneConfig,
        items: Vec<ContentItem>,
    ) -> Result<Self, ConfigError> {
        Self::new(config, items, AvianPhysics::new())
    }
}

impl<P: PhysicsBackend> SceneEngine<P> {
    /// Validate `config`, spawn the agents and hang the first page.
    ///
    /// Items with a blank or repeated id are dropped (see
    /// [`rejected`](Self::rejected)); the rest keep their order.
    pub fn new(
        config: SceneConfig,
        items: Vec<ContentItem>,
        physics: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let intake = sanitize_items(items.into_iter().map(Into::into).collect());

        let mut engine = Self {
            world: World::new(),
            physics,
            window: PageWindow::new(intake.accepted.len(), config.page_size),
            wind: WindField::new(config.wind),
            last_wind: WindSample::default(),
            navigation: NavigationQueue::new(),
            elapsed: 0.0,
            time_scale: 1.0,
            torn_down: false,
            items: intake.accepted,
            rejected: intake.rejected,
            config,
        };

        engine.spawn_agents();
        let load = engine.load_page(0);
        log::info!(
            "Scene ready: {} items over {} pages, {} agents",
            engine.items.len(),
            load.total_pages,
            engine.agent_count()
        );
        Ok(engine)
    }

    fn spawn_agents(&mut self) {
        let bounds = self.config.bounds;
        let wander = self.config.wander;
        let mut rng = StdRng::seed_from_u64(self.config.agents.master_seed);
        let bx = bounds.bound_x() * SPAWN_SPREAD;
        let bz = bounds.bound_z() * SPAWN_SPREAD;

        for index in 0..self.config.agents.count {
            let seed: u32 = rng.gen();
            let x = rng.gen_range(-bx..=bx);
            let z = rng.gen_range(-bz..=bz);
            let heading = rng.gen_range(-PI..PI);
            let agent = WanderingAgent::new(seed, x, z, heading);
            spawn_agent(&mut self.world, &mut self.physics, index, agent, &wander, &bounds);
        }
    }

    /// Advance the scene by `delta` seconds. Non-positive or non-finite
    /// deltas do nothing.
    pub fn update(&mut self, delta: f32) -> FrameReport {
        if self.torn_down || !(delta.is_finite() && delta > 0.0) {
            return FrameReport {
                wind: self.last_wind.force,
                wind_time: self.last_wind.time,
                ..Default::default()
            };
        }
        let delta = delta * self.time_scale;
        if delta <= 0.0 {
            return FrameReport {
                wind: self.last_wind.force,
                wind_time: self.last_wind.time,
                ..Default::default()
            };
        }
        self.elapsed += delta as f64;

        let sample = self.wind.tick(delta);
        self.last_wind = sample;

        let bodies_driven = wind_system(
            &self.world,
            &mut self.physics,
            &sample,
            &self.config.suspension.body,
        );
        let wander = wander_system(
            &mut self.world,
            &mut self.physics,
            &self.config.wander,
            &self.config.bounds,
            delta,
        );
        self.physics.step(delta);

        FrameReport {
            wind: sample.force,
            wind_time: sample.time,
            bodies_driven,
            agents_stepped: wander.stepped,
            boundary_overrides: wander.boundary_overrides,
        }
    }

    /// Tear down the current page and hang page `page` (clamped). Does
    /// nothing once the scene is torn down.
    pub fn load_page(&mut self, page: usize) -> PageLoad {
        if self.torn_down {
            return PageLoad::default();
        }
        let released = release_page(&mut self.world, &mut self.physics);
        let page = self.window.go_to(page);
        let range = self.window.range();
        let total = range.len();

        let bounds = &self.config.bounds;
        let suspension = &self.config.suspension;
        let slots: Vec<PageSlot> = range
            .enumerate()
            .map(|(slot, item_index)| {
                let id = &self.items[item_index].id;
                PageSlot {
                    item_index,
                    item_id: id.clone(),
                    params: SuspensionParams::derive(id, slot, total, bounds, suspension),
                }
            })
            .collect();

        let (hung, unhung) = hang_page(
            &mut self.world,
            &mut self.physics,
            slots,
            &self.config.suspension.body,
        );
        let load = PageLoad {
            page,
            total_pages: self.window.total_pages(),
            hung,
            unhung,
            released,
        };
        log::debug!("Loaded page {load:?}");
        load
    }

    pub fn next_page(&mut self) -> Option<PageLoad> {
        self.activate_portal(PortalSide::Next)
    }

    pub fn prev_page(&mut self) -> Option<PageLoad> {
        self.activate_portal(PortalSide::Prev)
    }

    /// Page in the portal's direction. `None` if that portal is not shown.
    pub fn activate_portal(&mut self, side: PortalSide) -> Option<PageLoad> {
        if self.torn_down {
            return None;
        }
        let page = self.window.activate(side)?;
        Some(self.load_page(page))
    }

    /// Visible portals at the current bob phase.
    pub fn portals(&self) -> Vec<Portal> {
        portals(&self.window, &self.config.bounds, self.elapsed as f32)
    }

    /// Queue navigation to `item_id` if it is on the active page.
    pub fn click(&mut self, item_id: &str) -> bool {
        let on_page = self
            .world
            .query::<&PageSlot>()
            .iter()
            .any(|(_, slot)| slot.item_id == item_id);
        if on_page {
            log::debug!("Clicked {item_id:?}");
            self.navigation.push(item_id);
        }
        on_page
    }

    /// Item id under the ray, nearest first.
    pub fn pick_item(&self, origin: Vec3, direction: Vec3) -> Option<String> {
        let radius = self.config.suspension.body.collider_radius;
        let targets: Vec<(String, Vec3, f32)> = self
            .body_views()
            .into_iter()
            .map(|(slot, position, _, _)| (slot.item_id, position, radius))
            .collect();
        pick_nearest(origin, direction, targets)
    }

    pub fn pick_portal(&self, origin: Vec3, direction: Vec3) -> Option<PortalSide> {
        pick_nearest(
            origin,
            direction,
            self.portals()
                .into_iter()
                .map(|p| (p.side, p.position, PORTAL_PICK_RADIUS)),
        )
    }

    pub fn pending_navigation(&self) -> usize {
        self.navigation.len()
    }

    pub fn drain_navigation(&mut self) -> Vec<String> {
        self.navigation.drain()
    }

    pub fn dispatch_navigation(&mut self, navigator: &mut dyn Navigator) -> usize {
        self.navigation.dispatch(navigator)
    }

    /// Page slots in item order with their current transform.
    fn body_views(&self) -> Vec<(PageSlot, Vec3, f32, bool)> {
        let mut views: Vec<(PageSlot, Vec3, f32, bool)> = self
            .world
            .query::<(&PageSlot, Option<&Suspended>)>()
            .iter()
            .map(|(_, (slot, suspended))| {
                let live = suspended.and_then(|s| {
                    let position = self.physics.translation(s.body).ok()?;
                    let yaw = self.physics.yaw(s.body).ok()?;
                    Some((position, yaw))
                });
                match live {
                    Some((position, yaw)) => (slot.clone(), position, yaw, true),
                    None => (slot.clone(), slot.params.rest_position, 0.0, false),
                }
            })
            .collect();
        views.sort_by_key(|(slot, ..)| slot.item_index);
        views
    }

    /// Push the current transforms of page items, agents and portals.
    pub fn mirror(&self, sink: &mut dyn RenderSink) {
        for (slot, position, yaw, hung) in self.body_views() {
            sink.body(&BodyView {
                item_id: &slot.item_id,
                item_index: slot.item_index,
                anchor: slot.params.anchor,
                position,
                yaw,
                hung,
            });
        }

        let mut agents: Vec<AgentView> = self
            .world
            .query::<&Agent>()
            .iter()
            .map(|(_, agent)| {
                let fallback = agent
                    .wander
                    .state
                    .translation(&self.config.bounds, &self.config.wander);
                let position = agent
                    .body
                    .and_then(|b| self.physics.translation(b).ok())
                    .unwrap_or(fallback);
                AgentView {
                    index: agent.index,
                    seed: agent.wander.seed(),
                    position,
                    heading: agent.wander.state.current_heading,
                }
            })
            .collect();
        agents.sort_by_key(|a| a.index);
        for agent in &agents {
            sink.agent(agent);
        }

        for portal in self.portals() {
            sink.portal(&portal);
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let mut snapshot = FrameSnapshot::default();
        self.mirror(&mut snapshot);
        snapshot
    }

    /// Release every body, constraint and agent. Idempotent; also runs on
    /// drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let released = release_page(&mut self.world, &mut self.physics);
        release_agents(&mut self.world, &mut self.physics);
        self.wind.reset();
        self.last_wind = WindSample::default();
        self.navigation.drain();
        self.torn_down = true;
        log::info!(
            "Scene torn down: {released} page items released, {} bodies left",
            self.physics.body_count()
        );
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Items dropped at intake.
    pub fn rejected(&self) -> &[DataError] {
        &self.rejected
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn last_wind(&self) -> WindSample {
        self.last_wind
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Scale applied to every delta (1.0 = real-time).
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// How fast the breeze evolves, independent of [`time_scale`](Self::time_scale).
    pub fn set_wind_time_scale(&mut self, scale: f32) {
        self.wind.set_time_scale(scale);
    }

    pub fn wind_time_scale(&self) -> f32 {
        self.wind.config().time_scale
    }

    /// Ids on the active page, in item order.
    pub fn page_item_ids(&self) -> Vec<String> {
        let mut slots: Vec<(usize, String)> = self
            .world
            .query::<&PageSlot>()
            .iter()
            .map(|(_, slot)| (slot.item_index, slot.item_id.clone()))
            .collect();
        slots.sort_by_key(|(index, _)| *index);
        slots.into_iter().map(|(_, id)| id).collect()
    }

    /// Suspension parameters of an item on the active page.
    pub fn params_of(&self, item_id: &str) -> Option<SuspensionParams> {
        self.world
            .query::<&PageSlot>()
            .iter()
            .find(|(_, slot)| slot.item_id == item_id)
            .map(|(_, slot)| slot.params)
    }

    pub fn hung_count(&self) -> usize {
        self.world.query::<(&PageSlot, &Suspended)>().iter().count()
    }

    pub fn unhung_count(&self) -> usize {
        self.world.query::<(&PageSlot, &Unhung)>().iter().count()
    }

    pub fn agent_count(&self) -> usize {
        self.world.query::<&Agent>().iter().count()
    }

    /// Wander state of every agent, in spawn order.
    pub fn agent_states(&self) -> Vec<WanderState> {
        let mut agents: Vec<(usize, WanderState)> = self
            .world
            .query::<&Agent>()
            .iter()
            .map(|(_, agent)| (agent.index, agent.wander.state))
            .collect();
        agents.sort_by_key(|(index, _)| *index);
        agents.into_iter().map(|(_, state)| state).collect()
    }
}

impl<P: PhysicsBackend> Drop for SceneEngine<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem::new(format!("item-{i}"), format!("Item {i}")))
            .collect()
    }

    fn engine(n: usize) -> SceneEngine {
        SceneEngine::with_default_physics(SceneConfig::default(), items(n)).unwrap()
    }

    #[test]
    fn first_page_is_hung_on_start() {
        let e = engine(7);
        assert_eq!(e.window().current_page(), 0);
        assert_eq!(e.hung_count(), 5);
        assert_eq!(e.agent_count(), 3);
        // anchor + body per item, one kinematic body per agent
        assert_eq!(e.physics().body_count(), 5 * 2 + 3);
        assert_eq!(e.physics().constraint_count(), 5);
    }

    #[test]
    fn invalid_config_is_rejected_before_start() {
        let config = SceneConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(SceneEngine::with_default_physics(config, items(3)).is_err());
    }

    #[test]
    fn duplicate_ids_are_dropped_at_intake() {
        let mut list = items(3);
        list.push(ContentItem::new("item-1", "again"));
        let e = SceneEngine::with_default_physics(SceneConfig::default(), list).unwrap();
        assert_eq!(e.items().len(), 3);
        assert_eq!(e.rejected().len(), 1);
    }

    #[test]
    fn update_drives_every_body_and_agent() {
        let mut e = engine(4);
        let report = e.update(1.0 / 60.0);
        assert_eq!(report.bodies_driven, 4);
        assert_eq!(report.agents_stepped, 3);
        assert!(report.wind_time > 0.0);
    }

    #[test]
    fn zero_delta_does_nothing() {
        let mut e = engine(2);
        let before = e.snapshot();
        let report = e.update(0.0);
        assert_eq!(report.bodies_driven, 0);
        assert_eq!(e.snapshot(), before);
    }

    #[test]
    fn click_only_queues_items_on_page() {
        let mut e = engine(7);
        assert!(e.click("item-2"));
        assert!(!e.click("item-6"));
        let mut seen: Vec<String> = Vec::new();
        assert_eq!(e.dispatch_navigation(&mut seen), 1);
        assert_eq!(seen, ["item-2"]);
    }

    #[test]
    fn mirror_lists_page_items_in_order() {
        let e = engine(3);
        let snap = e.snapshot();
        let ids: Vec<_> = snap.bodies.iter().map(|b| b.item_id.as_str()).collect();
        assert_eq!(ids, ["item-0", "item-1", "item-2"]);
        assert!(snap.bodies.iter().all(|b| b.hung));
        assert_eq!(snap.agents.len(), 3);
        assert!(snap.portals.is_empty());
    }

    #[test]
    fn time_scale_zero_freezes_the_scene() {
        let mut e = engine(2);
        e.set_time_scale(0.0);
        let before = e.agent_states();
        e.update(0.5);
        assert_eq!(e.agent_states(), before);
    }

    #[test]
    fn paused_update_still_reports_the_last_breeze() {
        let mut e = engine(2);
        let live = e.update(1.0 / 60.0);
        e.set_time_scale(0.0);
        let paused = e.update(1.0 / 60.0);
        assert_eq!(paused.wind, live.wind);
        assert_eq!(paused.wind_time, live.wind_time);
        assert_eq!(paused.bodies_driven, 0);
    }

    #[test]
    fn load_page_after_teardown_hangs_nothing() {
        let mut e = engine(7);
        e.teardown();
        assert_eq!(e.load_page(0), PageLoad::default());
        assert_eq!(e.hung_count(), 0);
        assert_eq!(e.physics().body_count(), 0);
        assert_eq!(e.physics().constraint_count(), 0);
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut e = engine(5);
        e.teardown();
        e.teardown();
        assert!(e.is_torn_down());
        assert_eq!(e.physics().body_count(), 0);
        assert_eq!(e.physics().constraint_count(), 0);
        assert_eq!(e.next_page(), None);
    }
}
