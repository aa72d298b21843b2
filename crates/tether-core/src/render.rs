//! Render seam.
//!
//! After each update the engine mirrors physics state into a
//! [`RenderSink`]: one call per page item, per agent and per visible portal.
//! The viewer draws straight from the calls; headless code collects them
//! into a [`FrameSnapshot`].

use serde::Serialize;
use tether_logic::math::Vec3;
use tether_logic::pagination::{Portal, PortalSide};

/// Transform of one item on the active page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView<'a> {
    pub item_id: &'a str,
    pub item_index: usize,
    pub anchor: Vec3,
    pub position: Vec3,
    pub yaw: f32,
    /// `false` for items without a physics body; they sit at rest.
    pub hung: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentView {
    pub index: usize,
    pub seed: u32,
    pub position: Vec3,
    pub heading: f32,
}

pub trait RenderSink {
    fn body(&mut self, body: &BodyView<'_>);

    fn agent(&mut self, agent: &AgentView);

    fn portal(&mut self, _portal: &Portal) {}
}

/// Owned copy of a [`BodyView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySnapshot {
    pub item_id: String,
    pub item_index: usize,
    pub anchor: Vec3,
    pub position: Vec3,
    pub yaw: f32,
    pub hung: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortalSnapshot {
    pub side: PortalSide,
    pub position: Vec3,
}

/// Everything mirrored in one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub bodies: Vec<BodySnapshot>,
    pub agents: Vec<AgentView>,
    pub portals: Vec<PortalSnapshot>,
}

impl FrameSnapshot {
    pub fn find_body(&self, item_id: &str) -> Option<&BodySnapshot> {
        self.bodies.iter().find(|b| b.item_id == item_id)
    }
}

impl RenderSink for FrameSnapshot {
    fn body(&mut self, body: &BodyView<'_>) {
        self.bodies.push(BodySnapshot {
            item_id: body.item_id.to_string(),
            item_index: body.item_index,
            anchor: body.anchor,
            position: body.position,
            yaw: body.yaw,
            hung: body.hung,
        });
    }

    fn agent(&mut self, agent: &AgentView) {
        self.agents.push(*agent);
    }

    fn portal(&mut self, portal: &Portal) {
        self.portals.push(PortalSnapshot {
            side: portal.side,
            position: portal.position,
        });
    }
}
