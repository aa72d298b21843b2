//! Component definitions for the scene world.
//!
//! Components are plain data attached to entities. Physics bodies live in
//! the backend; scene entities only hold the handles.

use tether_logic::suspension::SuspensionParams;
use tether_logic::wander::WanderingAgent;

use crate::physics::{BodyHandle, ConstraintHandle, PhysicsError};

/// One content item on the active page.
#[derive(Debug, Clone)]
pub struct PageSlot {
    /// Index into the full item list, not the page.
    pub item_index: usize,
    pub item_id: String,
    pub params: SuspensionParams,
}

/// Backend objects of a hanging item. Present only if every one of them
/// was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suspended {
    pub anchor: BodyHandle,
    pub body: BodyHandle,
    pub tether: ConstraintHandle,
}

/// Marks an item whose body could not be built this page.
#[derive(Debug, Clone, PartialEq)]
pub struct Unhung {
    pub reason: PhysicsError,
}

/// A floor wanderer. Lives for the whole session, across pages.
#[derive(Debug, Clone)]
pub struct Agent {
    pub index: usize,
    pub wander: WanderingAgent,
    /// `None` once the backend refused the agent's kinematic body.
    pub body: Option<BodyHandle>,
}
