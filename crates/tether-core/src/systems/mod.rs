//! Systems - logic that operates on scene components

mod hanging;
mod wander;
mod wind;

pub use hanging::*;
pub use wander::*;
pub use wind::*;
