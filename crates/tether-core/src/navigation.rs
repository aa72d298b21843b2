//! Click-to-navigate.
//!
//! A click on a hanging item never navigates synchronously from inside the
//! frame; it is queued and the host drains the queue into its own
//! [`Navigator`] when it is ready.

use std::collections::VecDeque;

/// Whatever the host does with "open this item".
pub trait Navigator {
    fn navigate(&mut self, item_id: &str);
}

/// Records requests in order.
impl Navigator for Vec<String> {
    fn navigate(&mut self, item_id: &str) {
        self.push(item_id.to_string());
    }
}

/// Logs requests; used by the headless harness.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, item_id: &str) {
        log::info!("Navigate to item {item_id:?}");
    }
}

#[derive(Debug, Default, Clone)]
pub struct NavigationQueue {
    pending: VecDeque<String>,
}

impl NavigationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item_id: impl Into<String>) {
        self.pending.push_back(item_id.into());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending request, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.pending.drain(..).collect()
    }

    /// Hand every pending request to `navigator`, oldest first.
    pub fn dispatch(&mut self, navigator: &mut dyn Navigator) -> usize {
        let mut count = 0;
        while let Some(id) = self.pending.pop_front() {
            navigator.navigate(&id);
            count += 1;
        }
        count
    }
}
