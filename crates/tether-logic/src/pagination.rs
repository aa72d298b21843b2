//! Page window over the content list and the portals that move it.
//!
//! Only `page_size` items hang at once. When there are more, portals appear
//! at the horizontal extremes of the scene: "prev" on the −X side while an
//! earlier page exists, "next" on the +X side while a later one does.
//! Changing page is a hard cut; the engine tears down every body of the old
//! page and builds the new slice from scratch.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::bounds::SceneBounds;
use crate::math::Vec3;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Decorative idle bob of portal geometry. Unrelated to physics.
const BOB_AMPLITUDE: f32 = 0.15;
const BOB_SPEED: f32 = 1.6;

/// Which way a portal pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalSide {
    Prev,
    Next,
}

/// A visible portal and where to draw it this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub side: PortalSide,
    pub position: Vec3,
}

/// Current page over a list of `item_count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    current_page: usize,
    page_size: usize,
    item_count: usize,
}

impl PageWindow {
    /// A `page_size` of zero is treated as one; config validation rejects it
    /// before it gets here.
    pub fn new(item_count: usize, page_size: usize) -> Self {
        Self {
            current_page: 0,
            page_size: page_size.max(1),
            item_count,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// `ceil(item_count / page_size)`; zero for an empty list.
    pub fn total_pages(&self) -> usize {
        self.item_count.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.current_page + 1 < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 0
    }

    /// Move forward one page. Returns the new page, or `None` at the end.
    pub fn next(&mut self) -> Option<usize> {
        if !self.has_next() {
            return None;
        }
        self.current_page += 1;
        Some(self.current_page)
    }

    /// Move back one page. Returns the new page, or `None` at the start.
    pub fn prev(&mut self) -> Option<usize> {
        if !self.has_prev() {
            return None;
        }
        self.current_page -= 1;
        Some(self.current_page)
    }

    /// Jump to `page`, clamped into `[0, total_pages - 1]`.
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current_page = page.min(self.total_pages().saturating_sub(1));
        self.current_page
    }

    /// Indices of the items on the current page.
    pub fn range(&self) -> Range<usize> {
        self.range_of(self.current_page)
    }

    pub fn range_of(&self, page: usize) -> Range<usize> {
        let start = (page * self.page_size).min(self.item_count);
        let end = (start + self.page_size).min(self.item_count);
        start..end
    }

    /// Items on the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let r = self.range();
        let end = r.end.min(items.len());
        &items[r.start.min(end)..end]
    }

    /// Size of every page, in order.
    pub fn page_sizes(&self) -> Vec<usize> {
        (0..self.total_pages())
            .map(|p| self.range_of(p).len())
            .collect()
    }

    pub fn portal_visible(&self, side: PortalSide) -> bool {
        match side {
            PortalSide::Prev => self.has_prev(),
            PortalSide::Next => self.has_next(),
        }
    }

    /// Step in the portal's direction.
    pub fn activate(&mut self, side: PortalSide) -> Option<usize> {
        match side {
            PortalSide::Prev => self.prev(),
            PortalSide::Next => self.next(),
        }
    }
}

/// Where a portal stands, before bobbing: in the margin band at the
/// horizontal extreme of its side, at mid height.
pub fn portal_anchor(side: PortalSide, bounds: &SceneBounds) -> Vec3 {
    let x = bounds.bound_x() + bounds.margin_x() * 0.5;
    let y = bounds.floor_y + bounds.height() * 0.5;
    match side {
        PortalSide::Prev => Vec3::new(-x, y, 0.0),
        PortalSide::Next => Vec3::new(x, y, 0.0),
    }
}

/// Vertical bob offset at `time`. The two sides are half a cycle apart.
pub fn portal_bob(side: PortalSide, time: f32) -> f32 {
    let phase = match side {
        PortalSide::Prev => 0.0,
        PortalSide::Next => std::f32::consts::PI,
    };
    (time * BOB_SPEED + phase).sin() * BOB_AMPLITUDE
}

/// Visible portals for the window at `time`.
pub fn portals(window: &PageWindow, bounds: &SceneBounds, time: f32) -> Vec<Portal> {
    [PortalSide::Prev, PortalSide::Next]
        .into_iter()
        .filter(|side| window.portal_visible(*side))
        .map(|side| Portal {
            side,
            position: portal_anchor(side, bounds) + Vec3::Y * portal_bob(side, time),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_no_pages_or_portals() {
        let w = PageWindow::new(0, 5);
        assert_eq!(w.total_pages(), 0);
        assert!(portals(&w, &SceneBounds::default(), 0.0).is_empty());
        assert!(w.range().is_empty());
    }

    #[test]
    fn exactly_one_page_has_no_portals() {
        let w = PageWindow::new(5, 5);
        assert_eq!(w.total_pages(), 1);
        assert!(!w.has_next());
        assert!(!w.has_prev());
    }

    #[test]
    fn seven_items_two_pages() {
        let mut w = PageWindow::new(7, 5);
        assert_eq!(w.total_pages(), 2);
        assert!(w.has_next() && !w.has_prev());
        assert_eq!(w.next(), Some(1));
        assert!(!w.has_next() && w.has_prev());
        assert_eq!(w.range(), 5..7);
    }

    #[test]
    fn twelve_items_walk_to_last_page() {
        let mut w = PageWindow::new(12, 5);
        assert_eq!(w.page_sizes(), vec![5, 5, 2]);
        w.activate(PortalSide::Next);
        w.activate(PortalSide::Next);
        assert_eq!(w.current_page(), 2);
        assert!(!w.portal_visible(PortalSide::Next));
        assert_eq!(w.activate(PortalSide::Next), None);
        assert_eq!(w.current_page(), 2);
    }

    #[test]
    fn prev_at_start_is_refused() {
        let mut w = PageWindow::new(12, 5);
        assert_eq!(w.prev(), None);
        assert_eq!(w.current_page(), 0);
    }

    #[test]
    fn go_to_clamps() {
        let mut w = PageWindow::new(12, 5);
        assert_eq!(w.go_to(99), 2);
        let mut empty = PageWindow::new(0, 5);
        assert_eq!(empty.go_to(3), 0);
    }

    #[test]
    fn slice_matches_range() {
        let items: Vec<u32> = (0..12).collect();
        let mut w = PageWindow::new(items.len(), 5);
        w.go_to(2);
        assert_eq!(w.slice(&items), &[10, 11]);
    }

    #[test]
    fn portals_sit_at_horizontal_extremes() {
        let b = SceneBounds::default();
        let mut w = PageWindow::new(12, 5);
        w.go_to(1);
        let ps = portals(&w, &b, 0.0);
        assert_eq!(ps.len(), 2);
        let prev = ps.iter().find(|p| p.side == PortalSide::Prev).unwrap();
        let next = ps.iter().find(|p| p.side == PortalSide::Next).unwrap();
        assert!(prev.position.x < -b.bound_x());
        assert!(next.position.x > b.bound_x());
    }

    #[test]
    fn bob_is_bounded() {
        for i in 0..1000 {
            let t = i as f32 * 0.05;
            assert!(portal_bob(PortalSide::Next, t).abs() <= BOB_AMPLITUDE);
        }
    }
}
