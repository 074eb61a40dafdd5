//! Active-section tracking.
//!
//! The spy watches heading elements against an activation window that runs
//! from the top of the viewport down to a fraction of its height (20% by
//! default). Every time a scroll produces an observation batch, each element
//! that has just entered the window becomes the active section. When several
//! enter in the same batch, the last one in document order wins.
//!
//! Coordinates are document offsets in pixels. The spy owns no rendering; the
//! caller reports element positions and scroll offsets.

use crate::config::ScrollSpyConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vertical extent of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Distance from the top of the document.
    pub top: f64,
    /// Element height.
    pub height: f64,
}

impl Rect {
    /// Build a rect.
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    const fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The visible part of the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Document offset of the top edge.
    pub scroll_top: f64,
    /// Viewport height.
    pub height: f64,
}

impl Viewport {
    /// Build a viewport.
    pub const fn new(scroll_top: f64, height: f64) -> Self {
        Self { scroll_top, height }
    }
}

/// An element to observe, identified by the id it was rendered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedElement {
    /// Element id, normally a TOC entry id.
    pub id: String,
    /// Element position.
    pub rect: Rect,
}

impl ObservedElement {
    /// Build an observed element.
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
        }
    }
}

/// A change in one element's intersection state.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    /// Element id.
    pub id: String,
    /// Whether the element is now inside the activation window.
    pub is_intersecting: bool,
    /// Fraction of the element inside the window.
    pub ratio: f64,
}

#[derive(Debug, Clone)]
struct Target {
    element: ObservedElement,
    intersecting: bool,
}

/// Tracks which observed section is active.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    window_ratio: f64,
    threshold: f64,
    targets: Vec<Target>,
    viewport: Option<Viewport>,
    active: Option<String>,
}

impl ScrollSpy {
    /// Create a spy with the given activation window.
    pub const fn new(config: &ScrollSpyConfig) -> Self {
        Self {
            window_ratio: config.window_ratio,
            threshold: config.threshold,
            targets: Vec::new(),
            viewport: None,
            active: None,
        }
    }

    /// The active section id, if any element has entered the window since the
    /// current set was observed.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Ids currently observed, in document order.
    pub fn observed_ids(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.element.id.as_str())
    }

    /// Replace the observed set, e.g. after the TOC changed.
    ///
    /// Elements missing from `elements` are unobserved and can no longer
    /// produce entries. Elements present in both sets keep their state. An
    /// empty set clears the active id. If a viewport is known, an initial
    /// batch runs for the new set and its entries are returned.
    pub fn observe(&mut self, elements: Vec<ObservedElement>) -> Vec<IntersectionEntry> {
        let previous = std::mem::take(&mut self.targets);
        self.targets = elements
            .into_iter()
            .map(|element| {
                let intersecting = previous
                    .iter()
                    .find(|t| t.element.id == element.id)
                    .is_some_and(|t| t.intersecting);
                Target {
                    element,
                    intersecting,
                }
            })
            .collect();

        if self.targets.is_empty() {
            self.disconnect();
            return Vec::new();
        }

        debug!("observing {} elements", self.targets.len());
        match self.viewport {
            Some(viewport) => self.scroll_to(viewport),
            None => Vec::new(),
        }
    }

    /// Stop observing one element.
    pub fn unobserve(&mut self, id: &str) {
        self.targets.retain(|t| t.element.id != id);
        if self.targets.is_empty() {
            self.active = None;
        }
    }

    /// Stop observing everything and clear the active id.
    pub fn disconnect(&mut self) {
        self.targets.clear();
        self.active = None;
    }

    /// Report a new scroll position and process the resulting batch.
    ///
    /// Returns the entries whose intersection state changed, in document
    /// order.
    pub fn scroll_to(&mut self, viewport: Viewport) -> Vec<IntersectionEntry> {
        self.viewport = Some(viewport);
        let window_top = viewport.scroll_top;
        let window_bottom = viewport.scroll_top + viewport.height * self.window_ratio;

        let mut batch = Vec::new();
        for target in &mut self.targets {
            let ratio = visible_ratio(target.element.rect, window_top, window_bottom);
            let now = ratio > 0.0 && ratio >= self.threshold;
            if now != target.intersecting {
                target.intersecting = now;
                batch.push(IntersectionEntry {
                    id: target.element.id.clone(),
                    is_intersecting: now,
                    ratio,
                });
            }
        }

        for entry in batch.iter().filter(|e| e.is_intersecting) {
            self.active = Some(entry.id.clone());
        }
        if !batch.is_empty() {
            debug!(active = ?self.active, "processed {} intersection entries", batch.len());
        }
        batch
    }

    /// Scroll so the element with `id` is aligned to the top of the viewport.
    ///
    /// Returns the new scroll offset, or `None` if the id is not observed or no
    /// viewport has been reported yet.
    pub fn navigate_to(&mut self, id: &str) -> Option<f64> {
        let viewport = self.viewport?;
        let top = self
            .targets
            .iter()
            .find(|t| t.element.id == id)?
            .element
            .rect
            .top;
        self.scroll_to(Viewport::new(top, viewport.height));
        Some(top)
    }
}

fn visible_ratio(rect: Rect, window_top: f64, window_bottom: f64) -> f64 {
    if rect.height <= 0.0 {
        return if rect.top >= window_top && rect.top < window_bottom {
            1.0
        } else {
            0.0
        };
    }
    let overlap = rect.bottom().min(window_bottom) - rect.top.max(window_top);
    (overlap / rect.height).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spy() -> ScrollSpy {
        ScrollSpy::new(&ScrollSpyConfig::default())
    }

    fn headings() -> Vec<ObservedElement> {
        vec![
            ObservedElement::new("intro", Rect::new(0.0, 40.0)),
            ObservedElement::new("usage", Rect::new(500.0, 40.0)),
        ]
    }

    #[test]
    fn heading_activates_inside_top_fifth() {
        // Given: h1 at 0 and h2 at 500 in a 1000px viewport
        let mut spy = spy();
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        spy.observe(headings());
        assert_eq!(spy.active_id(), Some("intro"));

        // When: h2's top reaches y=150 on screen
        spy.scroll_to(Viewport::new(350.0, 1000.0));

        // Then: h2 is active
        assert_eq!(spy.active_id(), Some("usage"));

        // And: scrolling back re-activates h1 once it re-enters
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        assert_eq!(spy.active_id(), Some("intro"));
    }

    #[test]
    fn heading_below_window_does_not_activate() {
        let mut spy = spy();
        spy.observe(headings());
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        spy.scroll_to(Viewport::new(250.0, 1000.0));

        // usage sits at y=250 on screen, below the 200px window
        assert_eq!(spy.active_id(), Some("intro"));
    }

    #[test]
    fn leaving_the_window_keeps_the_last_active_id() {
        let mut spy = spy();
        spy.observe(headings());
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        let batch = spy.scroll_to(Viewport::new(100.0, 1000.0));

        assert_eq!(batch.len(), 1);
        assert!(!batch[0].is_intersecting);
        assert_eq!(spy.active_id(), Some("intro"));
    }

    #[test]
    fn last_entering_element_in_a_batch_wins() {
        // Given: two headings that both enter on the same jump
        let mut spy = spy();
        spy.observe(vec![
            ObservedElement::new("a", Rect::new(1000.0, 20.0)),
            ObservedElement::new("b", Rect::new(1100.0, 20.0)),
        ]);
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        assert_eq!(spy.active_id(), None);

        // When: both land inside the window at once
        let batch = spy.scroll_to(Viewport::new(1000.0, 1000.0));

        // Then: document order decides, not distance to the top
        assert_eq!(batch.len(), 2);
        assert_eq!(spy.active_id(), Some("b"));
    }

    #[test]
    fn empty_set_clears_active_id() {
        let mut spy = spy();
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        spy.observe(headings());
        assert!(spy.active_id().is_some());

        spy.observe(Vec::new());
        assert_eq!(spy.active_id(), None);
        assert_eq!(spy.observed_ids().count(), 0);
    }

    #[test]
    fn unobserved_elements_produce_no_entries() {
        let mut spy = spy();
        spy.observe(headings());
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        spy.unobserve("usage");

        let batch = spy.scroll_to(Viewport::new(500.0, 1000.0));
        assert!(batch.iter().all(|e| e.id != "usage"));
        assert_eq!(spy.active_id(), Some("intro"));
    }

    #[test]
    fn reobserving_keeps_state_of_surviving_elements() {
        let mut spy = spy();
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        spy.observe(headings());

        // Same headings re-rendered: intro already intersecting, no new entry
        let batch = spy.observe(headings());
        assert!(batch.is_empty());
        assert_eq!(spy.active_id(), Some("intro"));
    }

    #[test]
    fn navigate_aligns_target_to_top() {
        let mut spy = spy();
        spy.observe(headings());
        spy.scroll_to(Viewport::new(0.0, 1000.0));

        assert_eq!(spy.navigate_to("usage"), Some(500.0));
        assert_eq!(spy.active_id(), Some("usage"));
        assert_eq!(spy.navigate_to("missing"), None);
    }

    #[test]
    fn threshold_requires_a_tenth_visible() {
        let mut spy = spy();
        spy.observe(vec![ObservedElement::new("tall", Rect::new(195.0, 100.0))]);

        // 5px of 100px inside the 0..200 window
        spy.scroll_to(Viewport::new(0.0, 1000.0));
        assert_eq!(spy.active_id(), None);

        // 15px inside
        spy.scroll_to(Viewport::new(10.0, 1000.0));
        assert_eq!(spy.active_id(), Some("tall"));
    }
}
