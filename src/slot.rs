//! The per-slot lifecycle state machine.
//!
//! A [`Slot`] is one reusable unit of the fixed-capacity rendering pool.
//! It cycles `Idle → Loading → Displaying → Idle` for the lifetime of the
//! process; only its content assignment changes. Commands arrive from the
//! reconciliation pass ([`display`](Slot::display), [`clear`](Slot::clear),
//! [`set_muted`](Slot::set_muted)); lifecycle events arrive asynchronously
//! from the renderer ([`content_ready`](Slot::content_ready),
//! [`content_failed`](Slot::content_failed)).
//!
//! Surface dispatch is optimistic: the slot records its new state first and
//! logs a warning if the surface call fails. A failed dispatch leaves the
//! slot waiting for an event that will never come; the next reconciliation
//! pass reissues or clears it, so the pool never wedges.

use crate::command::{CellRef, PixelRect};
use crate::traits::RenderSurface;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle phase of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotPhase {
    /// No content assigned; surface detached and hidden.
    Idle,
    /// URL assigned and surface navigating; content not yet confirmed.
    Loading,
    /// Content confirmed ready; surface positioned and visible.
    Displaying,
}

/// A point-in-time projection of one slot, republished to status
/// subscribers after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub slot: usize,
    pub phase: SlotPhase,
    pub url: Option<String>,
    pub rect: Option<PixelRect>,
    pub muted: bool,
    /// Last content title reported by the renderer.
    pub title: Option<String>,
}

/// One slot of the rendering pool.
pub struct Slot {
    index: usize,
    phase: SlotPhase,
    url: Option<String>,
    rect: Option<PixelRect>,
    span: BTreeSet<CellRef>,
    muted: bool,
    title: Option<String>,
}

impl Slot {
    /// Create an idle slot.
    ///
    /// Slots start muted: sound is only ever enabled by explicit focus
    /// routing.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            phase: SlotPhase::Idle,
            url: None,
            rect: None,
            span: BTreeSet::new(),
            muted: true,
            title: None,
        }
    }

    //  Accessors

    /// Pool index of this slot.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SlotPhase {
        self.phase
    }

    /// Currently assigned URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Cells this slot's region currently spans. Empty when idle.
    pub fn span(&self) -> &BTreeSet<CellRef> {
        &self.span
    }

    /// Current mute flag.
    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Build a snapshot of the current state.
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            slot: self.index,
            phase: self.phase,
            url: self.url.clone(),
            rect: self.rect,
            muted: self.muted,
            title: self.title.clone(),
        }
    }

    //  Commands

    /// Assign `url` to this slot at `rect`, spanning `span`.
    ///
    /// If the slot already holds the same URL (loading or displaying), only
    /// the position and span are updated and the surface is repositioned —
    /// the content is never reloaded. Otherwise the slot enters `Loading`
    /// and the surface navigates; the outcome arrives later as a
    /// `content_ready` / `content_failed` event.
    ///
    /// Returns `true` when the externally visible state changed.
    pub fn display<S: RenderSurface>(
        &mut self,
        surface: &S,
        url: &str,
        rect: PixelRect,
        span: BTreeSet<CellRef>,
    ) -> bool {
        if self.phase != SlotPhase::Idle && self.url.as_deref() == Some(url) {
            debug!("slot {}: reuse {} at {}", self.index, url, rect);
            self.rect = Some(rect);
            self.span = span;
            if let Err(e) = surface.reposition(self.index, rect) {
                warn!("slot {}: reposition failed: {}", self.index, e);
            }
            return true;
        }

        debug!("slot {}: load {} at {}", self.index, url, rect);
        self.phase = SlotPhase::Loading;
        self.url = Some(url.to_string());
        self.rect = Some(rect);
        self.span = span;
        self.title = None;
        if let Err(e) = surface.display(self.index, url, rect) {
            warn!("slot {}: display failed: {}", self.index, e);
        }
        // A fresh navigation re-asserts the mute flag on the surface.
        if let Err(e) = surface.set_muted(self.index, self.muted) {
            warn!("slot {}: set_muted failed: {}", self.index, e);
        }
        true
    }

    /// Release this slot: detach the surface and forget URL, position, and
    /// metadata. No-op when already idle.
    pub fn clear<S: RenderSurface>(&mut self, surface: &S) -> bool {
        if self.phase == SlotPhase::Idle && self.url.is_none() {
            return false;
        }
        debug!("slot {}: clear", self.index);
        self.phase = SlotPhase::Idle;
        self.url = None;
        self.rect = None;
        self.span.clear();
        self.title = None;
        if let Err(e) = surface.clear(self.index) {
            warn!("slot {}: clear failed: {}", self.index, e);
        }
        true
    }

    /// Set the mute flag. Valid in any phase; never changes the lifecycle.
    /// No-op (and no surface call) when the flag already matches.
    pub fn set_muted<S: RenderSurface>(&mut self, surface: &S, muted: bool) -> bool {
        if self.muted == muted {
            return false;
        }
        self.muted = muted;
        if let Err(e) = surface.set_muted(self.index, muted) {
            warn!("slot {}: set_muted failed: {}", self.index, e);
        }
        true
    }

    //  Renderer events

    /// Apply a `ready` event for `url`.
    ///
    /// Stale events — a URL that no longer matches the current assignment,
    /// or any event while idle — are discarded.
    pub fn content_ready<S: RenderSurface>(&mut self, surface: &S, url: &str, title: &str) -> bool {
        if self.url.as_deref() != Some(url) || self.phase == SlotPhase::Idle {
            debug!("slot {}: stale ready for {}", self.index, url);
            return false;
        }
        self.title = Some(title.to_string());
        if self.phase == SlotPhase::Loading {
            debug!("slot {}: displaying {}", self.index, url);
            self.phase = SlotPhase::Displaying;
            if let Some(rect) = self.rect {
                if let Err(e) = surface.reposition(self.index, rect) {
                    warn!("slot {}: reposition failed: {}", self.index, e);
                }
            }
        }
        true
    }

    /// Apply a `failed` event for `url`.
    ///
    /// A matching failure while loading returns the slot to idle; it becomes
    /// eligible for reassignment on the next reconciliation pass. There is
    /// no automatic retry — re-requesting the same URL in a later layout
    /// retries naturally. Stale failures are discarded.
    pub fn content_failed<S: RenderSurface>(&mut self, surface: &S, url: &str) -> bool {
        if self.phase != SlotPhase::Loading || self.url.as_deref() != Some(url) {
            debug!("slot {}: stale failure for {}", self.index, url);
            return false;
        }
        warn!("slot {}: load failed for {}", self.index, url);
        self.clear(surface)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Display(usize, String),
        Reposition(usize, PixelRect),
        Clear(usize),
        SetMuted(usize, bool),
    }

    /// Record-keeping surface stub.
    #[derive(Debug, Default)]
    struct RecorderSurface {
        calls: RefCell<Vec<Call>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder error")]
    struct RecorderErr;

    impl RenderSurface for RecorderSurface {
        type Error = RecorderErr;

        fn display(&self, slot: usize, url: &str, _rect: PixelRect) -> Result<(), RecorderErr> {
            self.calls.borrow_mut().push(Call::Display(slot, url.into()));
            Ok(())
        }

        fn reposition(&self, slot: usize, rect: PixelRect) -> Result<(), RecorderErr> {
            self.calls.borrow_mut().push(Call::Reposition(slot, rect));
            Ok(())
        }

        fn clear(&self, slot: usize) -> Result<(), RecorderErr> {
            self.calls.borrow_mut().push(Call::Clear(slot));
            Ok(())
        }

        fn set_muted(&self, slot: usize, muted: bool) -> Result<(), RecorderErr> {
            self.calls.borrow_mut().push(Call::SetMuted(slot, muted));
            Ok(())
        }
    }

    impl RecorderSurface {
        fn displays(&self) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| matches!(c, Call::Display(..)))
                .count()
        }
    }

    fn rect(x: i32) -> PixelRect {
        PixelRect {
            x,
            y: 0,
            width: 100,
            height: 50,
        }
    }

    fn span(cells: &[(u32, u32)]) -> BTreeSet<CellRef> {
        cells.iter().map(|&(c, r)| CellRef::new(c, r)).collect()
    }

    #[test]
    fn new_slot_is_idle_and_muted() {
        let slot = Slot::new(2);
        assert_eq!(slot.phase(), SlotPhase::Idle);
        assert_eq!(slot.url(), None);
        assert!(slot.muted());
        assert!(slot.span().is_empty());
    }

    #[test]
    fn display_enters_loading_and_navigates() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        assert!(slot.display(&surface, "https://a", rect(0), span(&[(0, 0)])));
        assert_eq!(slot.phase(), SlotPhase::Loading);
        assert_eq!(slot.url(), Some("https://a"));
        assert!(surface
            .calls
            .borrow()
            .contains(&Call::Display(0, "https://a".into())));
    }

    #[test]
    fn ready_promotes_loading_to_displaying() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        assert!(slot.content_ready(&surface, "https://a", "Title A"));
        assert_eq!(slot.phase(), SlotPhase::Displaying);
        assert_eq!(slot.snapshot().title.as_deref(), Some("Title A"));
    }

    #[test]
    fn failure_returns_slot_to_idle() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(1);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        assert!(slot.content_failed(&surface, "https://a"));
        assert_eq!(slot.phase(), SlotPhase::Idle);
        assert_eq!(slot.url(), None);
        assert!(surface.calls.borrow().contains(&Call::Clear(1)));
    }

    #[test]
    fn same_url_display_repositions_without_reload() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        slot.content_ready(&surface, "https://a", "A");
        assert_eq!(surface.displays(), 1);

        assert!(slot.display(&surface, "https://a", rect(100), span(&[(1, 0), (2, 0)])));
        assert_eq!(slot.phase(), SlotPhase::Displaying, "no reload");
        assert_eq!(surface.displays(), 1, "surface must not re-navigate");
        assert!(surface
            .calls
            .borrow()
            .contains(&Call::Reposition(0, rect(100))));
        assert_eq!(slot.span(), &span(&[(1, 0), (2, 0)]));
    }

    #[test]
    fn same_url_display_while_loading_keeps_loading() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        slot.display(&surface, "https://a", rect(100), span(&[(0, 1)]));
        assert_eq!(slot.phase(), SlotPhase::Loading);
        assert_eq!(surface.displays(), 1, "second display must not re-navigate");
    }

    #[test]
    fn different_url_display_renavigates() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        slot.content_ready(&surface, "https://a", "A");
        slot.display(&surface, "https://b", rect(0), span(&[(0, 0)]));
        assert_eq!(slot.phase(), SlotPhase::Loading);
        assert_eq!(slot.url(), Some("https://b"));
        assert_eq!(surface.displays(), 2);
        assert_eq!(slot.snapshot().title, None, "metadata belongs to the old url");
    }

    #[test]
    fn stale_ready_is_discarded() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        slot.display(&surface, "https://b", rect(0), span(&[(0, 0)]));
        // Late ready for the superseded url must not promote the slot.
        assert!(!slot.content_ready(&surface, "https://a", "A"));
        assert_eq!(slot.phase(), SlotPhase::Loading);
        assert_eq!(slot.url(), Some("https://b"));
        // The ready for the current url still lands.
        assert!(slot.content_ready(&surface, "https://b", "B"));
        assert_eq!(slot.phase(), SlotPhase::Displaying);
    }

    #[test]
    fn stale_failure_is_discarded() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        slot.display(&surface, "https://b", rect(0), span(&[(0, 0)]));
        assert!(!slot.content_failed(&surface, "https://a"));
        assert_eq!(slot.phase(), SlotPhase::Loading);
        assert_eq!(slot.url(), Some("https://b"));
    }

    #[test]
    fn failure_while_displaying_is_discarded() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        slot.content_ready(&surface, "https://a", "A");
        assert!(!slot.content_failed(&surface, "https://a"));
        assert_eq!(slot.phase(), SlotPhase::Displaying);
    }

    #[test]
    fn clear_resets_everything() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(3);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0), (1, 0)]));
        slot.content_ready(&surface, "https://a", "A");
        assert!(slot.clear(&surface));
        assert_eq!(slot.phase(), SlotPhase::Idle);
        assert_eq!(slot.url(), None);
        assert!(slot.span().is_empty());
        let snap = slot.snapshot();
        assert_eq!(snap.rect, None);
        assert_eq!(snap.title, None);
    }

    #[test]
    fn clear_on_idle_slot_is_noop() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        assert!(!slot.clear(&surface));
        assert!(surface.calls.borrow().is_empty());
    }

    #[test]
    fn mute_toggle_does_not_change_phase() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        assert!(slot.set_muted(&surface, false));
        assert!(!slot.muted());
        assert_eq!(slot.phase(), SlotPhase::Loading);
        assert!(surface.calls.borrow().contains(&Call::SetMuted(0, false)));
    }

    #[test]
    fn redundant_mute_skips_surface_call() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        assert!(!slot.set_muted(&surface, true), "already muted");
        assert!(surface.calls.borrow().is_empty());
    }

    #[test]
    fn fresh_navigation_reasserts_mute_flag() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(0);
        slot.display(&surface, "https://a", rect(0), span(&[(0, 0)]));
        assert!(surface.calls.borrow().contains(&Call::SetMuted(0, true)));
    }

    #[test]
    fn snapshot_reflects_state() {
        let surface = RecorderSurface::default();
        let mut slot = Slot::new(5);
        slot.display(&surface, "https://a", rect(200), span(&[(2, 0)]));
        slot.content_ready(&surface, "https://a", "Title");
        let snap = slot.snapshot();
        assert_eq!(snap.slot, 5);
        assert_eq!(snap.phase, SlotPhase::Displaying);
        assert_eq!(snap.url.as_deref(), Some("https://a"));
        assert_eq!(snap.rect, Some(rect(200)));
        assert_eq!(snap.title.as_deref(), Some("Title"));
    }
}
