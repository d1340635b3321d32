//! The orchestrator that ties geometry, scheduling, and the slot pool
//! together.
//!
//! [`Wall`] owns the fixed-capacity pool of [`Slot`]s and the listening
//! focus, and reacts to [`Input`]s by partitioning the desired layout,
//! reconciling it onto the pool, and applying renderer lifecycle events.
//! After every slot transition it republishes an [`AggregateState`]
//! snapshot to the attached status channel (consumed by the overlay or any
//! other observer).

use crate::command::{CellRef, Command, Input, LayoutSpec, SurfaceEvent};
use crate::layout::WallGeometry;
use crate::scheduler;
use crate::slot::{Slot, SlotSnapshot};
use crate::traits::RenderSurface;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

/// Possible errors from the wall.
#[derive(Debug, thiserror::Error)]
pub enum WallError {
    /// The layout partitions into more regions than the pool has slots.
    /// The layout is rejected wholesale; no slot is touched.
    #[error("layout needs {regions} regions but the pool has {capacity} slots")]
    CapacityExceeded { regions: usize, capacity: usize },

    /// A layout cell lies outside the grid. The previous layout is kept.
    #[error("cell {cell} is outside the {size}x{size} grid")]
    CellOutOfBounds { cell: CellRef, size: u32 },

    /// The requested focus cell lies outside the grid. The previous focus
    /// is kept.
    #[error("focus cell {cell} is outside the {size}x{size} grid")]
    InvalidFocusCell { cell: CellRef, size: u32 },
}

/// Read-only projection of the whole pool, republished after every slot
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateState {
    pub slots: Vec<SlotSnapshot>,
}

/// Orchestrates layout reconciliation and focus routing over a fixed pool.
///
/// The wall is generic over any [`RenderSurface`] implementation, making it
/// completely independent of the concrete renderer process.
///
/// # Typical usage
///
/// ```ignore
/// let surface = SocketSurface::new(socket_path);
/// let mut wall = Wall::new(surface, WallGeometry::new(10, 192, 108), 16);
/// wall.handle(Input::Command(Command::SetLayout(spec)))?;
/// ```
pub struct Wall<S: RenderSurface> {
    surface: S,
    geometry: WallGeometry,
    slots: Vec<Slot>,
    focus: Option<CellRef>,
    status_tx: Option<mpsc::Sender<AggregateState>>,
}

impl<S: RenderSurface> Wall<S> {
    /// Create a wall with `capacity` slots, all idle.
    pub fn new(surface: S, geometry: WallGeometry, capacity: usize) -> Self {
        Self {
            surface,
            geometry,
            slots: (0..capacity).map(Slot::new).collect(),
            focus: None,
            status_tx: None,
        }
    }

    /// Attach a status channel.
    ///
    /// The wall sends the full [`AggregateState`] after every slot
    /// transition. The receiver end can be owned by any independent
    /// listener — the status publisher, a debug logger, etc.
    pub fn set_status_sink(&mut self, tx: mpsc::Sender<AggregateState>) {
        self.status_tx = Some(tx);
    }

    /// Number of slots in the pool.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current listening focus, if one has been set.
    pub fn focus(&self) -> Option<CellRef> {
        self.focus
    }

    /// Shared view of the pool (for status queries and tests).
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Build the current aggregate projection.
    pub fn aggregate(&self) -> AggregateState {
        AggregateState {
            slots: self.slots.iter().map(Slot::snapshot).collect(),
        }
    }

    /// Process a single [`Input`].
    pub fn handle(&mut self, input: Input) -> Result<(), WallError> {
        match input {
            Input::Command(Command::SetLayout(spec)) => {
                info!("set layout: {} cell(s)", spec.len());
                self.set_layout(spec)
            }
            Input::Command(Command::SetFocus(cell)) => {
                info!("set focus: {}", cell);
                self.set_focus(cell)
            }
            Input::Command(Command::ClearWall) => {
                info!("clear wall");
                self.set_layout(LayoutSpec::default())
            }
            Input::Surface(event) => {
                self.on_surface_event(event);
                Ok(())
            }
        }
    }

    /// Replace the desired layout wholesale and reconcile the pool.
    ///
    /// Validation happens before any slot is touched: a rejected layout
    /// leaves every assignment exactly as it was.
    pub fn set_layout(&mut self, spec: LayoutSpec) -> Result<(), WallError> {
        if let Some(cell) = spec.cells().find(|&c| !self.geometry.contains(c)) {
            return Err(WallError::CellOutOfBounds {
                cell,
                size: self.geometry.grid_size,
            });
        }

        let regions = self.geometry.partition(&spec);
        if regions.len() > self.slots.len() {
            return Err(WallError::CapacityExceeded {
                regions: regions.len(),
                capacity: self.slots.len(),
            });
        }
        debug!("reconciling {} region(s)", regions.len());

        let plan = scheduler::plan(&self.slots, regions);
        for (index, region) in plan.assignments {
            if self.slots[index].display(&self.surface, &region.url, region.rect, region.span) {
                self.publish();
            }
        }
        for index in plan.clears {
            if self.slots[index].clear(&self.surface) {
                self.publish();
            }
        }

        // Spans moved, so the mute routing is stale until re-applied.
        self.apply_focus();
        Ok(())
    }

    /// Move the listening focus and re-route mute flags.
    pub fn set_focus(&mut self, cell: CellRef) -> Result<(), WallError> {
        if !self.geometry.contains(cell) {
            return Err(WallError::InvalidFocusCell {
                cell,
                size: self.geometry.grid_size,
            });
        }
        self.focus = Some(cell);
        self.apply_focus();
        Ok(())
    }

    /// Apply a renderer lifecycle event to the addressed slot.
    ///
    /// Events for unknown slot indices are dropped with a warning; stale
    /// events are discarded by the slot itself.
    fn on_surface_event(&mut self, event: SurfaceEvent) {
        let (index, changed) = match event {
            SurfaceEvent::Ready { slot, url, title } => {
                if slot >= self.slots.len() {
                    warn!("ready event for unknown slot {}", slot);
                    return;
                }
                (slot, self.slots[slot].content_ready(&self.surface, &url, &title))
            }
            SurfaceEvent::Failed { slot, url } => {
                if slot >= self.slots.len() {
                    warn!("failed event for unknown slot {}", slot);
                    return;
                }
                (slot, self.slots[slot].content_failed(&self.surface, &url))
            }
        };
        debug!("slot {} event applied: {}", index, changed);
        if changed {
            self.publish();
        }
    }

    //  Internal

    /// Route mute flags for the current focus across all span-holding
    /// slots. No-op until a focus has been set.
    fn apply_focus(&mut self) {
        let focus = match self.focus {
            Some(f) => f,
            None => return,
        };
        for (index, muted) in scheduler::route_focus(&self.slots, focus) {
            if self.slots[index].set_muted(&self.surface, muted) {
                self.publish();
            }
        }
    }

    /// Send the aggregate projection to the status channel, if attached.
    fn publish(&self) {
        if let Some(tx) = &self.status_tx {
            let _ = tx.send(self.aggregate());
        }
    }
}

//  Tests
