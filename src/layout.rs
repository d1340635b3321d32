//! Wall geometry: turning a sparse cell layout into display regions.
//!
//! [`WallGeometry`] fixes the grid dimension and the pixel size of one
//! cell. [`WallGeometry::partition`] reduces a [`LayoutSpec`] into the
//! minimal set of axis-aligned [`Region`]s: every non-empty cell lands in
//! exactly one region, regions never overlap, and no two adjacent regions
//! with the same URL could be merged into a single rectangle.  Fewer
//! regions means fewer slots consumed, and the pool is finite.
//!
//! Partitioning is a pure function of the layout; it holds no state and
//! performs no I/O.

use crate::command::{CellRef, LayoutSpec, PixelRect};
use std::collections::{BTreeSet, HashSet};

/// Fixed wall geometry: an `n × n` cell grid, each cell a fixed number of
/// pixels wide and high.
///
/// Supplied once at construction from configuration; never changes at
/// runtime.
#[derive(Debug, Clone, Copy)]
pub struct WallGeometry {
    /// Grid dimension `n` (the wall is `n × n` cells).
    pub grid_size: u32,
    /// Width of one cell in pixels.
    pub cell_width: u32,
    /// Height of one cell in pixels.
    pub cell_height: u32,
}

/// A maximal rectangle of contiguous cells sharing one assigned URL.
///
/// Produced by [`WallGeometry::partition`]. The `span` set doubles as the
/// unit for audio routing: a region is unmuted when the listening focus
/// lands on any cell it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Content URL shared by every spanned cell.
    pub url: String,
    /// Top-left cell of the rectangle.
    pub origin: CellRef,
    /// Width in cells.
    pub cols: u32,
    /// Height in cells.
    pub rows: u32,
    /// Pixel rectangle covering the spanned cells.
    pub rect: PixelRect,
    /// Every cell the rectangle covers.
    pub span: BTreeSet<CellRef>,
}

impl WallGeometry {
    /// Create a geometry for an `n × n` grid of `cell_width × cell_height`
    /// pixel cells.
    pub fn new(grid_size: u32, cell_width: u32, cell_height: u32) -> Self {
        Self {
            grid_size,
            cell_width,
            cell_height,
        }
    }

    /// Whether `cell` lies inside the grid.
    pub fn contains(&self, cell: CellRef) -> bool {
        cell.col < self.grid_size && cell.row < self.grid_size
    }

    /// Pixel rectangle of a `cols × rows` block of cells anchored at
    /// `origin`.
    pub fn cell_rect(&self, origin: CellRef, cols: u32, rows: u32) -> PixelRect {
        PixelRect {
            x: (origin.col * self.cell_width) as i32,
            y: (origin.row * self.cell_height) as i32,
            width: cols * self.cell_width,
            height: rows * self.cell_height,
        }
    }

    /// Partition `layout` into regions.
    ///
    /// Cells are scanned row-major. For each unclaimed non-empty cell the
    /// rectangle is grown right while the URL matches, then grown down
    /// while the entire row segment matches; all covered cells are claimed.
    /// The scan order makes the result deterministic for a given layout.
    ///
    /// Cells outside the grid are ignored here; callers reject them at the
    /// API boundary before partitioning.
    pub fn partition(&self, layout: &LayoutSpec) -> Vec<Region> {
        let n = self.grid_size;
        let mut claimed: HashSet<CellRef> = HashSet::new();
        let mut regions = Vec::new();

        for row in 0..n {
            for col in 0..n {
                let origin = CellRef::new(col, row);
                if claimed.contains(&origin) {
                    continue;
                }
                let url = match layout.url_at(origin) {
                    Some(u) => u,
                    None => continue,
                };

                // Grow right along the top row.
                let mut cols = 1;
                while col + cols < n {
                    let next = CellRef::new(col + cols, row);
                    if claimed.contains(&next) || layout.url_at(next) != Some(url) {
                        break;
                    }
                    cols += 1;
                }

                // Grow down one full row segment at a time.
                let mut rows = 1;
                'down: while row + rows < n {
                    for c in col..col + cols {
                        let next = CellRef::new(c, row + rows);
                        if claimed.contains(&next) || layout.url_at(next) != Some(url) {
                            break 'down;
                        }
                    }
                    rows += 1;
                }

                let mut span = BTreeSet::new();
                for r in row..row + rows {
                    for c in col..col + cols {
                        let cell = CellRef::new(c, r);
                        claimed.insert(cell);
                        span.insert(cell);
                    }
                }

                regions.push(Region {
                    url: url.to_string(),
                    origin,
                    cols,
                    rows,
                    rect: self.cell_rect(origin, cols, rows),
                    span,
                });
            }
        }
        regions
    }
}

//  Tests
