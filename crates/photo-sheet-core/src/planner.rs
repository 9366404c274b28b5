//! Regular grid planning for pages holding a single photo size.

use serde::{Deserialize, Serialize};

use crate::model::{PageGeometry, Rect};

/// Chosen grid for one item size on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlan {
    /// True if cells hold the item rotated 90°.
    pub rotated: bool,
    pub cols: u32,
    pub rows: u32,
    /// Cell width (post-rotation, clamped on fallback).
    pub cell_w: u32,
    /// Cell height (post-rotation, clamped on fallback).
    pub cell_h: u32,
    /// Horizontal spacing between neighbouring cells.
    pub x_spacing: u32,
    /// Vertical spacing between neighbouring cells.
    pub y_spacing: u32,
    pub margin: u32,
    /// True if neither orientation fit and a single clamped cell was used.
    pub fallback: bool,
}

impl GridPlan {
    pub fn capacity(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Rectangle of cell `index` in row-major order.
    pub fn cell(&self, index: usize) -> Option<Rect> {
        if index >= self.capacity() {
            return None;
        }
        let col = (index % self.cols as usize) as u32;
        let row = (index / self.cols as usize) as u32;
        Some(Rect::new(
            self.margin + col * (self.cell_w + self.x_spacing),
            self.margin + row * (self.cell_h + self.y_spacing),
            self.cell_w,
            self.cell_h,
        ))
    }
}

/// How many cells of `item` fit along `usable`, honouring `gap` between cells.
fn fit_count(usable: u32, item: u32, gap: u32) -> u32 {
    if item == 0 || item > usable {
        return 0;
    }
    let n = (usable as u64 + gap as u64) / (item as u64 + gap as u64);
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Leftover space spread evenly between `count` cells.
fn spread(usable: u32, item: u32, count: u32) -> u32 {
    if count > 1 {
        usable.saturating_sub(count.saturating_mul(item)) / (count - 1)
    } else {
        0
    }
}

/// Columns and rows of `item_w x item_h` cells fitting the usable area of `page`.
pub fn grid_dims(item_w: u32, item_h: u32, page: &PageGeometry) -> (u32, u32) {
    (
        fit_count(page.usable_width(), item_w, page.gap),
        fit_count(page.usable_height(), item_h, page.gap),
    )
}

/// Plans the maximum-count grid for `item_w x item_h` on `page`.
///
/// Both orientations are evaluated; the rotated grid wins only with a strictly
/// greater count. When neither fits, a single cell clamped to the usable area
/// is returned with `fallback` set, so the capacity is always at least 1.
pub fn plan_grid(item_w: u32, item_h: u32, page: &PageGeometry) -> GridPlan {
    let uw = page.usable_width();
    let uh = page.usable_height();

    let (cols_n, rows_n) = grid_dims(item_w, item_h, page);
    let count_n = cols_n.saturating_mul(rows_n);
    let (cols_r, rows_r) = grid_dims(item_h, item_w, page);
    let count_r = cols_r.saturating_mul(rows_r);

    let (rotated, cols, rows, cw, ch) = if count_r > count_n {
        (true, cols_r, rows_r, item_h, item_w)
    } else {
        (false, cols_n, rows_n, item_w, item_h)
    };

    if cols == 0 || rows == 0 {
        return GridPlan {
            rotated: false,
            cols: 1,
            rows: 1,
            cell_w: item_w.min(uw),
            cell_h: item_h.min(uh),
            x_spacing: 0,
            y_spacing: 0,
            margin: page.margin,
            fallback: true,
        };
    }

    GridPlan {
        rotated,
        cols,
        rows,
        cell_w: cw,
        cell_h: ch,
        x_spacing: spread(uw, cw, cols),
        y_spacing: spread(uh, ch, rows),
        margin: page.margin,
        fallback: false,
    }
}
