use super::Packer;
use crate::model::{Placement, PhotoItem};
use crate::planner::GridPlan;
use tracing::trace;

/// Fills the cells of a [`GridPlan`] row by row in input order.
pub struct GridPacker {
    plan: GridPlan,
    next: usize,
}

impl GridPacker {
    pub fn new(plan: GridPlan) -> Self {
        Self { plan, next: 0 }
    }

    pub fn plan(&self) -> &GridPlan {
        &self.plan
    }

    /// Cells still free on this page.
    pub fn remaining(&self) -> usize {
        self.plan.capacity().saturating_sub(self.next)
    }

    fn fits_cell(&self, item: &PhotoItem) -> bool {
        self.plan.fallback
            || item.size_px(self.plan.rotated) == (self.plan.cell_w, self.plan.cell_h)
    }
}

impl Packer for GridPacker {
    fn can_pack(&self, item: &PhotoItem) -> bool {
        self.remaining() > 0 && self.fits_cell(item)
    }

    fn pack(&mut self, item: &mut PhotoItem) -> Option<Placement> {
        if !self.fits_cell(item) {
            return None;
        }
        let cell = self.plan.cell(self.next)?;
        self.next += 1;

        item.x = cell.x;
        item.y = cell.y;
        item.rotated = self.plan.rotated;
        item.placed = true;
        trace!(id = %item.id, x = cell.x, y = cell.y, rotated = self.plan.rotated, "grid cell");
        Some(Placement {
            id: item.id.clone(),
            kind: item.kind,
            x: cell.x,
            y: cell.y,
            width: cell.w,
            height: cell.h,
            rotated: self.plan.rotated,
        })
    }
}
