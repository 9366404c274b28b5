use super::Packer;
use crate::model::{FreeRegion, PageGeometry, Placement, PhotoItem, Rect};
use tracing::trace;

/// Best-area-fit guillotine packer for mixed photo sizes on one page.
///
/// Free regions live in an owned list local to this packer and are addressed
/// by index. After each placement the consumed region is split into a right
/// remainder (full region height) and a bottom remainder (placed width only),
/// so the two children never overlap.
pub struct GuillotinePacker {
    geometry: PageGeometry,
    free: Vec<FreeRegion>,
    used: Vec<Rect>,
}

impl GuillotinePacker {
    pub fn new(geometry: PageGeometry) -> Self {
        let usable = geometry.usable_rect();
        let free = if usable.is_empty() {
            Vec::new()
        } else {
            vec![usable]
        };
        Self {
            geometry,
            free,
            used: Vec::new(),
        }
    }

    /// Current free regions, largest first.
    pub fn free_regions(&self) -> &[FreeRegion] {
        &self.free
    }

    /// Reserved slots (placement plus trailing gap) in placement order.
    pub fn used_slots(&self) -> &[Rect] {
        &self.used
    }

    /// Reserved footprint of an item in one orientation.
    fn reserve(&self, item: &PhotoItem, rotated: bool) -> (u32, u32) {
        let (w, h) = item.size_px(rotated);
        (
            w.saturating_add(self.geometry.gap),
            h.saturating_add(self.geometry.gap),
        )
    }

    fn waste(fr: &Rect, w: u32, h: u32) -> Option<u64> {
        if fr.w >= w && fr.h >= h {
            Some(fr.area() - w as u64 * h as u64)
        } else {
            None
        }
    }

    /// Picks the (region index, rotated) pair with the least leftover area.
    /// Within a region the unrotated orientation wins ties; across regions the
    /// first region in list order wins ties.
    fn choose(&self, item: &PhotoItem) -> Option<(usize, bool)> {
        let (w, h) = self.reserve(item, false);
        let (rw, rh) = self.reserve(item, true);
        let mut best: Option<(usize, u64, bool)> = None;
        for (i, fr) in self.free.iter().enumerate() {
            let upright = Self::waste(fr, w, h).map(|waste| (waste, false));
            let turned = Self::waste(fr, rw, rh).map(|waste| (waste, true));
            let here = match (upright, turned) {
                (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
                (a, b) => a.or(b),
            };
            if let Some((waste, rotated)) = here {
                if best.is_none_or(|(_, best_waste, _)| waste < best_waste) {
                    best = Some((i, waste, rotated));
                }
            }
        }
        best.map(|(idx, _, rotated)| (idx, rotated))
    }

    fn split(fr: &Rect, slot: &Rect) -> (Option<Rect>, Option<Rect>) {
        let right = Rect::new(slot.x2(), fr.y, fr.w.saturating_sub(slot.w), fr.h);
        let bottom = Rect::new(fr.x, slot.y2(), slot.w, fr.h.saturating_sub(slot.h));
        let r1 = if right.is_empty() { None } else { Some(right) };
        let r2 = if bottom.is_empty() { None } else { Some(bottom) };
        (r1, r2)
    }

    fn place(&mut self, idx: usize, slot: &Rect) {
        let fr = self.free.swap_remove(idx);
        let (a, b) = Self::split(&fr, slot);
        if let Some(r) = a {
            self.free.push(r);
        }
        if let Some(r) = b {
            self.free.push(r);
        }
        self.free.sort_by(|a, b| b.area().cmp(&a.area()));
        self.used.push(*slot);
    }
}

impl Packer for GuillotinePacker {
    fn can_pack(&self, item: &PhotoItem) -> bool {
        self.choose(item).is_some()
    }

    fn pack(&mut self, item: &mut PhotoItem) -> Option<Placement> {
        let (idx, rotated) = self.choose(item)?;
        let fr = self.free[idx];
        let (sw, sh) = self.reserve(item, rotated);
        let slot = Rect::new(fr.x, fr.y, sw, sh);
        self.place(idx, &slot);

        let (w, h) = item.size_px(rotated);
        item.x = fr.x;
        item.y = fr.y;
        item.rotated = rotated;
        item.placed = true;
        trace!(id = %item.id, x = fr.x, y = fr.y, w, h, rotated, "placed");
        Some(Placement {
            id: item.id.clone(),
            kind: item.kind,
            x: fr.x,
            y: fr.y,
            width: w,
            height: h,
            rotated,
        })
    }

    /// Largest physical area first; equal areas keep input order.
    fn pass_order(&self, items: &[PhotoItem]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| {
            items[b]
                .physical_area()
                .total_cmp(&items[a].physical_area())
        });
        order
    }
}
