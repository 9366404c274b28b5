use crate::model::{Placement, PhotoItem};

pub mod grid;
pub mod guillotine;

/// A packer places photo items onto a single page.
///
/// Implementations must ensure no overlaps and keep every placement inside the
/// page margins. `pack` returns `None` if the item cannot be placed on the
/// current page; on success it writes the item's position, rotation and placed
/// flag.
pub trait Packer {
    fn can_pack(&self, item: &PhotoItem) -> bool;
    fn pack(&mut self, item: &mut PhotoItem) -> Option<Placement>;

    /// Order in which a pass visits `items` (indices into the slice).
    fn pass_order(&self, items: &[PhotoItem]) -> Vec<usize> {
        (0..items.len()).collect()
    }

    /// Offers every unplaced item exactly once, in `pass_order`.
    /// Returns the placements made, in placement order.
    fn pack_pass(&mut self, items: &mut [PhotoItem]) -> Vec<Placement> {
        let order = self.pass_order(items);
        let mut placements = Vec::new();
        for idx in order {
            let item = &mut items[idx];
            if item.placed {
                continue;
            }
            if let Some(p) = self.pack(item) {
                placements.push(p);
            }
        }
        placements
    }
}
