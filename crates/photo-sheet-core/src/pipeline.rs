use std::collections::{HashMap, HashSet};

use crate::config::{LayoutConfig, Strategy};
use crate::error::{Result, SheetError};
use crate::model::{
    KindCounts, LayoutResult, LayoutWarning, Page, PageGeometry, PhotoItem, PhotoKind,
};
use crate::packer::{Packer, grid::GridPacker, guillotine::GuillotinePacker};
use crate::planner::plan_grid;
use tracing::{debug, instrument, warn};

/// Pagination controls independent of the page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginateOptions {
    pub strategy: Strategy,
    /// Safety cap on emitted pages.
    pub max_pages: usize,
    /// Grid strategy: place photos larger than the usable area one per page,
    /// clamped, instead of reporting them unplaced.
    pub oversized_fallback: bool,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        let cfg = LayoutConfig::default();
        Self {
            strategy: cfg.strategy,
            max_pages: cfg.max_pages,
            oversized_fallback: cfg.oversized_fallback,
        }
    }
}

impl From<&LayoutConfig> for PaginateOptions {
    fn from(cfg: &LayoutConfig) -> Self {
        Self {
            strategy: cfg.strategy,
            max_pages: cfg.max_pages,
            oversized_fallback: cfg.oversized_fallback,
        }
    }
}

#[instrument(skip_all)]
/// Lays out `items` on pages described by `cfg`.
///
/// Validates the configuration first; see [`paginate`] for the placement rules.
pub fn layout_items(items: Vec<PhotoItem>, cfg: &LayoutConfig) -> Result<LayoutResult> {
    cfg.validate()?;
    paginate(items, cfg.page.geometry(), PaginateOptions::from(cfg))
}

#[instrument(skip_all, fields(items = items.len(), strategy = ?opts.strategy))]
/// Places `items` page by page until every item is placed, a fresh page
/// places nothing, or `opts.max_pages` pages exist.
///
/// Notes:
/// - Placement failures never abort: leftovers are listed in `unplaced_ids`
///   (input order) and hitting the page cap adds a
///   [`LayoutWarning::PaginationExhausted`].
/// - `HomogeneousGrid` gives each (kind, pixel size) group its own pages, in
///   order of first appearance. `MixedPack` packs all items together.
/// - Results are deterministic for identical input order.
pub fn paginate(
    items: Vec<PhotoItem>,
    geometry: PageGeometry,
    opts: PaginateOptions,
) -> Result<LayoutResult> {
    geometry.validate()?;
    if opts.max_pages == 0 {
        return Err(SheetError::InvalidConfig(
            "max_pages must be at least 1".into(),
        ));
    }
    if items.is_empty() {
        return Err(SheetError::Empty);
    }
    validate_items(&items)?;

    let input_order: HashMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(i, it)| (it.id.clone(), i))
        .collect();

    let mut run = PageRun::new(geometry, opts.max_pages);
    let mut leftovers: Vec<PhotoItem> = Vec::new();

    match opts.strategy {
        Strategy::MixedPack => {
            let mut remaining = items;
            run.fill(&mut remaining, || {
                Box::new(GuillotinePacker::new(geometry)) as Box<dyn Packer>
            });
            leftovers.extend(remaining);
        }
        Strategy::HomogeneousGrid => {
            for mut group in group_by_size(items) {
                let (w, h) = (group[0].width_px, group[0].height_px);
                let plan = plan_grid(w, h, &geometry);
                if plan.fallback && !opts.oversized_fallback {
                    debug!(kind = %group[0].kind, w, h, count = group.len(), "photos exceed usable area");
                    leftovers.extend(group);
                    continue;
                }
                debug!(
                    kind = %group[0].kind,
                    cols = plan.cols,
                    rows = plan.rows,
                    rotated = plan.rotated,
                    capacity = plan.capacity(),
                    "grid plan"
                );
                run.fill(&mut group, || Box::new(GridPacker::new(plan)) as Box<dyn Packer>);
                leftovers.extend(group);
            }
        }
    }

    leftovers.sort_by_key(|it| input_order.get(&it.id).copied().unwrap_or(usize::MAX));

    let mut placed_count = KindCounts::default();
    for page in &run.pages {
        for p in &page.placements {
            placed_count.add(p.kind, 1);
        }
    }
    let mut unplaced_count = KindCounts::default();
    for it in &leftovers {
        unplaced_count.add(it.kind, 1);
    }

    let mut warnings = Vec::new();
    if run.exhausted {
        warn!(
            max_pages = opts.max_pages,
            remaining = leftovers.len(),
            "page limit reached; remaining photos reported unplaced"
        );
        warnings.push(LayoutWarning::PaginationExhausted {
            max_pages: opts.max_pages,
            remaining: leftovers.len(),
        });
    }

    Ok(LayoutResult {
        pages: run.pages,
        placed_count,
        unplaced_count,
        unplaced_ids: leftovers.into_iter().map(|it| it.id).collect(),
        warnings,
    })
}

fn validate_items(items: &[PhotoItem]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    for it in items {
        if !(it.width_cm.is_finite() && it.height_cm.is_finite()) {
            return Err(SheetError::InvalidItem {
                id: it.id.clone(),
                reason: format!(
                    "size must be finite (got {}x{} cm)",
                    it.width_cm, it.height_cm
                ),
            });
        }
        if it.width_px == 0 || it.height_px == 0 {
            return Err(SheetError::InvalidItem {
                id: it.id.clone(),
                reason: format!(
                    "size must be positive (got {}x{} px)",
                    it.width_px, it.height_px
                ),
            });
        }
        if it.placed {
            return Err(SheetError::InvalidItem {
                id: it.id.clone(),
                reason: "already placed".into(),
            });
        }
        if !seen.insert(it.id.as_str()) {
            return Err(SheetError::InvalidItem {
                id: it.id.clone(),
                reason: "duplicate id".into(),
            });
        }
    }
    Ok(())
}

/// Splits items into (kind, pixel size) groups, keeping first-appearance order
/// between groups and input order within each group.
fn group_by_size(items: Vec<PhotoItem>) -> Vec<Vec<PhotoItem>> {
    let mut index: HashMap<(PhotoKind, u32, u32), usize> = HashMap::new();
    let mut groups: Vec<Vec<PhotoItem>> = Vec::new();
    for it in items {
        let key = (it.kind, it.width_px, it.height_px);
        match index.get(&key) {
            Some(&g) => groups[g].push(it),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![it]);
            }
        }
    }
    groups
}

/// Pages emitted so far, shared across groups so the cap is global.
struct PageRun {
    geometry: PageGeometry,
    max_pages: usize,
    pages: Vec<Page>,
    exhausted: bool,
}

impl PageRun {
    fn new(geometry: PageGeometry, max_pages: usize) -> Self {
        Self {
            geometry,
            max_pages,
            pages: Vec::new(),
            exhausted: false,
        }
    }

    /// Emits pages for `remaining` until it is empty, a fresh page makes no
    /// progress, or the cap is hit. Placed items are removed from `remaining`.
    fn fill<F>(&mut self, remaining: &mut Vec<PhotoItem>, mut new_packer: F)
    where
        F: FnMut() -> Box<dyn Packer>,
    {
        while !remaining.is_empty() {
            if self.pages.len() >= self.max_pages {
                self.exhausted = true;
                break;
            }
            let mut packer = new_packer();
            let placements = packer.pack_pass(remaining);
            if placements.is_empty() {
                warn!(
                    remaining = remaining.len(),
                    "no photo fits an empty page; reporting remainder unplaced"
                );
                break;
            }
            remaining.retain(|it| !it.placed);
            let id = self.pages.len();
            debug!(
                page = id,
                placed = placements.len(),
                remaining = remaining.len(),
                "page emitted"
            );
            self.pages.push(Page {
                id,
                geometry: self.geometry,
                placements,
            });
        }
    }
}
