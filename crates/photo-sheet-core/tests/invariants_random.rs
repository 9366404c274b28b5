use photo_sheet_core::config::Strategy;
use photo_sheet_core::model::{LayoutResult, PageGeometry, PhotoItem, PhotoKind, Rect};
use photo_sheet_core::pipeline::{PaginateOptions, paginate};
use rand::{Rng, SeedableRng};

fn random_items(seed: u64, n: usize, min: u32, max: u32) -> Vec<PhotoItem> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let kind = if rng.gen_bool(0.5) { PhotoKind::A } else { PhotoKind::B };
            let w = rng.gen_range(min..=max);
            let h = rng.gen_range(min..=max);
            PhotoItem::with_pixels(format!("r{}", i), kind, w, h)
        })
        .collect()
}

/// Placement box grown by the trailing gap on the right and bottom.
fn with_gap(r: Rect, gap: u32) -> Rect {
    Rect::new(r.x, r.y, r.w + gap, r.h + gap)
}

fn check_invariants(out: &LayoutResult, page: &PageGeometry, n: usize) {
    assert_eq!(
        out.placed_count.total() + out.unplaced_count.total(),
        n,
        "every item is either placed or unplaced"
    );
    assert_eq!(out.unplaced_ids.len(), out.unplaced_count.total());

    let usable = page.usable_rect();
    let mut seen = std::collections::HashSet::new();
    for pg in &out.pages {
        assert!(!pg.placements.is_empty(), "no empty pages");
        for (i, a) in pg.placements.iter().enumerate() {
            assert!(usable.contains(&a.rect()), "{:?} outside margins", a);
            assert!(seen.insert(a.id.clone()), "{} placed twice", a.id);
            for b in &pg.placements[i + 1..] {
                assert!(!a.rect().intersects(&b.rect()), "{:?} overlaps {:?}", a, b);
                assert!(
                    !with_gap(a.rect(), page.gap).intersects(&with_gap(b.rect(), page.gap)),
                    "{:?} closer than the gap to {:?}",
                    a,
                    b
                );
            }
        }
    }
    for id in &out.unplaced_ids {
        assert!(!seen.contains(id), "{} both placed and unplaced", id);
    }
}

#[test]
fn mixed_pack_random_inputs_hold_invariants() {
    let page = PageGeometry::a4_300dpi();
    let opts = PaginateOptions {
        strategy: Strategy::MixedPack,
        max_pages: 40,
        oversized_fallback: true,
    };
    for seed in [1u64, 7, 42, 1234] {
        let items = random_items(seed, 60, 120, 1800);
        let out = paginate(items, page, opts).unwrap();
        check_invariants(&out, &page, 60);
    }
}

#[test]
fn mixed_pack_with_gap_and_oversized_items() {
    let page = PageGeometry::new(2480, 3508, 50, 24);
    let opts = PaginateOptions {
        strategy: Strategy::MixedPack,
        max_pages: 20,
        oversized_fallback: true,
    };
    let items = random_items(99, 40, 200, 3600);
    let out = paginate(items, page, opts).unwrap();
    check_invariants(&out, &page, 40);
}

#[test]
fn grid_random_sizes_hold_invariants() {
    let page = PageGeometry::a4_300dpi();
    let opts = PaginateOptions {
        strategy: Strategy::HomogeneousGrid,
        max_pages: 30,
        oversized_fallback: false,
    };
    // a handful of distinct sizes repeated so groups have several members
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    let sizes: Vec<(u32, u32)> = (0..4)
        .map(|_| (rng.gen_range(300..=1400), rng.gen_range(300..=1800)))
        .collect();
    let items: Vec<PhotoItem> = (0..30)
        .map(|i| {
            let (w, h) = sizes[rng.gen_range(0..sizes.len())];
            PhotoItem::with_pixels(format!("g{}", i), PhotoKind::A, w, h)
        })
        .collect();
    let out = paginate(items, page, opts).unwrap();
    check_invariants(&out, &page, 30);
    assert!(out.unplaced_ids.is_empty());
}

#[test]
fn grid_with_gap_keeps_spacing() {
    let page = PageGeometry::new(2480, 3508, 50, 24);
    let opts = PaginateOptions {
        strategy: Strategy::HomogeneousGrid,
        max_pages: 30,
        oversized_fallback: false,
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let sizes: Vec<(u32, u32)> = (0..3)
        .map(|_| (rng.gen_range(250..=1100), rng.gen_range(250..=1500)))
        .collect();
    let items: Vec<PhotoItem> = (0..36)
        .map(|i| {
            let (w, h) = sizes[i % sizes.len()];
            PhotoItem::with_pixels(format!("s{}", i), PhotoKind::B, w, h)
        })
        .collect();
    let out = paginate(items, page, opts).unwrap();
    check_invariants(&out, &page, 36);
    assert!(out.unplaced_ids.is_empty());
}

#[test]
fn repeatable_for_identical_input() {
    let page = PageGeometry::a4_300dpi();
    let opts = PaginateOptions {
        strategy: Strategy::MixedPack,
        max_pages: 40,
        oversized_fallback: true,
    };
    let a = paginate(random_items(42, 80, 64, 1500), page, opts).unwrap();
    let b = paginate(random_items(42, 80, 64, 1500), page, opts).unwrap();
    assert_eq!(a.pages.len(), b.pages.len());
    for (pa, pb) in a.pages.iter().zip(b.pages.iter()) {
        assert_eq!(pa.placements, pb.placements);
    }
    assert_eq!(a.unplaced_ids, b.unplaced_ids);
}
