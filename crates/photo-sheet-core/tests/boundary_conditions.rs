use photo_sheet_core::config::{LayoutConfig, PageSpec};
use photo_sheet_core::error::SheetError;
use photo_sheet_core::model::{PageGeometry, PhotoItem, PhotoKind};
use photo_sheet_core::pipeline::{PaginateOptions, layout_items, paginate};

/// Test zero-sized page dimensions
#[test]
fn test_zero_width_page() {
    let g = PageGeometry::new(0, 3508, 50, 0);
    match g.validate() {
        Err(SheetError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 3508);
        }
        other => panic!("Expected InvalidDimensions error, got {:?}", other),
    }
}

#[test]
fn test_margin_consumes_page() {
    let g = PageGeometry::new(100, 100, 50, 0);
    assert!(matches!(g.validate(), Err(SheetError::InvalidConfig(_))));

    let cfg = LayoutConfig::builder().page_mm(20.0, 20.0).margin_mm(10.0).build();
    assert!(matches!(cfg.validate(), Err(SheetError::InvalidConfig(_))));
}

#[test]
fn test_non_positive_margin_rejected() {
    let cfg = LayoutConfig::builder().margin_mm(0.0).build();
    assert!(matches!(cfg.validate(), Err(SheetError::InvalidConfig(_))));

    let cfg = LayoutConfig::builder().margin_mm(-1.0).build();
    assert!(matches!(cfg.validate(), Err(SheetError::InvalidConfig(_))));
}

#[test]
fn test_bad_page_spec_values() {
    let mut page = PageSpec::default();
    page.dpi = 0;
    assert!(page.validate().is_err());

    let mut page = PageSpec::default();
    page.width_mm = f64::NAN;
    assert!(page.validate().is_err());

    let mut page = PageSpec::default();
    page.gap_mm = -0.5;
    assert!(page.validate().is_err());

    assert!(PageSpec::default().validate().is_ok());
}

#[test]
fn test_zero_max_pages() {
    let cfg = LayoutConfig::builder().max_pages(0).build();
    assert!(cfg.validate().is_err());

    let opts = PaginateOptions {
        max_pages: 0,
        ..Default::default()
    };
    let items = vec![PhotoItem::of_kind("a", PhotoKind::A, 300)];
    assert!(matches!(
        paginate(items, PageGeometry::a4_300dpi(), opts),
        Err(SheetError::InvalidConfig(_))
    ));
}

#[test]
fn test_empty_input() {
    let result = layout_items(Vec::new(), &LayoutConfig::default());
    assert!(matches!(result, Err(SheetError::Empty)));
}

#[test]
fn test_duplicate_ids_rejected() {
    let items = vec![
        PhotoItem::of_kind("same", PhotoKind::A, 300),
        PhotoItem::of_kind("same", PhotoKind::B, 300),
    ];
    match layout_items(items, &LayoutConfig::default()) {
        Err(SheetError::InvalidItem { id, reason }) => {
            assert_eq!(id, "same");
            assert!(reason.contains("duplicate"));
        }
        other => panic!("Expected InvalidItem error, got {:?}", other),
    }
}

#[test]
fn test_zero_sized_item_rejected() {
    let items = vec![PhotoItem::new("flat", PhotoKind::A, 9.0, 0.0, 300)];
    assert!(matches!(
        layout_items(items, &LayoutConfig::default()),
        Err(SheetError::InvalidItem { .. })
    ));
}

#[test]
fn test_non_finite_item_rejected() {
    let items = vec![PhotoItem::new("inf", PhotoKind::A, f64::INFINITY, 11.0, 300)];
    match layout_items(items, &LayoutConfig::default()) {
        Err(SheetError::InvalidItem { id, .. }) => assert_eq!(id, "inf"),
        other => panic!("Expected InvalidItem error, got {:?}", other),
    }
}

/// Item exactly the size of the usable area
#[test]
fn test_exact_usable_size() {
    let page = PageGeometry::a4_300dpi();
    let items = vec![PhotoItem::with_pixels("full", PhotoKind::B, 2380, 3408)];
    for strategy in [
        photo_sheet_core::Strategy::HomogeneousGrid,
        photo_sheet_core::Strategy::MixedPack,
    ] {
        let opts = PaginateOptions {
            strategy,
            oversized_fallback: false,
            ..Default::default()
        };
        let out = paginate(items.clone(), page, opts).unwrap();
        assert_eq!(out.pages.len(), 1, "{:?}", strategy);
        let p = &out.pages[0].placements[0];
        assert_eq!((p.x, p.y, p.width, p.height), (50, 50, 2380, 3408));
    }
}

/// One pixel too large in both orientations
#[test]
fn test_one_pixel_over() {
    let page = PageGeometry::a4_300dpi();
    let items = vec![PhotoItem::with_pixels("over", PhotoKind::B, 2381, 3409)];
    let opts = PaginateOptions {
        strategy: photo_sheet_core::Strategy::MixedPack,
        ..Default::default()
    };
    let out = paginate(items, page, opts).unwrap();
    assert_eq!(out.unplaced_ids, vec!["over".to_string()]);
}

#[test]
fn test_landscape_swaps_page() {
    let cfg = LayoutConfig::builder()
        .orientation(photo_sheet_core::Orientation::Landscape)
        .build();
    let g = cfg.page.geometry();
    assert_eq!((g.width, g.height), (3507, 2480));
    assert_eq!(g.margin, 50);
}

#[test]
fn test_already_placed_item_rejected() {
    let mut stale = PhotoItem::of_kind("stale", PhotoKind::A, 300);
    stale.placed = true;
    let items = vec![stale, PhotoItem::of_kind("fresh", PhotoKind::A, 300)];
    for strategy in [
        photo_sheet_core::Strategy::HomogeneousGrid,
        photo_sheet_core::Strategy::MixedPack,
    ] {
        let cfg = LayoutConfig::builder().strategy(strategy).build();
        match layout_items(items.clone(), &cfg) {
            Err(SheetError::InvalidItem { id, reason }) => {
                assert_eq!(id, "stale");
                assert!(reason.contains("already placed"));
            }
            other => panic!("Expected InvalidItem error, got {:?}", other),
        }
    }
}

#[test]
fn test_gap_larger_than_usable_area_rejected() {
    let cfg = LayoutConfig::builder().gap_mm(1.0e9).build();
    assert!(matches!(cfg.validate(), Err(SheetError::InvalidConfig(_))));
    let items = vec![PhotoItem::of_kind("a", PhotoKind::A, 300)];
    assert!(matches!(
        layout_items(items, &cfg),
        Err(SheetError::InvalidConfig(_))
    ));

    // usable 80 x 80
    let g = PageGeometry::new(100, 100, 10, 80);
    assert!(matches!(g.validate(), Err(SheetError::InvalidConfig(_))));
    assert!(PageGeometry::new(100, 100, 10, 79).validate().is_ok());
}
