use photo_sheet_core::prelude::*;

#[test]
fn test_layout_stats_basic() {
    let items = (0..10)
        .map(|i| PhotoItem::with_pixels(format!("p{}", i), PhotoKind::A, 1063, 1299))
        .collect();
    let result = paginate(items, PageGeometry::a4_300dpi(), Default::default())
        .expect("layout should succeed");
    let stats = result.stats();

    assert_eq!(stats.num_pages, 3);
    assert_eq!(stats.num_placements, 10);
    assert_eq!(stats.total_page_area, 3 * 2480 * 3508);
    assert_eq!(stats.used_area, 10 * 1063 * 1299);
    assert_eq!(stats.num_rotated, 0);
    assert_eq!(stats.num_unplaced, 0);

    assert!(stats.occupancy > 0.0 && stats.occupancy <= 1.0);
    assert_eq!(stats.wasted_area(), stats.total_page_area - stats.used_area);
    let pct = stats.waste_percentage();
    assert!((pct - (100.0 - stats.occupancy * 100.0)).abs() < 1e-9);
}

#[test]
fn test_layout_stats_with_rotation() {
    let page = PageGeometry::new(1020, 420, 10, 0);
    let items = vec![
        PhotoItem::with_pixels("r0", PhotoKind::A, 300, 500),
        PhotoItem::with_pixels("r1", PhotoKind::A, 300, 500),
    ];
    let result = paginate(items, page, Default::default()).unwrap();
    let stats = result.stats();
    assert_eq!(stats.num_rotated, 2);
    assert_eq!(stats.num_pages, 1);
}

#[test]
fn test_stats_summary() {
    let items = vec![PhotoItem::of_kind("a", PhotoKind::A, 300)];
    let result = layout_items(items, &LayoutConfig::default()).unwrap();
    let summary = result.stats().summary();
    assert!(summary.contains("Pages: 1"));
    assert!(summary.contains("Photos: 1"));
    assert!(summary.contains("Occupancy:"));
    assert!(summary.contains("Unplaced: 0"));
}

#[test]
fn test_empty_result_stats() {
    let stats = LayoutResult::default().stats();
    assert_eq!(stats.num_pages, 0);
    assert_eq!(stats.occupancy, 0.0);
    assert_eq!(stats.waste_percentage(), 0.0);
}
