use photo_sheet_core::model::PhotoKind;
use photo_sheet_core::units::{cm_to_px, mm_to_px, px_to_cm};

#[test]
fn nominal_kinds_at_300_dpi() {
    let (w, h) = PhotoKind::A.nominal_size_cm();
    assert_eq!(cm_to_px(w, 300), 1062);
    assert_eq!(cm_to_px(h, 300), 1299);

    let (w, h) = PhotoKind::B.nominal_size_cm();
    assert_eq!(cm_to_px(w, 300), 1346);
    assert_eq!(cm_to_px(h, 300), 1795);
}

#[test]
fn a4_page_in_pixels_is_floored() {
    assert_eq!(mm_to_px(210.0, 300), 2480);
    assert_eq!(mm_to_px(297.0, 300), 3507);
    assert_eq!(mm_to_px(4.25, 300), 50);
}

#[test]
fn conversion_is_monotonic() {
    let mut prev = 0;
    for tenth in 0..500 {
        let px = cm_to_px(tenth as f64 / 10.0, 300);
        assert!(px >= prev, "{} cm went down to {} px", tenth as f64 / 10.0, px);
        prev = px;
    }
}

#[test]
fn degenerate_inputs_saturate_to_zero() {
    assert_eq!(cm_to_px(0.0, 300), 0);
    assert_eq!(cm_to_px(-3.0, 300), 0);
    assert_eq!(cm_to_px(f64::NAN, 300), 0);
    assert_eq!(cm_to_px(9.0, 0), 0);
    assert_eq!(px_to_cm(100, 0), 0.0);
}

#[test]
fn px_to_cm_inverts_within_one_pixel() {
    let px = cm_to_px(11.4, 300);
    let back = px_to_cm(px, 300);
    assert!(back <= 11.4);
    assert!(11.4 - back < 2.54 / 300.0);
}
