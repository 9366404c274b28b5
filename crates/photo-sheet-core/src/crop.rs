use crate::model::Rect;

/// Largest centred rectangle of `src_w x src_h` with the aspect ratio of
/// `target_w x target_h`.
///
/// Wider sources lose columns on both sides; taller sources lose rows at top
/// and bottom. Degenerate sizes return the full source.
pub fn cover_crop(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> Rect {
    if src_w == 0 || src_h == 0 || target_w == 0 || target_h == 0 {
        return Rect::new(0, 0, src_w, src_h);
    }
    let (sw, sh) = (src_w as u64, src_h as u64);
    let (tw, th) = (target_w as u64, target_h as u64);
    if sw * th > tw * sh {
        let new_w = ((sh * tw / th) as u32).clamp(1, src_w);
        Rect::new((src_w - new_w) / 2, 0, new_w, src_h)
    } else {
        let new_h = ((sw * th / tw) as u32).clamp(1, src_h);
        Rect::new(0, (src_h - new_h) / 2, src_w, new_h)
    }
}
