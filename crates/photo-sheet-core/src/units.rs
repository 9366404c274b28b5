//! Physical length to pixel conversion.

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Converts a length in centimetres to whole pixels at `dpi`.
///
/// The result is floored: `floor(length_cm * dpi / 2.54)`. Callers pass
/// positive inputs; a negative or non-finite product saturates to 0.
pub fn cm_to_px(length_cm: f64, dpi: u32) -> u32 {
    let px = (length_cm * dpi as f64 / CM_PER_INCH).floor();
    // `as` saturates for out-of-range floats and maps NaN to 0.
    px as u32
}

/// Converts a length in millimetres to whole pixels at `dpi`.
pub fn mm_to_px(length_mm: f64, dpi: u32) -> u32 {
    cm_to_px(length_mm / 10.0, dpi)
}

/// Converts a pixel length back to centimetres at `dpi`.
pub fn px_to_cm(px: u32, dpi: u32) -> f64 {
    if dpi == 0 {
        return 0.0;
    }
    px as f64 * CM_PER_INCH / dpi as f64
}
