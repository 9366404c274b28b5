use std::collections::HashMap;

use crate::crop::cover_crop;
use crate::model::{LayoutResult, Rect};
use crate::request::LayoutResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One photo to draw on a page canvas.
///
/// Target coordinates already include margin and gap. When `rotated` is set the
/// source is turned 90° clockwise and then fills `target_width x
/// target_height`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawInstruction {
    pub source_item_id: String,
    pub target_x: u32,
    pub target_y: u32,
    pub target_width: u32,
    pub target_height: u32,
    pub rotated: bool,
    /// Centred crop of the source image matching the slot aspect ratio, in
    /// source pixels before rotation. Present only when the source size is known.
    pub source_crop: Option<Rect>,
}

/// Draw instructions for one blank page canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInstructions {
    pub page_id: usize,
    pub width: u32,
    pub height: u32,
    pub instructions: Vec<DrawInstruction>,
}

/// Pixel work is delegated to an implementation of this trait (crop, resize,
/// rotate and composite onto a blank page).
pub trait ImageTransform {
    type Error;
    fn render_page(&mut self, page: &PageInstructions) -> Result<(), Self::Error>;
}

/// Builds draw instructions in page order, keeping placement order per page.
pub fn draw_instructions(result: &LayoutResult) -> Vec<PageInstructions> {
    draw_instructions_with_sources(result, &HashMap::new())
}

/// Like [`draw_instructions`], attaching a cover crop for every item whose
/// source size is present in `source_sizes` (id to `(width, height)`).
pub fn draw_instructions_with_sources(
    result: &LayoutResult,
    source_sizes: &HashMap<String, (u32, u32)>,
) -> Vec<PageInstructions> {
    result
        .pages
        .iter()
        .map(|page| {
            let instructions = page
                .placements
                .iter()
                .map(|p| {
                    // crop against the slot as it looks before rotation
                    let (slot_w, slot_h) = if p.rotated {
                        (p.height, p.width)
                    } else {
                        (p.width, p.height)
                    };
                    let source_crop = source_sizes
                        .get(&p.id)
                        .map(|&(sw, sh)| cover_crop(sw, sh, slot_w, slot_h));
                    DrawInstruction {
                        source_item_id: p.id.clone(),
                        target_x: p.x,
                        target_y: p.y,
                        target_width: p.width,
                        target_height: p.height,
                        rotated: p.rotated,
                        source_crop,
                    }
                })
                .collect();
            PageInstructions {
                page_id: page.id,
                width: page.geometry.width,
                height: page.geometry.height,
                instructions,
            }
        })
        .collect()
}

/// Hands every page to `renderer` in order. Returns the number of pages rendered.
pub fn render_all<T: ImageTransform>(
    result: &LayoutResult,
    source_sizes: &HashMap<String, (u32, u32)>,
    renderer: &mut T,
) -> Result<usize, T::Error> {
    let pages = draw_instructions_with_sources(result, source_sizes);
    for page in &pages {
        renderer.render_page(page)?;
    }
    Ok(pages.len())
}

/// Serialize a result in the external response shape:
/// `{ pages: [{ width_px, height_px, placements }], placed_count, unplaced_ids, warnings }`.
pub fn to_json(result: &LayoutResult) -> Value {
    json!(LayoutResponse::from(result))
}
