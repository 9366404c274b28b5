use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::units::cm_to_px;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x2(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn y2(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }
    /// Returns true if the two rectangles share any pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.x2() || r.x >= self.x2() || self.y >= r.y2() || r.y >= self.y2())
    }
}

/// Unallocated page area inside a packer.
pub type FreeRegion = Rect;

/// Photo print kinds with fixed nominal physical sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhotoKind {
    /// Construction photo, 9.0 cm x 11.0 cm.
    #[serde(alias = "a")]
    A,
    /// Document photo, 11.4 cm x 15.2 cm.
    #[serde(alias = "b")]
    B,
}

impl PhotoKind {
    pub const ALL: [PhotoKind; 2] = [PhotoKind::A, PhotoKind::B];

    /// Nominal (width, height) in centimetres.
    pub fn nominal_size_cm(self) -> (f64, f64) {
        match self {
            PhotoKind::A => (9.0, 11.0),
            PhotoKind::B => (11.4, 15.2),
        }
    }
}

impl FromStr for PhotoKind {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "construction" => Ok(Self::A),
            "b" | "document" => Ok(Self::B),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoKind::A => f.write_str("A"),
            PhotoKind::B => f.write_str("B"),
        }
    }
}

/// A photo to be placed on a page.
///
/// Size fields are inputs; `rotated`, `x`, `y` and `placed` are written by the
/// packer that places the item and are not reset afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoItem {
    pub id: String,
    pub kind: PhotoKind,
    pub width_cm: f64,
    pub height_cm: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub rotated: bool,
    pub x: u32,
    pub y: u32,
    pub placed: bool,
}

impl PhotoItem {
    /// Creates an unplaced item, deriving pixel size from `dpi`.
    pub fn new(id: impl Into<String>, kind: PhotoKind, width_cm: f64, height_cm: f64, dpi: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            width_cm,
            height_cm,
            width_px: cm_to_px(width_cm, dpi),
            height_px: cm_to_px(height_cm, dpi),
            rotated: false,
            x: 0,
            y: 0,
            placed: false,
        }
    }

    /// Creates an item at the nominal size of `kind`.
    pub fn of_kind(id: impl Into<String>, kind: PhotoKind, dpi: u32) -> Self {
        let (w, h) = kind.nominal_size_cm();
        Self::new(id, kind, w, h, dpi)
    }

    /// Creates an item directly from pixel sizes (physical size left at 0).
    pub fn with_pixels(id: impl Into<String>, kind: PhotoKind, width_px: u32, height_px: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            width_cm: 0.0,
            height_cm: 0.0,
            width_px,
            height_px,
            rotated: false,
            x: 0,
            y: 0,
            placed: false,
        }
    }

    /// Physical area used for ordering; falls back to pixel area when no
    /// physical size was given.
    pub fn physical_area(&self) -> f64 {
        let a = self.width_cm * self.height_cm;
        if a > 0.0 {
            a
        } else {
            self.width_px as f64 * self.height_px as f64
        }
    }

    /// Pixel size in the given orientation.
    pub fn size_px(&self, rotated: bool) -> (u32, u32) {
        if rotated {
            (self.height_px, self.width_px)
        } else {
            (self.width_px, self.height_px)
        }
    }
}

/// Pixel geometry of one print page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageGeometry {
    pub width: u32,
    pub height: u32,
    /// Uniform border excluded from placement.
    pub margin: u32,
    /// Minimum spacing between neighbouring items.
    pub gap: u32,
}

impl PageGeometry {
    pub fn new(width: u32, height: u32, margin: u32, gap: u32) -> Self {
        Self {
            width,
            height,
            margin,
            gap,
        }
    }

    /// Portrait A4 canvas at 300 dpi with a 50 px margin.
    pub fn a4_300dpi() -> Self {
        Self::new(2480, 3508, 50, 0)
    }

    pub fn usable_width(&self) -> u32 {
        self.width.saturating_sub(self.margin.saturating_mul(2))
    }

    pub fn usable_height(&self) -> u32 {
        self.height.saturating_sub(self.margin.saturating_mul(2))
    }

    /// The area inside the margins.
    pub fn usable_rect(&self) -> Rect {
        Rect::new(
            self.margin,
            self.margin,
            self.usable_width(),
            self.usable_height(),
        )
    }

    /// Swaps width and height.
    pub fn landscape(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            ..self
        }
    }

    /// Rejects zero dimensions, a margin that consumes the page and a gap
    /// at least as large as the usable area.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SheetError;

        if self.width == 0 || self.height == 0 {
            return Err(SheetError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let total_border = self.margin.saturating_mul(2);
        if total_border >= self.width || total_border >= self.height {
            return Err(SheetError::InvalidConfig(format!(
                "margin ({}) * 2 exceeds page dimensions ({}x{})",
                self.margin, self.width, self.height
            )));
        }
        if self.gap >= self.usable_width() || self.gap >= self.usable_height() {
            return Err(SheetError::InvalidConfig(format!(
                "gap ({}) must be smaller than the usable area ({}x{})",
                self.gap,
                self.usable_width(),
                self.usable_height()
            )));
        }
        Ok(())
    }
}

/// A placed item within a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub kind: PhotoKind,
    pub x: u32,
    pub y: u32,
    /// Post-rotation width.
    pub width: u32,
    /// Post-rotation height.
    pub height: u32,
    pub rotated: bool,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A single emitted page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: usize,
    pub geometry: PageGeometry,
    pub placements: Vec<Placement>,
}

/// Per-kind counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
}

impl KindCounts {
    pub fn get(&self, kind: PhotoKind) -> usize {
        match kind {
            PhotoKind::A => self.a,
            PhotoKind::B => self.b,
        }
    }

    pub fn add(&mut self, kind: PhotoKind, n: usize) {
        match kind {
            PhotoKind::A => self.a += n,
            PhotoKind::B => self.b += n,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b
    }
}

/// Non-fatal conditions reported alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// The safety page cap stopped pagination while items remained.
    PaginationExhausted { max_pages: usize, remaining: usize },
}

impl LayoutWarning {
    pub fn code(&self) -> &'static str {
        match self {
            LayoutWarning::PaginationExhausted { .. } => "pagination_exhausted",
        }
    }
}

/// Output of a layout run: pages in creation order plus bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub pages: Vec<Page>,
    pub placed_count: KindCounts,
    pub unplaced_count: KindCounts,
    pub unplaced_ids: Vec<String>,
    pub warnings: Vec<LayoutWarning>,
}

/// Statistics about page usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutStats {
    pub num_pages: usize,
    pub num_placements: usize,
    /// Sum of width * height over all pages.
    pub total_page_area: u64,
    /// Sum of placement areas.
    pub used_area: u64,
    /// used_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
    pub num_rotated: usize,
    pub num_unplaced: usize,
}

impl LayoutResult {
    pub fn is_exhausted(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LayoutWarning::PaginationExhausted { .. }))
    }

    /// Computes page usage statistics for this result.
    pub fn stats(&self) -> LayoutStats {
        let mut num_placements = 0;
        let mut total_page_area = 0u64;
        let mut used_area = 0u64;
        let mut num_rotated = 0;
        for page in &self.pages {
            total_page_area += page.geometry.width as u64 * page.geometry.height as u64;
            for p in &page.placements {
                num_placements += 1;
                used_area += p.rect().area();
                if p.rotated {
                    num_rotated += 1;
                }
            }
        }
        let occupancy = if total_page_area > 0 {
            used_area as f64 / total_page_area as f64
        } else {
            0.0
        };
        LayoutStats {
            num_pages: self.pages.len(),
            num_placements,
            total_page_area,
            used_area,
            occupancy,
            num_rotated,
            num_unplaced: self.unplaced_ids.len(),
        }
    }
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Photos: {}, Occupancy: {:.2}%, Page Area: {} px², Used Area: {} px², Rotated: {}, Unplaced: {}",
            self.num_pages,
            self.num_placements,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_area,
            self.num_rotated,
            self.num_unplaced,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_page_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_page_area > 0 {
            (self.wasted_area() as f64 / self.total_page_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
