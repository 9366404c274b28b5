use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, SheetError};
use crate::model::PageGeometry;
use crate::units::mm_to_px;

/// Paper orientation. Landscape swaps the page width and height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(()),
        }
    }
}

/// Pagination strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One photo size per page on a regular grid (rows x columns).
    #[default]
    HomogeneousGrid,
    /// Mixed sizes on a page via the guillotine best-fit packer.
    MixedPack,
}

impl FromStr for Strategy {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "homogeneous_grid" | "grid" => Ok(Self::HomogeneousGrid),
            "mixed_pack" | "mixed" => Ok(Self::MixedPack),
            _ => Err(()),
        }
    }
}

/// Physical page description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Output resolution in dots per inch.
    pub dpi: u32,
    /// Uniform border excluded from placement.
    pub margin_mm: f64,
    /// Spacing between neighbouring photos.
    #[serde(default)]
    pub gap_mm: f64,
    #[serde(default)]
    pub orientation: Orientation,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::a4(300)
    }
}

impl PageSpec {
    /// Portrait A4 (210 x 297 mm) with a 4.25 mm margin (50 px at 300 dpi).
    pub fn a4(dpi: u32) -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            dpi,
            margin_mm: 4.25,
            gap_mm: 0.0,
            orientation: Orientation::Portrait,
        }
    }

    /// Pixel geometry after orientation is applied.
    pub fn geometry(&self) -> PageGeometry {
        let g = PageGeometry::new(
            mm_to_px(self.width_mm, self.dpi),
            mm_to_px(self.height_mm, self.dpi),
            mm_to_px(self.margin_mm, self.dpi),
            mm_to_px(self.gap_mm, self.dpi),
        );
        match self.orientation {
            Orientation::Portrait => g,
            Orientation::Landscape => g.landscape(),
        }
    }

    /// Rejects non-positive page dimensions, margin or DPI.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(SheetError::InvalidConfig("dpi must be positive".into()));
        }
        if !(self.width_mm.is_finite() && self.width_mm > 0.0)
            || !(self.height_mm.is_finite() && self.height_mm > 0.0)
        {
            return Err(SheetError::InvalidConfig(format!(
                "page dimensions must be positive: {}x{} mm",
                self.width_mm, self.height_mm
            )));
        }
        if !(self.margin_mm.is_finite() && self.margin_mm > 0.0) {
            return Err(SheetError::InvalidConfig(format!(
                "margin_mm must be positive: {}",
                self.margin_mm
            )));
        }
        if !(self.gap_mm.is_finite() && self.gap_mm >= 0.0) {
            return Err(SheetError::InvalidConfig(format!(
                "gap_mm must not be negative: {}",
                self.gap_mm
            )));
        }
        self.geometry().validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    #[serde(default)]
    pub page: PageSpec,
    #[serde(default)]
    pub strategy: Strategy,
    /// Safety cap on emitted pages.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Place oversized photos one per page, clamped to the usable area,
    /// instead of reporting them unplaced (grid strategy only).
    #[serde(default = "default_oversized_fallback")]
    pub oversized_fallback: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageSpec::default(),
            strategy: Strategy::default(),
            max_pages: default_max_pages(),
            oversized_fallback: default_oversized_fallback(),
        }
    }
}

impl LayoutConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Page dimensions, margin or DPI are not positive
    /// - The margin leaves no usable space
    /// - `max_pages` is zero
    pub fn validate(&self) -> Result<()> {
        self.page.validate()?;
        if self.max_pages == 0 {
            return Err(SheetError::InvalidConfig(
                "max_pages must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `LayoutConfig`.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::new()
    }
}

pub const DEFAULT_MAX_PAGES: usize = 20;

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}
fn default_oversized_fallback() -> bool {
    true
}

/// Builder for `LayoutConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct LayoutConfigBuilder {
    cfg: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: LayoutConfig::default(),
        }
    }
    pub fn page(mut self, page: PageSpec) -> Self {
        self.cfg.page = page;
        self
    }
    pub fn page_mm(mut self, width_mm: f64, height_mm: f64) -> Self {
        self.cfg.page.width_mm = width_mm;
        self.cfg.page.height_mm = height_mm;
        self
    }
    pub fn dpi(mut self, v: u32) -> Self {
        self.cfg.page.dpi = v;
        self
    }
    pub fn margin_mm(mut self, v: f64) -> Self {
        self.cfg.page.margin_mm = v;
        self
    }
    pub fn gap_mm(mut self, v: f64) -> Self {
        self.cfg.page.gap_mm = v;
        self
    }
    pub fn orientation(mut self, v: Orientation) -> Self {
        self.cfg.page.orientation = v;
        self
    }
    pub fn strategy(mut self, v: Strategy) -> Self {
        self.cfg.strategy = v;
        self
    }
    pub fn max_pages(mut self, v: usize) -> Self {
        self.cfg.max_pages = v;
        self
    }
    pub fn oversized_fallback(mut self, v: bool) -> Self {
        self.cfg.oversized_fallback = v;
        self
    }
    pub fn build(self) -> LayoutConfig {
        self.cfg
    }
}
