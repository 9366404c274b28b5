//! Request/response shapes exchanged with the surrounding service.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::{DEFAULT_MAX_PAGES, LayoutConfig, PageSpec, Strategy};
use crate::error::Result;
use crate::model::{KindCounts, LayoutResult, PhotoItem, PhotoKind};
use crate::pipeline::layout_items;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PhotoKind,
    /// Defaults to the nominal width of `kind`.
    #[serde(default)]
    pub width_cm: Option<f64>,
    /// Defaults to the nominal height of `kind`.
    #[serde(default)]
    pub height_cm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub items: Vec<RequestItem>,
    pub page: PageSpec,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub max_pages: Option<usize>,
    #[serde(default)]
    pub oversized_fallback: Option<bool>,
}

impl LayoutRequest {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn config(&self) -> LayoutConfig {
        let defaults = LayoutConfig::default();
        LayoutConfig {
            page: self.page.clone(),
            strategy: self.strategy,
            max_pages: self.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
            oversized_fallback: self.oversized_fallback.unwrap_or(defaults.oversized_fallback),
        }
    }

    /// Items with pixel sizes derived at the page DPI.
    pub fn items(&self) -> Vec<PhotoItem> {
        self.items
            .iter()
            .map(|it| {
                let (nw, nh) = it.kind.nominal_size_cm();
                PhotoItem::new(
                    it.id.clone(),
                    it.kind,
                    it.width_cm.unwrap_or(nw),
                    it.height_cm.unwrap_or(nh),
                    self.page.dpi,
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePlacement {
    pub id: String,
    pub x_px: u32,
    pub y_px: u32,
    pub width_px: u32,
    pub height_px: u32,
    pub rotated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePage {
    pub width_px: u32,
    pub height_px: u32,
    pub placements: Vec<ResponsePlacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutResponse {
    pub pages: Vec<ResponsePage>,
    pub placed_count: KindCounts,
    pub unplaced_ids: Vec<String>,
    /// Warning codes, e.g. `pagination_exhausted`.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl From<&LayoutResult> for LayoutResponse {
    fn from(result: &LayoutResult) -> Self {
        let pages = result
            .pages
            .iter()
            .map(|page| ResponsePage {
                width_px: page.geometry.width,
                height_px: page.geometry.height,
                placements: page
                    .placements
                    .iter()
                    .map(|p| ResponsePlacement {
                        id: p.id.clone(),
                        x_px: p.x,
                        y_px: p.y,
                        width_px: p.width,
                        height_px: p.height,
                        rotated: p.rotated,
                    })
                    .collect(),
            })
            .collect();
        Self {
            pages,
            placed_count: result.placed_count,
            unplaced_ids: result.unplaced_ids.clone(),
            warnings: result.warnings.iter().map(|w| w.code().to_string()).collect(),
        }
    }
}

#[instrument(skip_all, fields(items = req.items.len()))]
/// Runs one request end to end.
pub fn run_request(req: &LayoutRequest) -> Result<LayoutResult> {
    layout_items(req.items(), &req.config())
}

/// Runs independent requests; results keep request order.
///
/// With the `parallel` feature requests are laid out on the rayon pool.
pub fn run_batch(reqs: &[LayoutRequest]) -> Vec<Result<LayoutResult>> {
    #[cfg(feature = "parallel")]
    {
        reqs.par_iter().map(run_request).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        reqs.iter().map(run_request).collect()
    }
}
