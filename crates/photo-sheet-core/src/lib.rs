//! Core library for laying out photo prints on printable pages.
//!
//! - Units: physical sizes (cm/mm) to pixels at a DPI
//! - Planning: best rows x columns grid for one photo size, with optional 90° rotation
//! - Packing: grid filler and guillotine best-fit packer for mixed sizes
//! - Pipeline: `paginate` opens pages until every photo is placed or deemed unplaceable
//! - Export: draw instructions for an image backend plus the JSON response shape
//!
//! Pixel work (decoding, cropping, resizing, compositing) is left to an
//! [`ImageTransform`] implementation supplied by the caller.
//!
//! Quick example:
//! ```
//! use photo_sheet_core::{LayoutConfig, PhotoItem, PhotoKind, layout_items};
//! # fn main() -> photo_sheet_core::Result<()> {
//! let items: Vec<PhotoItem> = (0..6)
//!     .map(|i| PhotoItem::of_kind(format!("p{i}"), PhotoKind::A, 300))
//!     .collect();
//! let out = layout_items(items, &LayoutConfig::default())?;
//! println!("pages: {}", out.pages.len());
//! # Ok(()) }
//! ```

pub mod config;
pub mod crop;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod planner;
pub mod request;
pub mod store;
pub mod units;

pub use config::*;
pub use crop::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use planner::*;
pub use request::*;
pub use store::*;
pub use units::*;

/// Convenience prelude for common types and functions.
/// Importing `photo_sheet_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{LayoutConfig, LayoutConfigBuilder, Orientation, PageSpec, Strategy};
    pub use crate::export::{DrawInstruction, ImageTransform, PageInstructions};
    pub use crate::model::{
        LayoutResult, LayoutStats, LayoutWarning, Page, PageGeometry, PhotoItem, PhotoKind,
        Placement, Rect,
    };
    pub use crate::request::{LayoutRequest, LayoutResponse};
    pub use crate::{draw_instructions, layout_items, paginate, plan_grid, to_json};
}
