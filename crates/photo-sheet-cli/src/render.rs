use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use indicatif::ProgressBar;
use photo_sheet_core::export::{ImageTransform, PageInstructions};
use tracing::{debug, info, warn};

/// Thumbnail bounding box in pixels.
pub const THUMBNAIL_SIZE: u32 = 400;

/// Composites photos onto white JPEG pages with the `image` crate.
pub struct ImageRenderer {
    sources: HashMap<String, DynamicImage>,
    out_dir: PathBuf,
    name: String,
    multi_page: bool,
    quality: u8,
    thumbnails: bool,
    progress: Option<ProgressBar>,
    written: Vec<PathBuf>,
}

impl ImageRenderer {
    pub fn new(
        sources: HashMap<String, DynamicImage>,
        out_dir: &Path,
        name: &str,
        page_count: usize,
        quality: u8,
    ) -> Self {
        Self {
            sources,
            out_dir: out_dir.to_path_buf(),
            name: name.to_string(),
            multi_page: page_count > 1,
            quality: quality.clamp(1, 100),
            thumbnails: false,
            progress: None,
            written: Vec::new(),
        }
    }

    pub fn with_thumbnails(mut self, on: bool) -> Self {
        self.thumbnails = on;
        self
    }

    pub fn with_progress(mut self, bar: Option<ProgressBar>) -> Self {
        self.progress = bar;
        self
    }

    /// File name of a page, `name.jpg` for a single page and `name_<id>.jpg` otherwise.
    fn page_file_name(&self, page_id: usize) -> String {
        if self.multi_page {
            format!("{}_{}.jpg", self.name, page_id)
        } else {
            format!("{}.jpg", self.name)
        }
    }

    /// Page files written so far, in page order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn finish(&self) {
        if let Some(b) = &self.progress {
            b.finish_and_clear();
        }
    }

    fn compose(&self, page: &PageInstructions) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(page.width, page.height, Rgb([255, 255, 255]));
        for ins in &page.instructions {
            let Some(src) = self.sources.get(&ins.source_item_id) else {
                warn!(id = %ins.source_item_id, page = page.page_id, "no source image; slot left blank");
                continue;
            };
            let tile = match ins.source_crop {
                Some(c) => src.crop_imm(c.x, c.y, c.w, c.h),
                None => src.clone(),
            };
            // resize to the upright slot, then turn clockwise into place
            let (w, h) = if ins.rotated {
                (ins.target_height, ins.target_width)
            } else {
                (ins.target_width, ins.target_height)
            };
            let mut tile = tile.resize_exact(w, h, FilterType::Lanczos3);
            if ins.rotated {
                tile = tile.rotate90();
            }
            imageops::overlay(
                &mut canvas,
                &tile.to_rgb8(),
                ins.target_x as i64,
                ins.target_y as i64,
            );
        }
        canvas
    }
}

impl ImageTransform for ImageRenderer {
    type Error = anyhow::Error;

    fn render_page(&mut self, page: &PageInstructions) -> anyhow::Result<()> {
        let canvas = self.compose(page);
        let file_name = self.page_file_name(page.page_id);
        let path = self.out_dir.join(&file_name);
        write_jpeg(&path, &canvas, self.quality)?;
        info!(?path, id = page.page_id, photos = page.instructions.len(), "wrote page");
        self.written.push(path);

        if self.thumbnails {
            let thumb = DynamicImage::ImageRgb8(canvas)
                .thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE)
                .to_rgb8();
            let thumb_path = self.out_dir.join(format!("thumb_{}", file_name));
            write_jpeg(&thumb_path, &thumb, self.quality)?;
            debug!(?thumb_path, "wrote thumbnail");
        }
        if let Some(b) = &self.progress {
            b.inc(1);
        }
        Ok(())
    }
}

fn write_jpeg(path: &Path, img: &RgbImage, quality: u8) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("write {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    encoder
        .encode_image(img)
        .with_context(|| format!("encode {}", path.display()))?;
    Ok(())
}
