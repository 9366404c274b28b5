use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use photo_sheet_core::config::{LayoutConfig, Orientation, PageSpec, Strategy};
use photo_sheet_core::export::{render_all, to_json};
use photo_sheet_core::model::{LayoutResult, PhotoItem, PhotoKind};
use photo_sheet_core::planner::plan_grid;
use photo_sheet_core::request::{LayoutRequest, run_batch, run_request};
use photo_sheet_core::units::cm_to_px;
use photo_sheet_core::{layout_items, store::DEFAULT_TTL};
use serde::Deserialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

mod render;

use render::ImageRenderer;

#[derive(Parser, Debug)]
#[command(
    name = "photo-sheet",
    about = "Lay out photo prints on printable pages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a folder of photos and write JPEG pages plus JSON layout
    Render(RenderArgs),
    /// Run a JSON layout request (object or array of objects) and print the response
    Layout(LayoutArgs),
    /// Print the grid chosen for one photo size
    Plan(PlanArgs),
    /// Delete output files older than a maximum age
    Clean(CleanArgs),
}

#[derive(Parser, Debug, Clone)]
struct PageArgs {
    /// Page width in millimetres
    #[arg(long, default_value_t = 210.0, help_heading = "Page")]
    page_width_mm: f64,
    /// Page height in millimetres
    #[arg(long, default_value_t = 297.0, help_heading = "Page")]
    page_height_mm: f64,
    /// Output resolution
    #[arg(long, default_value_t = 300, help_heading = "Page")]
    dpi: u32,
    /// Border kept free on every side (mm)
    #[arg(long, default_value_t = 4.25, help_heading = "Page")]
    margin_mm: f64,
    /// Minimum spacing between photos (mm)
    #[arg(long, default_value_t = 0.0, help_heading = "Page")]
    gap_mm: f64,
    /// Orientation: portrait | landscape
    #[arg(long, default_value = "portrait", help_heading = "Page")]
    orientation: String,
}

impl PageArgs {
    fn page_spec(&self) -> anyhow::Result<PageSpec> {
        Ok(PageSpec {
            width_mm: self.page_width_mm,
            height_mm: self.page_height_mm,
            dpi: self.dpi,
            margin_mm: self.margin_mm,
            gap_mm: self.gap_mm,
            orientation: parse_orientation(&self.orientation)?,
        })
    }
}

#[derive(Parser, Debug, Clone)]
struct RenderArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name for pages (name.jpg or name_<n>.jpg) and name.json
    #[arg(short, long, default_value = "sheet", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (values override command-line options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Photos
    /// Photo kind for every input: a (construction, 9x11 cm) | b (document, 11.4x15.2 cm)
    #[arg(long, default_value = "a", help_heading = "Photos")]
    kind: String,
    /// Override the printed width (cm)
    #[arg(long, help_heading = "Photos")]
    width_cm: Option<f64>,
    /// Override the printed height (cm)
    #[arg(long, help_heading = "Photos")]
    height_cm: Option<f64>,

    #[command(flatten)]
    page: PageArgs,

    // Layout
    /// Strategy: homogeneous_grid | mixed_pack
    #[arg(long, default_value = "homogeneous_grid", help_heading = "Layout")]
    strategy: String,
    /// Safety cap on emitted pages
    #[arg(long, default_value_t = photo_sheet_core::DEFAULT_MAX_PAGES, help_heading = "Layout")]
    max_pages: usize,
    /// Place photos larger than the usable area one per page, clamped
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Layout")]
    oversized_fallback: bool,

    // Export
    /// JPEG quality (1..=100)
    #[arg(long, default_value_t = 95, help_heading = "Export")]
    quality: u8,
    /// Also write 400x400 preview thumbnails
    #[arg(long, default_value_t = false, help_heading = "Export")]
    thumbnails: bool,
    /// Export layout stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    /// Request JSON file, or `-` for stdin
    input: PathBuf,
    /// Write the response here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Pretty-print the response
    #[arg(long, default_value_t = true, action=ArgAction::Set)]
    pretty: bool,
}

#[derive(Parser, Debug, Clone)]
struct PlanArgs {
    /// Photo kind: a | b
    #[arg(long, default_value = "a")]
    kind: String,
    /// Photo width in pixels (overrides --kind)
    #[arg(long, requires = "height_px")]
    width_px: Option<u32>,
    /// Photo height in pixels (overrides --kind)
    #[arg(long, requires = "width_px")]
    height_px: Option<u32>,
    #[command(flatten)]
    page: PageArgs,
    /// Print the plan as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
struct CleanArgs {
    /// Directory to clean
    dir: PathBuf,
    /// Files older than this are deleted (hours)
    #[arg(long, default_value_t = DEFAULT_TTL.as_secs() / 3600)]
    max_age_hours: u64,
    /// Only list what would be deleted
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Render(args) => run_render(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
        Commands::Plan(args) => run_plan(args),
        Commands::Clean(args) => run_clean(args),
    }
}

fn run_render(cli: &RenderArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = LayoutConfig {
        page: cli.page.page_spec()?,
        strategy: parse_strategy(&cli.strategy)?,
        max_pages: cli.max_pages,
        oversized_fallback: cli.oversized_fallback,
    };
    let mut kind = parse_kind(&cli.kind)?;
    let mut size_cm = (cli.width_cm, cli.height_cm);
    let mut quality = cli.quality;
    let mut thumbnails = cli.thumbnails;

    // Load config file if provided; set values win over the command line
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        if let Some(k) = &y.kind {
            kind = parse_kind(k)?;
        }
        size_cm = (y.width_cm.or(size_cm.0), y.height_cm.or(size_cm.1));
        quality = y.quality.unwrap_or(quality);
        thumbnails = y.thumbnails.unwrap_or(thumbnails);
        cfg = y.into_layout_config(cfg)?;
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate()?;

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let sources = load_images_with_progress(&paths, show_progress)?;
    info!(count = sources.len(), "loaded input images");
    if sources.is_empty() {
        anyhow::bail!("no readable images under {}", cli.input.display());
    }

    let (nw, nh) = kind.nominal_size_cm();
    let (w_cm, h_cm) = (size_cm.0.unwrap_or(nw), size_cm.1.unwrap_or(nh));
    let items: Vec<PhotoItem> = sources
        .iter()
        .map(|(key, _)| PhotoItem::new(key.clone(), kind, w_cm, h_cm, cfg.page.dpi))
        .collect();
    let result = layout_items(items, &cfg)?;
    let stats = result.stats();
    info!(
        pages = stats.num_pages,
        placed = stats.num_placements,
        unplaced = stats.num_unplaced,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
    for id in &result.unplaced_ids {
        warn!(%id, "photo not placed");
    }

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;

        let sizes: HashMap<String, (u32, u32)> = sources
            .iter()
            .map(|(k, img)| (k.clone(), (img.width(), img.height())))
            .collect();
        let page_count = result.pages.len();
        let bar = if show_progress {
            Some(progress_bar(page_count, "rendering")?)
        } else {
            None
        };
        let mut renderer = ImageRenderer::new(
            sources.into_iter().collect(),
            &cli.out_dir,
            &cli.name,
            page_count,
            quality,
        )
        .with_thumbnails(thumbnails)
        .with_progress(bar);
        render_all(&result, &sizes, &mut renderer)?;
        renderer.finish();

        let json_path = cli.out_dir.join(format!("{}.json", cli.name));
        let mut json_value = to_json(&result);
        if let Some(obj) = json_value.as_object_mut() {
            let files: Vec<String> = renderer
                .written()
                .iter()
                .filter_map(|p| p.file_name())
                .map(|f| f.to_string_lossy().into_owned())
                .collect();
            obj.insert("page_images".into(), serde_json::json!(files));
        }
        let json = serde_json::to_string_pretty(&json_value)?;
        fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
        info!(
            ?json_path,
            pages = renderer.written().len(),
            "layout written"
        );
    }

    if let Some(stats_path) = &cli.export_stats {
        let value = serde_json::json!({
            "pages": stats.num_pages,
            "placed": result.placed_count,
            "unplaced": result.unplaced_ids.len(),
            "used_area": stats.used_area,
            "total_area": stats.total_page_area,
            "occupancy": stats.occupancy,
            "rotated": stats.num_rotated,
        });
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_layout(args: &LayoutArgs) -> anyhow::Result<()> {
    let text = if args.input.as_os_str() == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        s
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("read {}", args.input.display()))?
    };

    let raw: serde_json::Value = serde_json::from_str(&text)?;
    let response = if raw.is_array() {
        let reqs: Vec<LayoutRequest> = serde_json::from_value(raw)?;
        let results = run_batch(&reqs);
        let values: Vec<serde_json::Value> = results
            .iter()
            .enumerate()
            .map(|(i, r)| match r {
                Ok(out) => to_json(out),
                Err(e) => {
                    error!(request = i, error = %e, "layout failed");
                    serde_json::json!({ "error": e.to_string() })
                }
            })
            .collect();
        info!(requests = reqs.len(), "batch done");
        serde_json::Value::Array(values)
    } else {
        let req: LayoutRequest = serde_json::from_value(raw)?;
        let out = run_request(&req)?;
        log_result(&out);
        to_json(&out)
    };

    let text = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    match &args.out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(?path, "response written");
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn log_result(out: &LayoutResult) {
    info!(
        pages = out.pages.len(),
        placed = out.placed_count.total(),
        unplaced = out.unplaced_ids.len(),
        "layout done"
    );
    for w in &out.warnings {
        warn!(code = w.code(), "layout warning");
    }
}

fn run_plan(args: &PlanArgs) -> anyhow::Result<()> {
    let page = args.page.page_spec()?;
    page.validate()?;
    let geometry = page.geometry();
    let (w, h) = match (args.width_px, args.height_px) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            let (wc, hc) = parse_kind(&args.kind)?.nominal_size_cm();
            (cm_to_px(wc, page.dpi), cm_to_px(hc, page.dpi))
        }
    };
    let plan = plan_grid(w, h, &geometry);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    println!(
        "page {}x{} px (margin {}), photo {}x{} px",
        geometry.width, geometry.height, geometry.margin, w, h
    );
    println!(
        "grid {}x{} = {} per page, rotated={}, cell {}x{}, spacing {}x{}{}",
        plan.cols,
        plan.rows,
        plan.capacity(),
        plan.rotated,
        plan.cell_w,
        plan.cell_h,
        plan.x_spacing,
        plan.y_spacing,
        if plan.fallback { " (oversized: clamped)" } else { "" }
    );
    Ok(())
}

fn run_clean(args: &CleanArgs) -> anyhow::Result<()> {
    let max_age = Duration::from_secs(args.max_age_hours.saturating_mul(3600));
    let now = SystemTime::now();
    let mut removed = 0usize;
    for entry in WalkDir::new(&args.dir).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
            Some(t) => t,
            None => continue,
        };
        let expired = now.duration_since(modified).is_ok_and(|age| age > max_age);
        if !expired {
            continue;
        }
        if args.dry_run {
            println!("{}", p.display());
        } else if let Err(e) = fs::remove_file(p) {
            error!(?p, error = %e, "failed to delete");
            continue;
        }
        removed += 1;
    }
    info!(removed, dry_run = args.dry_run, "clean done");
    Ok(())
}

fn parse_kind(s: &str) -> anyhow::Result<PhotoKind> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown photo kind: {}", s))
}

fn parse_strategy(s: &str) -> anyhow::Result<Strategy> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown strategy: {}", s))
}

fn parse_orientation(s: &str) -> anyhow::Result<Orientation> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown orientation: {}", s))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "gif" | "webp")
    )
}

fn progress_bar(len: usize, what: &str) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    let b = ProgressBar::new(len as u64);
    b.set_style(ProgressStyle::with_template(&format!(
        "{{spinner:.green}} {} {{pos}}/{{len}} [{{elapsed_precise}}] {{wide_msg}}",
        what
    ))?);
    Ok(b)
}

/// Decodes every path, keyed by its forward-slash path. Unreadable files are
/// logged and skipped. Input order is kept.
fn load_images_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<(String, DynamicImage)>> {
    let bar = if progress {
        Some(progress_bar(paths.len(), "loading")?)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => {
                let key = p.to_string_lossy().replace('\\', "/");
                list.push((key, img));
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Render settings read from a YAML file; every field is optional.
#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    kind: Option<String>,
    width_cm: Option<f64>,
    height_cm: Option<f64>,
    page_width_mm: Option<f64>,
    page_height_mm: Option<f64>,
    dpi: Option<u32>,
    margin_mm: Option<f64>,
    gap_mm: Option<f64>,
    orientation: Option<String>,
    strategy: Option<String>,
    max_pages: Option<usize>,
    oversized_fallback: Option<bool>,
    quality: Option<u8>,
    thumbnails: Option<bool>,
}

impl YamlConfig {
    fn into_layout_config(self, mut cfg: LayoutConfig) -> anyhow::Result<LayoutConfig> {
        if let Some(v) = self.page_width_mm {
            cfg.page.width_mm = v;
        }
        if let Some(v) = self.page_height_mm {
            cfg.page.height_mm = v;
        }
        if let Some(v) = self.dpi {
            cfg.page.dpi = v;
        }
        if let Some(v) = self.margin_mm {
            cfg.page.margin_mm = v;
        }
        if let Some(v) = self.gap_mm {
            cfg.page.gap_mm = v;
        }
        if let Some(v) = &self.orientation {
            cfg.page.orientation = parse_orientation(v)?;
        }
        if let Some(v) = &self.strategy {
            cfg.strategy = parse_strategy(v)?;
        }
        if let Some(v) = self.max_pages {
            cfg.max_pages = v;
        }
        if let Some(v) = self.oversized_fallback {
            cfg.oversized_fallback = v;
        }
        Ok(cfg)
    }
}
