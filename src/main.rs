use clap::{Args, Parser, Subcommand};
use filemerge::config::{self, MergeConfig};
use filemerge::files::{self, FileCategory, MergeKind};
use filemerge::imaging::{
    self, Background, Filter, ImageBackend, ImageWatermark, LayoutKind, MergeRequest, Pipeline,
    ResizeMode, RustBackend,
};
use filemerge::output;
use filemerge::text::{self, JsonMode, SeparatorStyle};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "filemerge")]
#[command(about = "Merge images into composites and concatenate text files")]
#[command(long_about = "\
Merge images into composites and concatenate text files

Inputs are files or directories. Directories are walked recursively and their
files taken in name order; files the command cannot merge are ignored.

Image layouts:

  vertical     one column, images stacked top to bottom
  horizontal   one row, images side by side
  grid         rows x cols, filled row by row (missing values auto-computed)

Every image is resized into a uniform cell (the largest input size unless
--cell is given) using --resize:

  fit       keep aspect ratio, pad with --background
  fill      keep aspect ratio, crop the overflow
  stretch   ignore aspect ratio

`merge` picks the command from the inputs: images, JSON (all .json), CSV
(all .csv) or plain text.

Settings come from ./filemerge.toml (or --config) on top of stock defaults;
flags override both. Run 'filemerge gen-config' for a documented config.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./filemerge.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (overrides [output].directory)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Inputs and output name shared by every merge command.
#[derive(Args)]
struct MergeTarget {
    /// Files or directories to merge, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file name, placed in the output directory unless it has a path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ImageArgs {
    #[command(flatten)]
    target: MergeTarget,

    #[arg(long)]
    layout: Option<LayoutKind>,

    /// Grid rows (grid layout only)
    #[arg(long)]
    rows: Option<u32>,

    /// Grid columns (grid layout only)
    #[arg(long)]
    cols: Option<u32>,

    #[arg(long)]
    resize: Option<ResizeMode>,

    /// Cell size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_cell)]
    cell: Option<(u32, u32)>,

    /// Background as #RRGGBB or #RRGGBBAA, or white/black/transparent
    #[arg(long)]
    background: Option<Background>,

    #[arg(long)]
    filter: Option<Filter>,

    /// Watermark text, drawn in white bottom-right on every input
    #[arg(long, value_name = "TEXT")]
    watermark: Option<String>,

    /// Watermark image, stamped bottom-right on every input
    #[arg(long, value_name = "FILE")]
    watermark_image: Option<PathBuf>,

    /// Watermark alpha (0.0-1.0)
    #[arg(long)]
    watermark_opacity: Option<f32>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Print the layout without reading pixels or writing anything
    #[arg(long)]
    plan: bool,
}

#[derive(Args)]
struct TextArgs {
    #[command(flatten)]
    target: MergeTarget,

    #[arg(long)]
    separator: Option<SeparatorStyle>,

    #[arg(long)]
    line_numbers: bool,

    /// Prefix each file with its size and modification time
    #[arg(long)]
    metadata: bool,

    /// Trim leading and trailing whitespace of each file
    #[arg(long)]
    strip: bool,

    /// Write a markdown document with one fenced section per file
    #[arg(long)]
    markdown: bool,
}

#[derive(Args)]
struct JsonArgs {
    #[command(flatten)]
    target: MergeTarget,

    /// array: one element per file; object: keyed by file stem
    #[arg(long)]
    mode: Option<JsonMode>,
}

#[derive(Args)]
struct CsvArgs {
    #[command(flatten)]
    target: MergeTarget,

    /// Do not append the source_file column
    #[arg(long)]
    no_source_column: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Merge images into one composite
    Images(ImageArgs),
    /// Concatenate text files
    Text(TextArgs),
    /// Combine JSON files into one document
    Json(JsonArgs),
    /// Concatenate CSV files under the first file's header
    Csv(CsvArgs),
    /// Detect the input kind and merge with configured settings
    Merge(MergeTarget),
    /// List inputs with their categories without merging
    Check {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock filemerge.toml with all options documented
    GenConfig,
}

fn main() -> CliResult {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    match cli.command {
        Command::Images(args) => {
            apply_image_flags(&mut config, &args);
            config.validate()?;
            let ctx = Context::new(config);
            let sources = collect(&args.target.inputs, FileCategory::Image)?;
            if args.plan {
                plan_images(&ctx, &sources)?;
            } else {
                merge_images(&ctx, sources, args.target.output.as_deref())?;
            }
        }
        Command::Text(args) => {
            apply_text_flags(&mut config, &args);
            let ctx = Context::new(config);
            let sources = collect(&args.target.inputs, FileCategory::Text)?;
            merge_text(&ctx, &sources, args.target.output.as_deref())?;
        }
        Command::Json(args) => {
            if let Some(mode) = args.mode {
                config.json.mode = mode;
            }
            let ctx = Context::new(config);
            let sources = collect(&args.target.inputs, FileCategory::Text)?;
            merge_json(&ctx, &sources, args.target.output.as_deref())?;
        }
        Command::Csv(args) => {
            config.csv.source_column &= !args.no_source_column;
            let ctx = Context::new(config);
            let sources = collect(&args.target.inputs, FileCategory::Text)?;
            merge_csv(&ctx, &sources, args.target.output.as_deref())?;
        }
        Command::Merge(target) => {
            let ctx = Context::new(config);
            let sources = files::collect_sources(&target.inputs)?;
            let requested = target.output.as_deref();
            match files::detect_kind(&sources) {
                Some(MergeKind::Images) => merge_images(&ctx, sources, requested)?,
                Some(MergeKind::Text) => merge_text(&ctx, &sources, requested)?,
                Some(MergeKind::Json) => merge_json(&ctx, &sources, requested)?,
                Some(MergeKind::Csv) => merge_csv(&ctx, &sources, requested)?,
                Some(MergeKind::Mixed) => {
                    return Err(
                        "inputs mix images and text; use `images` or `text` to merge one kind"
                            .into(),
                    );
                }
                None => return Err("no mergeable files in the given inputs".into()),
            }
        }
        Command::Check { inputs } => {
            let sources = files::collect_sources(&inputs)?;
            output::print_check(&sources);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Warn by default, raised by `-v`. `RUST_LOG` wins when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Parse `WIDTHxHEIGHT` (also accepts `X` and `*`).
fn parse_cell(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X', '*'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid cell dimension '{v}': {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}

fn apply_image_flags(config: &mut MergeConfig, args: &ImageArgs) {
    let images = &mut config.images;
    if let Some(layout) = args.layout {
        images.layout = layout;
    }
    if args.rows.is_some() {
        images.rows = args.rows;
    }
    if args.cols.is_some() {
        images.cols = args.cols;
    }
    if let Some(resize) = args.resize {
        images.resize = resize;
    }
    if let Some((w, h)) = args.cell {
        images.cell_size = Some([w, h]);
    }
    if let Some(background) = args.background {
        images.background = background;
    }
    if let Some(filter) = args.filter {
        images.filter = filter;
    }
    if args.watermark.is_some() {
        images.watermark = args.watermark.clone();
    }
    if args.watermark_image.is_some() {
        images.watermark_image = args.watermark_image.clone();
    }
    if let Some(opacity) = args.watermark_opacity {
        images.watermark_opacity = opacity;
    }
    if let Some(quality) = args.quality {
        images.quality = quality;
    }
}

/// Flags only switch options on; config decides the rest.
fn apply_text_flags(config: &mut MergeConfig, args: &TextArgs) {
    let text = &mut config.text;
    if let Some(separator) = args.separator {
        text.separator = separator;
    }
    text.line_numbers |= args.line_numbers;
    text.metadata |= args.metadata;
    text.strip_whitespace |= args.strip;
    text.markdown |= args.markdown;
}

/// Expand inputs, keeping only files of `category`.
fn collect(inputs: &[PathBuf], category: FileCategory) -> Result<Vec<PathBuf>, files::FilesError> {
    let mut sources = files::collect_sources(inputs)?;
    sources.retain(|path| {
        let keep = files::categorize(path) == category;
        if !keep {
            log::warn!("Ignoring {}: not {}", path.display(), category.as_str());
        }
        keep
    });
    Ok(sources)
}

/// Resolved settings plus the single timestamp used for names and backups.
struct Context {
    config: MergeConfig,
    now: OffsetDateTime,
}

impl Context {
    fn new(config: MergeConfig) -> Self {
        Self {
            config,
            now: files::local_now(),
        }
    }

    fn backup(&self) -> Option<OffsetDateTime> {
        self.config.output.backup.then_some(self.now)
    }

    /// Final output path. Without backups an existing file is never
    /// overwritten; the name gets a numeric suffix instead.
    fn output_path(&self, requested: Option<&Path>, default_name: &str) -> PathBuf {
        let name = requested.unwrap_or(Path::new(default_name));
        let stamp = self.config.output.timestamp.then_some(self.now);
        let path = files::resolve_output(name, &self.config.output.directory, stamp);
        if self.config.output.backup {
            path
        } else {
            files::unique_path(&path)
        }
    }
}

fn plan_images(ctx: &Context, sources: &[PathBuf]) -> CliResult {
    let backend = RustBackend::new();
    let images = &ctx.config.images;
    let preview = imaging::plan_merge(
        &backend,
        sources,
        &images.layout_options(),
        images.skip_invalid,
    )?;
    output::print_plan(&preview);
    Ok(())
}

fn merge_images(ctx: &Context, sources: Vec<PathBuf>, requested: Option<&Path>) -> CliResult {
    let backend = RustBackend::new();
    let images = &ctx.config.images;

    let mut pipeline = Pipeline::new().filter(images.filter, images.sharpening());
    if let Some(path) = &images.watermark_image {
        let mark = backend.load(path)?;
        pipeline = pipeline.image_watermark(ImageWatermark::new(mark, images.watermark_opacity));
    }
    if let Some(mark) = images.text_watermark() {
        pipeline = pipeline.text_watermark(mark);
    }

    let target = ctx.output_path(requested, "merged.png");
    files::ensure_parent(&target)?;

    let request = MergeRequest {
        sources,
        output: target,
        options: images.layout_options(),
        pipeline,
        quality: images.quality(),
        skip_invalid: images.skip_invalid,
        backup: ctx.backup(),
    };
    let report = imaging::merge_images(&backend, &request)?;
    output::print_image_report(&report);
    Ok(())
}

fn merge_text(ctx: &Context, sources: &[PathBuf], requested: Option<&Path>) -> CliResult {
    let options = ctx.config.text.options();
    let merged = text::merge_text(sources, &options, ctx.now)?;

    let default_name = if options.markdown {
        "merged.md"
    } else {
        "merged.txt"
    };
    let target = ctx.output_path(requested, default_name);
    let backup = files::write_output(&target, merged.content.as_bytes(), ctx.backup())?;
    output::print_text_report(&merged, &target, backup.as_deref());
    Ok(())
}

fn merge_json(ctx: &Context, sources: &[PathBuf], requested: Option<&Path>) -> CliResult {
    let mode = ctx.config.json.mode;
    let merged = text::merge_json(sources, mode)?;

    let target = ctx.output_path(requested, "merged.json");
    let backup = files::write_output(&target, merged.to_pretty()?.as_bytes(), ctx.backup())?;
    output::print_json_report(&merged, mode, &target, backup.as_deref());
    Ok(())
}

fn merge_csv(ctx: &Context, sources: &[PathBuf], requested: Option<&Path>) -> CliResult {
    let merged = text::merge_csv(sources, ctx.config.csv.source_column)?;

    let target = ctx.output_path(requested, "merged.csv");
    let backup = files::write_output(&target, merged.content.as_bytes(), ctx.backup())?;
    output::print_csv_report(&merged, &target, backup.as_deref());
    Ok(())
}
