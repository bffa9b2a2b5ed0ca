use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drawgroup_core::config::GroupingConfig;
use drawgroup_core::io::{read_ocr_document, write_artifact_atomically};
use drawgroup_core::pipeline::group_document;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Deterministic structural grouping (Stage 2): OCR tokens -> lines, blocks, regions",
    long_about = "Consumes a Stage 1 OCR artifact and emits a Stage 2 grouping artifact: tokens \
partitioned into lines and blocks by geometry alone, with stable ids and an audit-oriented meta \
section. No ML, no semantic interpretation, no randomness."
)]
struct Args {
    /// Path to the input OCR artifact (JSON).
    input_path: PathBuf,

    /// Path to write the grouping artifact (JSON).
    output_path: PathBuf,

    #[arg(long, default_value_t = 0.0)]
    confidence_floor: f64,

    #[arg(long, default_value_t = false)]
    keep_whitespace_tokens: bool,

    #[arg(long, default_value_t = true)]
    bbox_repair: bool,

    #[arg(long, default_value_t = 0.5)]
    line_y_overlap_threshold: f64,

    #[arg(long, default_value_t = 0.7)]
    line_y_center_k: f64,

    #[arg(long, default_value_t = 2)]
    min_line_y_tol_px: i64,

    #[arg(long, default_value_t = 1.5)]
    block_y_gap_k: f64,

    #[arg(long, default_value_t = 2)]
    min_block_gap_px: i64,

    #[arg(long, default_value_t = 0.1)]
    block_x_overlap_threshold: f64,

    #[arg(long, default_value_t = false)]
    disable_regions: bool,

    #[arg(long, default_value_t = false)]
    enable_cell_candidates: bool,

    /// Recorded in the output's meta.config for provenance; has no effect
    /// on the artifact, which never carries token text.
    #[arg(long, default_value_t = false)]
    omit_text_fields: bool,
}

impl From<&Args> for GroupingConfig {
    fn from(args: &Args) -> Self {
        GroupingConfig {
            bbox_repair: args.bbox_repair,
            block_x_overlap_threshold: args.block_x_overlap_threshold,
            block_y_gap_k: args.block_y_gap_k,
            confidence_floor: args.confidence_floor,
            disable_regions: args.disable_regions,
            enable_cell_candidates: args.enable_cell_candidates,
            keep_whitespace_tokens: args.keep_whitespace_tokens,
            line_y_center_k: args.line_y_center_k,
            line_y_overlap_threshold: args.line_y_overlap_threshold,
            min_block_gap_px: args.min_block_gap_px,
            min_line_y_tol_px: args.min_line_y_tol_px,
            omit_text_fields: args.omit_text_fields,
        }
    }
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
}

fn run(args: Args) -> drawgroup_core::Result<()> {
    let config: GroupingConfig = (&args).into();
    config.validate()?;

    let doc = read_ocr_document(&args.input_path)?;
    let artifact = group_document(&doc, &config)?;
    write_artifact_atomically(&args.output_path, &artifact)?;

    println!(
        "{} grouped {} page(s): {} lines, {} blocks -> {}",
        "✓".green().bold(),
        artifact.pages.len(),
        artifact.meta.counts.n_lines,
        artifact.meta.counts.n_blocks,
        args.output_path.display().to_string().cyan().underline()
    );
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "✗".red().bold());
            ExitCode::FAILURE
        }
    }
}
