//! # CLI Module
//!
//! Command-line interface for the dataset preparation pipelines.
//!
//! ## Usage
//! ```bash
//! # Gather frames from several folders into one training class
//! dataset-prep collect --target train/0_real frames/real frames/youtube
//!
//! # Several targets back to back
//! dataset-prep collect --manifest jobs.json
//!
//! # Face crops, mirrored into des/
//! dataset-prep crop --input src --output des --model seeta_fd_frontal_v1.0.bin
//!
//! # JSON summary for scripting
//! dataset-prep --format json crop --input src --output des
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use dataset_prep::core::collect::{load_manifest, run_jobs, CollectJob, CollectResult, CopyOutcome};
use dataset_prep::core::crop::{CropPipeline, CropResult, NormalizeOutcome};
use dataset_prep::core::face::{FaceDetector, NoFaceDetector, DEFAULT_MIN_FACE_SIZE};
use dataset_prep::core::normalize::{NormalizeConfig, DEFAULT_CANVAS_SIZE, DEFAULT_FACE_PADDING};
use dataset_prep::core::pool::{default_crop_workers, DEFAULT_COPY_WORKERS};
use dataset_prep::error::{PrepError, Result};
use dataset_prep::events::{
    CollectEvent, CropEvent, Event, EventChannel, EventReceiver, PipelineEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// Prepare image datasets: dedup-copy and face-crop normalization
#[derive(Parser, Debug)]
#[command(name = "dataset-prep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// No progress bar, warnings and errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Summary format
    #[arg(short, long, global = true, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy images from files and folders into one flat directory
    Collect {
        /// Directory to copy into (created if missing)
        #[arg(short, long, required_unless_present = "manifest")]
        target: Option<PathBuf>,

        /// JSON list of {"target", "sources"} jobs, run in order
        #[arg(short, long, conflicts_with_all = ["target", "sources"])]
        manifest: Option<PathBuf>,

        /// Maximum concurrent copies
        #[arg(short, long, default_value_t = DEFAULT_COPY_WORKERS)]
        workers: usize,

        /// Image files or directories to gather from
        #[arg(required_unless_present = "manifest")]
        sources: Vec<PathBuf>,
    },

    /// Crop faces and letterbox them onto a fixed canvas
    Crop {
        /// Directory tree to read (repeatable)
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Root of the mirrored output tree
        #[arg(short, long)]
        output: PathBuf,

        /// SeetaFace model file; without it every image keeps its full frame
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Smallest face edge in pixels the model looks for
        #[arg(
            long,
            requires = "model",
            default_value_t = DEFAULT_MIN_FACE_SIZE,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        min_face: u32,

        /// Maximum concurrent images (default: one per core)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Canvas size as WxH, or N for a square
        #[arg(long, value_parser = parse_canvas, default_value_t = default_canvas())]
        canvas: Canvas,

        /// Margin around the face, as a fraction of its size
        #[arg(long, default_value_t = DEFAULT_FACE_PADDING)]
        padding: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Canvas {
    width: u32,
    height: u32,
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn default_canvas() -> Canvas {
    Canvas {
        width: DEFAULT_CANVAS_SIZE,
        height: DEFAULT_CANVAS_SIZE,
    }
}

fn parse_canvas(value: &str) -> std::result::Result<Canvas, String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("`{}` is not a positive size", s))
    };
    match value.split_once(['x', 'X']) {
        Some((w, h)) => Ok(Canvas {
            width: parse(w)?,
            height: parse(h)?,
        }),
        None => {
            let side = parse(value)?;
            Ok(Canvas {
                width: side,
                height: side,
            })
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    dataset_prep::init_tracing(level);

    let show_progress = !cli.quiet && matches!(cli.format, OutputFormat::Pretty);

    match cli.command {
        Commands::Collect {
            target,
            manifest,
            workers,
            sources,
        } => {
            let jobs = match (manifest, target) {
                (Some(manifest), _) => load_manifest(&manifest)?,
                (None, Some(target)) => vec![CollectJob { target, sources }],
                (None, None) => {
                    return Err(PrepError::Config(
                        "either --target or --manifest is required".to_string(),
                    ))
                }
            };
            run_collect(&jobs, workers, cli.format, show_progress, cli.verbose)
        }
        Commands::Crop {
            inputs,
            output,
            model,
            min_face,
            workers,
            canvas,
            padding,
        } => {
            let detector = build_detector(model.as_deref(), min_face)?;
            let pipeline = CropPipeline::builder()
                .inputs(inputs)
                .output(output)
                .detector(detector)
                .max_workers(workers.unwrap_or_else(default_crop_workers))
                .normalize(
                    NormalizeConfig::default()
                        .canvas(canvas.width, canvas.height)
                        .face_padding(padding),
                )
                .build();
            run_crop(&pipeline, cli.format, show_progress, cli.verbose)
        }
    }
}

fn build_detector(model: Option<&Path>, min_face: u32) -> Result<Arc<dyn FaceDetector>> {
    match model {
        Some(path) => load_model(path, min_face),
        None => {
            warn!("No face model given; every image is normalized from its full frame");
            Ok(Arc::new(NoFaceDetector))
        }
    }
}

#[cfg(feature = "rustface")]
fn load_model(path: &Path, min_face: u32) -> Result<Arc<dyn FaceDetector>> {
    let detector = dataset_prep::core::face::RustfaceDetector::from_model_file(path)
        .map_err(|e| PrepError::Config(e.to_string()))?
        .min_face_size(min_face);
    Ok(Arc::new(detector))
}

#[cfg(not(feature = "rustface"))]
fn load_model(path: &Path, _min_face: u32) -> Result<Arc<dyn FaceDetector>> {
    Err(PrepError::Config(format!(
        "--model {} needs a build with the `rustface` feature",
        path.display()
    )))
}

fn run_collect(
    jobs: &[CollectJob],
    workers: usize,
    format: OutputFormat,
    show_progress: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    if matches!(format, OutputFormat::Pretty) {
        print_header(&term);
    }

    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_progress(receiver, show_progress, verbose);

    let results = run_jobs(jobs, workers, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let results = results?;
    match format {
        OutputFormat::Pretty => {
            for result in &results {
                print_collect_pretty(&term, result, verbose);
            }
        }
        OutputFormat::Json => print_collect_json(&results),
    }
    Ok(())
}

fn run_crop(
    pipeline: &CropPipeline,
    format: OutputFormat,
    show_progress: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    if matches!(format, OutputFormat::Pretty) {
        print_header(&term);
    }

    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_progress(receiver, show_progress, verbose);

    let result = pipeline.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();

    let result = result?;
    match format {
        OutputFormat::Pretty => print_crop_pretty(&term, &result, verbose),
        OutputFormat::Json => print_crop_json(&result),
    }
    Ok(())
}

/// Drain events on a separate thread, driving one progress bar per pool run
fn spawn_progress(receiver: EventReceiver, show: bool, verbose: bool) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut bar: Option<ProgressBar> = None;
        for event in receiver.iter() {
            if !show {
                continue;
            }
            match event {
                Event::Collect(CollectEvent::Started { total, target }) => {
                    let pb = new_bar(total);
                    pb.set_message(format!("-> {}", target.display()));
                    bar = Some(pb);
                }
                Event::Crop(CropEvent::Started { total }) => {
                    bar = Some(new_bar(total));
                }
                Event::Collect(CollectEvent::Progress(p)) | Event::Crop(CropEvent::Progress(p)) => {
                    if let Some(ref pb) = bar {
                        pb.set_position(p.completed as u64);
                        if verbose {
                            pb.set_message(
                                p.current_path
                                    .file_name()
                                    .unwrap_or_default()
                                    .to_string_lossy()
                                    .into_owned(),
                            );
                        }
                    }
                }
                Event::Collect(CollectEvent::Completed { .. })
                | Event::Crop(CropEvent::Completed { .. }) => {
                    if let Some(pb) = bar.take() {
                        pb.finish_and_clear();
                    }
                }
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = bar {
                        pb.set_message(format!("{}", phase));
                    }
                }
                _ => {}
            }
        }
        if let Some(pb) = bar {
            pb.finish_and_clear();
        }
    })
}

fn new_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(bar_style);
    pb
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("dataset-prep").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_collect_pretty(term: &Term, result: &CollectResult, verbose: bool) {
    term.write_line(&format!(
        "{} Collected into {}",
        style("✓").green().bold(),
        style(result.target.display()).bold()
    ))
    .ok();
    term.write_line(&format!(
        "  {} copied in {:.1}s",
        style(result.copied()).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if result.failed() > 0 {
        term.write_line(&format!("  {} failed", style(result.failed()).red()))
            .ok();
        for outcome in &result.outcomes {
            if let CopyOutcome::Failed { source, error } = outcome {
                term.write_line(&format!(
                    "    {} {}: {}",
                    style("✗").red(),
                    source.display(),
                    style(error).dim()
                ))
                .ok();
            }
        }
    }

    print_scan_errors(term, &result.scan_errors);

    if verbose {
        for outcome in &result.outcomes {
            if let CopyOutcome::Copied {
                source,
                destination,
            } = outcome
            {
                term.write_line(&format!(
                    "    {} {} -> {}",
                    style("○").dim(),
                    source.display(),
                    destination.display()
                ))
                .ok();
            }
        }
    }
    term.write_line("").ok();
}

fn print_crop_pretty(term: &Term, result: &CropResult, verbose: bool) {
    term.write_line(&format!(
        "{} Normalized into {}",
        style("✓").green().bold(),
        style(result.output.display()).bold()
    ))
    .ok();
    term.write_line(&format!(
        "  {} images written in {:.1}s",
        style(result.normalized()).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} with a detected face, {} full frame",
        style(result.faces_found()).cyan(),
        style(result.normalized() - result.faces_found()).yellow()
    ))
    .ok();

    if result.skipped() > 0 {
        term.write_line(&format!("  {} skipped", style(result.skipped()).red()))
            .ok();
        for outcome in &result.outcomes {
            if let NormalizeOutcome::Skipped { source, error } = outcome {
                term.write_line(&format!(
                    "    {} {}: {}",
                    style("✗").red(),
                    source.display(),
                    style(error).dim()
                ))
                .ok();
            }
        }
    }

    print_scan_errors(term, &result.scan_errors);

    if verbose {
        for outcome in &result.outcomes {
            if let NormalizeOutcome::Normalized {
                destination,
                details,
                ..
            } = outcome
            {
                let marker = if details.face_found() {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!("    {} {}", marker, destination.display()))
                    .ok();
            }
        }
    }
    term.write_line("").ok();
}

fn print_scan_errors(term: &Term, errors: &[String]) {
    for message in errors {
        term.write_line(&format!("  {} {}", style("!").yellow(), message))
            .ok();
    }
}

fn print_collect_json(results: &[CollectResult]) {
    let jobs: Vec<serde_json::Value> = results
        .iter()
        .map(|r| {
            serde_json::json!({
                "target": r.target,
                "copied": r.copied(),
                "failed": r.failed(),
                "duration_ms": r.duration_ms,
                "scan_errors": r.scan_errors,
                "outcomes": r.outcomes.iter().map(|o| match o {
                    CopyOutcome::Copied { source, destination } => serde_json::json!({
                        "source": source,
                        "destination": destination,
                    }),
                    CopyOutcome::Failed { source, error } => serde_json::json!({
                        "source": source,
                        "error": error.to_string(),
                    }),
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    println!("{:#}", serde_json::Value::Array(jobs));
}

fn print_crop_json(result: &CropResult) {
    let output = serde_json::json!({
        "output": result.output,
        "normalized": result.normalized(),
        "faces_found": result.faces_found(),
        "skipped": result.skipped(),
        "duration_ms": result.duration_ms,
        "scan_errors": result.scan_errors,
        "outcomes": result.outcomes.iter().map(|o| match o {
            NormalizeOutcome::Normalized { source, destination, details } => serde_json::json!({
                "source": source,
                "destination": destination,
                "face": details.face,
                "crop": details.crop,
            }),
            NormalizeOutcome::Skipped { source, error } => serde_json::json!({
                "source": source,
                "error": error.to_string(),
            }),
        }).collect::<Vec<_>>(),
    });

    println!("{:#}", output);
}
