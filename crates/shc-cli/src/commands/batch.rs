//! Batch processing command for multiple OCR text files and card images.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use shc_core::{CardExtractor, CardParser, CardScanner, PureOcrEngine, ShcConfig, ShcRecord};

use super::load_config;
use super::output::{format_record, OutputFormat};
use super::scan::{build_scanner, scan_file};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers for text files
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Text,
    Image,
}

fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
    match ext.as_str() {
        "txt" => Some(InputKind::Text),
        "png" | "jpg" | "jpeg" | "webp" | "tiff" | "tif" | "bmp" => Some(InputKind::Image),
        _ => None,
    }
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    record: Option<ShcRecord>,
    warnings: Vec<String>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl FileOutcome {
    fn success(path: PathBuf, record: ShcRecord, warnings: Vec<String>, started: Instant) -> Self {
        Self {
            path,
            record: Some(record),
            warnings,
            error: None,
            processing_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn failure(path: PathBuf, error: impl ToString, started: Instant) -> Self {
        Self {
            path,
            record: None,
            warnings: Vec::new(),
            error: Some(error.to_string()),
            processing_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }

    // Expand glob pattern
    let files: Vec<(PathBuf, InputKind)> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter_map(|p| input_kind(&p).map(|kind| (p, kind)))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut slots: Vec<Option<FileOutcome>> = (0..files.len()).map(|_| None).collect();

    // Text files are pure CPU work and run on the blocking pool
    let parser = Arc::new(CardParser::from_config(&config.extraction));
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, (path, kind)) in files.iter().enumerate() {
        if *kind != InputKind::Text {
            continue;
        }
        let path = path.clone();
        let parser = Arc::clone(&parser);
        let permits = Arc::clone(&permits);

        tasks.spawn(async move {
            let started = Instant::now();
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (index, FileOutcome::failure(path, e, started)),
            };

            let job_path = path.clone();
            let outcome = match tokio::task::spawn_blocking(move || parse_text_file(&job_path, &parser)).await {
                Ok(Ok((record, warnings))) => FileOutcome::success(path, record, warnings, started),
                Ok(Err(e)) => FileOutcome::failure(path, e, started),
                Err(e) => FileOutcome::failure(path, e, started),
            };
            (index, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined?;
        slots[index] = Some(outcome);
        overall_pb.inc(1);
    }

    // Images share one engine, loaded on first use
    let mut scanner: Option<CardScanner<PureOcrEngine>> = None;
    for (index, (path, kind)) in files.iter().enumerate() {
        if *kind != InputKind::Image {
            continue;
        }
        let started = Instant::now();
        let outcome = match scan_image(&mut scanner, &config, path) {
            Ok((record, warnings)) => FileOutcome::success(path.clone(), record, warnings, started),
            Err(e) => FileOutcome::failure(path.clone(), e, started),
        };
        slots[index] = Some(outcome);
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let results: Vec<FileOutcome> = slots.into_iter().flatten().collect();

    for result in &results {
        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }
        for warning in &result.warnings {
            debug!("{}: {}", result.path.display(), warning);
        }
    }

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(record) = &result.record {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("card");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_record(record, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results, &config)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.record.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn parse_text_file(path: &Path, parser: &CardParser) -> anyhow::Result<(ShcRecord, Vec<String>)> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        anyhow::bail!("No text in file");
    }

    let result = parser.parse(&text);
    Ok((result.record, result.warnings))
}

fn scan_image(
    scanner: &mut Option<CardScanner<PureOcrEngine>>,
    config: &ShcConfig,
    path: &Path,
) -> anyhow::Result<(ShcRecord, Vec<String>)> {
    if scanner.is_none() {
        debug!("Loading OCR models from {}", config.ocr.model_dir.display());
        *scanner = Some(build_scanner(config)?);
    }

    match scanner.as_ref() {
        Some(scanner) => {
            let report = scan_file(scanner, path)?;
            Ok((report.record, report.warnings))
        }
        None => anyhow::bail!("OCR engine unavailable"),
    }
}

fn write_summary(path: &Path, results: &[FileOutcome], config: &ShcConfig) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let codes: Vec<&str> = config
        .extraction
        .vocabulary
        .nutrients
        .iter()
        .map(|rule| rule.code.as_str())
        .collect();

    let mut header = vec!["filename", "status", "shc_number", "farmer_name"];
    header.extend(codes.iter().copied());
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut row = vec![filename];
        match &result.record {
            Some(record) => {
                row.push("success".to_string());
                row.push(record.card_metadata.shc_number.clone().unwrap_or_default());
                row.push(record.farmer_details.name.clone().unwrap_or_default());
                for code in &codes {
                    row.push(
                        record
                            .nutrients
                            .get(*code)
                            .map(|reading| reading.value.to_string())
                            .unwrap_or_default(),
                    );
                }
            }
            None => {
                row.push("error".to_string());
                row.extend(std::iter::repeat_n(String::new(), codes.len() + 2));
            }
        }
        row.push(result.processing_time_ms.to_string());
        row.push(result.error.clone().unwrap_or_default());

        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
