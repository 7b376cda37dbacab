//! Scan command - run OCR on a card image and extract card data.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use shc_core::models::config::OcrConfig;
use shc_core::{CardParser, CardScanner, PureOcrEngine, ScanReport, ShcConfig, Upload};

use super::load_config;
use super::output::{format_record, OutputFormat};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Card image (png, jpg, tiff, bmp, webp)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Print extraction warnings and timings to stderr
    #[arg(long)]
    show_warnings: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Scanning card image {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );

    pb.set_message("Loading OCR models...");
    let scanner = build_scanner(&config)?;

    pb.set_message("Running OCR...");
    let report = scan_file(&scanner, &args.input)?;
    pb.finish_and_clear();

    let output = format_record(&report.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_warnings {
        for warning in &report.warnings {
            eprintln!("{} {}", style("!").yellow(), warning);
        }
        eprintln!(
            "{} OCR {}ms, extraction {}ms ({})",
            style("ℹ").blue(),
            report.ocr_time_ms,
            report.extraction_time_ms,
            report.ocr_engine
        );
    }

    Ok(())
}

/// Load the OCR engine and wrap it in a scanner configured from `config`.
pub fn build_scanner(config: &ShcConfig) -> anyhow::Result<CardScanner<PureOcrEngine>> {
    ensure_models(&config.ocr)?;

    let engine = PureOcrEngine::from_config(&config.ocr)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;

    Ok(
        CardScanner::with_extractor(engine, CardParser::from_config(&config.extraction))
            .with_debug(config.debug.clone()),
    )
}

/// Run one image file through the scanner's upload boundary.
pub fn scan_file(scanner: &CardScanner<PureOcrEngine>, path: &Path) -> anyhow::Result<ScanReport> {
    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    debug!("Read {} bytes from {}", bytes.len(), path.display());

    Ok(scanner.scan(Some(Upload::new(filename, bytes)))?)
}

fn ensure_models(ocr: &OcrConfig) -> anyhow::Result<()> {
    if !ocr.models_present() {
        anyhow::bail!(
            "OCR models not found in {}.\n\n\
             Expected {}, {} and {}. Pass --model-dir or set ocr.model_dir in the config.",
            ocr.model_dir.display(),
            ocr.detection_model,
            ocr.recognition_model,
            ocr.dictionary
        );
    }
    Ok(())
}
