use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use log::LevelFilter;
use serde::Serialize;
use tic_core::{
    ByteSource, Dataset, Decoder, DecoderConfig, Outcome, OverflowPolicy, ReaderSource,
};

#[derive(Parser, Debug)]
#[command(name = "tic")]
#[command(version)]
#[command(
    about = "Decoder for the utility-meter telemetry link (TIC), historic and standard.",
    long_about = None,
    after_help = "Examples:\n  tic decode capture.tic -o report.json\n  tic decode capture.tic --stdout --pretty\n  tic dump /dev/ttyUSB0 --json"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a recorded capture and write a versioned JSON report.
    #[command(
        after_help = "Examples:\n  tic decode capture.tic -o report.json\n  tic decode 'captures/*.tic' --stdout --strict"
    )]
    Decode {
        /// Path (or single-match glob) to a raw TIC capture
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any decode error was counted
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        decoder: DecoderArgs,
    },
    /// Print datasets one per line as they are decoded.
    #[command(after_help = "Examples:\n  tic dump capture.tic\n  tic dump /dev/ttyUSB0 --json")]
    Dump {
        /// Capture file or already configured serial device
        input: PathBuf,

        /// One JSON object per line instead of tab-separated text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        decoder: DecoderArgs,
    },
}

#[derive(Args, Debug)]
struct DecoderArgs {
    /// Field caps preset
    #[arg(long, value_enum, default_value_t = Profile::Standard)]
    profile: Profile,

    /// Behaviour when a dataset outgrows the decoder buffer
    #[arg(long, value_enum, default_value_t = Overflow::Resync)]
    overflow: Overflow,

    /// Override the value cap of the selected profile
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u8).range(1..))]
    value_max: Option<u8>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Profile {
    /// Values up to 98 bytes
    Standard,
    /// Values up to 12 bytes
    Compact,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Overflow {
    /// Drop the dataset silently and wait for the next frame
    Resync,
    /// Drop the dataset and count a payload_too_long error
    Report,
}

impl DecoderArgs {
    fn config(&self) -> DecoderConfig {
        let config = match self.profile {
            Profile::Standard => DecoderConfig::default(),
            Profile::Compact => DecoderConfig::compact(),
        };
        let config = config.with_overflow(match self.overflow {
            Overflow::Resync => OverflowPolicy::Resync,
            Overflow::Report => OverflowPolicy::Report,
        });
        match self.value_max {
            Some(value_max) => config.with_value_max(usize::from(value_max)),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode {
            input,
            report,
            stdout,
            pretty,
            compact: _,
            quiet,
            strict,
            decoder,
        } => cmd_decode(
            input,
            report,
            OutputOptions {
                stdout,
                pretty,
                quiet,
                strict,
            },
            decoder.config(),
        ),
        Commands::Dump {
            input,
            json,
            decoder,
        } => cmd_dump(input, json, decoder.config()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

#[derive(Debug, Clone, Copy)]
struct OutputOptions {
    stdout: bool,
    pretty: bool,
    quiet: bool,
    strict: bool,
}

fn cmd_decode(
    input: PathBuf,
    report: Option<PathBuf>,
    options: OutputOptions,
    config: DecoderConfig,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if options.stdout {
        None
    } else {
        let report_path = report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_output(&report_path, &input_abs)?;
        Some(report_path)
    };

    let rep = tic_core::decode_capture_file(&resolved_input, config)
        .context("TIC capture decoding failed")?;
    let json = serialize_report(&rep, options.pretty)?;

    match report_path {
        None => print!("{}", json),
        Some(report_path) => {
            if let Some(parent) = report_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report_path, json)
                .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
            if !options.quiet {
                eprintln!(
                    "OK: {} datasets, {} errors -> {}",
                    rep.summary.datasets_total,
                    rep.summary.errors_total,
                    report_path.display()
                );
            }
        }
    }

    if options.strict && rep.summary.errors_total > 0 {
        if !options.quiet {
            print_errors(&rep);
        }
        return Err(CliError::new(
            "decode errors detected",
            Some("inspect the report's errors section, or drop --strict".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = match report_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => fs::canonicalize("."),
        Some(parent) => fs::canonicalize(parent),
        None => return Ok(()),
    };
    // A missing output directory is created later and cannot hold the input.
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| CliError::new("invalid report path", None))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &tic_core::Report, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_errors(rep: &tic_core::Report) {
    eprintln!("Decode errors:");
    for entry in &rep.errors {
        eprintln!("  {} ({})", entry.kind.as_str(), entry.count);
    }
}

#[derive(Serialize)]
struct DumpLine<'a> {
    /// 1-based position of the dataset in the session.
    seq: u64,
    #[serde(flatten)]
    dataset: &'a Dataset,
}

fn cmd_dump(input: PathBuf, json: bool, config: DecoderConfig) -> Result<(), CliError> {
    let mut source = ReaderSource::open(&input)
        .with_context(|| format!("Failed to open input: {}", input.display()))
        .map_err(|err| {
            CliError::new(
                format!("{err:#}"),
                Some("pass a capture file or a configured serial device".to_string()),
            )
        })?;
    let mut decoder = Decoder::new(config).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("lower --value-max".to_string()),
        )
    })?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    loop {
        let outcome = decoder
            .drain(&mut source)
            .with_context(|| format!("Failed to read input: {}", input.display()))?;
        match outcome {
            Outcome::NeedMore => {
                let more = source
                    .fill()
                    .with_context(|| format!("Failed to read input: {}", input.display()))?;
                if !more {
                    break;
                }
            }
            Outcome::Error(err) => log::warn!("{err}"),
            Outcome::DatasetReady(dataset) => {
                let seq = decoder.stats().datasets;
                write_dataset(&mut out, seq, &dataset, json).context("Failed to write output")?;
            }
        }
    }

    out.flush().context("Failed to write output")?;
    let stats = decoder.stats();
    log::info!(
        "{} datasets, {} errors, {} bytes",
        stats.datasets,
        stats.errors,
        stats.bytes
    );
    Ok(())
}

fn write_dataset<W: Write>(out: &mut W, seq: u64, dataset: &Dataset, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, &DumpLine { seq, dataset })?;
        writeln!(out)?;
    } else if dataset.has_timestamp() {
        writeln!(
            out,
            "{}\t{}\t{}",
            dataset.name, dataset.timestamp, dataset.value
        )?;
    } else {
        writeln!(out, "{}\t{}", dataset.name, dataset.value)?;
    }
    // Live devices deliver a dataset at a time; show it right away.
    out.flush()?;
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a raw TIC capture file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use `tic dump` to read from a device".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
