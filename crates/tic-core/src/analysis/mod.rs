use std::fs::Metadata;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::config::{ConfigError, DecoderConfig};
use crate::protocol::{Decoder, Generation, Outcome};
use crate::source::{ByteSource, ReaderSource, SourceError};
use crate::{DEFAULT_GENERATED_AT, Report, StreamSummary, make_stub_report};

mod errors;
mod labels;

use errors::ErrorTally;
use labels::LabelTally;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Invalid decoder configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Decode a recorded capture file into a report.
///
/// `generated_at` is the modification time of the capture when the
/// filesystem provides one.
pub fn decode_capture_file(path: &Path, config: DecoderConfig) -> Result<Report, AnalysisError> {
    let meta = path.metadata()?;
    let source = ReaderSource::open(path)?;
    let mut report = analyze_source(&path.display().to_string(), meta.len(), source, config)?;
    report.generated_at =
        modified_rfc3339(&meta).unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    Ok(report)
}

/// Run the decoder over `source` until it has no more bytes.
pub fn analyze_source<S: ByteSource>(
    input_path: &str,
    input_bytes: u64,
    mut source: S,
    config: DecoderConfig,
) -> Result<Report, AnalysisError> {
    log::info!("decoding {input_path} ({input_bytes} bytes)");
    let mut decoder = Decoder::new(config)?;
    let mut errors = ErrorTally::default();
    let mut labels = LabelTally::default();
    let mut datasets = Vec::new();

    loop {
        match decoder.drain(&mut source)? {
            Outcome::NeedMore => {
                if !source.fill()? {
                    break;
                }
            }
            Outcome::DatasetReady(dataset) => {
                labels.add(&dataset);
                datasets.push(dataset);
            }
            Outcome::Error(err) => {
                let offset = decoder.stats().bytes.saturating_sub(1);
                errors.add(&err, offset);
            }
        }
    }

    let stats = decoder.stats();
    let count_generation = |generation: Generation| {
        datasets
            .iter()
            .filter(|dataset| dataset.generation == generation)
            .count() as u64
    };

    let mut report = make_stub_report(input_path, input_bytes, config);
    report.summary = StreamSummary {
        bytes_total: stats.bytes,
        frames_started: stats.frames_started,
        frames_completed: stats.frames_completed,
        datasets_total: stats.datasets,
        datasets_truncated: datasets.iter().filter(|dataset| dataset.truncated).count() as u64,
        historic_datasets: count_generation(Generation::Historic),
        standard_datasets: count_generation(Generation::Standard),
        errors_total: stats.errors,
    };
    report.errors = errors.build_summaries();
    report.labels = labels.build_summaries();
    report.datasets = datasets;

    log::info!(
        "decoded {} datasets, {} errors",
        report.summary.datasets_total,
        report.summary.errors_total
    );
    Ok(report)
}

fn modified_rfc3339(meta: &Metadata) -> Option<String> {
    let modified = meta.modified().ok()?;
    OffsetDateTime::from(modified).format(&Rfc3339).ok()
}

#[cfg(test)]
mod tests {
    use super::{AnalysisError, analyze_source};
    use crate::config::{ConfigError, DecoderConfig};
    use crate::protocol::Generation;
    use crate::protocol::encoder::{FrameBuilder, apply_parity};
    use crate::protocol::error::ErrorKind;
    use crate::source::SliceSource;

    #[test]
    fn summary_counts_frames_datasets_and_errors() {
        let mut stream = FrameBuilder::new()
            .dataset(Generation::Historic, "ADCO", "", "031528123456")
            .dataset(Generation::Historic, "IINST", "", "002")
            .finish();
        stream.extend(
            FrameBuilder::new()
                .dataset(Generation::Standard, "SINSTS", "e190223132520", "00290")
                .raw(b"\nIINST 002 Z\r")
                .finish(),
        );
        let wire = apply_parity(&stream);

        let report = analyze_source(
            "memory",
            wire.len() as u64,
            SliceSource::new(&wire),
            DecoderConfig::default(),
        )
        .unwrap();

        assert_eq!(report.summary.bytes_total, wire.len() as u64);
        assert_eq!(report.summary.frames_started, 2);
        assert_eq!(report.summary.frames_completed, 1);
        assert_eq!(report.summary.datasets_total, 3);
        assert_eq!(report.summary.historic_datasets, 2);
        assert_eq!(report.summary.standard_datasets, 1);
        assert_eq!(report.summary.errors_total, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::ChecksumMismatch);
        assert_eq!(report.labels.len(), 3);
        assert_eq!(report.datasets.len(), 3);
    }

    #[test]
    fn empty_source_gives_empty_report() {
        let report =
            analyze_source("memory", 0, SliceSource::new(&[]), DecoderConfig::default()).unwrap();
        assert_eq!(report.summary.bytes_total, 0);
        assert!(report.datasets.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn oversized_caps_fail_before_decoding() {
        let config = DecoderConfig::default().with_value_max(usize::MAX);
        let err = analyze_source("memory", 0, SliceSource::new(&[]), config).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}
