//! TIC core library: streaming decoder for the utility-meter telemetry link.
//!
//! The link is an endless serial feed of frames (`0x02`…`0x03`), each holding
//! datasets (`0x0A`…`0x0D`) made of a name, an optional timestamp, a value and
//! a checksum. Two generations share the wire: "historic" separates fields
//! with a space, "standard" with a tab, and the two disagree on what the
//! checksum covers.
//!
//! The crate is organised like a small pipeline: byte sources feed the
//! decoder one byte at a time, and the analysis layer aggregates decoded
//! datasets into a deterministic report. All I/O lives in `source`; the
//! decoder itself is a pure state machine that never blocks.
//!
//! Invariants:
//! - The accumulation buffer never exceeds its capacity.
//! - Every decode error sends the decoder back to frame search; feeding more
//!   bytes always resynchronizes.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use tic_core::{DecoderConfig, decode_capture_file};
//!
//! let report = decode_capture_file(Path::new("capture.tic"), DecoderConfig::default())?;
//! println!("datasets: {}", report.summary.datasets_total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod config;
pub mod protocol;
mod source;

pub use analysis::{AnalysisError, analyze_source, decode_capture_file};
pub use config::{ConfigError, DecoderConfig, FieldLimits, OverflowPolicy};
pub use protocol::{
    Dataset, DecodeError, Decoder, DecoderState, DecoderStats, ErrorKind, Generation, Outcome,
};
pub use source::{ByteSource, ReaderSource, SliceSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the capture has no modification time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoding report for one capture, with deterministic ordering.
///
/// # Examples
/// ```
/// use tic_core::{DecoderConfig, make_stub_report};
///
/// let report = make_stub_report("capture.tic", 123, DecoderConfig::default());
/// assert_eq!(report.report_version, tic_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the capture.
    pub generated_at: String,
    /// Input capture metadata.
    pub input: InputInfo,
    /// Decoder configuration the report was produced with.
    pub config: DecoderConfig,
    /// Stream-level counters.
    pub summary: StreamSummary,
    /// Decode errors by kind, only kinds that occurred.
    pub errors: Vec<ErrorSummary>,
    /// Per-name summaries sorted by name.
    pub labels: Vec<LabelSummary>,
    /// Every decoded dataset in stream order.
    pub datasets: Vec<Dataset>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Stream-level counters.
///
/// # Examples
/// ```
/// use tic_core::StreamSummary;
///
/// let summary = StreamSummary::default();
/// assert_eq!(summary.datasets_total, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Bytes fed to the decoder.
    pub bytes_total: u64,
    /// Frame start markers accepted.
    pub frames_started: u64,
    /// Frames closed by a frame stop marker.
    pub frames_completed: u64,
    /// Datasets decoded.
    pub datasets_total: u64,
    /// Datasets with at least one field clipped to its cap.
    pub datasets_truncated: u64,
    pub historic_datasets: u64,
    pub standard_datasets: u64,
    /// Decode errors of any kind.
    pub errors_total: u64,
}

/// Count of one decode error kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub count: u64,
    /// At most three occurrences, formatted as `byte <offset>: <message>`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Summary of every dataset sharing one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSummary {
    pub name: String,
    /// Generation of the last dataset with this name.
    pub generation: Generation,
    pub count: u64,
    pub last_value: String,
    /// Timestamp of the last dataset, when it carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use tic_core::{DecoderConfig, make_stub_report};
///
/// let report = make_stub_report("capture.tic", 123, DecoderConfig::default());
/// assert!(report.datasets.is_empty());
/// assert_eq!(report.input.bytes, 123);
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64, config: DecoderConfig) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "tic".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        config,
        summary: StreamSummary::default(),
        errors: vec![],
        labels: vec![],
        datasets: vec![],
    }
}
