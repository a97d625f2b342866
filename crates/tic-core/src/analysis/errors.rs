use std::collections::HashMap;

use crate::ErrorSummary;
use crate::protocol::{DecodeError, ErrorKind};

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Default)]
struct ErrorStats {
    count: u64,
    examples: Vec<String>,
}

/// Per-kind decode error counts with the first few occurrences.
#[derive(Debug, Default)]
pub(crate) struct ErrorTally {
    per_kind: HashMap<ErrorKind, ErrorStats>,
}

impl ErrorTally {
    pub(crate) fn add(&mut self, err: &DecodeError, offset: u64) {
        let entry = self.per_kind.entry(err.kind()).or_default();
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry.examples.push(format!("byte {offset}: {err}"));
        }
    }

    /// Summaries for the kinds seen, in [`ErrorKind::ALL`] order.
    pub(crate) fn build_summaries(mut self) -> Vec<ErrorSummary> {
        ErrorKind::ALL
            .iter()
            .filter_map(|kind| {
                self.per_kind.remove(kind).map(|stats| ErrorSummary {
                    kind: *kind,
                    count: stats.count,
                    examples: stats.examples,
                })
            })
            .collect()
    }
}
