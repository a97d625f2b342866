use std::collections::HashMap;

use crate::LabelSummary;
use crate::protocol::{Dataset, Generation};

#[derive(Debug)]
struct LabelStats {
    count: u64,
    generation: Generation,
    last_value: String,
    last_timestamp: String,
}

/// Per-name dataset counts and last seen values.
#[derive(Debug, Default)]
pub(crate) struct LabelTally {
    per_name: HashMap<String, LabelStats>,
}

impl LabelTally {
    pub(crate) fn add(&mut self, dataset: &Dataset) {
        let entry = self
            .per_name
            .entry(dataset.name.clone())
            .or_insert_with(|| LabelStats {
                count: 0,
                generation: dataset.generation,
                last_value: String::new(),
                last_timestamp: String::new(),
            });
        entry.count += 1;
        entry.generation = dataset.generation;
        entry.last_value.clone_from(&dataset.value);
        entry.last_timestamp.clone_from(&dataset.timestamp);
    }

    pub(crate) fn build_summaries(self) -> Vec<LabelSummary> {
        let mut labels: Vec<LabelSummary> = self
            .per_name
            .into_iter()
            .map(|(name, stats)| LabelSummary {
                name,
                generation: stats.generation,
                count: stats.count,
                last_value: stats.last_value,
                last_timestamp: if stats.last_timestamp.is_empty() {
                    None
                } else {
                    Some(stats.last_timestamp)
                },
            })
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        labels
    }
}
