use crate::dataset::Record;
use crate::filter::{Rejection, ValidityFilter};
use std::collections::BTreeMap;
use std::panic;
use std::thread;
use tracing::{debug, info};

/// Result of filtering a whole split.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterReport {
    /// Valid records, in input order.
    pub kept: Vec<Record>,
    pub total: usize,
    /// Removed records, by the first check they failed.
    pub rejections: BTreeMap<Rejection, usize>,
}

impl FilterReport {
    pub fn removed(&self) -> usize {
        self.total - self.kept.len()
    }
}

/// Keep only the records `filter` accepts, checking chunks in parallel.
pub fn run_filter(records: Vec<Record>, filter: &ValidityFilter, num_workers: usize) -> FilterReport {
    let total = records.len();
    let workers = num_workers.clamp(1, total.max(1));
    let chunk_size = total.div_ceil(workers).max(1);

    let verdicts: Vec<Option<Rejection>> = thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || chunk.iter().map(|r| filter.rejection(r)).collect::<Vec<_>>())
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    });
    debug!(workers, chunk_size, "validity checked");

    let mut rejections = BTreeMap::new();
    let mut kept = Vec::with_capacity(total);
    for (record, verdict) in records.into_iter().zip(verdicts) {
        match verdict {
            None => kept.push(record),
            Some(rejection) => *rejections.entry(rejection).or_insert(0) += 1,
        }
    }

    let report = FilterReport {
        kept,
        total,
        rejections,
    };
    info!(total, kept = report.kept.len(), removed = report.removed(), "filter finished");
    report
}
