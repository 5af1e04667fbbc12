use crate::config::Config;
use crate::dataset::{Batch, Record};
use crate::defaults;
use crate::error::{PhonorateError, Result};
use crate::phonemize::Phonemizer;
use crate::rate::{BatchAnnotation, ColumnNames, FailureKind, RateAnnotator, RecordFailure};
use crossbeam_channel::unbounded;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How a split is cut up and spread over workers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationJob {
    pub num_workers: usize,
    pub batch_size: usize,
    pub columns: ColumnNames,
}

impl Default for AnnotationJob {
    fn default() -> Self {
        Self {
            num_workers: defaults::NUM_WORKERS,
            batch_size: defaults::BATCH_SIZE,
            columns: ColumnNames::default(),
        }
    }
}

impl AnnotationJob {
    pub fn from_config(config: &Config) -> Self {
        Self {
            num_workers: config.pipeline.num_workers,
            batch_size: config.rate.batch_size,
            columns: config.columns.clone(),
        }
    }
}

/// Result of annotating a whole split.
#[derive(Debug, Clone)]
pub struct AnnotationReport {
    /// Every input record, in input order, with outputs set (or null on failure).
    pub records: Vec<Record>,
    /// Failed records, indexed into `records`.
    pub failures: Vec<RecordFailure>,
    pub batches: usize,
    pub workers: usize,
    pub elapsed: Duration,
}

impl AnnotationReport {
    pub fn annotated(&self) -> usize {
        self.records.len() - self.failures.len()
    }

    pub fn failure_counts(&self) -> BTreeMap<FailureKind, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind).or_insert(0) += 1;
        }
        counts
    }
}

struct BatchJob {
    seq: usize,
    offset: usize,
    batch: Batch,
}

enum WorkerMessage {
    Done {
        seq: usize,
        offset: usize,
        result: Result<BatchAnnotation>,
    },
    SetupFailed {
        worker: usize,
        error: PhonorateError,
    },
}

/// Annotate `records` in fixed-size batches on a pool of worker threads.
///
/// `factory` is called once per worker, on that worker's thread, so every
/// worker owns its own phonemizer. Under the abort policy the first failing
/// batch stops the remaining workers and its error is returned with the
/// record index translated to the position in `records`.
pub fn run_annotation<P, F>(
    records: Vec<Record>,
    job: &AnnotationJob,
    factory: F,
) -> Result<AnnotationReport>
where
    P: Phonemizer,
    F: Fn(usize) -> Result<RateAnnotator<P>> + Sync,
{
    let started = Instant::now();
    let total = records.len();
    let batches = split_into_batches(records, job.batch_size.max(1));
    let batch_count = batches.len();

    if batch_count == 0 {
        return Ok(AnnotationReport {
            records: Vec::new(),
            failures: Vec::new(),
            batches: 0,
            workers: 0,
            elapsed: started.elapsed(),
        });
    }

    let workers = job.num_workers.clamp(1, batch_count);
    info!(records = total, batches = batch_count, workers, "annotating speaking rate");

    let (job_tx, job_rx) = unbounded();
    for batch in batches {
        job_tx
            .send(batch)
            .map_err(|_| PhonorateError::Other("batch queue closed".to_string()))?;
    }
    drop(job_tx);

    let (result_tx, result_rx) = unbounded();
    let cancelled = AtomicBool::new(false);
    let mut slots: Vec<Option<(usize, BatchAnnotation)>> = (0..batch_count).map(|_| None).collect();
    let mut first_error: Option<(usize, PhonorateError)> = None;

    thread::scope(|scope| {
        let factory = &factory;
        let cancelled = &cancelled;
        let columns = &job.columns;

        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                let mut annotator = match factory(worker) {
                    Ok(annotator) => annotator,
                    Err(error) => {
                        cancelled.store(true, Ordering::SeqCst);
                        if result_tx.send(WorkerMessage::SetupFailed { worker, error }).is_err() {
                            debug!(worker, "result channel closed");
                        }
                        return;
                    }
                };

                for BatchJob { seq, offset, batch } in job_rx.iter() {
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    let result = annotator.annotate_batch(batch, columns);
                    if result.is_err() {
                        cancelled.store(true, Ordering::SeqCst);
                    }
                    if result_tx.send(WorkerMessage::Done { seq, offset, result }).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for message in result_rx.iter() {
            match message {
                WorkerMessage::Done { seq, offset, result: Ok(annotation) } => {
                    debug!(
                        batch = seq,
                        rows = annotation.batch.len(),
                        failures = annotation.failures.len(),
                        "batch annotated"
                    );
                    if let Some(slot) = slots.get_mut(seq) {
                        *slot = Some((offset, annotation));
                    }
                }
                WorkerMessage::Done { seq, offset, result: Err(error) } => {
                    let error = globalize(error, offset);
                    if first_error.as_ref().is_none_or(|(s, _)| seq < *s) {
                        first_error = Some((seq, error));
                    }
                }
                WorkerMessage::SetupFailed { worker, error } => {
                    debug!(worker, error = %error, "worker failed to start");
                    if first_error.is_none() {
                        first_error = Some((usize::MAX, error));
                    }
                }
            }
        }
    });

    if let Some((_, error)) = first_error {
        return Err(error);
    }

    let mut out = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (seq, slot) in slots.into_iter().enumerate() {
        let Some((offset, annotation)) = slot else {
            return Err(PhonorateError::Other(format!("batch {} was never annotated", seq)));
        };
        failures.extend(annotation.failures.into_iter().map(|mut failure| {
            failure.index += offset;
            failure
        }));
        out.extend(annotation.batch.into_records());
    }

    let report = AnnotationReport {
        records: out,
        failures,
        batches: batch_count,
        workers,
        elapsed: started.elapsed(),
    };
    info!(
        annotated = report.annotated(),
        failed = report.failures.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "annotation finished"
    );
    Ok(report)
}

fn split_into_batches(records: Vec<Record>, batch_size: usize) -> Vec<BatchJob> {
    let mut jobs = Vec::with_capacity(records.len().div_ceil(batch_size));
    let mut pending = Vec::with_capacity(batch_size);
    let mut offset = 0;

    for record in records {
        pending.push(record);
        if pending.len() == batch_size {
            let rows = std::mem::replace(&mut pending, Vec::with_capacity(batch_size));
            jobs.push(BatchJob {
                seq: jobs.len(),
                offset,
                batch: Batch::from_records(rows),
            });
            offset += batch_size;
        }
    }
    if !pending.is_empty() {
        jobs.push(BatchJob {
            seq: jobs.len(),
            offset,
            batch: Batch::from_records(pending),
        });
    }
    jobs
}

/// Rewrite a batch-relative record index into a split-relative one.
fn globalize(error: PhonorateError, offset: usize) -> PhonorateError {
    match error {
        PhonorateError::RecordFailed { index, source } => PhonorateError::RecordFailed {
            index: offset + index,
            source,
        },
        other => other,
    }
}
