//! Parallel passes over a whole dataset split.
//!
//! Both passes preserve input order regardless of how many workers run.

pub mod annotate;
pub mod filter;

pub use annotate::{AnnotationJob, AnnotationReport, run_annotation};
pub use filter::{FilterReport, run_filter};
