pub mod batch;
pub mod jsonl;
pub mod record;

pub use batch::Batch;
pub use record::Record;
