mod jsonl;

pub use jsonl::{flush_to_jsonl, write_metrics_jsonl};
