//! Append-only JSONL activity log with graceful degradation.

pub mod jsonl;
