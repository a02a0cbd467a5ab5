//! Artifact scanner: recursive directory walker and streaming digester.

pub mod digest;
pub mod walker;
