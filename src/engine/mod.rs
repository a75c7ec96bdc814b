//! Tool output interpretation and progress reporting

pub mod progress;
