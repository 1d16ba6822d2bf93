//! Report pipeline and domain logic for crtrack.
//!
//! This crate ties together input loading, work-block scanning, assignment
//! indexing, and digest rendering into one end-to-end run (`run_report`).

pub mod assignments;
pub mod digest;
pub mod matrix;
pub mod pipeline;
pub mod sources;
pub mod writer;
