//! Scoring progress display

pub mod reporter;
