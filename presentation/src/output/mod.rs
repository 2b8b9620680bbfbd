//! Report output

pub mod console;
