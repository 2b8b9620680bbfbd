//! Answers, ratings and the workers who submit them

pub mod answer;
pub mod rating;
pub mod worker;

pub use answer::Answer;
pub use rating::Rating;
pub use worker::Worker;
