//! # Push-driven sources.

mod subject;

pub use subject::Subject;
