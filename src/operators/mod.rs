//! # Built-in operators.
//!
//! Thin [`Operator`](crate::Operator) implementations behind the
//! [`Observable`](crate::Observable) convenience methods.
//!
//! - [`Map`] → `Observable::map`
//! - [`Filter`] → `Observable::filter`
//! - [`Passthrough`] → `Observable::buffered`
//! - [`LogWriter`] → `Observable::log` (feature `logging`)

mod buffer;
mod filter;
#[cfg(feature = "logging")]
mod log;
mod map;

pub use buffer::Passthrough;
pub use filter::Filter;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use map::Map;
