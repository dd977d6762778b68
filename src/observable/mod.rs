//! # Observables and the nodes behind them.
//!
//! ```text
//!   Source ──► Lift(op) ──► Lift(op) ──► Published ──┬──► target
//!     ▲                                              ├──► target
//!   Producer                                         └──► target
//!
//!   Observable A ─┐
//!   Observable B ─┼─► merge ──► one feed
//!   Observable C ─┘
//! ```
//!
//! - [`Producer`] / [`ProducerFn`]: what a leaf source runs per subscription.
//! - [`Operator`] / [`OperatorFn`]: what a lifted stage runs per notification.
//! - [`Observable`]: the public handle tying them together.

mod broadcast;
mod lift;
mod merge;
mod observable;
mod operator;
mod source;

pub(crate) use observable::Subscribe;

pub use observable::Observable;
pub use operator::{Operator, OperatorFn};
pub use source::{BoxProducerFuture, Producer, ProducerFn};
