// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `run_pass`: one pass over all sources (dedup → deliver → record)
//! - `run_scheduler`: the forever loop driving passes on an interval

pub mod dispatch;
pub mod poll;
pub mod scheduler;

pub use dispatch::{DeliveryOutcome, Dispatch, TelegramDispatcher};
pub use poll::{PassOutcome, run_pass};
pub use scheduler::run_scheduler;
