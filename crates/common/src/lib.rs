//! Shared value types used across the stagetext crates.

pub mod types;

pub use types::{Locale, LocaleError, NodeId};
