//! The sync controller
//!
//! Owns the mirror and the store for the lifetime of the process and runs
//! one sync cycle per polling interval.

mod controller;

pub use controller::{CycleReport, SyncController};
