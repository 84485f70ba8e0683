//! Shared test utilities for the git2consul workspace.
//!
//! This crate provides standardised fixtures so that crate test suites do not
//! each grow their own git setup code. It is a dev-dependency only and is
//! never published.
//!
//! # Modules
//!
//! - [`git`]: an upstream repository fixture driven through `git2`
//! - [`tree`]: helpers for laying out plain directory trees

pub mod git;
pub mod tree;

pub use git::UpstreamRepo;
