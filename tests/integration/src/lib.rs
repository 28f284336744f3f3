//! Integration test utilities for the rating ledger
//!
//! This crate provides a dispatcher harness over the in-memory store or
//! PostgreSQL, plus event builders for end-to-end scenarios.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
