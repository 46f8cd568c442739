//! Shared test utilities for lyricset integration tests.
//!
//! This module provides:
//! - `TestHarness` for running the pipeline against a temp output directory
//! - `FakeSource` and builders for scripting lookup outcomes

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
