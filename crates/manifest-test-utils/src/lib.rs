//! Shared test utilities for the manifest-provenance workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject), a temporary
//!   multi-module Android project with manifests, reports and a graph file
//! - [`merge`]: a deliberately small manifest merger that honours
//!   `tools:node="remove"` and `tools:remove`, for round-trip tests
//! - [`scenario`]: ready-made projects

pub mod merge;
pub mod project;
pub mod scenario;
