//! Freshness check for the running build
//!
//! Decides whether the running version is the latest published release without
//! hitting the network on every invocation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Checker   │────▶│    Cache    │     │   Semver    │
//! │  (verdict)  │     │ (file, TTL) │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       ▲
//!        ▼                                       │
//! ┌─────────────┐                                │
//! │   Fetcher   │────────────────────────────────┘
//! │   (HTTP)    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Two-line cache record with a fixed time-to-live
//! - [`checker`]: Orchestrates cache, fetch and comparison into a verdict
//! - [`fetcher`]: Single bounded-timeout request to the version endpoint
//! - [`error`]: Error types for cache, fetch and version parsing
//! - [`semver`]: Version parsing and ordering

pub mod cache;
pub mod checker;
pub mod error;
pub mod fetcher;
pub mod semver;
