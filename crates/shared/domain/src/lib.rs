//! # Domain
//!
//! Plain data shared by every crate of the tracking service: configuration sections,
//! constants, notification recipient flags and the feature slice registry.
//! No I/O lives here.

pub mod config;
pub mod constants;
pub mod recipients;
pub mod registry;
