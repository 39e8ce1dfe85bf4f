//! Common utilities for thicket.
//!
//! This crate provides shared infrastructure used by all thicket components:
//! - **Warning System** - deduplicated warnings routed through `tracing`

pub mod warning;
