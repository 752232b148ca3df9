//! Release resolution and retrieval.
//!
//! # Sub-modules
//!
//! - [`version`] - Version selectors and archive filename construction.
//! - [`download`] - Release client trait and HTTP implementation.

pub mod download;
pub mod version;
