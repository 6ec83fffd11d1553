//! Backend test support utilities
//!
//! Shared helpers for the backend's integration tests: unified logging
//! initialization and generators for unique participant identities.

pub mod logging;
pub mod unique_helpers;
