//! depsnap - node_modules snapshots in git
//!
//! Caches fully installed dependency trees as tagged commits in a
//! dedicated repository, keyed by a content hash of package.json.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod tools;

pub use error::{DepsnapError, DepsnapResult};
