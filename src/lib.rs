//! Flock - church membership and attendance directory
//!
//! Flock keeps member and attendance records in process-local stores and
//! answers the questions a directory front-end asks of them: family-aware
//! search, household lookup, status filters and aggregate statistics.

pub mod domain;
pub mod error;
pub mod id;
pub mod report;
pub mod seed;
pub mod store;

pub use error::{FlockError, Result};
