//! Data-access layer for Flock.
//!
//! Two independent stores own their in-memory collections:
//! - **MemberStore**: members, family-aware search, household lookup, stats
//! - **AttendanceStore**: attendance records, member/date/event filters, stats
//!
//! Every operation awaits a [`Latency`] first and returns copies of the
//! stored records.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use flock::seed::Seed;
//! use flock::store::{MemberStore, NoLatency};
//!
//! # async fn demo() -> flock::Result<()> {
//! let seed = Seed::embedded()?;
//! let members = MemberStore::new(seed.members, Arc::new(NoLatency));
//!
//! let smiths = members.search("smith").await?;
//! let stats = members.get_stats().await?;
//! # Ok(())
//! # }
//! ```

mod attendance;
mod collection;
mod latency;
mod members;

pub use attendance::AttendanceStore;
pub use collection::{Collection, Record};
pub use latency::{Latency, NoLatency, Operation, SimulatedLatency};
pub use members::MemberStore;
