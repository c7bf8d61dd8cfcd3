//! Domain types for Flock
//!
//! This module contains all core domain types:
//! - Member: a person in the directory, optionally grouped into a family unit
//! - AttendanceRecord: one presence/absence entry for a member at an event
//!
//! Each record comes with a creation payload (`New*`) that carries no id and
//! a partial-update structure (`*Patch`) used by the stores' merge semantics.

pub mod attendance;
pub mod member;

pub use attendance::{AttendancePatch, AttendanceRecord, AttendanceStats, EventType, NewAttendance};
pub use member::{FamilyOption, Member, MemberPatch, MemberStats, MemberStatus, NewMember};

use serde::{Deserialize, Deserializer};

/// Distinguish an explicit `null` from a missing key in patch payloads
///
/// Used with `#[serde(default)]`: a missing key stays `None`, while any
/// present value (including `null`) becomes `Some(..)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
