//! Attendance record and related types
//!
//! An attendance record is one presence/absence entry for one member at one
//! event instance. `member_id` is advisory: the store never checks it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::id::RecordId;
use crate::store::Record;

/// A single presence/absence entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub member_id: RecordId,
    pub date: DateTime<Utc>,
    pub event_type: EventType,
    pub present: bool,
}

impl AttendanceRecord {
    /// Overwrite every field present in `patch`, keeping the rest
    pub fn apply(&mut self, patch: AttendancePatch) {
        if let Some(v) = patch.member_id {
            self.member_id = v;
        }
        if let Some(v) = patch.date {
            self.date = v;
        }
        if let Some(v) = patch.event_type {
            self.event_type = v;
        }
        if let Some(v) = patch.present {
            self.present = v;
        }
    }
}

impl Record for AttendanceRecord {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// Kind of gathering an attendance record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "sunday service")]
    SundayService,
    #[serde(rename = "wednesday service")]
    WednesdayService,
    #[serde(rename = "bible study")]
    BibleStudy,
    #[serde(rename = "special event")]
    SpecialEvent,
    #[serde(rename = "conference")]
    Conference,
    #[serde(rename = "youth meeting")]
    YouthMeeting,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::SundayService,
        EventType::WednesdayService,
        EventType::BibleStudy,
        EventType::SpecialEvent,
        EventType::Conference,
        EventType::YouthMeeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::SundayService => "sunday service",
            EventType::WednesdayService => "wednesday service",
            EventType::BibleStudy => "bible study",
            EventType::SpecialEvent => "special event",
            EventType::Conference => "conference",
            EventType::YouthMeeting => "youth meeting",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    /// Accepts the display form in any case, with `-` or `_` standing in for spaces
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        EventType::ALL
            .into_iter()
            .find(|event| event.as_str() == normalized)
            .ok_or_else(|| format!("unknown event type: {}", s))
    }
}

/// Payload for creating an attendance record; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub member_id: RecordId,
    pub date: DateTime<Utc>,
    pub event_type: EventType,
    pub present: bool,
}

impl NewAttendance {
    pub fn new(member_id: RecordId, date: DateTime<Utc>, event_type: EventType, present: bool) -> Self {
        Self {
            member_id,
            date,
            event_type,
            present,
        }
    }

    pub fn into_record(self, id: RecordId) -> AttendanceRecord {
        AttendanceRecord {
            id,
            member_id: self.member_id,
            date: self.date,
            event_type: self.event_type,
            present: self.present,
        }
    }
}

/// Partial update for an attendance record; unknown keys (including `Id`) are ignored
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendancePatch {
    pub member_id: Option<RecordId>,
    pub date: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
    pub present: Option<bool>,
}

/// Aggregate attendance counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_records: usize,
    pub present_count: usize,
    pub absent_count: usize,
    /// Whole percent of present records, 0 for an empty collection
    pub attendance_rate: u32,
}

impl AttendanceStats {
    pub fn from_counts(total_records: usize, present_count: usize) -> Self {
        let attendance_rate = if total_records > 0 {
            ((present_count as f64 / total_records as f64) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total_records,
            present_count,
            absent_count: total_records - present_count,
            attendance_rate,
        }
    }
}
