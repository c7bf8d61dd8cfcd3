//! Dashboard and report aggregation over both stores.
//!
//! The stores never reference each other; everything that combines members
//! with attendance (name resolution, exports, overview figures) lives here.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::{AttendanceRecord, AttendanceStats, Member, MemberStats, MemberStatus};
use crate::error::Result;
use crate::store::{AttendanceStore, MemberStore};

/// Display name for attendance rows whose member no longer exists
pub const UNKNOWN_MEMBER: &str = "Unknown Member";

/// Member entry in the exported report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub name: String,
    pub email: String,
    pub status: MemberStatus,
    pub join_date: DateTime<Utc>,
}

impl From<&Member> for MemberSummary {
    fn from(member: &Member) -> Self {
        Self {
            name: member.full_name(),
            email: member.email.clone(),
            status: member.status,
            join_date: member.join_date,
        }
    }
}

/// Snapshot of directory figures at one instant
///
/// Serializes to the export document
/// `{generatedAt, memberStats, attendanceStats, members}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryReport {
    pub generated_at: DateTime<Utc>,
    pub member_stats: MemberStats,
    pub attendance_stats: AttendanceStats,
    pub members: Vec<MemberSummary>,

    /// Newest members by join date
    #[serde(skip)]
    pub recent_members: Vec<Member>,

    #[serde(skip)]
    all_members: Vec<Member>,
}

impl DirectoryReport {
    /// Gather stats and members from both stores concurrently.
    pub async fn build(members: &MemberStore, attendance: &AttendanceStore, recent_limit: usize) -> Result<Self> {
        let (member_stats, attendance_stats, all_members) =
            futures::try_join!(members.get_stats(), attendance.get_stats(), members.get_all())?;

        log::debug!(
            "Building report: {} members, {} attendance records",
            member_stats.total,
            attendance_stats.total_records
        );

        Ok(Self {
            generated_at: Utc::now(),
            member_stats,
            attendance_stats,
            members: all_members.iter().map(MemberSummary::from).collect(),
            recent_members: recent_members(&all_members, recent_limit),
            all_members,
        })
    }

    /// Count per status, only for statuses present, in order of first appearance.
    pub fn status_breakdown(&self) -> Vec<(MemberStatus, usize)> {
        let mut breakdown: Vec<(MemberStatus, usize)> = Vec::new();
        for member in &self.all_members {
            match breakdown.iter().position(|(status, _)| *status == member.status) {
                Some(index) => breakdown[index].1 += 1,
                None => breakdown.push((member.status, 1)),
            }
        }
        breakdown
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `church-report-YYYY-MM-DD.json`
    pub fn export_file_name(date: NaiveDate) -> String {
        format!("church-report-{}.json", date.format("%Y-%m-%d"))
    }
}

/// Up to `limit` members, newest join date first. Ties keep collection order.
pub fn recent_members(members: &[Member], limit: usize) -> Vec<Member> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|a, b| b.join_date.cmp(&a.join_date));
    sorted.truncate(limit);
    sorted
}

/// Member directory as CSV: `Name,Email,Phone,Status,Join Date`, every value quoted.
pub fn members_csv(members: &[Member]) -> String {
    let mut lines = vec!["Name,Email,Phone,Status,Join Date".to_string()];
    lines.extend(members.iter().map(|m| {
        [
            m.full_name(),
            m.email.clone(),
            m.phone.clone(),
            m.status.to_string(),
            m.join_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        ]
        .iter()
        .map(|value| csv_quote(value))
        .collect::<Vec<_>>()
        .join(",")
    }));
    lines.join("\n")
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// An attendance record with its member's display name resolved
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRow {
    pub record: AttendanceRecord,
    pub member_name: String,
}

pub fn attendance_rows(records: &[AttendanceRecord], members: &[Member]) -> Vec<AttendanceRow> {
    records
        .iter()
        .map(|record| AttendanceRow {
            record: record.clone(),
            member_name: members
                .iter()
                .find(|m| m.id == record.member_id)
                .map(Member::full_name)
                .unwrap_or_else(|| UNKNOWN_MEMBER.to_string()),
        })
        .collect()
}

/// Reorder results so each household is contiguous.
///
/// Families appear in order of their first member; members without a
/// `family_id` stand alone at their own position.
pub fn group_by_family(members: Vec<Member>) -> Vec<Member> {
    let mut groups: Vec<(Option<String>, Vec<Member>)> = Vec::new();

    for member in members {
        let slot = match &member.family_id {
            Some(family_id) => groups
                .iter()
                .position(|(key, _)| key.as_deref() == Some(family_id.as_str())),
            None => None,
        };

        match slot {
            Some(index) => groups[index].1.push(member),
            None => groups.push((member.family_id.clone(), vec![member])),
        }
    }

    groups.into_iter().flat_map(|(_, group)| group).collect()
}
