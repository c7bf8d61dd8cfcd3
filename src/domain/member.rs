//! Member record and related types
//!
//! A Member is one person tracked in the directory. Members sharing a
//! `family_id` form a household (family unit).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::deserialize_some;
use crate::id::RecordId;
use crate::store::Record;

/// A person in the church directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Store-assigned identifier, immutable after creation
    #[serde(rename = "Id")]
    pub id: RecordId,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub status: MemberStatus,

    pub join_date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Household grouping key; `None` means the member belongs to no family unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
}

impl Member {
    /// "First Last" display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Overwrite every field present in `patch`, keeping the rest
    ///
    /// The id is never touched.
    pub fn apply(&mut self, patch: MemberPatch) {
        let MemberPatch {
            first_name,
            last_name,
            email,
            phone,
            address,
            status,
            join_date,
            birth_date,
            notes,
            family_id,
        } = patch;

        if let Some(v) = first_name {
            self.first_name = v;
        }
        if let Some(v) = last_name {
            self.last_name = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(v) = phone {
            self.phone = v;
        }
        if let Some(v) = address {
            self.address = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = join_date {
            self.join_date = v;
        }
        if let Some(v) = birth_date {
            self.birth_date = v;
        }
        if let Some(v) = notes {
            self.notes = v;
        }
        if let Some(v) = family_id {
            self.family_id = v;
        }
    }
}

impl Record for Member {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// Membership status of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    #[serde(rename = "visitor")]
    Visitor,
    #[serde(rename = "new member")]
    NewMember,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "inactive")]
    Inactive,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 4] = [
        MemberStatus::Visitor,
        MemberStatus::NewMember,
        MemberStatus::Active,
        MemberStatus::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Visitor => "visitor",
            MemberStatus::NewMember => "new member",
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        MemberStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == lowered)
            .ok_or_else(|| format!("unknown member status: {}", s))
    }
}

/// Payload for creating a member; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    pub status: MemberStatus,
    pub join_date: DateTime<Utc>,
    #[serde(default)]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub family_id: Option<String>,
}

impl NewMember {
    /// Create a payload with the required fields and no optional ones
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        status: MemberStatus,
        join_date: DateTime<Utc>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            address: None,
            status,
            join_date,
            birth_date: None,
            notes: None,
            family_id: None,
        }
    }

    pub fn with_family(mut self, family_id: impl Into<String>) -> Self {
        self.family_id = Some(family_id.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Materialize the payload as a stored member
    pub fn into_member(self, id: RecordId) -> Member {
        Member {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            status: self.status,
            join_date: self.join_date,
            birth_date: self.birth_date,
            notes: self.notes,
            family_id: self.family_id,
        }
    }
}

/// Partial update for a member
///
/// Absent fields keep their prior value. For optional member fields the
/// outer `Option` means "present in the update" and the inner one is the new
/// value, so `Some(None)` clears the field. Unknown keys (including `Id`)
/// are ignored when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub address: Option<Option<String>>,
    pub status: Option<MemberStatus>,
    pub join_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub birth_date: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub family_id: Option<Option<String>>,
}

impl MemberPatch {
    pub fn status(status: MemberStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Aggregate member counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub total: usize,
    pub active: usize,
    pub new_members: usize,
    pub visitors: usize,
    pub inactive: usize,
}

/// One household summary for family pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyOption {
    /// The shared `familyId`
    pub id: String,
    /// "<lastName> Family"
    pub name: String,
    pub member_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Member {
        NewMember::new(
            "Jane",
            "Doe",
            "jane@example.com",
            "555-0100",
            MemberStatus::Active,
            Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap(),
        )
        .with_family("F1")
        .into_member(1)
    }

    #[test]
    fn test_status_serializes_with_spaces() {
        let json = serde_json::to_string(&MemberStatus::NewMember).unwrap();
        assert_eq!(json, "\"new member\"");
    }

    #[test]
    fn test_status_from_str_case_insensitive() {
        assert_eq!("New Member".parse::<MemberStatus>(), Ok(MemberStatus::NewMember));
        assert_eq!(" ACTIVE ".parse::<MemberStatus>(), Ok(MemberStatus::Active));
        assert!("member".parse::<MemberStatus>().is_err());
    }

    #[test]
    fn test_member_json_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["Id"], 1);
        assert_eq!(value["firstName"], "Jane");
        assert_eq!(value["familyId"], "F1");
        assert!(value.get("address").is_none());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample().full_name(), "Jane Doe");
    }

    #[test]
    fn test_apply_overwrites_only_present_fields() {
        let mut member = sample();
        member.apply(MemberPatch {
            phone: Some("555-0199".to_string()),
            notes: Some(Some("Choir".to_string())),
            ..MemberPatch::default()
        });

        assert_eq!(member.phone, "555-0199");
        assert_eq!(member.notes.as_deref(), Some("Choir"));
        assert_eq!(member.first_name, "Jane");
        assert_eq!(member.family_id.as_deref(), Some("F1"));
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let patch: MemberPatch = serde_json::from_str(r#"{"familyId": null}"#).unwrap();
        assert_eq!(patch.family_id, Some(None));

        let mut member = sample();
        member.apply(patch);
        assert_eq!(member.family_id, None);
    }

    #[test]
    fn test_patch_missing_field_is_untouched() {
        let patch: MemberPatch = serde_json::from_str(r#"{"status": "inactive"}"#).unwrap();
        assert_eq!(patch.family_id, None);
        assert_eq!(patch.status, Some(MemberStatus::Inactive));
    }

    #[test]
    fn test_with_address_sets_optional_field() {
        let member = NewMember::new(
            "Ann",
            "Lee",
            "ann@example.com",
            "555-0101",
            MemberStatus::Visitor,
            Utc::now(),
        )
        .with_address("12 Elm St")
        .into_member(4);
        assert_eq!(member.address.as_deref(), Some("12 Elm St"));
        assert!(member.family_id.is_none());
    }

    #[test]
    fn test_status_patch_changes_only_status() {
        let mut member = sample();
        member.apply(MemberPatch::status(MemberStatus::Inactive));
        assert_eq!(member.status, MemberStatus::Inactive);
        assert_eq!(member.email, "jane@example.com");
        assert_eq!(member.family_id.as_deref(), Some("F1"));
    }

    #[test]
    fn test_patch_ignores_id_key() {
        let patch: MemberPatch = serde_json::from_str(r#"{"Id": 999, "status": "active"}"#).unwrap();
        let mut member = sample();
        member.apply(patch);
        assert_eq!(member.id, 1);
    }
}
