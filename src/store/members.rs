//! MemberStore: CRUD, family-aware search and statistics over members.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};

use super::collection::Collection;
use super::latency::{Latency, Operation};
use crate::domain::{FamilyOption, Member, MemberPatch, MemberStats, MemberStatus, NewMember};
use crate::error::{FlockError, Result};
use crate::id::RecordId;

/// Data-access layer for member records
///
/// Cloning yields another handle onto the same collection.
#[derive(Clone)]
pub struct MemberStore {
    members: Collection<Member>,
    latency: Arc<dyn Latency>,
}

impl std::fmt::Debug for MemberStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberStore")
            .field("len", &self.members.len())
            .finish_non_exhaustive()
    }
}

impl MemberStore {
    /// Create a store seeded with `members`.
    pub fn new(members: Vec<Member>, latency: Arc<dyn Latency>) -> Self {
        let members = Collection::new(members);
        info!("MemberStore initialized with {} members", members.len());
        Self { members, latency }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Every member, in collection order.
    pub async fn get_all(&self) -> Result<Vec<Member>> {
        self.latency.wait(Operation::GetAll).await;
        self.members.snapshot()
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Member> {
        self.latency.wait(Operation::GetById).await;
        debug!("get_by_id: {}", id);
        self.members.find(id)?.ok_or_else(|| not_found(id))
    }

    /// Append a new member with the next free id.
    pub async fn create(&self, data: NewMember) -> Result<Member> {
        self.latency.wait(Operation::Create).await;
        let member = self.members.insert_with(|id| data.into_member(id))?;
        debug!("create: member {} ({})", member.id, member.full_name());
        Ok(member)
    }

    /// Merge `patch` over the stored member; the id is preserved.
    pub async fn update(&self, id: RecordId, patch: MemberPatch) -> Result<Member> {
        self.latency.wait(Operation::Update).await;
        debug!("update: {}", id);
        self.members
            .modify(id, |member| member.apply(patch))?
            .ok_or_else(|| not_found(id))
    }

    /// Remove a member. Returns `true` on success.
    pub async fn delete(&self, id: RecordId) -> Result<bool> {
        self.latency.wait(Operation::Delete).await;
        debug!("delete: {}", id);
        if self.members.remove(id)? {
            Ok(true)
        } else {
            Err(not_found(id))
        }
    }

    /// Free-text search expanded to whole households.
    ///
    /// A blank query returns everyone. Otherwise members whose first name,
    /// last name, email or status contain the query (case-insensitively), or
    /// whose phone contains it literally, are returned first, followed by
    /// every other member sharing a `family_id` with one of them.
    pub async fn search(&self, query: &str) -> Result<Vec<Member>> {
        self.latency.wait(Operation::Search).await;
        let results = self.members.read(|members| family_search(members, query))?;
        debug!("search: {:?} -> {} results", query, results.len());
        Ok(results)
    }

    /// Members of the same household as `member_id`.
    ///
    /// A member without a family is returned alone; an unknown id yields an
    /// empty list.
    pub async fn get_family_members(&self, member_id: RecordId) -> Result<Vec<Member>> {
        self.latency.wait(Operation::GetFamilyMembers).await;
        self.members.read(|members| {
            let Some(member) = members.iter().find(|m| m.id == member_id) else {
                return Vec::new();
            };

            match &member.family_id {
                None => vec![member.clone()],
                Some(family_id) => members
                    .iter()
                    .filter(|m| m.family_id.as_ref() == Some(family_id))
                    .cloned()
                    .collect(),
            }
        })
    }

    /// One summary per household, in order of first appearance.
    pub async fn get_family_options(&self) -> Result<Vec<FamilyOption>> {
        self.latency.wait(Operation::GetFamilyOptions).await;
        self.members.read(family_options)
    }

    /// Members whose status equals `status`, ignoring case.
    pub async fn get_by_status(&self, status: &str) -> Result<Vec<Member>> {
        self.latency.wait(Operation::GetByStatus).await;
        let wanted = status.to_lowercase();
        self.members.filter(|m| m.status.as_str() == wanted)
    }

    pub async fn get_stats(&self) -> Result<MemberStats> {
        self.latency.wait(Operation::GetStats).await;
        self.members.read(|members| {
            let count = |status: MemberStatus| members.iter().filter(|m| m.status == status).count();
            MemberStats {
                total: members.len(),
                active: count(MemberStatus::Active),
                new_members: count(MemberStatus::NewMember),
                visitors: count(MemberStatus::Visitor),
                inactive: count(MemberStatus::Inactive),
            }
        })
    }
}

fn not_found(id: RecordId) -> FlockError {
    warn!("Member not found: {}", id);
    FlockError::MemberNotFound(id)
}

fn matches_query(member: &Member, term: &str) -> bool {
    member.first_name.to_lowercase().contains(term)
        || member.last_name.to_lowercase().contains(term)
        || member.email.to_lowercase().contains(term)
        || member.phone.contains(term)
        || member.status.as_str().contains(term)
}

fn family_search(members: &[Member], query: &str) -> Vec<Member> {
    if query.trim().is_empty() {
        return members.to_vec();
    }

    let term = query.to_lowercase();
    let matched: Vec<&Member> = members.iter().filter(|m| matches_query(m, &term)).collect();

    let families: HashSet<&str> = matched.iter().filter_map(|m| m.family_id.as_deref()).collect();

    let relatives = members
        .iter()
        .filter(|m| m.family_id.as_deref().is_some_and(|f| families.contains(f)));

    let mut seen = HashSet::new();
    matched
        .into_iter()
        .chain(relatives)
        .filter(|m| seen.insert(m.id))
        .cloned()
        .collect()
}

fn family_options(members: &[Member]) -> Vec<FamilyOption> {
    let mut groups: Vec<(&str, &str, usize)> = Vec::new();

    for member in members {
        let Some(family_id) = member.family_id.as_deref() else {
            continue;
        };
        let last_name = member.last_name.as_str();

        match groups.iter().position(|(f, l, _)| *f == family_id && *l == last_name) {
            Some(index) => groups[index].2 += 1,
            None => groups.push((family_id, last_name, 1)),
        }
    }

    groups
        .into_iter()
        .map(|(family_id, last_name, member_count)| FamilyOption {
            id: family_id.to_string(),
            name: format!("{} Family", last_name),
            member_count,
        })
        .collect()
}
