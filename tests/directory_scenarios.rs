//! Directory integration tests
//!
//! Exercises both stores and the report layer through the public API.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use flock::domain::{EventType, Member, MemberPatch, MemberStats, MemberStatus, NewAttendance, NewMember};
use flock::error::{FlockError, Result};
use flock::report::DirectoryReport;
use flock::seed::Seed;
use flock::store::{AttendanceStore, MemberStore, NoLatency, Operation, SimulatedLatency};

fn member(id: u32, first: &str, last: &str, status: MemberStatus, family: Option<&str>) -> Member {
    Member {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.org", first.to_lowercase()),
        phone: format!("555-{:04}", id),
        address: None,
        status,
        join_date: Utc.with_ymd_and_hms(2022, 5, 1, 0, 0, 0).unwrap(),
        birth_date: None,
        notes: None,
        family_id: family.map(str::to_string),
    }
}

fn draft(first: &str) -> NewMember {
    NewMember::new(
        first,
        "Tester",
        format!("{}@example.org", first.to_lowercase()),
        "555-9999",
        MemberStatus::Visitor,
        Utc::now(),
    )
}

fn ids(members: &[Member]) -> Vec<u32> {
    members.iter().map(|m| m.id).collect()
}

/// Jane and Jon Doe share a household
#[tokio::test]
async fn test_doe_household_scenario() -> Result<()> {
    let store = MemberStore::new(
        vec![
            member(1, "Jane", "Doe", MemberStatus::Active, Some("F1")),
            member(2, "Jon", "Doe", MemberStatus::Visitor, Some("F1")),
        ],
        Arc::new(NoLatency),
    );

    assert_eq!(ids(&store.search("doe").await?), vec![1, 2]);
    assert_eq!(ids(&store.get_family_members(1).await?), vec![1, 2]);
    assert_eq!(
        store.get_stats().await?,
        MemberStats {
            total: 2,
            active: 1,
            new_members: 0,
            visitors: 1,
            inactive: 0,
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_search_family_expansion() -> Result<()> {
    let store = MemberStore::new(
        vec![
            member(1, "Anna", "Smith", MemberStatus::Active, Some("F1")),
            member(2, "Ben", "Smith", MemberStatus::Active, Some("F1")),
            member(3, "Cara", "Jones", MemberStatus::Active, None),
        ],
        Arc::new(NoLatency),
    );

    assert_eq!(ids(&store.search("Jones").await?), vec![3]);
    assert_eq!(ids(&store.search("Smith").await?), vec![1, 2]);
    // Only Anna matches the text; Ben arrives through the household
    assert_eq!(ids(&store.search("anna").await?), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_ids_are_monotonic_and_never_reused() -> Result<()> {
    let store = MemberStore::new(vec![], Arc::new(NoLatency));

    let first = store.create(draft("One")).await?;
    let second = store.create(draft("Two")).await?;
    assert_eq!((first.id, second.id), (1, 2));

    store.delete(second.id).await?;
    let third = store.create(draft("Three")).await?;
    assert_eq!(third.id, 3);

    store.delete(first.id).await?;
    let fourth = store.create(draft("Four")).await?;
    assert_eq!(fourth.id, 4);
    Ok(())
}

#[tokio::test]
async fn test_update_cannot_change_id() -> Result<()> {
    let store = MemberStore::new(
        vec![member(7, "Gail", "Force", MemberStatus::Inactive, None)],
        Arc::new(NoLatency),
    );

    let patch: MemberPatch = serde_json::from_str(r#"{"Id": 999, "status": "active"}"#)?;
    let updated = store.update(7, patch).await?;

    assert_eq!(updated.id, 7);
    assert_eq!(updated.status, MemberStatus::Active);
    assert!(matches!(store.get_by_id(999).await, Err(FlockError::MemberNotFound(999))));
    Ok(())
}

#[tokio::test]
async fn test_delete_twice_fails_second_time() -> Result<()> {
    let store = MemberStore::new(
        vec![member(1, "Ivy", "Green", MemberStatus::Visitor, None)],
        Arc::new(NoLatency),
    );

    assert!(store.delete(1).await?);
    assert!(store.delete(1).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_embedded_seed_figures() -> Result<()> {
    let seed = Seed::embedded()?;
    let members = MemberStore::new(seed.members, Arc::new(NoLatency));
    let attendance = AttendanceStore::new(seed.attendance, Arc::new(NoLatency));

    let stats = members.get_stats().await?;
    assert_eq!(stats.total, 12);
    assert_eq!(stats.total, stats.active + stats.new_members + stats.visitors + stats.inactive);

    let attendance_stats = attendance.get_stats().await?;
    assert_eq!(attendance_stats.total_records, 24);
    assert_eq!(attendance_stats.present_count, 19);
    assert_eq!(attendance_stats.attendance_rate, 79);

    // The Smith household has three members
    let smiths = members.search("smith").await?;
    assert_eq!(smiths.len(), 3);
    assert!(smiths.iter().all(|m| m.family_id.as_deref() == Some("FAM001")));
    Ok(())
}

#[tokio::test]
async fn test_attendance_rate_stays_in_bounds() -> Result<()> {
    let store = AttendanceStore::new(vec![], Arc::new(NoLatency));
    assert_eq!(store.get_stats().await?.attendance_rate, 0);

    let date = Utc.with_ymd_and_hms(2024, 4, 7, 10, 0, 0).unwrap();
    for (member_id, present) in [(1, true), (2, false), (3, false)] {
        store
            .create(NewAttendance::new(member_id, date, EventType::SundayService, present))
            .await?;
        let rate = store.get_stats().await?.attendance_rate;
        assert!(rate <= 100);
    }

    assert_eq!(store.get_stats().await?.attendance_rate, 33);
    Ok(())
}

#[tokio::test]
async fn test_report_over_embedded_seed() -> Result<()> {
    let seed = Seed::embedded()?;
    let members = MemberStore::new(seed.members, Arc::new(NoLatency));
    let attendance = AttendanceStore::new(seed.attendance, Arc::new(NoLatency));

    let report = DirectoryReport::build(&members, &attendance, 5).await?;
    assert_eq!(report.members.len(), 12);
    assert_eq!(report.recent_members.len(), 5);

    let breakdown_total: usize = report.status_breakdown().iter().map(|(_, count)| count).sum();
    assert_eq!(breakdown_total, 12);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_simulated_latency_delays_operations() -> Result<()> {
    let latency = SimulatedLatency::new().with_override(Operation::GetAll, Duration::from_millis(300));
    let store = MemberStore::new(
        vec![member(1, "Lu", "Slow", MemberStatus::Active, None)],
        Arc::new(latency),
    );

    let start = tokio::time::Instant::now();
    let all = store.get_all().await?;
    assert_eq!(all.len(), 1);
    assert!(start.elapsed() >= Duration::from_millis(300));
    Ok(())
}

#[tokio::test]
async fn test_returned_records_are_copies() -> Result<()> {
    let store = MemberStore::new(
        vec![member(1, "Rae", "Stone", MemberStatus::Active, Some("F9"))],
        Arc::new(NoLatency),
    );

    let mut all = store.get_all().await?;
    all[0].family_id = None;
    all.clear();

    let fresh = store.get_by_id(1).await?;
    assert_eq!(fresh.family_id.as_deref(), Some("F9"));
    assert_eq!(store.len(), 1);
    Ok(())
}
