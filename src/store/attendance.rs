//! AttendanceStore: CRUD, filtering and statistics over attendance records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::collection::Collection;
use super::latency::{Latency, Operation};
use crate::domain::{AttendancePatch, AttendanceRecord, AttendanceStats, EventType, NewAttendance};
use crate::error::{FlockError, Result};
use crate::id::RecordId;

/// Data-access layer for attendance records
#[derive(Clone)]
pub struct AttendanceStore {
    records: Collection<AttendanceRecord>,
    latency: Arc<dyn Latency>,
}

impl std::fmt::Debug for AttendanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceStore")
            .field("len", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl AttendanceStore {
    pub fn new(records: Vec<AttendanceRecord>, latency: Arc<dyn Latency>) -> Self {
        let records = Collection::new(records);
        info!("AttendanceStore initialized with {} records", records.len());
        Self { records, latency }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub async fn get_all(&self) -> Result<Vec<AttendanceRecord>> {
        self.latency.wait(Operation::GetAll).await;
        self.records.snapshot()
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<AttendanceRecord> {
        self.latency.wait(Operation::GetById).await;
        debug!("get_by_id: {}", id);
        self.records.find(id)?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, data: NewAttendance) -> Result<AttendanceRecord> {
        self.latency.wait(Operation::Create).await;
        let record = self.records.insert_with(|id| data.into_record(id))?;
        debug!("create: attendance {} for member {}", record.id, record.member_id);
        Ok(record)
    }

    pub async fn update(&self, id: RecordId, patch: AttendancePatch) -> Result<AttendanceRecord> {
        self.latency.wait(Operation::Update).await;
        debug!("update: {}", id);
        self.records
            .modify(id, |record| record.apply(patch))?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: RecordId) -> Result<bool> {
        self.latency.wait(Operation::Delete).await;
        debug!("delete: {}", id);
        if self.records.remove(id)? {
            Ok(true)
        } else {
            Err(not_found(id))
        }
    }

    /// Records referencing `member_id`. The member need not exist.
    pub async fn get_by_member_id(&self, member_id: RecordId) -> Result<Vec<AttendanceRecord>> {
        self.latency.wait(Operation::GetByMemberId).await;
        self.records.filter(|r| r.member_id == member_id)
    }

    /// Records dated within `[start, end]`, both ends inclusive.
    pub async fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.latency.wait(Operation::GetByDateRange).await;
        self.records.filter(|r| r.date >= start && r.date <= end)
    }

    pub async fn get_by_event_type(&self, event_type: EventType) -> Result<Vec<AttendanceRecord>> {
        self.latency.wait(Operation::GetByEventType).await;
        self.records.filter(|r| r.event_type == event_type)
    }

    pub async fn get_stats(&self) -> Result<AttendanceStats> {
        self.latency.wait(Operation::GetStats).await;
        self.records.read(|records| {
            let present = records.iter().filter(|r| r.present).count();
            AttendanceStats::from_counts(records.len(), present)
        })
    }
}

fn not_found(id: RecordId) -> FlockError {
    warn!("Attendance record not found: {}", id);
    FlockError::AttendanceNotFound(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoLatency;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()
    }

    fn record(id: RecordId, member_id: RecordId, d: u32, event_type: EventType, present: bool) -> AttendanceRecord {
        NewAttendance::new(member_id, day(d), event_type, present).into_record(id)
    }

    fn store() -> AttendanceStore {
        AttendanceStore::new(
            vec![
                record(1, 1, 3, EventType::SundayService, true),
                record(2, 2, 3, EventType::SundayService, false),
                record(3, 1, 6, EventType::WednesdayService, true),
                record(4, 3, 10, EventType::SundayService, true),
            ],
            Arc::new(NoLatency),
        )
    }

    fn ids(records: &[AttendanceRecord]) -> Vec<RecordId> {
        records.iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let store = store();
        let created = store
            .create(NewAttendance::new(2, day(10), EventType::BibleStudy, true))
            .await
            .unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(store.get_by_id(5).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_preserves_id_and_other_fields() {
        let store = store();
        let updated = store
            .update(2, AttendancePatch {
                present: Some(true),
                ..AttendancePatch::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.id, 2);
        assert!(updated.present);
        assert_eq!(updated.member_id, 2);
        assert_eq!(updated.date, day(3));
    }

    #[tokio::test]
    async fn test_update_ignores_id_in_json_patch() {
        let store = store();
        let patch: AttendancePatch = serde_json::from_str(r#"{"Id": 999, "present": false}"#).unwrap();
        let updated = store.update(1, patch).await.unwrap();
        assert_eq!(updated.id, 1);
        assert!(store.get_by_id(999).await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let err = store().get_by_id(12).await.unwrap_err();
        assert!(matches!(err, FlockError::AttendanceNotFound(12)));
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let store = store();
        assert!(store.delete(4).await.unwrap());
        assert!(store.delete(4).await.unwrap_err().is_not_found());
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_get_by_member_id() {
        let records = store().get_by_member_id(1).await.unwrap();
        assert_eq!(ids(&records), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_get_by_member_id_unknown_member() {
        assert!(store().get_by_member_id(40).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let records = store().get_by_date_range(day(3), day(6)).await.unwrap();
        assert_eq!(ids(&records), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_date_range_inverted_is_empty() {
        assert!(store().get_by_date_range(day(10), day(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_event_type() {
        let records = store().get_by_event_type(EventType::SundayService).await.unwrap();
        assert_eq!(ids(&records), vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_stats() {
        let stats = store().get_stats().await.unwrap();
        assert_eq!(
            stats,
            AttendanceStats {
                total_records: 4,
                present_count: 3,
                absent_count: 1,
                attendance_rate: 75,
            }
        );
    }

    #[tokio::test]
    async fn test_stats_empty_store() {
        let store = AttendanceStore::new(vec![], Arc::new(NoLatency));
        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.attendance_rate, 0);
    }
}
