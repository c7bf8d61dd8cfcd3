//! Error types for Flock
//!
//! Centralized error handling using thiserror.

use crate::id::RecordId;
use thiserror::Error;

/// All error types that can occur in Flock
#[derive(Debug, Error)]
pub enum FlockError {
    /// No member carries the requested id
    #[error("Member not found: {0}")]
    MemberNotFound(RecordId),

    /// No attendance record carries the requested id
    #[error("Attendance record not found: {0}")]
    AttendanceNotFound(RecordId),

    /// Backing collection could not be accessed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Seed dataset could not be loaded
    #[error("Seed error: {0}")]
    Seed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlockError {
    /// Returns true for the lookup failures raised by get/update/delete
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlockError::MemberNotFound(_) | FlockError::AttendanceNotFound(_))
    }
}

/// Result type alias for Flock operations
pub type Result<T> = std::result::Result<T, FlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_not_found_error() {
        let err = FlockError::MemberNotFound(12);
        assert_eq!(err.to_string(), "Member not found: 12");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_attendance_not_found_error() {
        let err = FlockError::AttendanceNotFound(3);
        assert_eq!(err.to_string(), "Attendance record not found: 3");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_storage_error() {
        let err = FlockError::Storage("lock poisoned".to_string());
        assert_eq!(err.to_string(), "Storage error: lock poisoned");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_seed_error() {
        let err = FlockError::Seed("members.json: expected array".to_string());
        assert_eq!(err.to_string(), "Seed error: members.json: expected array");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FlockError = io_err.into();
        assert!(matches!(err, FlockError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: FlockError = json_err.into();
        assert!(matches!(err, FlockError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(42)
        }

        fn returns_err() -> Result<u32> {
            Err(FlockError::MemberNotFound(1))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
