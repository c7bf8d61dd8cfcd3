//! Static seed dataset loaded once at process start.
//!
//! The default dataset is compiled into the binary. A directory holding
//! `members.json` and `attendance.json` in the same shape can replace it.

use std::fs;
use std::path::Path;

use log::info;
use serde::de::DeserializeOwned;

use crate::domain::{AttendanceRecord, Member};
use crate::error::{FlockError, Result};

const MEMBERS_JSON: &str = include_str!("../data/members.json");
const ATTENDANCE_JSON: &str = include_str!("../data/attendance.json");

pub const MEMBERS_FILE: &str = "members.json";
pub const ATTENDANCE_FILE: &str = "attendance.json";

/// Initial records for both stores
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub members: Vec<Member>,
    pub attendance: Vec<AttendanceRecord>,
}

impl Seed {
    /// The dataset bundled with the crate.
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            members: parse(MEMBERS_FILE, MEMBERS_JSON)?,
            attendance: parse(ATTENDANCE_FILE, ATTENDANCE_JSON)?,
        })
    }

    /// Load `members.json` and `attendance.json` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let members = fs::read_to_string(dir.join(MEMBERS_FILE))?;
        let attendance = fs::read_to_string(dir.join(ATTENDANCE_FILE))?;

        let seed = Self {
            members: parse(MEMBERS_FILE, &members)?,
            attendance: parse(ATTENDANCE_FILE, &attendance)?,
        };
        info!(
            "Loaded seed from {}: {} members, {} attendance records",
            dir.display(),
            seed.members.len(),
            seed.attendance.len()
        );
        Ok(seed)
    }

    /// Seed from `dir` when given, otherwise the embedded dataset.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }
}

fn parse<T: DeserializeOwned>(name: &str, json: &str) -> Result<Vec<T>> {
    serde_json::from_str(json).map_err(|e| FlockError::Seed(format!("{}: {}", name, e)))
}
