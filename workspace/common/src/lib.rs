//! Common transport-layer types shared between the server and the sync client.
//! These structs are the JSON payloads of the HTTP API, so both sides
//! deserialize the same shapes without duplicating them.

pub mod limits;

pub use limits::{AbsenceStatus, CourseAbsenceSummary, ModuleAbsenceReport};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// Absence count per module id, as returned by the server.
/// Modules the user never touched are absent and count as zero.
pub type AbsenceMap = BTreeMap<i32, u32>;

/// Error response body returned for every non-2xx answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

// ===================== Absences =====================

/// Mutation applied to an absence counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceAction {
    Add,
    Remove,
}

impl AbsenceAction {
    /// Signed change this action applies to a counter.
    pub fn delta(self) -> i32 {
        match self {
            AbsenceAction::Add => 1,
            AbsenceAction::Remove => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AbsenceAction::Add => "add",
            AbsenceAction::Remove => "remove",
        }
    }

    /// Parses the wire representation; anything but "add" or "remove" is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "add" => Some(AbsenceAction::Add),
            "remove" => Some(AbsenceAction::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for AbsenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/v1/absences`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceMutationRequest {
    pub module_id: i32,
    pub action: AbsenceAction,
}

/// All absence counts of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct AbsencesResponse {
    pub absences: BTreeMap<i32, u32>,
}

/// Answer to a successful mutation: the full refreshed mapping, not only the touched module.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AbsenceMutationResponse {
    pub success: bool,
    pub absences: BTreeMap<i32, u32>,
}

/// A single recorded absence.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceLogEntryDto {
    pub id: i32,
    pub absence_date: NaiveDate,
    pub hours_missed: i32,
}

/// Absence log of one module, newest entry first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceLogResponse {
    pub module_id: i32,
    pub entries: Vec<AbsenceLogEntryDto>,
}

// ===================== Reference data =====================

/// Course response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub year_level: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CoursesResponse {
    pub courses: Vec<CourseDto>,
}

/// Module response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDto {
    pub id: i32,
    pub course_id: i32,
    pub module_code: String,
    pub name: String,
    pub total_hours: u32,
    pub weekly_hours: u32,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ModulesResponse {
    pub modules: Vec<ModuleDto>,
}

// ===================== Users =====================

/// Profile of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}
