use common::{
    AbsenceAction, AbsenceLogEntryDto, AbsenceLogResponse, AbsenceMutationRequest,
    AbsenceMutationResponse, AbsenceStatus, AbsencesResponse, CourseAbsenceSummary, CourseDto,
    CoursesResponse, ModuleAbsenceReport, ModuleDto, ModulesResponse, UserProfile,
};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use store::AbsenceStore;
use utoipa::{OpenApi, ToSchema};

pub use common::ErrorResponse;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Absence counters for the configured academic year
    pub store: AbsenceStore,
    /// Cache for reference data
    pub cache: Cache<String, CachedData>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Courses(Vec<CourseDto>),
    Modules(Vec<ModuleDto>),
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::absences::get_absences,
        crate::handlers::absences::mutate_absence,
        crate::handlers::absences::get_absence_summary,
        crate::handlers::absences::get_absence_log,
        crate::handlers::courses::get_courses,
        crate::handlers::modules::get_modules,
        crate::handlers::users::get_me,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            AbsenceAction,
            AbsenceMutationRequest,
            AbsenceMutationResponse,
            AbsencesResponse,
            AbsenceLogEntryDto,
            AbsenceLogResponse,
            AbsenceStatus,
            ModuleAbsenceReport,
            CourseAbsenceSummary,
            CourseDto,
            CoursesResponse,
            ModuleDto,
            ModulesResponse,
            UserProfile,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "absences", description = "Absence counters and their log"),
        (name = "reference", description = "Courses and modules"),
        (name = "users", description = "Authenticated user"),
    ),
    info(
        title = "Attendance API",
        description = "Student attendance tracker - absence counters per module with limits derived from course hours",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
