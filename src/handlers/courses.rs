use axum::{extract::State, response::Json};
use common::CoursesResponse;
use tracing::{debug, instrument, trace};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::helpers::reference::cached_courses;
use crate::schemas::AppState;

/// Get all active courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "reference",
    responses(
        (status = 200, description = "Courses ordered by year level", body = CoursesResponse),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _user))]
pub async fn get_courses(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<CoursesResponse>, ApiError> {
    trace!("Entering get_courses function");
    let courses = cached_courses(&state).await?;
    debug!("Returning {} courses", courses.len());
    Ok(Json(CoursesResponse { courses }))
}
