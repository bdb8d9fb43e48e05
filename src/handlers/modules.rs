use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use axum_valid::{Valid, ValidRejection};
use common::ModulesResponse;
use serde::Deserialize;
use tracing::{debug, instrument, trace};
use utoipa::IntoParams;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::helpers::reference::cached_modules;
use crate::schemas::AppState;

/// Query parameters for listing modules
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ModulesQuery {
    /// Course whose modules are listed
    #[validate(range(min = 1))]
    pub course_id: Option<i32>,
}

/// Get the active modules of a course
#[utoipa::path(
    get,
    path = "/api/v1/modules",
    tag = "reference",
    params(ModulesQuery),
    responses(
        (status = 200, description = "Modules ordered by module code", body = ModulesResponse),
        (status = 400, description = "Missing or invalid course id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _user, query))]
pub async fn get_modules(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    query: Result<Valid<Query<ModulesQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<ModulesResponse>, ApiError> {
    trace!("Entering get_modules function");
    let Valid(Query(query)) = query?;

    let course_id = query
        .course_id
        .ok_or_else(|| ApiError::Validation("courseId is required".to_string()))?;
    let modules = cached_modules(&state, course_id).await?;
    debug!("Returning {} modules of course {}", modules.len(), course_id);

    Ok(Json(ModulesResponse { modules }))
}
