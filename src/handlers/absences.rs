use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use axum_valid::{Valid, ValidRejection};
use common::{
    limits, AbsenceAction, AbsenceLogResponse, AbsenceMutationResponse, AbsencesResponse,
    CourseAbsenceSummary,
};
use serde::Deserialize;
use store::MutationOutcome;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::IntoParams;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::helpers::converters::log_entry_to_dto;
use crate::helpers::reference::{cached_modules, require_course};
use crate::schemas::AppState;

/// Mutation body as received. Fields are optional so that missing values are reported as
/// validation failures instead of generic decoding errors.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceMutationPayload {
    #[validate(range(min = 1, message = "moduleId must be a positive integer"))]
    pub module_id: Option<i32>,
    pub action: Option<String>,
}

/// Query parameters of the summary endpoint
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Course to summarize
    #[validate(range(min = 1))]
    pub course_id: i32,
}

/// Get every absence counter of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/absences",
    tag = "absences",
    responses(
        (status = 200, description = "Absence counters per module id", body = AbsencesResponse),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
        (status = 500, description = "Counters could not be read", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user = %user.email))]
pub async fn get_absences(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<AbsencesResponse>, ApiError> {
    trace!("Entering get_absences function");
    let absences = state.store.try_get_all(&user.token).await?;
    debug!("Returning {} absence counters", absences.len());
    Ok(Json(AbsencesResponse { absences }))
}

/// Add or remove one absence
#[utoipa::path(
    post,
    path = "/api/v1/absences",
    tag = "absences",
    request_body = AbsenceMutationRequest,
    responses(
        (status = 200, description = "Mutation applied, full refreshed mapping returned", body = AbsenceMutationResponse),
        (status = 400, description = "Invalid payload or nothing to remove", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
        (status = 500, description = "The change could not be persisted", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, payload), fields(user = %user.email))]
pub async fn mutate_absence(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<AbsenceMutationPayload>, JsonRejection>,
) -> Result<Json<AbsenceMutationResponse>, ApiError> {
    trace!("Entering mutate_absence function");

    let Json(payload) = payload.map_err(|rejection| {
        warn!("Malformed absence payload: {}", rejection.body_text());
        ApiError::Validation(format!("Malformed request body: {}", rejection.body_text()))
    })?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let module_id = payload
        .module_id
        .ok_or_else(|| ApiError::Validation("moduleId is required".to_string()))?;
    let action = payload
        .action
        .as_deref()
        .and_then(AbsenceAction::parse)
        .ok_or_else(|| ApiError::Validation("action must be 'add' or 'remove'".to_string()))?;

    if store::reference::find_module(&state.db, module_id).await?.is_none() {
        warn!("Absence mutation for unknown module {}", module_id);
        return Err(ApiError::Validation(format!("Unknown module {}", module_id)));
    }

    debug!("Applying {} on module {}", action, module_id);
    match state.store.apply(&user.token, module_id, action).await {
        MutationOutcome::Applied => {
            // The write is committed; a failed re-read must not pass for an empty mapping
            let absences = state.store.try_get_all(&user.token).await?;
            info!("Absence {} applied on module {}", action, module_id);
            Ok(Json(AbsenceMutationResponse {
                success: true,
                absences,
            }))
        }
        MutationOutcome::NothingToRemove => {
            debug!("Nothing to remove on module {}", module_id);
            Err(ApiError::NothingToRemove)
        }
        MutationOutcome::Failed => Err(ApiError::ActionFailed),
    }
}

/// Absence limits of every module of a course
#[utoipa::path(
    get,
    path = "/api/v1/absences/summary",
    tag = "absences",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per module limits and course totals", body = CourseAbsenceSummary),
        (status = 400, description = "Missing or invalid course id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Counters could not be read", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, query), fields(user = %user.email))]
pub async fn get_absence_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    query: Result<Valid<Query<SummaryQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<CourseAbsenceSummary>, ApiError> {
    trace!("Entering get_absence_summary function");
    let Valid(Query(query)) = query?;

    require_course(&state, query.course_id).await?;
    let modules = cached_modules(&state, query.course_id).await?;
    let absences = state.store.try_get_all(&user.token).await?;

    let summary = limits::summarize(&modules, &absences);
    debug!(
        "Course {}: {} absences of {} allowed",
        query.course_id, summary.total_absences, summary.total_allowed
    );
    Ok(Json(summary))
}

/// Recorded absences of one module, newest first
#[utoipa::path(
    get,
    path = "/api/v1/absences/{module_id}/log",
    tag = "absences",
    params(
        ("module_id" = i32, Path, description = "Module ID"),
    ),
    responses(
        (status = 200, description = "Log entries", body = AbsenceLogResponse),
        (status = 400, description = "Invalid module id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, module_id), fields(user = %user.email))]
pub async fn get_absence_log(
    module_id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<AbsenceLogResponse>, ApiError> {
    let Path(module_id) = module_id.map_err(|rejection| {
        warn!("Invalid module id in path: {}", rejection.body_text());
        ApiError::Validation(format!("Invalid module id: {}", rejection.body_text()))
    })?;
    trace!("Entering get_absence_log function for module_id: {}", module_id);

    if store::reference::find_module(&state.db, module_id).await?.is_none() {
        warn!("Module with ID {} not found", module_id);
        return Err(ApiError::NotFound(format!("Module {} not found", module_id)));
    }

    let entries: Vec<_> = state
        .store
        .absence_log(&user.token, module_id)
        .await
        .into_iter()
        .map(log_entry_to_dto)
        .collect();
    debug!("Returning {} log entries", entries.len());

    Ok(Json(AbsenceLogResponse { module_id, entries }))
}
