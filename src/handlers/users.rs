use axum::response::Json;
use common::UserProfile;
use tracing::{instrument, trace};

use crate::auth::AuthenticatedUser;
use crate::helpers::converters::user_to_profile;

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "users",
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_me(user: AuthenticatedUser) -> Json<UserProfile> {
    trace!("Entering get_me function");
    Json(user_to_profile(user))
}
