use crate::handlers::{
    absences::{get_absence_log, get_absence_summary, get_absences, mutate_absence},
    courses::get_courses,
    health::health_check,
    modules::get_modules,
    users::get_me,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Absence counters
        .route("/api/v1/absences", get(get_absences).post(mutate_absence))
        .route("/api/v1/absences/summary", get(get_absence_summary))
        .route("/api/v1/absences/:module_id/log", get(get_absence_log))
        // Reference data
        .route("/api/v1/courses", get(get_courses))
        .route("/api/v1/modules", get(get_modules))
        // Session
        .route("/api/v1/me", get(get_me))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
