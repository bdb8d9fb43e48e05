//! Cached access to courses and modules.

use common::{CourseDto, ModuleDto};
use tracing::{debug, trace};

use crate::error::ApiError;
use crate::helpers::converters::{course_to_dto, module_to_dto};
use crate::schemas::{AppState, CachedData};

const COURSES_KEY: &str = "courses";

fn modules_key(course_id: i32) -> String {
    format!("modules:{}", course_id)
}

/// Active courses, served from the cache when possible.
pub async fn cached_courses(state: &AppState) -> Result<Vec<CourseDto>, ApiError> {
    if let Some(CachedData::Courses(courses)) = state.cache.get(COURSES_KEY).await {
        trace!("Courses served from cache");
        return Ok(courses);
    }

    debug!("Loading courses from database");
    let courses: Vec<CourseDto> = store::reference::active_courses(&state.db)
        .await?
        .into_iter()
        .map(course_to_dto)
        .collect();
    state
        .cache
        .insert(COURSES_KEY.to_string(), CachedData::Courses(courses.clone()))
        .await;
    Ok(courses)
}

/// Active modules of a course, served from the cache when possible.
pub async fn cached_modules(state: &AppState, course_id: i32) -> Result<Vec<ModuleDto>, ApiError> {
    let key = modules_key(course_id);
    if let Some(CachedData::Modules(modules)) = state.cache.get(&key).await {
        trace!("Modules of course {} served from cache", course_id);
        return Ok(modules);
    }

    debug!("Loading modules of course {} from database", course_id);
    let modules: Vec<ModuleDto> = store::reference::modules_for_course(&state.db, course_id)
        .await?
        .into_iter()
        .map(module_to_dto)
        .collect();
    state
        .cache
        .insert(key, CachedData::Modules(modules.clone()))
        .await;
    Ok(modules)
}

/// Fails with 404 unless the course exists and is active.
pub async fn require_course(state: &AppState, course_id: i32) -> Result<CourseDto, ApiError> {
    cached_courses(state)
        .await?
        .into_iter()
        .find(|course| course.id == course_id)
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))
}
