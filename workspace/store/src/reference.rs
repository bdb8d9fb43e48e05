//! Read access to the seeded courses and modules.

use model::entities::{course, module};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{instrument, trace};

use crate::error::StoreResult;

/// Active courses ordered by year level.
#[instrument(skip(db))]
pub async fn active_courses(db: &DatabaseConnection) -> StoreResult<Vec<course::Model>> {
    let courses = course::Entity::find()
        .filter(course::Column::Active.eq(true))
        .order_by_asc(course::Column::YearLevel)
        .order_by_asc(course::Column::Code)
        .all(db)
        .await?;
    trace!("Found {} active courses", courses.len());
    Ok(courses)
}

/// Active modules of a course ordered by module code. Unknown courses yield an empty list.
#[instrument(skip(db))]
pub async fn modules_for_course(
    db: &DatabaseConnection,
    course_id: i32,
) -> StoreResult<Vec<module::Model>> {
    let modules = module::Entity::find()
        .filter(module::Column::CourseId.eq(course_id))
        .filter(module::Column::Active.eq(true))
        .order_by_asc(module::Column::ModuleCode)
        .all(db)
        .await?;
    trace!("Found {} modules for course {}", modules.len(), course_id);
    Ok(modules)
}

#[instrument(skip(db))]
pub async fn find_module(db: &DatabaseConnection, module_id: i32) -> StoreResult<Option<module::Model>> {
    Ok(module::Entity::find_by_id(module_id).one(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_db;

    #[tokio::test]
    async fn test_courses_are_ordered_by_year() {
        let db = setup_db().await;

        let codes: Vec<String> = active_courses(&db).await.unwrap().into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["DAM1".to_string(), "DAM2".to_string()]);
    }

    #[tokio::test]
    async fn test_modules_for_course() {
        let db = setup_db().await;
        let first_year = active_courses(&db).await.unwrap().remove(0);

        let modules = modules_for_course(&db, first_year.id).await.unwrap();
        assert_eq!(modules.len(), 8);
        assert!(modules.windows(2).all(|w| w[0].module_code <= w[1].module_code));
        assert!(modules.iter().all(|m| m.course_id == first_year.id));

        assert!(modules_for_course(&db, 999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_module() {
        let db = setup_db().await;

        let databases = find_module(&db, 2).await.unwrap().expect("seeded module");
        assert_eq!(databases.module_code, "0484");
        assert_eq!(databases.total_hours, 200);
        assert!(find_module(&db, 999).await.unwrap().is_none());
    }
}
