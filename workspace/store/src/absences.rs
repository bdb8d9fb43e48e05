use chrono::Utc;
use common::{AbsenceAction, AbsenceMap};
use model::entities::{absence_log, enrollment};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, error, instrument, trace, warn};

use crate::error::StoreResult;

/// Result of a counter mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The counter and the log were changed.
    Applied,
    /// `remove` on a counter that is already zero; nothing was written.
    NothingToRemove,
    /// The database rejected the write and the transaction was rolled back.
    Failed,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == MutationOutcome::Applied
    }
}

/// Absence counters of every user for one academic year.
///
/// Each (user token, module, academic year) triple maps to exactly one enrollment row,
/// created lazily on first access. Persistence errors never cross this boundary: they are
/// logged and the neutral value (`0`, `false`, empty) is returned instead.
#[derive(Debug, Clone)]
pub struct AbsenceStore {
    db: DatabaseConnection,
    academic_year: String,
}

impl AbsenceStore {
    pub fn new(db: DatabaseConnection, academic_year: impl Into<String>) -> Self {
        Self {
            db,
            academic_year: academic_year.into(),
        }
    }

    pub fn academic_year(&self) -> &str {
        &self.academic_year
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Current absence count, creating the enrollment with 0 if it does not exist yet.
    #[instrument(skip(self, user_token))]
    pub async fn get_count(&self, user_token: &str, module_id: i32) -> u32 {
        match self.ensure_enrollment(&self.db, user_token, module_id).await {
            Ok(enrollment) => clamp_count(enrollment.current_absences),
            Err(e) => {
                error!("Failed to read absence count for module {}: {}", module_id, e);
                0
            }
        }
    }

    /// Records one absence. Returns false if nothing was persisted.
    pub async fn add(&self, user_token: &str, module_id: i32) -> bool {
        self.apply(user_token, module_id, AbsenceAction::Add)
            .await
            .is_applied()
    }

    /// Removes the latest absence. Returns false at zero or on failure.
    pub async fn remove(&self, user_token: &str, module_id: i32) -> bool {
        self.apply(user_token, module_id, AbsenceAction::Remove)
            .await
            .is_applied()
    }

    /// Applies `action` in a single transaction and reports what happened.
    #[instrument(skip(self, user_token))]
    pub async fn apply(
        &self,
        user_token: &str,
        module_id: i32,
        action: AbsenceAction,
    ) -> MutationOutcome {
        let result = match action {
            AbsenceAction::Add => self.try_add(user_token, module_id).await,
            AbsenceAction::Remove => self.try_remove(user_token, module_id).await,
        };

        match result {
            Ok(outcome) => {
                debug!("Absence {} on module {}: {:?}", action, module_id, outcome);
                outcome
            }
            Err(e) => {
                error!("Failed to {} absence on module {}: {}", action, module_id, e);
                MutationOutcome::Failed
            }
        }
    }

    /// Every counter of the user for the configured academic year.
    /// Modules that were never touched are not part of the map.
    #[instrument(skip(self, user_token))]
    pub async fn get_all(&self, user_token: &str) -> AbsenceMap {
        self.try_get_all(user_token).await.unwrap_or_else(|e| {
            error!("Failed to load absences: {}", e);
            AbsenceMap::new()
        })
    }

    /// Same as [`AbsenceStore::get_all`], but a failed read is returned instead of an
    /// empty map, so callers that hand the mapping to clients can tell the two apart.
    pub async fn try_get_all(&self, user_token: &str) -> StoreResult<AbsenceMap> {
        let enrollments = enrollment::Entity::find()
            .filter(enrollment::Column::UserToken.eq(user_token))
            .filter(enrollment::Column::AcademicYear.eq(self.academic_year.as_str()))
            .all(&self.db)
            .await?;

        trace!("Loaded {} enrollments", enrollments.len());
        Ok(enrollments
            .into_iter()
            .map(|e| (e.module_id, clamp_count(e.current_absences)))
            .collect())
    }

    /// Log entries of one module, newest first. Does not create the enrollment.
    #[instrument(skip(self, user_token))]
    pub async fn absence_log(&self, user_token: &str, module_id: i32) -> Vec<absence_log::Model> {
        self.load_log(user_token, module_id).await.unwrap_or_else(|e| {
            error!("Failed to load absence log for module {}: {}", module_id, e);
            Vec::new()
        })
    }

    /// Number of log entries of one module.
    pub async fn log_count(&self, user_token: &str, module_id: i32) -> u64 {
        self.count_log(user_token, module_id).await.unwrap_or_else(|e| {
            error!("Failed to count absence log for module {}: {}", module_id, e);
            0
        })
    }

    async fn load_log(&self, user_token: &str, module_id: i32) -> StoreResult<Vec<absence_log::Model>> {
        let Some(enrollment) = self.find_enrollment(&self.db, user_token, module_id).await? else {
            return Ok(Vec::new());
        };
        let entries = absence_log::Entity::find()
            .filter(absence_log::Column::EnrollmentId.eq(enrollment.id))
            .order_by_desc(absence_log::Column::AbsenceDate)
            .order_by_desc(absence_log::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    async fn count_log(&self, user_token: &str, module_id: i32) -> StoreResult<u64> {
        let Some(enrollment) = self.find_enrollment(&self.db, user_token, module_id).await? else {
            return Ok(0);
        };
        let count = absence_log::Entity::find()
            .filter(absence_log::Column::EnrollmentId.eq(enrollment.id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn try_add(&self, user_token: &str, module_id: i32) -> StoreResult<MutationOutcome> {
        let txn = self.db.begin().await?;

        let enrollment_id = match self.find_enrollment(&txn, user_token, module_id).await? {
            Some(existing) => {
                enrollment::Entity::update_many()
                    .col_expr(
                        enrollment::Column::CurrentAbsences,
                        Expr::col(enrollment::Column::CurrentAbsences).add(1),
                    )
                    .filter(enrollment::Column::Id.eq(existing.id))
                    .exec(&txn)
                    .await?;
                existing.id
            }
            None => self.insert_enrollment(&txn, user_token, module_id, 1).await?.id,
        };

        absence_log::ActiveModel {
            enrollment_id: Set(enrollment_id),
            absence_date: Set(Utc::now().date_naive()),
            hours_missed: Set(1),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(MutationOutcome::Applied)
    }

    async fn try_remove(&self, user_token: &str, module_id: i32) -> StoreResult<MutationOutcome> {
        let txn = self.db.begin().await?;

        let Some(existing) = self.find_enrollment(&txn, user_token, module_id).await? else {
            return Ok(MutationOutcome::NothingToRemove);
        };
        if existing.current_absences <= 0 {
            return Ok(MutationOutcome::NothingToRemove);
        }

        // The guard lives in the UPDATE so the counter can never go below zero
        let updated = enrollment::Entity::update_many()
            .col_expr(
                enrollment::Column::CurrentAbsences,
                Expr::col(enrollment::Column::CurrentAbsences).sub(1),
            )
            .filter(enrollment::Column::Id.eq(existing.id))
            .filter(enrollment::Column::CurrentAbsences.gt(0))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            return Ok(MutationOutcome::NothingToRemove);
        }

        let latest = absence_log::Entity::find()
            .filter(absence_log::Column::EnrollmentId.eq(existing.id))
            .order_by_desc(absence_log::Column::AbsenceDate)
            .order_by_desc(absence_log::Column::Id)
            .one(&txn)
            .await?;
        match latest {
            Some(entry) => {
                absence_log::Entity::delete_by_id(entry.id).exec(&txn).await?;
            }
            None => warn!(
                "Enrollment {} had {} absences but no log entries",
                existing.id, existing.current_absences
            ),
        }

        txn.commit().await?;
        Ok(MutationOutcome::Applied)
    }

    async fn find_enrollment<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_token: &str,
        module_id: i32,
    ) -> StoreResult<Option<enrollment::Model>> {
        let enrollment = enrollment::Entity::find()
            .filter(enrollment::Column::UserToken.eq(user_token))
            .filter(enrollment::Column::ModuleId.eq(module_id))
            .filter(enrollment::Column::AcademicYear.eq(self.academic_year.as_str()))
            .one(conn)
            .await?;
        Ok(enrollment)
    }

    async fn ensure_enrollment<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_token: &str,
        module_id: i32,
    ) -> StoreResult<enrollment::Model> {
        match self.find_enrollment(conn, user_token, module_id).await? {
            Some(existing) => Ok(existing),
            None => self.insert_enrollment(conn, user_token, module_id, 0).await,
        }
    }

    async fn insert_enrollment<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_token: &str,
        module_id: i32,
        current_absences: i32,
    ) -> StoreResult<enrollment::Model> {
        trace!("Creating enrollment for module {}", module_id);
        let created = enrollment::ActiveModel {
            user_token: Set(user_token.to_string()),
            module_id: Set(module_id),
            academic_year: Set(self.academic_year.clone()),
            status: Set(enrollment::EnrollmentStatus::Active),
            current_absences: Set(current_absences),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(created)
    }
}

fn clamp_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ACADEMIC_YEAR, new_user, setup_db};
    use chrono::NaiveDate;
    use common::limits::{AbsenceStatus, percentage_used};

    const DATABASES_MODULE: i32 = 2;

    #[tokio::test]
    async fn test_get_count_creates_enrollment_lazily() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let store = AbsenceStore::new(db.clone(), ACADEMIC_YEAR);

        assert!(store.get_all(&user.token).await.is_empty());
        assert_eq!(store.get_count(&user.token, 1).await, 0);

        // The row now exists and is reported with zero
        let all = store.get_all(&user.token).await;
        assert_eq!(all.get(&1), Some(&0));
        assert_eq!(store.get_count(&user.token, 1).await, 0);
        assert_eq!(enrollment::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_remove_sequence_keeps_log_in_step() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let store = AbsenceStore::new(db, ACADEMIC_YEAR);

        use AbsenceAction::{Add, Remove};
        let sequence = [Add, Add, Remove, Add, Remove, Remove, Remove, Add, Add, Remove];
        let mut expected: u32 = 0;
        for action in sequence {
            let outcome = store.apply(&user.token, 3, action).await;
            match action {
                Add => {
                    assert_eq!(outcome, MutationOutcome::Applied);
                    expected += 1;
                }
                Remove if expected == 0 => assert_eq!(outcome, MutationOutcome::NothingToRemove),
                Remove => {
                    assert_eq!(outcome, MutationOutcome::Applied);
                    expected -= 1;
                }
            }
            assert_eq!(store.get_count(&user.token, 3).await, expected);
            assert_eq!(store.log_count(&user.token, 3).await, u64::from(expected));
        }
        assert_eq!(expected, 1);
    }

    #[tokio::test]
    async fn test_remove_at_zero_is_a_noop() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let store = AbsenceStore::new(db.clone(), ACADEMIC_YEAR);

        // No enrollment yet: nothing is created either
        assert!(!store.remove(&user.token, 4).await);
        assert_eq!(enrollment::Entity::find().count(&db).await.unwrap(), 0);

        assert_eq!(store.get_count(&user.token, 4).await, 0);
        assert!(!store.remove(&user.token, 4).await);
        assert_eq!(
            store.apply(&user.token, 4, AbsenceAction::Remove).await,
            MutationOutcome::NothingToRemove
        );
        assert_eq!(store.get_count(&user.token, 4).await, 0);
        assert_eq!(store.log_count(&user.token, 4).await, 0);
    }

    #[tokio::test]
    async fn test_get_all_only_returns_touched_modules_of_the_year() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let other = new_user(&db).await;
        let store = AbsenceStore::new(db.clone(), ACADEMIC_YEAR);
        let next_year = AbsenceStore::new(db, "2025-2026");

        assert!(store.add(&user.token, 1).await);
        assert!(store.add(&user.token, 1).await);
        assert!(store.add(&user.token, 5).await);
        assert!(store.add(&other.token, 6).await);
        assert!(next_year.add(&user.token, 7).await);

        let all = store.get_all(&user.token).await;
        assert_eq!(all, AbsenceMap::from([(1, 2), (5, 1)]));

        assert_eq!(next_year.get_all(&user.token).await, AbsenceMap::from([(7, 1)]));
        assert_eq!(next_year.get_count(&user.token, 1).await, 0);
    }

    #[tokio::test]
    async fn test_remove_deletes_chronologically_last_entry() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let store = AbsenceStore::new(db.clone(), ACADEMIC_YEAR);

        let enrollment = enrollment::ActiveModel {
            user_token: Set(user.token.clone()),
            module_id: Set(1),
            academic_year: Set(ACADEMIC_YEAR.to_string()),
            status: Set(enrollment::EnrollmentStatus::Active),
            current_absences: Set(3),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let mut ids = Vec::new();
        for day in [5, 1, 5] {
            let entry = absence_log::ActiveModel {
                enrollment_id: Set(enrollment.id),
                absence_date: Set(NaiveDate::from_ymd_opt(2024, 10, day).unwrap()),
                hours_missed: Set(1),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
            ids.push(entry.id);
        }

        // Same date: the highest id goes first
        assert!(store.remove(&user.token, 1).await);
        let remaining: Vec<i32> = store
            .absence_log(&user.token, 1)
            .await
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(remaining, vec![ids[0], ids[1]]);

        assert!(store.remove(&user.token, 1).await);
        let remaining = store.absence_log(&user.token, 1).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[1]);
        assert_eq!(store.get_count(&user.token, 1).await, 1);
    }

    #[tokio::test]
    async fn test_two_hundred_hour_module_reaches_limit() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let store = AbsenceStore::new(db, ACADEMIC_YEAR);

        for _ in 0..30 {
            assert!(store.add(&user.token, DATABASES_MODULE).await);
        }
        let count = store.get_count(&user.token, DATABASES_MODULE).await;
        assert_eq!(count, 30);
        assert_eq!(percentage_used(200, count), 100.0);
        assert_eq!(
            AbsenceStatus::from_percentage(percentage_used(200, count)),
            AbsenceStatus::LimitReached
        );

        // No upper bound on the stored counter
        assert!(store.add(&user.token, DATABASES_MODULE).await);
        assert!(store.remove(&user.token, DATABASES_MODULE).await);
        assert!(store.remove(&user.token, DATABASES_MODULE).await);

        let count = store.get_count(&user.token, DATABASES_MODULE).await;
        assert_eq!(count, 29);
        assert!((percentage_used(200, count) - 96.7).abs() < 0.05);
        assert_eq!(store.log_count(&user.token, DATABASES_MODULE).await, 29);
    }

    #[tokio::test]
    async fn test_failed_write_is_rolled_back() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let store = AbsenceStore::new(db.clone(), ACADEMIC_YEAR);

        assert!(store.add(&user.token, 1).await);
        db.execute_unprepared("DROP TABLE absence_log").await.unwrap();

        assert_eq!(
            store.apply(&user.token, 1, AbsenceAction::Add).await,
            MutationOutcome::Failed
        );
        assert_eq!(
            store.apply(&user.token, 1, AbsenceAction::Remove).await,
            MutationOutcome::Failed
        );
        assert_eq!(store.get_count(&user.token, 1).await, 1);
        assert_eq!(store.log_count(&user.token, 1).await, 0);
    }

    #[tokio::test]
    async fn test_failed_read_is_reported_by_try_get_all() {
        let db = setup_db().await;
        let user = new_user(&db).await;
        let store = AbsenceStore::new(db.clone(), ACADEMIC_YEAR);

        assert!(store.add(&user.token, DATABASES_MODULE).await);
        let all = store.try_get_all(&user.token).await.unwrap();
        assert_eq!(all.get(&DATABASES_MODULE), Some(&1));

        db.execute_unprepared("ALTER TABLE enrollments RENAME TO enrollments_gone")
            .await
            .unwrap();

        assert!(store.try_get_all(&user.token).await.is_err());
        // The neutral view still hides the failure
        assert!(store.get_all(&user.token).await.is_empty());
    }
}
