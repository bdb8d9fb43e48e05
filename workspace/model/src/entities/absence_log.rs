use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use super::enrollment;

/// One recorded absence. Rows are appended on every increment and the most recent
/// row is deleted on every decrement, so the row count tracks `current_absences`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "absence_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub enrollment_id: i32,
    pub absence_date: NaiveDate,
    /// Always 1 for entries written by the tracker.
    pub hours_missed: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "enrollment::Entity",
        from = "Column::EnrollmentId",
        to = "enrollment::Column::Id",
        on_delete = "Cascade"
    )]
    Enrollment,
}

impl Related<enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
