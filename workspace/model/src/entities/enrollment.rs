use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

use super::{module, user};

/// Lifecycle status of an enrollment. Persisted but not interpreted by the counter logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EnrollmentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "validated")]
    Validated,
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// The only mutable record of the tracker: one row per (user, module, academic year)
/// holding the current absence count.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_token: String,
    pub module_id: i32,
    /// Academic year label, e.g. "2024-2025".
    pub academic_year: String,
    pub status: EnrollmentStatus,
    /// Never negative; only changed through the absence store.
    pub current_absences: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserToken",
        to = "user::Column::Token",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "module::Entity",
        from = "Column::ModuleId",
        to = "module::Column::Id",
        on_delete = "Cascade"
    )]
    Module,
    #[sea_orm(has_many = "super::absence_log::Entity")]
    AbsenceLog,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::absence_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AbsenceLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
