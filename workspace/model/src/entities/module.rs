use sea_orm::entity::prelude::*;

use super::course;

/// A subject taught within a course. Reference data, seeded once.
///
/// `total_hours` is what the absence cap is derived from.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_id: i32,
    /// Official module code, e.g. "0484".
    pub module_code: String,
    pub name: String,
    pub total_hours: i32,
    pub weekly_hours: i32,
    /// Presentation color tag, opaque to the server.
    pub color: Option<String>,
    #[sea_orm(default_value = "true")]
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "course::Entity",
        from = "Column::CourseId",
        to = "course::Column::Id",
        on_delete = "Cascade"
    )]
    Course,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
