use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::Name))
                    .col(string_null(Users::AvatarUrl))
                    .col(string(Users::Token).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(pk_auto(Courses::Id))
                    .col(string(Courses::Code).unique_key())
                    .col(string(Courses::Name))
                    .col(integer(Courses::YearLevel))
                    .col(string_null(Courses::Description))
                    .col(boolean(Courses::Active).default(true))
                    .to_owned(),
            )
            .await?;

        // Create modules table
        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(pk_auto(Modules::Id))
                    .col(integer(Modules::CourseId))
                    .col(string(Modules::ModuleCode))
                    .col(string(Modules::Name))
                    .col(integer(Modules::TotalHours))
                    .col(integer(Modules::WeeklyHours))
                    .col(string_null(Modules::Color))
                    .col(boolean(Modules::Active).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_modules_course")
                            .from(Modules::Table, Modules::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create enrollments table
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(pk_auto(Enrollments::Id))
                    .col(string(Enrollments::UserToken))
                    .col(integer(Enrollments::ModuleId))
                    .col(string(Enrollments::AcademicYear))
                    .col(string_len(Enrollments::Status, 16).default("active"))
                    .col(integer(Enrollments::CurrentAbsences).default(0))
                    .col(date_time(Enrollments::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_user")
                            .from(Enrollments::Table, Enrollments::UserToken)
                            .to(Users::Table, Users::Token)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_module")
                            .from(Enrollments::Table, Enrollments::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One enrollment per (user, module, academic year)
        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_user_module_year")
                    .table(Enrollments::Table)
                    .col(Enrollments::UserToken)
                    .col(Enrollments::ModuleId)
                    .col(Enrollments::AcademicYear)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Create absence_log table
        manager
            .create_table(
                Table::create()
                    .table(AbsenceLog::Table)
                    .if_not_exists()
                    .col(pk_auto(AbsenceLog::Id))
                    .col(integer(AbsenceLog::EnrollmentId))
                    .col(date(AbsenceLog::AbsenceDate))
                    .col(integer(AbsenceLog::HoursMissed).default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_absence_log_enrollment")
                            .from(AbsenceLog::Table, AbsenceLog::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_absence_log_enrollment")
                    .table(AbsenceLog::Table)
                    .col(AbsenceLog::EnrollmentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(AbsenceLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Modules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    AvatarUrl,
    Token,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Code,
    Name,
    YearLevel,
    Description,
    Active,
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
    CourseId,
    ModuleCode,
    Name,
    TotalHours,
    WeeklyHours,
    Color,
    Active,
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    UserToken,
    ModuleId,
    AcademicYear,
    Status,
    CurrentAbsences,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AbsenceLog {
    Table,
    Id,
    EnrollmentId,
    AbsenceDate,
    HoursMissed,
}
