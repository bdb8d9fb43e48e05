use common::{AbsenceLogEntryDto, CourseDto, ModuleDto, UserProfile};
use model::entities::{absence_log, course, module};

use crate::auth::AuthenticatedUser;

pub fn course_to_dto(model: course::Model) -> CourseDto {
    CourseDto {
        id: model.id,
        code: model.code,
        name: model.name,
        year_level: model.year_level,
        description: model.description,
    }
}

/// Hours are stored as integers; negative values never occur in seeded data and map to 0.
pub fn module_to_dto(model: module::Model) -> ModuleDto {
    ModuleDto {
        id: model.id,
        course_id: model.course_id,
        module_code: model.module_code,
        name: model.name,
        total_hours: u32::try_from(model.total_hours).unwrap_or(0),
        weekly_hours: u32::try_from(model.weekly_hours).unwrap_or(0),
        color: model.color,
    }
}

pub fn log_entry_to_dto(model: absence_log::Model) -> AbsenceLogEntryDto {
    AbsenceLogEntryDto {
        id: model.id,
        absence_date: model.absence_date,
        hours_missed: model.hours_missed,
    }
}

pub fn user_to_profile(user: AuthenticatedUser) -> UserProfile {
    UserProfile {
        email: user.email,
        name: user.name,
        avatar_url: user.avatar_url,
    }
}
