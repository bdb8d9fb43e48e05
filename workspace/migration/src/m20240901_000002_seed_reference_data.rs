use model::entities::{course, module};
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (code, name, year level, description)
const COURSES: &[(&str, &str, i32, &str)] = &[
    ("DAM1", "1º DAM", 1, "Primer año del ciclo, fundamentos de programación y sistemas."),
    ("DAM2", "2º DAM", 2, "Segundo año, especialización en desarrollo de aplicaciones."),
];

/// (course code, module code, name, total hours, weekly hours, color)
const MODULES: &[(&str, &str, &str, i32, i32, &str)] = &[
    ("DAM1", "0483", "Sistemas informáticos", 167, 5, "from-purple-500 via-indigo-500 to-blue-500"),
    ("DAM1", "0484", "Bases de Datos", 200, 6, "from-emerald-400 via-teal-500 to-cyan-500"),
    ("DAM1", "0485", "Programación", 267, 8, "from-amber-400 via-orange-500 to-red-500"),
    ("DAM1", "0373", "Lenguajes de marcas y sistemas de gestión de información", 67, 2, "from-rose-400 via-pink-500 to-fuchsia-500"),
    ("DAM1", "0487", "Entornos de desarrollo", 100, 3, "from-violet-500 via-purple-500 to-indigo-500"),
    ("DAM1", "1709", "Itinerario personal para la empleabilidad I", 100, 3, "from-blue-400 via-cyan-500 to-teal-500"),
    ("DAM1", "1665", "Digitalización aplicada a los sectores productivos (GS)", 33, 1, "from-cyan-400 via-blue-500 to-indigo-500"),
    ("DAM1", "0179", "Inglés profesional", 67, 2, "from-fuchsia-400 via-pink-500 to-rose-500"),
    ("DAM2", "0486", "Acceso a datos", 167, 5, "from-sky-400 via-blue-500 to-indigo-500"),
    ("DAM2", "0488", "Desarrollo de interfaces", 167, 5, "from-emerald-500 via-green-500 to-teal-500"),
    ("DAM2", "0489", "Programación multimedia y dispositivos móviles", 200, 6, "from-amber-500 via-orange-500 to-red-500"),
    ("DAM2", "0490", "Programación de servicios y procesos", 67, 2, "from-rose-500 via-pink-500 to-fuchsia-500"),
    ("DAM2", "0491", "Sistemas de gestión empresarial", 133, 4, "from-indigo-500 via-violet-500 to-purple-500"),
    ("DAM2", "0492", "Proyecto intermodular de desarrollo de aplicaciones multiplataforma", 67, 2, "from-teal-500 via-emerald-500 to-green-500"),
    ("DAM2", "1710", "Itinerario personal para la empleabilidad II", 67, 2, "from-blue-500 via-sky-500 to-cyan-500"),
    ("DAM2", "1708", "Sostenibilidad aplicada al sistema productivo", 33, 1, "from-lime-500 via-green-500 to-emerald-500"),
    ("DAM2", "OPT", "Módulo profesional optativo", 100, 3, "from-slate-500 via-slate-400 to-slate-300"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Reference data is only seeded into empty tables
        if course::Entity::find().count(db).await? == 0 {
            course::Entity::insert_many(COURSES.iter().map(|(code, name, year_level, description)| {
                course::ActiveModel {
                    code: Set(String::from(*code)),
                    name: Set(String::from(*name)),
                    year_level: Set(*year_level),
                    description: Set(Some(String::from(*description))),
                    active: Set(true),
                    ..Default::default()
                }
            }))
            .exec(db)
            .await?;
        }

        if module::Entity::find().count(db).await? == 0 {
            let courses = course::Entity::find().all(db).await?;
            let mut rows = Vec::with_capacity(MODULES.len());
            for (course_code, module_code, name, total_hours, weekly_hours, color) in MODULES {
                let course = courses
                    .iter()
                    .find(|c| c.code == *course_code)
                    .ok_or_else(|| DbErr::RecordNotFound(format!("course {course_code}")))?;
                rows.push(module::ActiveModel {
                    course_id: Set(course.id),
                    module_code: Set(String::from(*module_code)),
                    name: Set(String::from(*name)),
                    total_hours: Set(*total_hours),
                    weekly_hours: Set(*weekly_hours),
                    color: Set(Some(String::from(*color))),
                    active: Set(true),
                    ..Default::default()
                });
            }
            module::Entity::insert_many(rows).exec(db).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let codes: Vec<&str> = COURSES.iter().map(|(code, ..)| *code).collect();

        // Modules cascade with their course
        course::Entity::delete_many()
            .filter(course::Column::Code.is_in(codes))
            .exec(db)
            .await?;
        Ok(())
    }
}
