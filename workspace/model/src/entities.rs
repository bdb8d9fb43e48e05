//! SeaORM entities of the attendance tracker.
//!
//! Courses and modules are reference data; enrollments and their absence log
//! are the only records mutated at runtime.

pub mod absence_log;
pub mod course;
pub mod enrollment;
pub mod module;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::absence_log::Entity as AbsenceLog;
    pub use super::course::Entity as Course;
    pub use super::enrollment::Entity as Enrollment;
    pub use super::module::Entity as Module;
    pub use super::user::Entity as User;
}
