pub mod absences;
pub mod courses;
pub mod health;
pub mod modules;
pub mod users;
