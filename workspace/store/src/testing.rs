use std::sync::atomic::{AtomicU64, Ordering};

use migration::{Migrator, MigratorTrait};
use model::entities::user;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

pub const ACADEMIC_YEAR: &str = "2024-2025";

/// In-memory database with schema and reference data.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

pub async fn new_user(db: &DatabaseConnection) -> user::Model {
    static USER_ID: AtomicU64 = AtomicU64::new(0);

    let current_id = USER_ID.fetch_add(1, Ordering::SeqCst);
    user::ActiveModel {
        email: Set(format!("student{}@example.com", current_id)),
        name: Set(format!("Student {}", current_id)),
        avatar_url: Set(None),
        token: Set(format!("token-{}", current_id)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test user")
}
