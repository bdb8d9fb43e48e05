//! User registration: the persistence half of signing in.

use model::entities::user;
use rand::RngCore;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument};

use crate::error::StoreResult;

/// Identity confirmed by the external sign-in provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Random 32-byte token, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Returns the user with this email, creating it with a fresh token on first sign-in.
///
/// The token of an existing user is never rotated; only a changed avatar is written back.
#[instrument(skip(db, identity), fields(email = %identity.email))]
pub async fn login_user(db: &DatabaseConnection, identity: &UserIdentity) -> StoreResult<user::Model> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(identity.email.as_str()))
        .one(db)
        .await?;

    match existing {
        Some(found) if found.avatar_url == identity.avatar_url => {
            debug!("Existing user signed in");
            Ok(found)
        }
        Some(found) => {
            debug!("Refreshing avatar of existing user");
            let mut active: user::ActiveModel = found.into();
            active.avatar_url = Set(identity.avatar_url.clone());
            Ok(active.update(db).await?)
        }
        None => {
            let created = user::ActiveModel {
                email: Set(identity.email.clone()),
                name: Set(identity.name.clone()),
                avatar_url: Set(identity.avatar_url.clone()),
                token: Set(generate_token()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!("Registered new user {}", created.id);
            Ok(created)
        }
    }
}

pub async fn find_by_token(db: &DatabaseConnection, token: &str) -> StoreResult<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Token.eq(token))
        .one(db)
        .await?)
}
