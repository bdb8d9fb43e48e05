use anyhow::{anyhow, Result};
use store::users::{login_user, UserIdentity};
use tracing::{debug, error, info};
use validator::Validate;

use super::initdb::connect_and_migrate;

/// Arguments of `create-user`, validated before touching the database.
#[derive(Debug, Validate)]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Registers the user (or refreshes its avatar) and returns its session token.
pub async fn create_user(
    database_url: &str,
    email: String,
    name: String,
    avatar_url: Option<String>,
) -> Result<String> {
    let new_user = NewUser {
        email,
        name,
        avatar_url,
    };
    if let Err(e) = new_user.validate() {
        error!("Invalid user data: {}", e);
        return Err(anyhow!("Invalid user data: {}", e));
    }

    let db = connect_and_migrate(database_url).await?;
    let identity = UserIdentity {
        email: new_user.email,
        name: new_user.name,
        avatar_url: new_user.avatar_url,
    };

    debug!("Registering user {}", identity.email);
    let user = login_user(&db, &identity).await?;
    info!("User {} ready (id {})", user.email, user.id);

    Ok(user.token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_email() {
        let result = create_user("sqlite::memory:", "not-an-email".to_string(), "Ana".to_string(), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_returns_token() {
        let token = create_user(
            "sqlite::memory:",
            "ana@example.com".to_string(),
            "Ana".to_string(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(token.len(), 64);
    }
}
