//! Session guard: resolves the bearer token of a request to a registered user.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

/// The user behind the `Authorization: Bearer <token>` header.
///
/// Extraction fails with 401 before any handler code runs when the header is missing,
/// malformed or carries an unknown token.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub token: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl std::fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            debug!("Request without bearer token");
            return Err(ApiError::Unauthorized);
        };

        match store::users::find_by_token(&state.db, token).await? {
            Some(user) => Ok(AuthenticatedUser {
                token: user.token,
                email: user.email,
                name: user.name,
                avatar_url: user.avatar_url,
            }),
            None => {
                warn!("Rejected unknown session token");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/absences");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc123"))), Some("abc123"));
        assert_eq!(bearer_token(&parts(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[test]
    fn test_debug_hides_token() {
        let user = AuthenticatedUser {
            token: "secret-token".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            avatar_url: None,
        };
        let printed = format!("{:?}", user);
        assert!(printed.contains("ana@example.com"));
        assert!(!printed.contains("secret-token"));
    }
}
