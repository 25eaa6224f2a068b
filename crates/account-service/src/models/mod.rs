use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Identity model (maps to users table)
///
/// The username is the lower-cased email address and is the stable subject
/// identifier carried in issued tokens.
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub email_confirmed: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Fields for creating a new identity.
///
/// Callers normalize names and email to lower case before constructing this;
/// the store derives the username from the email.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub email_confirmed: bool,
}

/// Successful login/refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub first_name: String,
    pub last_name: String,
    pub token: String,
}

impl UserResponse {
    pub fn new(identity: &Identity, token: String) -> Self {
        Self {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            token,
        }
    }
}
