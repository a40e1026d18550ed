use crate::domain;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// DTO for creating an account via the API. Missing fields deserialize as empty strings so
/// they're caught by validation instead of by the JSON parser.
#[derive(Serialize, Deserialize, Display, Validate, ToSchema, Clone)]
#[display("{email}")]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    #[schema(example = "someone@example.com")]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    #[schema(example = "password123")]
    pub password: String,
    /// Overrides the account's creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<SignupRequest> for domain::user::Signup {
    fn from(value: SignupRequest) -> Self {
        domain::user::Signup {
            email: value.email,
            password: value.password,
            created_at: value.created_at,
        }
    }
}

/// DTO for logging in via the API
#[derive(Serialize, Deserialize, Display, Validate, ToSchema, Clone)]
#[display("{email}")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    #[schema(example = "someone@example.com")]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    #[schema(example = "password123")]
    pub password: String,
}

impl From<LoginRequest> for domain::user::Credentials {
    fn from(value: LoginRequest) -> Self {
        domain::user::Credentials {
            email: value.email,
            password: value.password,
        }
    }
}

/// A user as returned by the API. Never carries the password hash.
#[derive(Serialize, Deserialize, ToSchema, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: Uuid,
    #[schema(example = "someone@example.com")]
    pub email: String,
    pub default_task_list_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<domain::user::User> for AuthenticatedUser {
    fn from(value: domain::user::User) -> Self {
        AuthenticatedUser {
            id: value.id,
            email: value.email,
            default_task_list_id: value.default_task_list_id,
            created_at: value.created_at,
        }
    }
}
