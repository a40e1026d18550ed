use crate::domain;
use crate::domain::user::User;
use crate::external_connections::{ExternalConnectivity, StoreHandle};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub default_task_list_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            email: value.email,
            password_hash: value.password_hash,
            default_task_list_id: value.default_task_list_id,
            created_at: value.created_at,
        }
    }
}

impl From<&User> for UserRow {
    fn from(value: &User) -> Self {
        UserRow {
            id: value.id,
            email: value.email.clone(),
            password_hash: value.password_hash.clone(),
            default_task_list_id: value.default_task_list_id,
            created_at: value.created_at,
        }
    }
}

pub struct JsonDetectUser;

impl domain::user::driven_ports::DetectUser for JsonDetectUser {
    async fn user_with_email_exists(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("Detecting user via email")?;

        Ok(handle.document().users.iter().any(|user| user.email == email))
    }
}

pub struct JsonReadUsers;

impl domain::user::driven_ports::UserReader for JsonReadUsers {
    async fn user_by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("Fetching a user by email")?;

        let user = handle
            .document()
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned();

        Ok(user.map(User::from))
    }
}

pub struct JsonWriteUsers;

impl domain::user::driven_ports::UserWriter for JsonWriteUsers {
    async fn create_user(
        &self,
        user: &User,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut handle = ext_cxn.store_cxn().await.context("Inserting new user")?;

        handle.document().users.push(UserRow::from(user));
        handle.save().await.context("Saving new user")?;

        Ok(())
    }
}
