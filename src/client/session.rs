use crate::client::api::TaskBoardClient;
use crate::client::{ClientError, load_local, save_local};
use crate::dto;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Who is logged in on this client, if anyone
#[derive(Serialize, Deserialize, Default, Clone, PartialEq, Debug)]
pub struct AuthSession {
    #[serde(default)]
    user: Option<dto::user::AuthenticatedUser>,
}

impl AuthSession {
    pub fn user(&self) -> Option<&dto::user::AuthenticatedUser> {
        self.user.as_ref()
    }

    /// Creates an account and logs into it
    pub async fn sign_up(
        &mut self,
        client: &impl TaskBoardClient,
        email: &str,
        password: &str,
    ) -> Result<&dto::user::AuthenticatedUser, ClientError> {
        let signup = dto::user::SignupRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            created_at: None,
        };
        let user = client.sign_up(&signup).await?;
        info!("Signed up as {}", user.email);

        Ok(&*self.user.insert(user))
    }

    pub async fn log_in(
        &mut self,
        client: &impl TaskBoardClient,
        email: &str,
        password: &str,
    ) -> Result<&dto::user::AuthenticatedUser, ClientError> {
        let credentials = dto::user::LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let user = client.log_in(&credentials).await?;
        info!("Logged in as {}", user.email);

        Ok(&*self.user.insert(user))
    }

    pub fn log_out(&mut self) {
        self.user = None;
    }

    pub async fn persist(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        save_local(path.as_ref(), self).await
    }

    /// Loads a session saved by [AuthSession::persist]. Nobody is logged in if nothing was
    /// saved yet.
    pub async fn restore(path: impl AsRef<Path>) -> anyhow::Result<AuthSession> {
        load_local(path.as_ref()).await
    }
}
