use crate::domain::task_list::TaskList;
use crate::domain::task_list::driven_ports::TaskListWriter;
use crate::domain::user::driving_ports::{CreateUserError, LoginError};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2 PHC string. Records imported from elsewhere may lack one, in which case the
    /// user can never log in.
    pub password_hash: Option<String>,
    pub default_task_list_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Signup {
    pub email: String,
    pub password: String,
    /// Overrides the account creation time, used when importing accounts
    pub created_at: Option<DateTime<Utc>>,
}

/// A signup whose password has already been hashed, ready to be stored
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Signup {
    /// Hashes the signup's password. Call this before opening a store transaction so the
    /// store isn't locked while the hash is computed.
    pub async fn hash_password(
        &self,
        hasher: &impl driven_ports::PasswordHasher,
    ) -> Result<NewAccount, anyhow::Error> {
        let password_hash = hasher
            .hash_password(&self.password)
            .await
            .context("Hashing password during signup")?;

        Ok(NewAccount {
            email: self.email.clone(),
            password_hash,
            created_at: self.created_at,
        })
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        async fn user_by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
    }

    pub trait UserWriter {
        async fn create_user(
            &self,
            user: &User,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }

    pub trait DetectUser {
        async fn user_with_email_exists(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }

    /// One-way password hashing. Implementations salt every hash individually.
    pub trait PasswordHasher: Send + Sync {
        async fn hash_password(&self, password: &str) -> Result<String, anyhow::Error>;

        /// Checks a password against a stored hash. Returns an error if the stored hash
        /// can't be parsed.
        async fn verify_password(
            &self,
            password: &str,
            password_hash: &str,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum CreateUserError {
        #[error("Email already in use.")]
        EmailInUse,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum LoginError {
        #[error("Invalid email or password")]
        InvalidCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait UserPort {
        /// Creates a user along with their default task list
        async fn sign_up(
            &self,
            account: &NewAccount,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl driven_ports::DetectUser,
            u_writer: &impl driven_ports::UserWriter,
            task_list_write: &impl TaskListWriter,
        ) -> Result<User, CreateUserError>;

        async fn log_in(
            &self,
            credentials: &Credentials,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
            hasher: &impl driven_ports::PasswordHasher,
        ) -> Result<User, LoginError>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn sign_up(
        &self,
        account: &NewAccount,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl driven_ports::DetectUser,
        u_writer: &impl driven_ports::UserWriter,
        task_list_write: &impl TaskListWriter,
    ) -> Result<User, CreateUserError> {
        let email_taken = u_detect
            .user_with_email_exists(&account.email, &mut *ext_cxn)
            .await
            .context("Looking up email during signup")?;
        if email_taken {
            info!("Rejected signup for an email already in use");
            return Err(CreateUserError::EmailInUse);
        }

        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let default_list = TaskList::default_for_owner(user_id, now);
        let user = User {
            id: user_id,
            email: account.email.clone(),
            password_hash: Some(account.password_hash.clone()),
            default_task_list_id: Some(default_list.id),
            created_at: account.created_at.unwrap_or(now),
        };

        u_writer
            .create_user(&user, &mut *ext_cxn)
            .await
            .context("Saving new user")?;
        task_list_write
            .create_task_list(&default_list, &mut *ext_cxn)
            .await
            .context("Saving default task list for new user")?;

        Ok(user)
    }

    async fn log_in(
        &self,
        credentials: &Credentials,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
        hasher: &impl driven_ports::PasswordHasher,
    ) -> Result<User, LoginError> {
        let Some(user) = u_reader
            .user_by_email(&credentials.email, &mut *ext_cxn)
            .await
            .context("Looking up user during login")?
        else {
            return Err(LoginError::InvalidCredentials);
        };

        let Some(ref password_hash) = user.password_hash else {
            warn!("User {} has no password hash on record", user.id);
            return Err(LoginError::InvalidCredentials);
        };

        match hasher
            .verify_password(&credentials.password, password_hash)
            .await
        {
            Ok(true) => Ok(user),
            Ok(false) => Err(LoginError::InvalidCredentials),
            Err(hash_err) => {
                warn!("Stored password hash for user {} is unusable: {hash_err}", user.id);
                Err(LoginError::InvalidCredentials)
            }
        }
    }
}
