use crate::domain::user::driven_ports::PasswordHasher;
use crate::domain::user::driving_ports::{CreateUserError, LoginError, UserPort};
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use crate::routing_utils::{
    BasicErrorResponse, ClientErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::post;
use std::sync::Arc;
use tracing::{debug, error, info};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(sign_up, log_in))]
/// Defines the OpenAPI documentation for the account API
pub struct UsersApi;
/// Constant used to group account endpoints in OpenAPI documentation
pub const USER_API_GROUP: &str = "Accounts";

const MISSING_CREDENTIALS: &str = "Email and password are required.";

/// Builds a router for signup and login
pub fn user_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/signup",
            post(
                |State(app_state): AppState,
                 Json(signup): Json<dto::user::SignupRequest>| async move {
                    let user_service = domain::user::UserService {};

                    sign_up(
                        signup,
                        &app_state.ext_cxn,
                        &user_service,
                        &app_state.password_hasher,
                    )
                    .await
                },
            ),
        )
        .route(
            "/login",
            post(
                |State(app_state): AppState,
                 Json(credentials): Json<dto::user::LoginRequest>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    log_in(
                        credentials,
                        &mut ext_cxn,
                        &user_service,
                        &app_state.password_hasher,
                    )
                    .await
                },
            ),
        )
}

#[utoipa::path(
    post,
    path = "/api/signup",
    tag = USER_API_GROUP,
    request_body = dto::user::SignupRequest,
    responses(
        (status = 201, description = "Account created along with its default task list", body = dto::user::AuthenticatedUser),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates an account
async fn sign_up(
    signup: dto::user::SignupRequest,
    ext_cxn: &impl Transactable,
    user_service: &impl UserPort,
    hasher: &impl PasswordHasher,
) -> Result<(StatusCode, Json<dto::user::AuthenticatedUser>), ErrorResponse> {
    debug!("Signing up user {signup}");
    signup
        .validate()
        .map_err(ValidationErrorResponse::with_message(MISSING_CREDENTIALS))?;

    let domain_signup = domain::user::Signup::from(signup);
    let account = domain_signup
        .hash_password(hasher)
        .await
        .inspect_err(|hash_err| error!("Signup failure: {hash_err}"))
        .map_err(GenericErrorResponse)?;
    let user_detect = persistence::json_user_driven_ports::JsonDetectUser;
    let user_write = persistence::json_user_driven_ports::JsonWriteUsers;
    let task_list_write = persistence::json_task_list_driven_ports::JsonTaskListWriter;

    let mut txn = ext_cxn.start_transaction().await.map_err(GenericErrorResponse)?;
    let signup_result = user_service
        .sign_up(&account, &mut txn, &user_detect, &user_write, &task_list_write)
        .await;

    match signup_result {
        Ok(user) => {
            txn.commit().await.map_err(GenericErrorResponse)?;
            info!(user_id = %user.id, "Created user");
            Ok((StatusCode::CREATED, Json(dto::user::AuthenticatedUser::from(user))))
        }
        Err(CreateUserError::EmailInUse) => Err(ClientErrorResponse::BadRequest {
            error_code: "email_in_use",
            message: "Email already in use.",
        }
        .into()),
        Err(CreateUserError::PortError(port_err)) => {
            error!("Signup failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = USER_API_GROUP,
    request_body = dto::user::LoginRequest,
    responses(
        (status = 200, description = "Credentials matched", body = dto::user::AuthenticatedUser),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Checks a user's credentials
async fn log_in(
    credentials: dto::user::LoginRequest,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
    hasher: &impl PasswordHasher,
) -> Result<Json<dto::user::AuthenticatedUser>, ErrorResponse> {
    debug!("Login attempt for {credentials}");
    credentials
        .validate()
        .map_err(ValidationErrorResponse::with_message(MISSING_CREDENTIALS))?;

    let domain_credentials = domain::user::Credentials::from(credentials);
    let user_read = persistence::json_user_driven_ports::JsonReadUsers;

    let login_result = user_service
        .log_in(&domain_credentials, &mut *ext_cxn, &user_read, hasher)
        .await;

    match login_result {
        Ok(user) => {
            info!(user_id = %user.id, "User logged in");
            Ok(Json(dto::user::AuthenticatedUser::from(user)))
        }
        Err(LoginError::InvalidCredentials) => Err(ClientErrorResponse::BadRequest {
            error_code: "invalid_credentials",
            message: "Invalid email or password",
        }
        .into()),
        Err(LoginError::PortError(port_err)) => {
            error!("Login failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}
