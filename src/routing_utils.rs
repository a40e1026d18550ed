use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;
use serde::Serialize;
use tracing::error;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToResponse, ToSchema, openapi};
use validator::ValidationErrors;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[response(examples(
    ("Not Found" = (
        summary = "Entity could not be found (404)",
        value = json!({
            "error_code": "not_found",
            "message": "Task not found.",
            "extra_info": null
        })
    )),

    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error_code": "internal_error",
            "message": "Internal server error",
            "extra_info": null
        })
    )),

    ("Invalid Input" = (
        summary = "Required fields were missing from the request body (400)",
        value = json!({
            "error_code": "invalid_input",
            "message": "Email and password are required.",
            "extra_info": {
                "password": [
                    {
                        "code": "length",
                        "message": null,
                        "params": {
                            "value": "",
                            "min": 1
                        }
                    }
                ]
            }
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error_code": "invalid_json",
            "message": "The passed request body contained malformed or unreadable JSON.",
            "extra_info": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    )),

    ("Rejected Credentials" = (
        summary = "Login failed (400)",
        value = json!({
            "error_code": "invalid_credentials",
            "message": "Invalid email or password",
            "extra_info": null
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub message: String,
    pub extra_info: Option<ExtraInfo>,
}

impl BasicErrorResponse {
    fn new(error_code: &str, message: impl Into<String>) -> Self {
        BasicErrorResponse {
            error_code: error_code.to_owned(),
            message: message.into(),
            extra_info: None,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse {
    message: &'static str,
    issues: ValidationErrors,
}

impl ValidationErrorResponse {
    /// Builds a mapper for [Result::map_err] which reports validation failures with a
    /// message specific to the endpoint
    pub fn with_message(message: &'static str) -> impl FnOnce(ValidationErrors) -> Self {
        move |issues| ValidationErrorResponse { message, issues }
    }
}

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "invalid_input".into(),
                message: self.message.to_owned(),
                extra_info: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(
                    self.issues,
                ))),
            }),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        ValidationErrorResponse {
            message: "Submitted data was invalid.",
            issues: value,
        }
    }
}

/// Response type for failures the client can do something about
pub enum ClientErrorResponse {
    NotFound { message: &'static str },
    BadRequest {
        error_code: &'static str,
        message: &'static str,
    },
}

impl IntoResponse for ClientErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound { message } => (
                StatusCode::NOT_FOUND,
                Json(BasicErrorResponse::new("not_found", message)),
            )
                .into_response(),
            Self::BadRequest {
                error_code,
                message,
            } => (
                StatusCode::BAD_REQUEST,
                Json(BasicErrorResponse::new(error_code, message)),
            )
                .into_response(),
        }
    }
}

/// Response type for unexpected failures. The cause is logged and never sent to the caller.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Internal failure while handling request: {:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse::new(
                "internal_error",
                "Internal server error",
            )),
        )
            .into_response()
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                message: "The passed request body contained malformed or unreadable JSON."
                    .into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}
