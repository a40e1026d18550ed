use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{OpenApi, ToSchema};

pub mod task;
pub mod task_list;
pub mod user;

/// Collects the schemas of every DTO so they can be merged into the API documentation
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        user::SignupRequest,
        user::LoginRequest,
        user::AuthenticatedUser,
        task_list::TaskList,
        task::TaskStatus,
        task::Task,
        task::NewTask,
        task::TaskUpdate,
        task::ReorderTasks,
        Message,
    ),
    responses(crate::routing_utils::BasicErrorResponse)
))]
pub struct OpenApiSchemas;

/// A plain acknowledgement from the server
#[derive(Serialize, Deserialize, ToSchema, PartialEq, Eq, Debug, Clone)]
pub struct Message {
    #[schema(example = "Tasks reordered successfully.")]
    pub message: String,
}

/// Lets a field tell apart "absent" from "explicitly null". Use together with
/// `#[serde(default)]` on an `Option<Option<T>>` so a missing field stays `None` and a null
/// becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
