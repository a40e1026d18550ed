use crate::domain::task_list::driving_ports::TaskListPort;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{BasicErrorResponse, GenericErrorResponse, Json};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(OpenApi)]
#[openapi(paths(task_lists_for_user))]
/// Defines the OpenAPI documentation for the task list API
pub struct TaskListsApi;
/// Constant used to group task list endpoints in OpenAPI documentation
pub const TASK_LIST_API_GROUP: &str = "Task Lists";

pub fn task_list_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/users/:user_id/tasklists",
        get(
            |State(app_state): AppState, Path(user_id): Path<Uuid>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let task_list_service = domain::task_list::TaskListService {};

                task_lists_for_user(user_id, &mut ext_cxn, &task_list_service).await
            },
        ),
    )
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/tasklists",
    tag = TASK_LIST_API_GROUP,
    params(
        ("user_id" = Uuid, Path, description = "The ID of the user who owns the task lists"),
    ),
    responses(
        (status = 200, description = "The user's task lists. Empty for an unknown user.", body = Vec<dto::task_list::TaskList>),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves the task lists owned by a user
async fn task_lists_for_user(
    user_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    task_list_service: &impl TaskListPort,
) -> Result<Json<Vec<dto::task_list::TaskList>>, ErrorResponse> {
    info!("Get task lists for user {user_id}");
    let task_list_read = persistence::json_task_list_driven_ports::JsonTaskListReader;

    let task_lists = task_list_service
        .task_lists_for_user(user_id, &mut *ext_cxn, &task_list_read)
        .await
        .map_err(GenericErrorResponse)?;

    Ok(Json(
        task_lists
            .into_iter()
            .map(dto::task_list::TaskList::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task_list::TaskList;
    use crate::domain::task_list::test_util::MockTaskListService;
    use crate::domain::test_util::test_time;
    use crate::external_connections;
    use anyhow::anyhow;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Mutex;

    #[tokio::test]
    async fn happy_path() {
        let mut service_raw = MockTaskListService::new();
        let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
        let user_id = Uuid::new_v4();
        let list = TaskList::default_for_owner(user_id, test_time());
        service_raw
            .task_lists_for_user_result
            .set_returned_anyhow(Ok(vec![list.clone()]));
        let service = Mutex::new(service_raw);

        let response = task_lists_for_user(user_id, &mut ext_cxn, &service).await;
        let Ok(Json(returned_lists)) = response else {
            panic!("Fetching task lists should have succeeded");
        };
        assert_eq!(vec![dto::task_list::TaskList::from(list)], returned_lists);

        let locked_service = service.lock().expect("task list service mutex poisoned");
        assert_eq!(&[user_id], locked_service.task_lists_for_user_result.calls());
    }

    #[tokio::test]
    async fn returns_500_on_port_failure() {
        let mut service_raw = MockTaskListService::new();
        let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
        service_raw
            .task_lists_for_user_result
            .set_returned_anyhow(Err(anyhow!("store offline")));
        let service = Mutex::new(service_raw);

        let response = task_lists_for_user(Uuid::new_v4(), &mut ext_cxn, &service)
            .await
            .into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    }
}
