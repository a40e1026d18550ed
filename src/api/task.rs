use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use crate::routing_utils::{
    BasicErrorResponse, ClientErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{get, patch, post};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(OpenApi)]
#[openapi(paths(tasks_in_list, create_task, reorder_tasks, update_task, delete_task))]
/// Defines the OpenAPI documentation for the task API
pub struct TaskApi;
/// Constant used to group task endpoints in OpenAPI documentation
pub const TASK_API_GROUP: &str = "Tasks";

const TASK_NOT_FOUND: ClientErrorResponse = ClientErrorResponse::NotFound {
    message: "Task not found.",
};

/// Adds routes under "/tasks" and the per-list task listing to the application router
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/tasklists/:task_list_id/tasks",
            get(
                |State(app_state): AppState, Path(task_list_id): Path<Uuid>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    tasks_in_list(task_list_id, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/tasks",
            post(
                |State(app_state): AppState, Json(new_task): Json<dto::task::NewTask>| async move {
                    let task_service = domain::task::TaskService {};

                    create_task(new_task, &app_state.ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/tasks/reorder",
            post(
                |State(app_state): AppState, Json(reorder): Json<dto::task::ReorderTasks>| async move {
                    let task_service = domain::task::TaskService {};

                    reorder_tasks(reorder, &app_state.ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/tasks/:task_id",
            patch(
                |State(app_state): AppState,
                 Path(task_id): Path<Uuid>,
                 Json(update): Json<dto::task::TaskUpdate>| async move {
                    let task_service = domain::task::TaskService {};

                    update_task(task_id, update, &app_state.ext_cxn, &task_service).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(task_id): Path<Uuid>| async move {
                    let task_service = domain::task::TaskService {};

                    delete_task(task_id, &app_state.ext_cxn, &task_service).await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/api/tasklists/{task_list_id}/tasks",
    tag = TASK_API_GROUP,
    params(
        ("task_list_id" = Uuid, Path, description = "The ID of the list to fetch tasks from"),
    ),
    responses(
        (status = 200, description = "Tasks in the list, in storage order", body = Vec<dto::task::Task>),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves the tasks in a task list
async fn tasks_in_list(
    task_list_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::task::Task>>, ErrorResponse> {
    info!("Get tasks for list {task_list_id}");
    let task_read = persistence::json_task_driven_ports::JsonTaskReader;

    let tasks = task_service
        .tasks_in_list(task_list_id, &mut *ext_cxn, &task_read)
        .await
        .map_err(GenericErrorResponse)?;

    Ok(Json(tasks.into_iter().map(dto::task::Task::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = TASK_API_GROUP,
    request_body = dto::task::NewTask,
    responses(
        (status = 201, description = "Task created at the end of its list", body = dto::task::Task),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates a task at the end of a task list
async fn create_task(
    new_task: dto::task::NewTask,
    ext_cxn: &impl Transactable,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::task::Task>), ErrorResponse> {
    info!("Creating task in list {:?}", new_task.task_list_id);
    let domain_task = domain::task::NewTask::try_from(new_task).map_err(
        ValidationErrorResponse::with_message("Task list ID and title are required."),
    )?;

    let task_list_detect = persistence::json_task_list_driven_ports::JsonTaskListReader;
    let task_read = persistence::json_task_driven_ports::JsonTaskReader;
    let task_write = persistence::json_task_driven_ports::JsonTaskWriter;

    let mut txn = ext_cxn.start_transaction().await.map_err(GenericErrorResponse)?;
    let create_result = task_service
        .create_task(
            &domain_task,
            &mut txn,
            &task_list_detect,
            &task_read,
            &task_write,
        )
        .await;

    match create_result {
        Ok(task) => {
            txn.commit().await.map_err(GenericErrorResponse)?;
            Ok((StatusCode::CREATED, Json(dto::task::Task::from(task))))
        }
        Err(TaskError::TaskListDoesNotExist) => Err(ClientErrorResponse::NotFound {
            message: "Task list not found.",
        }
        .into()),
        Err(TaskError::TaskDoesNotExist) => Err(TASK_NOT_FOUND.into()),
        Err(TaskError::PortError(port_err)) => {
            error!("Create task failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/tasks/reorder",
    tag = TASK_API_GROUP,
    request_body = dto::task::ReorderTasks,
    responses(
        (status = 200, description = "Named tasks were given their new positions", body = dto::Message),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Assigns new positions to tasks within a list
async fn reorder_tasks(
    reorder: dto::task::ReorderTasks,
    ext_cxn: &impl Transactable,
    task_service: &impl TaskPort,
) -> Result<Json<dto::Message>, ErrorResponse> {
    let (task_list_id, ordered_task_ids) = reorder.into_parts().map_err(
        ValidationErrorResponse::with_message("Task list ID and ordered task IDs are required."),
    )?;
    info!(
        "Reordering {} tasks in list {task_list_id}",
        ordered_task_ids.len()
    );

    let task_read = persistence::json_task_driven_ports::JsonTaskReader;
    let task_write = persistence::json_task_driven_ports::JsonTaskWriter;

    let mut txn = ext_cxn.start_transaction().await.map_err(GenericErrorResponse)?;
    task_service
        .reorder_tasks(
            task_list_id,
            &ordered_task_ids,
            &mut txn,
            &task_read,
            &task_write,
        )
        .await
        .map_err(GenericErrorResponse)?;
    txn.commit().await.map_err(GenericErrorResponse)?;

    Ok(Json(dto::Message {
        message: "Tasks reordered successfully.".to_owned(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = Uuid, Path, description = "The ID of the task to update"),
    ),
    request_body = dto::task::TaskUpdate,
    responses(
        (status = 200, description = "The task after the update was applied", body = dto::task::Task),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Applies a partial update to a task
async fn update_task(
    task_id: Uuid,
    update: dto::task::TaskUpdate,
    ext_cxn: &impl Transactable,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::Task>, ErrorResponse> {
    info!("Updating task {task_id}");
    let domain_update = domain::task::TaskUpdate::from(update);
    let task_read = persistence::json_task_driven_ports::JsonTaskReader;
    let task_write = persistence::json_task_driven_ports::JsonTaskWriter;

    let mut txn = ext_cxn.start_transaction().await.map_err(GenericErrorResponse)?;
    let update_result = task_service
        .update_task(task_id, &domain_update, &mut txn, &task_read, &task_write)
        .await;

    match update_result {
        Ok(task) => {
            txn.commit().await.map_err(GenericErrorResponse)?;
            Ok(Json(dto::task::Task::from(task)))
        }
        Err(TaskError::TaskDoesNotExist) => Err(TASK_NOT_FOUND.into()),
        Err(TaskError::TaskListDoesNotExist) => Err(ClientErrorResponse::NotFound {
            message: "Task list not found.",
        }
        .into()),
        Err(TaskError::PortError(port_err)) => {
            error!("Update task failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = Uuid, Path, description = "The ID of the task to delete"),
    ),
    responses(
        (status = 204, description = "Task removed"),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Deletes a task
async fn delete_task(
    task_id: Uuid,
    ext_cxn: &impl Transactable,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting task {task_id}");
    let task_write = persistence::json_task_driven_ports::JsonTaskWriter;

    let mut txn = ext_cxn.start_transaction().await.map_err(GenericErrorResponse)?;
    let delete_result = task_service
        .delete_task(task_id, &mut txn, &task_write)
        .await;

    match delete_result {
        Ok(()) => {
            txn.commit().await.map_err(GenericErrorResponse)?;
            Ok(StatusCode::NO_CONTENT)
        }
        Err(TaskError::TaskDoesNotExist) | Err(TaskError::TaskListDoesNotExist) => {
            Err(TASK_NOT_FOUND.into())
        }
        Err(TaskError::PortError(port_err)) => {
            error!("Failed to delete task: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}
