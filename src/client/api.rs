use crate::client::ClientError;
use crate::dto;
use anyhow::anyhow;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;

/// The task board's REST API as seen from a client
pub trait TaskBoardClient {
    async fn sign_up(
        &self,
        signup: &dto::user::SignupRequest,
    ) -> Result<dto::user::AuthenticatedUser, ClientError>;
    async fn log_in(
        &self,
        credentials: &dto::user::LoginRequest,
    ) -> Result<dto::user::AuthenticatedUser, ClientError>;
    async fn task_lists_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<dto::task_list::TaskList>, ClientError>;
    async fn tasks_in_list(&self, task_list_id: Uuid) -> Result<Vec<dto::task::Task>, ClientError>;
    async fn create_task(&self, new_task: &dto::task::NewTask)
    -> Result<dto::task::Task, ClientError>;
    async fn update_task(
        &self,
        task_id: Uuid,
        update: &dto::task::TaskUpdate,
    ) -> Result<dto::task::Task, ClientError>;
    async fn delete_task(&self, task_id: Uuid) -> Result<(), ClientError>;
    async fn reorder_tasks(
        &self,
        task_list_id: Uuid,
        ordered_task_ids: &[Uuid],
    ) -> Result<(), ClientError>;
}

/// Error body returned by the server. Only the message is surfaced to callers.
#[derive(Deserialize)]
struct ServerError {
    message: String,
}

/// [TaskBoardClient] which talks to a running server over HTTP. Outgoing requests carry the
/// current trace context.
pub struct HttpTaskBoardClient {
    http_client: ClientWithMiddleware,
    base_url: String,
}

impl HttpTaskBoardClient {
    /// Creates a client for the server at `base_url`, e.g. "http://localhost:3000"
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|err| ClientError::Transport(anyhow!(err)))?;
        let http_client = ClientBuilder::new(base_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(HttpTaskBoardClient {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// Sends the request and hands back the raw response if the server reported success
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|err| ClientError::Transport(anyhow!(err)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ServerError>().await {
            Ok(server_error) => server_error.message,
            Err(err) => {
                warn!("Error response from the task board had an unexpected body: {err}");
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_owned()
            }
        };

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_for_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| ClientError::Decode(anyhow!(err)))
    }
}

impl TaskBoardClient for HttpTaskBoardClient {
    #[tracing::instrument(skip_all, fields(email = %signup.email))]
    async fn sign_up(
        &self,
        signup: &dto::user::SignupRequest,
    ) -> Result<dto::user::AuthenticatedUser, ClientError> {
        self.send_for_json(self.http_client.post(self.url("/signup")).json(signup))
            .await
    }

    #[tracing::instrument(skip_all, fields(email = %credentials.email))]
    async fn log_in(
        &self,
        credentials: &dto::user::LoginRequest,
    ) -> Result<dto::user::AuthenticatedUser, ClientError> {
        self.send_for_json(self.http_client.post(self.url("/login")).json(credentials))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn task_lists_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<dto::task_list::TaskList>, ClientError> {
        self.send_for_json(
            self.http_client
                .get(self.url(&format!("/users/{user_id}/tasklists"))),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn tasks_in_list(&self, task_list_id: Uuid) -> Result<Vec<dto::task::Task>, ClientError> {
        self.send_for_json(
            self.http_client
                .get(self.url(&format!("/tasklists/{task_list_id}/tasks"))),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn create_task(
        &self,
        new_task: &dto::task::NewTask,
    ) -> Result<dto::task::Task, ClientError> {
        self.send_for_json(self.http_client.post(self.url("/tasks")).json(new_task))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn update_task(
        &self,
        task_id: Uuid,
        update: &dto::task::TaskUpdate,
    ) -> Result<dto::task::Task, ClientError> {
        self.send_for_json(
            self.http_client
                .patch(self.url(&format!("/tasks/{task_id}")))
                .json(update),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, task_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .send(self.http_client.delete(self.url(&format!("/tasks/{task_id}"))))
            .await?;
        if response.status() != StatusCode::NO_CONTENT {
            warn!("Task deletion answered with {}", response.status());
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn reorder_tasks(
        &self,
        task_list_id: Uuid,
        ordered_task_ids: &[Uuid],
    ) -> Result<(), ClientError> {
        let reorder = dto::task::ReorderTasks {
            task_list_id: Some(task_list_id),
            ordered_task_ids: Some(ordered_task_ids.to_vec()),
        };
        let _: dto::Message = self
            .send_for_json(
                self.http_client
                    .post(self.url("/tasks/reorder"))
                    .json(&reorder),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::FakeImplementation;
    use std::sync::Mutex;

    pub struct MockTaskBoardClient {
        pub sign_up_result:
            FakeImplementation<dto::user::SignupRequest, Result<dto::user::AuthenticatedUser, ClientError>>,
        pub log_in_result:
            FakeImplementation<dto::user::LoginRequest, Result<dto::user::AuthenticatedUser, ClientError>>,
        pub task_lists_for_user_result:
            FakeImplementation<Uuid, Result<Vec<dto::task_list::TaskList>, ClientError>>,
        pub tasks_in_list_result: FakeImplementation<Uuid, Result<Vec<dto::task::Task>, ClientError>>,
        pub create_task_result:
            FakeImplementation<dto::task::NewTask, Result<dto::task::Task, ClientError>>,
        pub update_task_result:
            FakeImplementation<(Uuid, dto::task::TaskUpdate), Result<dto::task::Task, ClientError>>,
        pub delete_task_result: FakeImplementation<Uuid, Result<(), ClientError>>,
        pub reorder_tasks_result: FakeImplementation<(Uuid, Vec<Uuid>), Result<(), ClientError>>,
    }

    impl MockTaskBoardClient {
        pub fn new() -> MockTaskBoardClient {
            MockTaskBoardClient {
                sign_up_result: FakeImplementation::new(),
                log_in_result: FakeImplementation::new(),
                task_lists_for_user_result: FakeImplementation::new(),
                tasks_in_list_result: FakeImplementation::new(),
                create_task_result: FakeImplementation::new(),
                update_task_result: FakeImplementation::new(),
                delete_task_result: FakeImplementation::new(),
                reorder_tasks_result: FakeImplementation::new(),
            }
        }

        pub fn new_locked() -> Mutex<MockTaskBoardClient> {
            Mutex::new(Self::new())
        }
    }

    /// A failure the server might answer with
    pub fn server_failure() -> ClientError {
        ClientError::Status {
            status: 500,
            message: "Internal server error".to_owned(),
        }
    }

    impl TaskBoardClient for Mutex<MockTaskBoardClient> {
        async fn sign_up(
            &self,
            signup: &dto::user::SignupRequest,
        ) -> Result<dto::user::AuthenticatedUser, ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self.sign_up_result.save_arguments(signup.clone());
            locked_self.sign_up_result.return_value_result()
        }

        async fn log_in(
            &self,
            credentials: &dto::user::LoginRequest,
        ) -> Result<dto::user::AuthenticatedUser, ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self.log_in_result.save_arguments(credentials.clone());
            locked_self.log_in_result.return_value_result()
        }

        async fn task_lists_for_user(
            &self,
            user_id: Uuid,
        ) -> Result<Vec<dto::task_list::TaskList>, ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self.task_lists_for_user_result.save_arguments(user_id);
            locked_self.task_lists_for_user_result.return_value_result()
        }

        async fn tasks_in_list(
            &self,
            task_list_id: Uuid,
        ) -> Result<Vec<dto::task::Task>, ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self.tasks_in_list_result.save_arguments(task_list_id);
            locked_self.tasks_in_list_result.return_value_result()
        }

        async fn create_task(
            &self,
            new_task: &dto::task::NewTask,
        ) -> Result<dto::task::Task, ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self.create_task_result.save_arguments(new_task.clone());
            locked_self.create_task_result.return_value_result()
        }

        async fn update_task(
            &self,
            task_id: Uuid,
            update: &dto::task::TaskUpdate,
        ) -> Result<dto::task::Task, ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self
                .update_task_result
                .save_arguments((task_id, update.clone()));
            locked_self.update_task_result.return_value_result()
        }

        async fn delete_task(&self, task_id: Uuid) -> Result<(), ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self.delete_task_result.save_arguments(task_id);
            locked_self.delete_task_result.return_value_result()
        }

        async fn reorder_tasks(
            &self,
            task_list_id: Uuid,
            ordered_task_ids: &[Uuid],
        ) -> Result<(), ClientError> {
            let mut locked_self = self.lock().expect("mock client mutex poisoned");
            locked_self
                .reorder_tasks_result
                .save_arguments((task_list_id, ordered_task_ids.to_vec()));
            locked_self.reorder_tasks_result.return_value_result()
        }
    }
}
