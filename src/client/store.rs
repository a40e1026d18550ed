use crate::client::api::TaskBoardClient;
use crate::client::{ClientError, load_local, save_local};
use crate::{domain, dto};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// The part of [ClientStore] which survives a restart
#[derive(Serialize, Deserialize, Default, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedTasks {
    pub tasks: Vec<dto::task::Task>,
    pub task_lists: Vec<dto::task_list::TaskList>,
}

/// A local change to the cached tasks which is applied before the server confirms it
#[derive(Debug, Clone)]
pub enum TaskCommand {
    Update {
        task_id: Uuid,
        update: dto::task::TaskUpdate,
    },
    Delete {
        task_id: Uuid,
    },
    Reorder {
        task_list_id: Uuid,
        ordered_task_ids: Vec<Uuid>,
    },
}

/// The cached tasks as they were before a [TaskCommand] was applied
#[must_use]
pub struct Snapshot(Vec<dto::task::Task>);

impl Snapshot {
    /// Undoes the command this snapshot was taken for
    pub fn restore(self, tasks: &mut Vec<dto::task::Task>) {
        *tasks = self.0;
    }
}

impl TaskCommand {
    /// Applies the command to the cached tasks and returns what they looked like beforehand
    pub fn apply(&self, tasks: &mut Vec<dto::task::Task>, now: DateTime<Utc>) -> Snapshot {
        let snapshot = Snapshot(tasks.clone());

        match self {
            Self::Update { task_id, update } => {
                let domain_update = domain::task::TaskUpdate::from(update.clone());
                if let Some(cached) = tasks.iter_mut().find(|task| task.id == *task_id) {
                    let mut merged = domain::task::Task::from(cached.clone());
                    domain_update.merge_into(&mut merged);
                    merged.updated_at = now;
                    *cached = dto::task::Task::from(merged);
                }
            }
            Self::Delete { task_id } => tasks.retain(|task| task.id != *task_id),
            Self::Reorder {
                task_list_id,
                ordered_task_ids,
            } => {
                let mut domain_tasks: Vec<domain::task::Task> = tasks
                    .drain(..)
                    .map(domain::task::Task::from)
                    .collect();
                domain::task::assign_positions(
                    &mut domain_tasks,
                    *task_list_id,
                    ordered_task_ids,
                    now,
                );
                domain_tasks.sort_by_key(|task| task.order);
                tasks.extend(domain_tasks.into_iter().map(dto::task::Task::from));
            }
        }

        snapshot
    }

    /// What gets recorded in [ClientStore::error] when the server rejects the command
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Update { .. } => "Failed to update task",
            Self::Delete { .. } => "Failed to delete task",
            Self::Reorder { .. } => "Failed to reorder tasks",
        }
    }
}

/// Local mirror of the task lists and tasks the user has looked at. Mutations show up locally
/// right away and are rolled back if the server refuses them.
pub struct ClientStore<C> {
    client: C,
    task_lists: Vec<dto::task_list::TaskList>,
    tasks: Vec<dto::task::Task>,
    loading: bool,
    error: Option<String>,
}

impl<C: TaskBoardClient> ClientStore<C> {
    pub fn new(client: C) -> Self {
        Self::with_state(client, PersistedTasks::default())
    }

    /// Creates a store seeded with previously persisted state
    pub fn with_state(client: C, state: PersistedTasks) -> Self {
        ClientStore {
            client,
            task_lists: state.task_lists,
            tasks: state.tasks,
            loading: false,
            error: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn task_lists(&self) -> &[dto::task_list::TaskList] {
        &self.task_lists
    }

    pub fn tasks(&self) -> &[dto::task::Task] {
        &self.tasks
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the cached task lists with the user's lists from the server
    #[tracing::instrument(skip(self))]
    pub async fn fetch_task_lists(&mut self, user_id: Uuid) -> Result<(), ClientError> {
        if self.task_lists.is_empty() {
            self.loading = true;
        }
        self.error = None;

        let fetch_result = self.client.task_lists_for_user(user_id).await;
        self.loading = false;
        match fetch_result {
            Ok(task_lists) => {
                self.task_lists = task_lists;
                Ok(())
            }
            Err(err) => {
                warn!("Fetching task lists failed: {err}");
                self.error = Some("Failed to fetch task lists".to_owned());
                Err(err)
            }
        }
    }

    /// Replaces the cached tasks of one list with the server's copy. Tasks of other lists are
    /// kept as they are.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_tasks(&mut self, task_list_id: Uuid) -> Result<(), ClientError> {
        if !self
            .tasks
            .iter()
            .any(|task| task.task_list_id == task_list_id)
        {
            self.loading = true;
        }
        self.error = None;

        let fetch_result = self.client.tasks_in_list(task_list_id).await;
        self.loading = false;
        match fetch_result {
            Ok(fetched) => {
                self.tasks.retain(|task| task.task_list_id != task_list_id);
                self.tasks.extend(fetched);
                Ok(())
            }
            Err(err) => {
                warn!("Fetching tasks for {task_list_id} failed: {err}");
                self.error = Some("Failed to fetch tasks".to_owned());
                Err(err)
            }
        }
    }

    /// Creates a task on the server and caches it once the server has assigned its ID
    #[tracing::instrument(skip(self))]
    pub async fn add_task(&mut self, new_task: dto::task::NewTask) -> Result<(), ClientError> {
        match self.client.create_task(&new_task).await {
            Ok(created) => {
                self.tasks.push(created);
                Ok(())
            }
            Err(err) => {
                warn!("Adding task failed: {err}");
                self.error = Some("Failed to add task".to_owned());
                Err(err)
            }
        }
    }

    pub async fn update_task(
        &mut self,
        task_id: Uuid,
        update: dto::task::TaskUpdate,
    ) -> Result<(), ClientError> {
        self.execute(TaskCommand::Update { task_id, update }).await
    }

    pub async fn delete_task(&mut self, task_id: Uuid) -> Result<(), ClientError> {
        self.execute(TaskCommand::Delete { task_id }).await
    }

    pub async fn reorder_tasks(
        &mut self,
        task_list_id: Uuid,
        ordered_task_ids: Vec<Uuid>,
    ) -> Result<(), ClientError> {
        self.execute(TaskCommand::Reorder {
            task_list_id,
            ordered_task_ids,
        })
        .await
    }

    /// Applies the command locally, then sends it to the server. The local change is undone
    /// if the server call fails. A successful update is replaced by the server's copy of the
    /// task.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&mut self, command: TaskCommand) -> Result<(), ClientError> {
        let snapshot = command.apply(&mut self.tasks, Utc::now());

        let server_result = match &command {
            TaskCommand::Update { task_id, update } => self
                .client
                .update_task(*task_id, update)
                .await
                .map(Some),
            TaskCommand::Delete { task_id } => {
                self.client.delete_task(*task_id).await.map(|_| None)
            }
            TaskCommand::Reorder {
                task_list_id,
                ordered_task_ids,
            } => self
                .client
                .reorder_tasks(*task_list_id, ordered_task_ids)
                .await
                .map(|_| None),
        };

        match server_result {
            Ok(Some(server_task)) => {
                if let Some(cached) = self.tasks.iter_mut().find(|task| task.id == server_task.id) {
                    *cached = server_task;
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                warn!("Server rejected local change, rolling back: {err}");
                snapshot.restore(&mut self.tasks);
                self.error = Some(command.failure_message().to_owned());
                Err(err)
            }
        }
    }

    /// Forgets everything cached, e.g. on logout
    pub fn clear(&mut self) {
        self.task_lists.clear();
        self.tasks.clear();
        self.error = None;
        self.loading = false;
    }

    /// The state worth keeping across restarts
    pub fn persisted(&self) -> PersistedTasks {
        PersistedTasks {
            tasks: self.tasks.clone(),
            task_lists: self.task_lists.clone(),
        }
    }

    /// Saves the cached lists and tasks to `path`
    pub async fn persist(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        save_local(path.as_ref(), &self.persisted()).await
    }

    /// Builds a store from state saved by [ClientStore::persist]. Starts empty if nothing was
    /// saved yet.
    pub async fn restore(client: C, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let state: PersistedTasks = load_local(path.as_ref()).await?;
        info!(
            "Restored {} task lists and {} tasks",
            state.task_lists.len(),
            state.tasks.len()
        );

        Ok(Self::with_state(client, state))
    }
}
