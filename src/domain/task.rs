use crate::domain;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskError;
use crate::domain::task_list::driven_ports::DetectTaskList;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

/// Where a task is in its lifecycle. This is a three-state cycle rather than a boolean:
/// a task can be parked as "pending" without counting as done.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TaskStatus {
    Incomplete,
    Pending,
    Complete,
}

/// The outcome of asking a task to move to a new [TaskStatus]
#[derive(PartialEq, Eq, Debug)]
pub struct StatusTransition {
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskStatus {
    /// Moves from this status to `requested`, working out the resulting completion time.
    /// `completed_at` is the completion time the task would otherwise keep.
    ///
    /// * Entering [TaskStatus::Complete] from any other status stamps `now`
    /// * Re-completing an already complete task keeps its original stamp
    /// * [TaskStatus::Incomplete] always clears the stamp
    /// * [TaskStatus::Pending] leaves the stamp alone
    pub fn transition(
        self,
        requested: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> StatusTransition {
        let completed_at = match (self, requested) {
            (TaskStatus::Complete, TaskStatus::Complete) => completed_at,
            (_, TaskStatus::Complete) => Some(now),
            (_, TaskStatus::Incomplete) => None,
            (_, TaskStatus::Pending) => completed_at,
        };

        StatusTransition {
            status: requested,
            completed_at,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    pub task_list_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Position within the owning task list. Not unique and not contiguous: deletes leave
    /// gaps and partial reorders can leave duplicates.
    pub order: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct NewTask {
    pub task_list_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

/// A partial set of task fields. Every field that is present overwrites the task's value.
/// The nested options on `due_date` and `completed_at` distinguish "not provided" (outer
/// `None`) from "explicitly cleared" (`Some(None)`).
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct TaskUpdate {
    pub task_list_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub order: Option<i64>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    /// Shallow merge of the provided fields onto `task`. No status rules are applied here.
    pub fn merge_into(&self, task: &mut Task) {
        if let Some(task_list_id) = self.task_list_id {
            task.task_list_id = task_list_id;
        }
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = completed_at;
        }
        if let Some(ref tags) = self.tags {
            task.tags = tags.clone();
        }
    }
}

impl Task {
    /// Builds a freshly created task at the given position in its list
    pub fn from_new(new_task: &NewTask, order: i64, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            task_list_id: new_task.task_list_id,
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            status: TaskStatus::Incomplete,
            order,
            due_date: new_task.due_date,
            completed_at: None,
            tags: new_task.tags.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update the way the server does: shallow merge, then the status
    /// transition rules, then an `updated_at` refresh.
    pub fn apply_update(&mut self, update: &TaskUpdate, now: DateTime<Utc>) {
        let previous_status = self.status;
        update.merge_into(self);

        if let Some(requested_status) = update.status {
            let transition = previous_status.transition(requested_status, self.completed_at, now);
            self.status = transition.status;
            self.completed_at = transition.completed_at;
        }

        self.updated_at = now;
    }
}

/// Gives each task in `task_list_id` named by `ordered_task_ids` the index of its ID as its
/// new order. Tasks not named keep their old order, which may now collide with an assigned
/// one. IDs which don't belong to the list are skipped; if an ID is repeated, its last
/// position wins. Returns the indices into `tasks` which were modified.
pub fn assign_positions(
    tasks: &mut [Task],
    task_list_id: Uuid,
    ordered_task_ids: &[Uuid],
    now: DateTime<Utc>,
) -> Vec<usize> {
    let mut touched = Vec::new();

    for (position, task_id) in ordered_task_ids.iter().enumerate() {
        let found = tasks
            .iter()
            .position(|task| task.id == *task_id && task.task_list_id == task_list_id);
        if let Some(idx) = found {
            tasks[idx].order = position as i64;
            tasks[idx].updated_at = now;
            if !touched.contains(&idx) {
                touched.push(idx);
            }
        }
    }

    touched
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        async fn tasks_in_list(
            &self,
            task_list_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
        async fn task_by_id(
            &self,
            task_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
    }

    pub trait TaskWriter {
        async fn insert_task(
            &self,
            task: &Task,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        /// Overwrites stored tasks with the given versions, matching on ID
        async fn update_tasks(
            &self,
            tasks: &[Task],
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        /// Removes a task, returning false if there was no such task
        async fn delete_task(
            &self,
            task_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use crate::domain::task_list::TaskListExistsErr;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("The specified task list did not exist.")]
        TaskListDoesNotExist,
        #[error("The specified task did not exist.")]
        TaskDoesNotExist,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<TaskListExistsErr> for TaskError {
        fn from(value: TaskListExistsErr) -> Self {
            match value {
                TaskListExistsErr::TaskListDoesNotExist(task_list_id) => {
                    info!("Task list {task_list_id} didn't exist when creating a task.");
                    TaskError::TaskListDoesNotExist
                }
                TaskListExistsErr::PortError(err) => {
                    TaskError::from(err.context("Verifying task list exists"))
                }
            }
        }
    }


    pub trait TaskPort {
        async fn tasks_in_list(
            &self,
            task_list_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, anyhow::Error>;
        async fn create_task(
            &self,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_list_detect: &impl domain::task_list::driven_ports::DetectTaskList,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn update_task(
            &self,
            task_id: Uuid,
            update: &TaskUpdate,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn delete_task(
            &self,
            task_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;
        async fn reorder_tasks(
            &self,
            task_list_id: Uuid,
            ordered_task_ids: &[Uuid],
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), anyhow::Error>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn tasks_in_list(
        &self,
        task_list_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, anyhow::Error> {
        task_read
            .tasks_in_list(task_list_id, &mut *ext_cxn)
            .await
            .context("fetching tasks in a task list")
    }

    async fn create_task(
        &self,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_list_detect: &impl DetectTaskList,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        domain::task_list::verify_task_list_exists(
            new_task.task_list_id,
            &mut *ext_cxn,
            task_list_detect,
        )
        .await?;

        let tasks_in_list = task_read
            .tasks_in_list(new_task.task_list_id, &mut *ext_cxn)
            .await
            .context("counting tasks in the target list")?;
        let task = Task::from_new(new_task, tasks_in_list.len() as i64, Utc::now());

        task_write
            .insert_task(&task, &mut *ext_cxn)
            .await
            .context("inserting a new task")?;

        Ok(task)
    }

    async fn update_task(
        &self,
        task_id: Uuid,
        update: &TaskUpdate,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        let Some(mut task) = task_read
            .task_by_id(task_id, &mut *ext_cxn)
            .await
            .context("looking up a task to update")?
        else {
            return Err(TaskError::TaskDoesNotExist);
        };

        task.apply_update(update, Utc::now());
        task_write
            .update_tasks(std::slice::from_ref(&task), &mut *ext_cxn)
            .await
            .context("updating a task")?;

        Ok(task)
    }

    async fn delete_task(
        &self,
        task_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        let deleted = task_write
            .delete_task(task_id, &mut *ext_cxn)
            .await
            .context("deleting a task")?;

        if deleted {
            Ok(())
        } else {
            Err(TaskError::TaskDoesNotExist)
        }
    }

    async fn reorder_tasks(
        &self,
        task_list_id: Uuid,
        ordered_task_ids: &[Uuid],
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), anyhow::Error> {
        let mut tasks = task_read
            .tasks_in_list(task_list_id, &mut *ext_cxn)
            .await
            .context("fetching tasks to reorder")?;

        let touched = assign_positions(&mut tasks, task_list_id, ordered_task_ids, Utc::now());
        if touched.len() != ordered_task_ids.len() {
            info!(
                "Reorder of list {task_list_id} matched {} of {} task IDs",
                touched.len(),
                ordered_task_ids.len()
            );
        }

        let reordered: Vec<Task> = touched.into_iter().map(|idx| tasks[idx].clone()).collect();
        if let Err(port_err) = task_write.update_tasks(&reordered, &mut *ext_cxn).await {
            error!("Failed to save reordered tasks for list {task_list_id}: {port_err}");
            return Err(port_err.context("saving reordered tasks"));
        }

        Ok(())
    }
}
