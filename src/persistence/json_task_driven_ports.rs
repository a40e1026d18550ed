use crate::domain;
use crate::domain::task::{Task, TaskStatus};
use crate::external_connections::{ExternalConnectivity, StoreHandle};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusRow {
    Incomplete,
    Pending,
    Complete,
}

impl From<TaskStatusRow> for TaskStatus {
    fn from(value: TaskStatusRow) -> Self {
        match value {
            TaskStatusRow::Incomplete => TaskStatus::Incomplete,
            TaskStatusRow::Pending => TaskStatus::Pending,
            TaskStatusRow::Complete => TaskStatus::Complete,
        }
    }
}

impl From<TaskStatus> for TaskStatusRow {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Incomplete => TaskStatusRow::Incomplete,
            TaskStatus::Pending => TaskStatusRow::Pending,
            TaskStatus::Complete => TaskStatusRow::Complete,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: Uuid,
    pub task_list_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatusRow,
    pub order: i64,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(value: TaskRow) -> Self {
        Task {
            id: value.id,
            task_list_id: value.task_list_id,
            title: value.title,
            description: value.description,
            status: value.status.into(),
            order: value.order,
            due_date: value.due_date,
            completed_at: value.completed_at,
            tags: value.tags,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<&Task> for TaskRow {
    fn from(value: &Task) -> Self {
        TaskRow {
            id: value.id,
            task_list_id: value.task_list_id,
            title: value.title.clone(),
            description: value.description.clone(),
            status: value.status.into(),
            order: value.order,
            due_date: value.due_date,
            completed_at: value.completed_at,
            tags: value.tags.clone(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

pub struct JsonTaskReader;

impl domain::task::driven_ports::TaskReader for JsonTaskReader {
    async fn tasks_in_list(
        &self,
        task_list_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to fetch tasks for a task list")?;

        let tasks = handle
            .document()
            .tasks
            .iter()
            .filter(|task| task.task_list_id == task_list_id)
            .cloned()
            .map(Task::from)
            .collect();

        Ok(tasks)
    }

    async fn task_by_id(
        &self,
        task_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to fetch a task by ID")?;

        let task = handle
            .document()
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
            .map(Task::from);

        Ok(task)
    }
}

pub struct JsonTaskWriter;

impl domain::task::driven_ports::TaskWriter for JsonTaskWriter {
    async fn insert_task(
        &self,
        task: &Task,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to insert a new task")?;

        handle.document().tasks.push(TaskRow::from(task));
        handle.save().await.context("saving a new task")?;

        Ok(())
    }

    async fn update_tasks(
        &self,
        tasks: &[Task],
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to update tasks")?;

        let stored_tasks = &mut handle.document().tasks;
        for updated in tasks {
            if let Some(stored) = stored_tasks.iter_mut().find(|row| row.id == updated.id) {
                *stored = TaskRow::from(updated);
            }
        }
        handle.save().await.context("saving updated tasks")?;

        Ok(())
    }

    async fn delete_task(
        &self,
        task_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to remove a task")?;

        let stored_tasks = &mut handle.document().tasks;
        let Some(idx) = stored_tasks.iter().position(|row| row.id == task_id) else {
            return Ok(false);
        };
        stored_tasks.remove(idx);
        handle.save().await.context("saving after task removal")?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
    use crate::domain::task::test_util::task_in_list;
    use crate::domain::test_util::test_time;
    use crate::persistence::test_util::temp_store;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn insert_then_read_back() {
        let (_dir, mut ext_cxn) = temp_store();
        let list = Uuid::new_v4();
        let mut task = task_in_list(list, "Write tests", 0);
        task.tags = vec!["work".to_owned()];
        task.due_date = Some(test_time());

        JsonTaskWriter
            .insert_task(&task, &mut ext_cxn)
            .await
            .expect("task insert failed");
        JsonTaskWriter
            .insert_task(&task_in_list(Uuid::new_v4(), "Elsewhere", 0), &mut ext_cxn)
            .await
            .expect("task insert failed");

        let in_list = JsonTaskReader.tasks_in_list(list, &mut ext_cxn).await;
        assert_that!(in_list).is_ok().is_equal_to(vec![task.clone()]);

        let by_id = JsonTaskReader.task_by_id(task.id, &mut ext_cxn).await;
        assert_that!(by_id).is_ok().is_equal_to(Some(task));
    }

    #[tokio::test]
    async fn update_overwrites_matching_tasks_only() {
        let (_dir, mut ext_cxn) = temp_store();
        let list = Uuid::new_v4();
        let first = task_in_list(list, "first", 0);
        let second = task_in_list(list, "second", 1);
        for task in [&first, &second] {
            JsonTaskWriter
                .insert_task(task, &mut ext_cxn)
                .await
                .expect("task insert failed");
        }

        let mut renamed = first.clone();
        renamed.title = "renamed".to_owned();
        renamed.status = TaskStatus::Pending;
        let phantom = task_in_list(list, "never stored", 2);
        JsonTaskWriter
            .update_tasks(&[renamed.clone(), phantom], &mut ext_cxn)
            .await
            .expect("task update failed");

        let in_list = JsonTaskReader.tasks_in_list(list, &mut ext_cxn).await;
        assert_that!(in_list)
            .is_ok()
            .is_equal_to(vec![renamed, second]);
    }

    #[tokio::test]
    async fn delete_reports_whether_task_existed() {
        let (_dir, mut ext_cxn) = temp_store();
        let task = task_in_list(Uuid::new_v4(), "doomed", 0);
        JsonTaskWriter
            .insert_task(&task, &mut ext_cxn)
            .await
            .expect("task insert failed");

        let first_delete = JsonTaskWriter.delete_task(task.id, &mut ext_cxn).await;
        assert_that!(first_delete).is_ok().is_true();

        let second_delete = JsonTaskWriter.delete_task(task.id, &mut ext_cxn).await;
        assert_that!(second_delete).is_ok().is_false();
    }

    #[test]
    fn status_is_stored_lowercase() {
        let row = TaskRow::from(&task_in_list(Uuid::new_v4(), "status check", 0));
        let serialized = serde_json::to_value(&row).expect("row should serialize");

        assert_eq!(Some("incomplete"), serialized["status"].as_str());
        assert!(serialized["completedAt"].is_null());
        assert!(serialized.get("taskListId").is_some());
    }
}
