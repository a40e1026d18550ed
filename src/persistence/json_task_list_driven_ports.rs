use crate::domain;
use crate::domain::task_list::TaskList;
use crate::external_connections::{ExternalConnectivity, StoreHandle};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TaskListRow {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskListRow> for TaskList {
    fn from(value: TaskListRow) -> Self {
        TaskList {
            id: value.id,
            name: value.name,
            owner_id: value.owner_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<&TaskList> for TaskListRow {
    fn from(value: &TaskList) -> Self {
        TaskListRow {
            id: value.id,
            name: value.name.clone(),
            owner_id: value.owner_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

pub struct JsonTaskListReader;

impl domain::task_list::driven_ports::TaskListReader for JsonTaskListReader {
    async fn task_lists_for_owner(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TaskList>, Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to fetch task lists for a user")?;

        let task_lists = handle
            .document()
            .task_lists
            .iter()
            .filter(|list| list.owner_id == owner_id)
            .cloned()
            .map(TaskList::from)
            .collect();

        Ok(task_lists)
    }
}

impl domain::task_list::driven_ports::DetectTaskList for JsonTaskListReader {
    async fn task_list_exists(
        &self,
        task_list_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to detect a task list")?;

        Ok(handle
            .document()
            .task_lists
            .iter()
            .any(|list| list.id == task_list_id))
    }
}

pub struct JsonTaskListWriter;

impl domain::task_list::driven_ports::TaskListWriter for JsonTaskListWriter {
    async fn create_task_list(
        &self,
        task_list: &TaskList,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut handle = ext_cxn
            .store_cxn()
            .await
            .context("trying to insert a task list")?;

        handle.document().task_lists.push(TaskListRow::from(task_list));
        handle.save().await.context("saving a new task list")?;

        Ok(())
    }
}
