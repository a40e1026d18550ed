use crate::domain;
use crate::dto::deserialize_some;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Serialize, Deserialize, ToSchema, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Incomplete,
    Pending,
    Complete,
}

impl From<domain::task::TaskStatus> for TaskStatus {
    fn from(value: domain::task::TaskStatus) -> Self {
        match value {
            domain::task::TaskStatus::Incomplete => TaskStatus::Incomplete,
            domain::task::TaskStatus::Pending => TaskStatus::Pending,
            domain::task::TaskStatus::Complete => TaskStatus::Complete,
        }
    }
}

impl From<TaskStatus> for domain::task::TaskStatus {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Incomplete => domain::task::TaskStatus::Incomplete,
            TaskStatus::Pending => domain::task::TaskStatus::Pending,
            TaskStatus::Complete => domain::task::TaskStatus::Complete,
        }
    }
}

/// DTO for a task returned on the API
#[derive(Serialize, Deserialize, ToSchema, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub task_list_id: Uuid,
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[schema(example = "Milk and eggs")]
    pub description: String,
    pub status: TaskStatus,
    #[schema(example = 0)]
    pub order: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[schema(example = json!(["errands"]))]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::task::Task> for Task {
    fn from(value: domain::task::Task) -> Self {
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

impl From<Task> for domain::task::Task {
    fn from(value: Task) -> Self {
        domain::task::Task {
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

/// DTO for creating a new task via the API
#[derive(Serialize, Deserialize, Validate, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[validate(required)]
    pub task_list_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(min = 1))]
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TryFrom<NewTask> for domain::task::NewTask {
    type Error = ValidationErrors;

    fn try_from(value: NewTask) -> Result<Self, Self::Error> {
        value.validate()?;
        let task_list_id = value.task_list_id.ok_or_else(|| required_field("task_list_id"))?;

        Ok(domain::task::NewTask {
            task_list_id,
            title: value.title,
            description: value.description.unwrap_or_default(),
            due_date: value.due_date,
            tags: value.tags.unwrap_or_default(),
        })
    }
}

/// DTO for a partial task update. Absent fields are left alone; `dueDate` and `completedAt`
/// may be sent as null to clear them. Unknown fields, including `id` and `createdAt`, are
/// ignored.
#[derive(Serialize, Deserialize, ToSchema, PartialEq, Eq, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_list_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<TaskUpdate> for domain::task::TaskUpdate {
    fn from(value: TaskUpdate) -> Self {
        domain::task::TaskUpdate {
            task_list_id: value.task_list_id,
            title: value.title,
            description: value.description,
            status: value.status.map(domain::task::TaskStatus::from),
            order: value.order,
            due_date: value.due_date,
            completed_at: value.completed_at,
            tags: value.tags,
        }
    }
}

impl From<&domain::task::TaskUpdate> for TaskUpdate {
    fn from(value: &domain::task::TaskUpdate) -> Self {
        TaskUpdate {
            task_list_id: value.task_list_id,
            title: value.title.clone(),
            description: value.description.clone(),
            status: value.status.map(TaskStatus::from),
            order: value.order,
            due_date: value.due_date,
            completed_at: value.completed_at,
            tags: value.tags.clone(),
        }
    }
}

/// DTO for rewriting the order of tasks within a list
#[derive(Serialize, Deserialize, Validate, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTasks {
    #[validate(required)]
    pub task_list_id: Option<Uuid>,
    /// Task IDs in their new order. Each task named gets its index here as its order.
    #[validate(required)]
    pub ordered_task_ids: Option<Vec<Uuid>>,
}

impl ReorderTasks {
    /// Validates the request and splits it into the list ID and the new ordering
    pub fn into_parts(self) -> Result<(Uuid, Vec<Uuid>), ValidationErrors> {
        self.validate()?;
        let task_list_id = self
            .task_list_id
            .ok_or_else(|| required_field("task_list_id"))?;
        let ordered_task_ids = self
            .ordered_task_ids
            .ok_or_else(|| required_field("ordered_task_ids"))?;

        Ok((task_list_id, ordered_task_ids))
    }
}

fn required_field(field: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new("required"));
    errors
}
