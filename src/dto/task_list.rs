use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// DTO for a task list returned on the API
#[derive(Serialize, Deserialize, ToSchema, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: Uuid,
    #[schema(example = "Tasks")]
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::task_list::TaskList> for TaskList {
    fn from(value: domain::task_list::TaskList) -> Self {
        TaskList {
            id: value.id,
            name: value.name,
            owner_id: value.owner_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
