use crate::domain::task_list::driven_ports::TaskListReader;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Name given to the task list every user receives on signup
pub const DEFAULT_TASK_LIST_NAME: &str = "Tasks";

/// A named container of tasks owned by a single user
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskList {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskList {
    /// Builds the default task list for a freshly created user
    pub fn default_for_owner(owner_id: Uuid, now: DateTime<Utc>) -> TaskList {
        TaskList {
            id: Uuid::new_v4(),
            name: DEFAULT_TASK_LIST_NAME.to_owned(),
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

pub mod driven_ports {
    use super::*;

    pub trait TaskListReader {
        async fn task_lists_for_owner(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TaskList>, anyhow::Error>;
    }

    pub trait TaskListWriter {
        async fn create_task_list(
            &self,
            task_list: &TaskList,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }

    pub trait DetectTaskList {
        async fn task_list_exists(
            &self,
            task_list_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait TaskListPort {
        async fn task_lists_for_user(
            &self,
            user_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            task_list_read: &impl driven_ports::TaskListReader,
        ) -> Result<Vec<TaskList>, anyhow::Error>;
    }
}

#[derive(Debug, Error)]
pub(super) enum TaskListExistsErr {
    #[error("task list with ID {0} does not exist")]
    TaskListDoesNotExist(Uuid),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

pub(super) async fn verify_task_list_exists(
    id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    task_list_detect: &impl driven_ports::DetectTaskList,
) -> Result<(), TaskListExistsErr> {
    let does_task_list_exist = task_list_detect.task_list_exists(id, ext_cxn).await?;

    if does_task_list_exist {
        Ok(())
    } else {
        Err(TaskListExistsErr::TaskListDoesNotExist(id))
    }
}

pub struct TaskListService {}

impl driving_ports::TaskListPort for TaskListService {
    async fn task_lists_for_user(
        &self,
        user_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        task_list_read: &impl TaskListReader,
    ) -> Result<Vec<TaskList>, anyhow::Error> {
        let task_lists_result = task_list_read
            .task_lists_for_owner(user_id, &mut *ext_cxn)
            .await;
        if let Err(ref port_err) = task_lists_result {
            error!("Task list fetch failure for user {user_id}: {port_err}");
        }

        task_lists_result.context("Fetching task lists for a user")
    }
}

#[cfg(test)]
mod verify_task_list_exists_tests {
    use super::test_util::InMemoryTaskListPersistence;
    use super::*;
    use crate::domain::test_util::{Connectivity, test_time};
    use crate::external_connections;
    use speculoos::prelude::*;
    use std::sync::RwLock;

    #[tokio::test]
    async fn detects_task_list() {
        let task_list = TaskList::default_for_owner(Uuid::new_v4(), test_time());
        let persistence = RwLock::new(InMemoryTaskListPersistence::new_with_task_lists(&[
            task_list.clone(),
        ]));
        let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

        let exists_result = verify_task_list_exists(task_list.id, &mut ext_cxn, &persistence).await;
        assert_that!(exists_result).is_ok();
    }

    #[tokio::test]
    async fn errors_when_task_list_doesnt_exist() {
        let persistence = InMemoryTaskListPersistence::new_locked();
        let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
        let missing_id = Uuid::new_v4();

        let exists_result = verify_task_list_exists(missing_id, &mut ext_cxn, &persistence).await;
        assert_that!(exists_result).is_err().matches(|inner_err| {
            matches!(inner_err, TaskListExistsErr::TaskListDoesNotExist(id) if *id == missing_id)
        });
    }

    #[tokio::test]
    async fn propagates_port_error() {
        let mut raw_persistence = InMemoryTaskListPersistence::new();
        raw_persistence.connectivity = Connectivity::Disconnected;
        let persistence = RwLock::new(raw_persistence);
        let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

        let exists_result =
            verify_task_list_exists(Uuid::new_v4(), &mut ext_cxn, &persistence).await;
        assert_that!(exists_result)
            .is_err()
            .matches(|inner_err| matches!(inner_err, TaskListExistsErr::PortError(_)));
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use std::sync::{Mutex, RwLock};

    pub struct InMemoryTaskListPersistence {
        pub task_lists: Vec<TaskList>,
        pub connectivity: Connectivity,
    }

    impl InMemoryTaskListPersistence {
        pub fn new() -> InMemoryTaskListPersistence {
            InMemoryTaskListPersistence {
                task_lists: Vec::new(),
                connectivity: Connectivity::Connected,
            }
        }

        pub fn new_with_task_lists(task_lists: &[TaskList]) -> InMemoryTaskListPersistence {
            InMemoryTaskListPersistence {
                task_lists: task_lists.to_vec(),
                connectivity: Connectivity::Connected,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryTaskListPersistence> {
            RwLock::new(Self::new())
        }
    }

    impl driven_ports::TaskListReader for RwLock<InMemoryTaskListPersistence> {
        async fn task_lists_for_owner(
            &self,
            owner_id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TaskList>, anyhow::Error> {
            let persistence = self.read().expect("task list persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            Ok(persistence
                .task_lists
                .iter()
                .filter(|list| list.owner_id == owner_id)
                .cloned()
                .collect())
        }
    }

    impl driven_ports::TaskListWriter for RwLock<InMemoryTaskListPersistence> {
        async fn create_task_list(
            &self,
            task_list: &TaskList,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error> {
            let mut persistence = self.write().expect("task list persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            persistence.task_lists.push(task_list.clone());
            Ok(())
        }
    }

    impl driven_ports::DetectTaskList for RwLock<InMemoryTaskListPersistence> {
        async fn task_list_exists(
            &self,
            task_list_id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error> {
            let persistence = self.read().expect("task list persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            Ok(persistence
                .task_lists
                .iter()
                .any(|list| list.id == task_list_id))
        }
    }

    pub struct MockTaskListService {
        pub task_lists_for_user_result: FakeImplementation<Uuid, anyhow::Result<Vec<TaskList>>>,
    }

    impl MockTaskListService {
        pub fn new() -> MockTaskListService {
            MockTaskListService {
                task_lists_for_user_result: FakeImplementation::new(),
            }
        }
    }

    impl driving_ports::TaskListPort for Mutex<MockTaskListService> {
        async fn task_lists_for_user(
            &self,
            user_id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_list_read: &impl TaskListReader,
        ) -> Result<Vec<TaskList>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock task list service mutex poisoned");
            locked_self.task_lists_for_user_result.save_arguments(user_id);

            locked_self.task_lists_for_user_result.return_value_anyhow()
        }
    }
}
