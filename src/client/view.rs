use crate::dto;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Which statuses a [TaskFilter] lets through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(dto::task::TaskStatus),
}

/// Narrows a list of tasks down to what the user is searching for
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive text to look for in the title or description. Empty matches everything.
    pub search: String,
    /// Tags which must all be present on a task
    pub tags: Vec<String>,
    pub status: StatusFilter,
}

impl TaskFilter {
    pub fn matches(&self, task: &dto::task::Task) -> bool {
        let query = self.search.to_lowercase();
        let search_match = query.is_empty()
            || task.title.to_lowercase().contains(&query)
            || task.description.to_lowercase().contains(&query);
        let tags_match = self.tags.iter().all(|tag| task.tags.contains(tag));
        let status_match = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        };

        search_match && tags_match && status_match
    }

    /// Keeps the tasks this filter matches, in their original order
    pub fn apply<'t>(
        &self,
        tasks: impl IntoIterator<Item = &'t dto::task::Task>,
    ) -> Vec<&'t dto::task::Task> {
        tasks.into_iter().filter(|task| self.matches(task)).collect()
    }
}

/// Tasks belonging to one list, sorted by their position. Tasks sharing a position keep their
/// relative order.
pub fn tasks_for_list(tasks: &[dto::task::Task], task_list_id: Uuid) -> Vec<&dto::task::Task> {
    let mut in_list: Vec<&dto::task::Task> = tasks
        .iter()
        .filter(|task| task.task_list_id == task_list_id)
        .collect();
    in_list.sort_by_key(|task| task.order);

    in_list
}

/// Every distinct tag used across `tasks`, sorted
pub fn all_tags(tasks: &[dto::task::Task]) -> Vec<String> {
    tasks
        .iter()
        .flat_map(|task| task.tags.iter().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// The list to show first: the user's default list if it's cached, otherwise the first list
pub fn default_task_list<'l>(
    task_lists: &'l [dto::task_list::TaskList],
    user: Option<&dto::user::AuthenticatedUser>,
) -> Option<&'l dto::task_list::TaskList> {
    let preferred = user
        .and_then(|user| user.default_task_list_id)
        .and_then(|list_id| task_lists.iter().find(|list| list.id == list_id));

    preferred.or_else(|| task_lists.first())
}

/// The status a task moves to when its status is toggled: incomplete, then pending, then
/// complete, then back to incomplete
pub fn next_status(status: dto::task::TaskStatus) -> dto::task::TaskStatus {
    match status {
        dto::task::TaskStatus::Incomplete => dto::task::TaskStatus::Pending,
        dto::task::TaskStatus::Pending => dto::task::TaskStatus::Complete,
        dto::task::TaskStatus::Complete => dto::task::TaskStatus::Incomplete,
    }
}

/// The task IDs of `list_view` after dropping `dragged` onto `target`: the dragged task is
/// taken out and reinserted at the target's index. Returns [None] when nothing would move,
/// either because the two are the same task or because one of them isn't in the view.
pub fn move_task(
    list_view: &[&dto::task::Task],
    dragged: Uuid,
    target: Uuid,
) -> Option<Vec<Uuid>> {
    if dragged == target {
        return None;
    }
    let dragged_index = list_view.iter().position(|task| task.id == dragged)?;
    let target_index = list_view.iter().position(|task| task.id == target)?;

    let mut ordered_ids: Vec<Uuid> = list_view.iter().map(|task| task.id).collect();
    let moved = ordered_ids.remove(dragged_index);
    ordered_ids.insert(target_index, moved);

    Some(ordered_ids)
}

/// Splits comma-separated tag input, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}
