//! Business logic for the task board. Each submodule defines the entities it owns, the
//! "driven ports" it needs from the outside world (storage, hashing), and a "driving port"
//! service trait which the API layer calls into.

pub mod task;
pub mod task_list;
pub mod user;

#[cfg(test)]
pub(crate) mod test_util;
