//! HTTP adapters. Each submodule builds a router for one group of endpoints and drives the
//! matching domain service.

pub mod spa;
pub mod swagger_main;
pub mod task;
pub mod task_list;
pub mod user;

#[cfg(test)]
pub mod test_util;
