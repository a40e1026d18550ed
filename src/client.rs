//! Client-side mirror of the task board. [store::ClientStore] keeps a local copy of task lists
//! and tasks, applies changes optimistically, and reconciles them with the server through a
//! [api::TaskBoardClient].

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

pub mod api;
pub mod session;
pub mod store;
pub mod view;

/// Failures talking to the task board server
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach the task board: {0}")]
    Transport(#[source] anyhow::Error),
    #[error("task board responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode the task board's response: {0}")]
    Decode(#[source] anyhow::Error),
}

#[cfg(test)]
impl Clone for ClientError {
    fn clone(&self) -> Self {
        match self {
            Self::Transport(err) => Self::Transport(anyhow::anyhow!(format!("{err}"))),
            Self::Status { status, message } => Self::Status {
                status: *status,
                message: message.clone(),
            },
            Self::Decode(err) => Self::Decode(anyhow::anyhow!(format!("{err}"))),
        }
    }
}

/// Writes `value` to `path` as pretty JSON, standing in for the browser's local storage
async fn save_local<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let serialized = serde_json::to_vec_pretty(value).context("serializing local state")?;
    tokio::fs::write(path, serialized)
        .await
        .with_context(|| format!("writing local state to {}", path.display()))
}

/// Reads a value saved by [save_local]. A missing file yields the default value.
async fn load_local<T: DeserializeOwned + Default>(path: &Path) -> anyhow::Result<T> {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("reading local state from {}", path.display()));
        }
    };

    serde_json::from_slice(&contents)
        .with_context(|| format!("local state in {} was malformed", path.display()))
}
