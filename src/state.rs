//! Persisted local state: the ticket store and the batch target list
//!
//! Both files are read before any network call. A missing file and an
//! unreadable one are reported separately, since the first is fixed by
//! re-running a command and the second needs manual inspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::auth::Ticket;

#[derive(Debug, Error)]
pub enum LocalStateError {
    #[error("{} not found; {hint}", .path.display())]
    NotFound { path: PathBuf, hint: &'static str },

    #[error("{} is corrupted ({detail}); inspect or delete it manually", .path.display())]
    Corrupted { path: PathBuf, detail: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LocalStateError>;

const TICKET_HINT: &str = "run `gridfetch ticket` first";
const TARGETS_HINT: &str = "create it with the power plants to fetch, e.g. [{\"id\": 1, \"name\": \"...\"}]";

/// One entity of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchTarget {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

impl FetchTarget {
    pub fn new(id: Option<i64>, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    /// Lenient read of one record. A null, missing or non-integer `id`
    /// yields `None`; a null or missing `name` yields "".
    fn from_record(index: usize, record: &Value) -> Self {
        let raw_id = record.get("id").filter(|v| !v.is_null());
        let id = raw_id.and_then(Value::as_i64);
        if let (Some(raw), None) = (raw_id, id) {
            warn!(index, id = %raw, "Target id is not an integer");
        }
        let name = record.get("name").and_then(Value::as_str).unwrap_or_default();
        Self::new(id, name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetFile {
    List(Vec<Value>),
    Wrapped { powerplants_info: Vec<Value> },
}

async fn read_state(path: &Path, hint: &'static str) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => LocalStateError::NotFound {
            path: path.to_path_buf(),
            hint,
        },
        _ => LocalStateError::Corrupted {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    })
}

/// Read the persisted `{"tgt": ...}` ticket
pub async fn load_ticket(path: &Path) -> Result<Ticket> {
    let bytes = read_state(path, TICKET_HINT).await?;

    let ticket: Ticket = serde_json::from_slice(&bytes).map_err(|e| LocalStateError::Corrupted {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    if ticket.as_str().trim().is_empty() {
        return Err(LocalStateError::Corrupted {
            path: path.to_path_buf(),
            detail: "empty ticket".to_string(),
        });
    }

    Ok(ticket)
}

/// Persist a ticket, creating parent directories as needed
pub async fn save_ticket(path: &Path, ticket: &Ticket) -> Result<()> {
    let write_err = |source| LocalStateError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let data = serde_json::to_vec_pretty(ticket).map_err(|e| LocalStateError::Write {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    tokio::fs::write(path, data).await.map_err(write_err)
}

/// Read the batch target list.
///
/// Accepts a bare array of `{id, name}` records or an object wrapping it
/// under `powerplants_info`.
pub async fn load_targets(path: &Path) -> Result<Vec<FetchTarget>> {
    let bytes = read_state(path, TARGETS_HINT).await?;

    let file: TargetFile = serde_json::from_slice(&bytes).map_err(|e| LocalStateError::Corrupted {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let records = match file {
        TargetFile::List(records) => records,
        TargetFile::Wrapped { powerplants_info } => powerplants_info,
    };

    Ok(records
        .iter()
        .enumerate()
        .map(|(index, record)| FetchTarget::from_record(index, record))
        .collect())
}
