use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::oneshot;

use super::{migrations::ensure_schema, storage_key, ProgressStore};

type Reply<T> = oneshot::Sender<Result<T>>;

/// Work for the connection thread, keyed by physical storage key.
enum ProgressCommand {
    Load { key: String, reply: Reply<Option<String>> },
    Save { key: String, data: String, reply: Reply<()> },
    Clear { key: String, reply: Reply<()> },
}

struct Worker {
    sender: Mutex<Option<mpsc::Sender<ProgressCommand>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        drop(
            self.sender
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take(),
        );
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(join_err) = handle.join() {
                error!("Failed to join progress DB thread: {join_err:?}");
            }
        }
    }
}

/// SQLite-backed progress store.
///
/// A dedicated thread owns the connection; async callers send it load,
/// save and clear requests and await the reply.
#[derive(Clone)]
pub struct SqliteStore {
    worker: Arc<Worker>,
    db_path: Arc<PathBuf>,
}

impl SqliteStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<ProgressCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let handle = thread::Builder::new()
            .name("handy-helper-db".into())
            .spawn(move || {
                let conn = match open_connection(&path_for_thread) {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                if ready_tx.send(Ok(())).is_err() {
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    handle_command(&conn, command);
                }
                info!("Progress database thread shutting down");
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Progress database initialized at {}", db_path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                sender: Mutex::new(Some(command_tx)),
                handle: Mutex::new(Some(handle)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> ProgressCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let sender = self
                .worker
                .sender
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            sender
                .as_ref()
                .ok_or_else(|| anyhow!("progress database is closed"))?
                .send(command(reply_tx))
                .map_err(|_| anyhow!("progress database thread is gone"))?;
        }
        reply_rx
            .await
            .map_err(|_| anyhow!("progress database thread terminated unexpectedly"))?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path).context("failed to open SQLite database")?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }
    ensure_schema(&mut conn).context("failed to prepare progress schema")?;
    Ok(conn)
}

fn handle_command(conn: &Connection, command: ProgressCommand) {
    let delivered = match command {
        ProgressCommand::Load { key, reply } => reply
            .send(
                conn.query_row(
                    "SELECT data FROM progress WHERE storage_key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
                .context("failed to query progress"),
            )
            .is_ok(),
        ProgressCommand::Save { key, data, reply } => reply
            .send(
                conn.execute(
                    "INSERT INTO progress (storage_key, data, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(storage_key) DO UPDATE SET
                         data = excluded.data,
                         updated_at = excluded.updated_at",
                    params![key, data, Utc::now().to_rfc3339()],
                )
                .map(|_| ())
                .context("failed to upsert progress"),
            )
            .is_ok(),
        ProgressCommand::Clear { key, reply } => reply
            .send(
                conn.execute("DELETE FROM progress WHERE storage_key = ?1", params![key])
                    .map(|_| ())
                    .context("failed to delete progress"),
            )
            .is_ok(),
    };
    if !delivered {
        error!("Progress caller dropped before receiving result");
    }
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn load(&self, app_key: &str) -> Result<Option<Value>> {
        let key = storage_key(app_key);
        let raw = self
            .request(|reply| ProgressCommand::Load {
                key: key.clone(),
                reply,
            })
            .await?;
        raw.map(|data| {
            serde_json::from_str(&data)
                .with_context(|| format!("stored progress for {key} is not valid JSON"))
        })
        .transpose()
    }

    async fn save(&self, app_key: &str, data: &Value) -> Result<()> {
        let data = serde_json::to_string(data)?;
        self.request(|reply| ProgressCommand::Save {
            key: storage_key(app_key),
            data,
            reply,
        })
        .await
    }

    async fn clear(&self, app_key: &str) -> Result<()> {
        self.request(|reply| ProgressCommand::Clear {
            key: storage_key(app_key),
            reply,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn upserts_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/progress.sqlite3");

        {
            let store = SqliteStore::new(path.clone()).unwrap();
            assert!(store.load("handy-helper").await.unwrap().is_none());
            store.save("handy-helper", &json!({ "v": 1 })).await.unwrap();
            store.save("handy-helper", &json!({ "v": 2 })).await.unwrap();
        }

        let reopened = SqliteStore::new(path).unwrap();
        assert_eq!(
            reopened.load("handy-helper").await.unwrap(),
            Some(json!({ "v": 2 }))
        );

        reopened.clear("handy-helper").await.unwrap();
        assert!(reopened.load("handy-helper").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rows_use_prefixed_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.sqlite3");
        {
            let store = SqliteStore::new(path.clone()).unwrap();
            store.save("handy-helper", &json!({})).await.unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn.prepare("SELECT storage_key FROM progress").unwrap();
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(keys, vec!["nmda-therapy-handy-helper".to_string()]);
    }

    #[tokio::test]
    async fn corrupt_row_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.sqlite3");
        drop(SqliteStore::new(path.clone()).unwrap());
        Connection::open(&path)
            .unwrap()
            .execute(
                "INSERT INTO progress (storage_key, data, updated_at) VALUES (?1, 'not json', '')",
                params![storage_key("handy-helper")],
            )
            .unwrap();

        let store = SqliteStore::new(path).unwrap();
        assert!(store.load("handy-helper").await.is_err());
    }
}
