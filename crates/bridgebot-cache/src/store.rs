// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pending-context cache store.
//!
//! [`CacheStore`] holds the ordered sequence of pending chat entries in
//! memory behind a mutex and mirrors every mutation to disk with an
//! atomic replace (write temp file, rename over the original). Appends and
//! reconciliation serialize on the store's internal lock, so no
//! read-modify-write interleaving can lose an update.
//!
//! Entries carry a process-local sequence id assigned on insertion.
//! Snapshots remember those ids, and reconciliation removes exactly the
//! snapshot's ids -- two byte-identical messages are never confused for
//! one another. Ids are not persisted; the on-disk file is the plain JSON
//! array of entries that external tools read as the pending-context queue.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bridgebot_core::{BridgeError, CachedMessage};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A cache entry tagged with its in-memory sequence id.
#[derive(Debug, Clone)]
pub struct SeqEntry {
    pub(crate) seq: u64,
    pub message: CachedMessage,
}

/// An immutable copy of the cache taken at dispatch start.
///
/// Used later for reconciliation: the snapshot's sequence ids identify
/// exactly which entries the dispatch consumed.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    entries: Vec<SeqEntry>,
}

impl CacheSnapshot {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The snapshot's messages in arrival order.
    pub fn messages(&self) -> Vec<CachedMessage> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }

    fn seq_set(&self) -> HashSet<u64> {
        self.entries.iter().map(|e| e.seq).collect()
    }
}

struct Inner {
    entries: Vec<SeqEntry>,
    next_seq: u64,
}

/// Durable ordered sequence of pending chat entries.
pub struct CacheStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl CacheStore {
    /// Opens the cache at `path`, creating an empty file when missing.
    ///
    /// A malformed file is logged and treated as empty; the previous
    /// content is overwritten on the next mutation.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BridgeError> {
        let path = path.into();

        let messages: Vec<CachedMessage> = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "cache file is malformed, starting with an empty cache"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                write_atomic(&path, b"[]").await?;
                info!(path = %path.display(), "created new cache file");
                Vec::new()
            }
            Err(e) => {
                return Err(BridgeError::Cache {
                    message: format!("failed to read cache file {}", path.display()),
                    source: Some(Box::new(e)),
                });
            }
        };

        let entries: Vec<SeqEntry> = messages
            .into_iter()
            .enumerate()
            .map(|(i, message)| SeqEntry {
                seq: i as u64,
                message,
            })
            .collect();
        let next_seq = entries.len() as u64;

        debug!(
            path = %path.display(),
            entries = entries.len(),
            "cache store opened"
        );

        Ok(Self {
            path,
            inner: Mutex::new(Inner { entries, next_seq }),
        })
    }

    /// Number of pending entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Appends one entry and persists the full sequence.
    pub async fn append(&self, message: CachedMessage) -> Result<(), BridgeError> {
        let mut inner = self.inner.lock().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(SeqEntry { seq, message });
        persist(&self.path, &inner.entries).await
    }

    /// Takes an immutable copy of the current cache contents.
    pub async fn snapshot(&self) -> CacheSnapshot {
        let inner = self.inner.lock().await;
        CacheSnapshot {
            entries: inner.entries.clone(),
        }
    }

    /// Removes exactly the snapshot's entries and persists the remainder.
    ///
    /// Entries that arrived after the snapshot was taken are preserved
    /// verbatim, in arrival order. Reconciling a snapshot whose entries are
    /// already gone is a no-op. Returns the number of entries removed.
    pub async fn reconcile(&self, snapshot: &CacheSnapshot) -> Result<usize, BridgeError> {
        let consumed = snapshot.seq_set();
        let mut inner = self.inner.lock().await;
        let before = inner.entries.len();
        inner.entries.retain(|e| !consumed.contains(&e.seq));
        let removed = before - inner.entries.len();
        if removed > 0 {
            persist(&self.path, &inner.entries).await?;
        }
        debug!(removed, remaining = inner.entries.len(), "cache reconciled");
        Ok(removed)
    }

    /// The current messages in arrival order.
    pub async fn messages(&self) -> Vec<CachedMessage> {
        let inner = self.inner.lock().await;
        inner.entries.iter().map(|e| e.message.clone()).collect()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Serializes `entries` and atomically replaces the cache file.
async fn persist(path: &Path, entries: &[SeqEntry]) -> Result<(), BridgeError> {
    let messages: Vec<&CachedMessage> = entries.iter().map(|e| &e.message).collect();
    let bytes = serde_json::to_vec_pretty(&messages).map_err(|e| BridgeError::Cache {
        message: "failed to serialize cache".to_string(),
        source: Some(Box::new(e)),
    })?;
    write_atomic(path, &bytes).await
}

/// Writes `bytes` to a sibling temp file and renames it over `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BridgeError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| BridgeError::Cache {
            message: format!("failed to write {}", tmp.display()),
            source: Some(Box::new(e)),
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| BridgeError::Cache {
            message: format!("failed to replace {}", path.display()),
            source: Some(Box::new(e)),
        })
}
