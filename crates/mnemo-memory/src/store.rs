// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed memory store with brute-force vector search.
//!
//! Vectors are stored as little-endian f32 BLOBs. A search scores the most
//! recent `candidate_window` rows against the query and ranks them in
//! memory. The embedder a database was created with is recorded in
//! `store_meta`, and reopening it with a different one is refused.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, SubsecRound, Utc};
use mnemo_config::MemoryConfig;
use mnemo_core::{EmbeddingProvider, MnemoError};
use regex::Regex;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::types::{
    MemoryCategory, MemoryEntry, MemorySearchResult, blob_to_vec, cosine_similarity, l2_norm,
    vec_to_blob,
};

const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    vector BLOB NOT NULL,
    importance REAL NOT NULL DEFAULT 0.5,
    category TEXT NOT NULL DEFAULT 'other',
    session_key TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_memories_category ON memories(category);
CREATE INDEX IF NOT EXISTS idx_memories_session ON memories(session_key);
CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);

CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

const SELECT_COLUMNS: &str =
    "SELECT id, text, vector, importance, category, session_key, created_at FROM memories";

/// Fixed-width UTC timestamps sort lexicographically in time order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

const DEFAULT_IMPORTANCE: f32 = 0.5;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern is valid")
});

fn map_tr_err(e: tokio_rusqlite::Error) -> MnemoError {
    MnemoError::storage(e)
}

/// Persistent store of embedded memories.
///
/// Safe to share behind an `Arc`; every SQL statement runs on the
/// connection's single background thread.
pub struct MemoryStore {
    conn: Connection,
    embedder: Embedder,
    config: MemoryConfig,
    path: PathBuf,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("path", &self.path)
            .field("embedder", &self.embedder.identity())
            .finish()
    }
}

impl MemoryStore {
    /// Opens the database at `config.database_path` with the embedder the
    /// config selects.
    pub async fn open(config: &MemoryConfig) -> Result<Self, MnemoError> {
        let embedder = Embedder::from_config(config)?;
        Self::open_with_embedder(&config.database_path, embedder, config.clone()).await
    }

    /// Opens (creating if needed) the database at `path` with `embedder`.
    ///
    /// `config.database_path` is ignored in favor of `path`; the search
    /// defaults come from `config`.
    pub async fn open_with_embedder(
        path: impl AsRef<Path>,
        embedder: Embedder,
        config: MemoryConfig,
    ) -> Result<Self, MnemoError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(MnemoError::storage)?;
        }

        let conn = Connection::open(&path)
            .await
            .map_err(MnemoError::storage)?;

        let identity = embedder.identity();
        let dims = embedder.dimensions().to_string();
        let (meta_identity, meta_dims) = (identity.clone(), dims.clone());
        let (stored_identity, stored_dims) = conn
            .call(move |conn| {
                conn.execute_batch(SCHEMA)?;
                let tx = conn.transaction()?;
                let read = |key: &str| -> rusqlite::Result<Option<String>> {
                    tx.query_row(
                        "SELECT value FROM store_meta WHERE key = ?1",
                        [key],
                        |row| row.get(0),
                    )
                    .optional()
                };
                let existing = (read("embedder")?, read("dimensions")?);
                tx.execute(
                    "INSERT OR IGNORE INTO store_meta (key, value) VALUES ('embedder', ?1), ('dimensions', ?2)",
                    [&meta_identity, &meta_dims],
                )?;
                tx.commit()?;
                Ok(existing)
            })
            .await
            .map_err(map_tr_err)?;

        if let Some(stored) = stored_identity.filter(|s| *s != identity) {
            return Err(MnemoError::Config(format!(
                "{} was created with embedder `{stored}`, refusing to open it with `{identity}`",
                path.display()
            )));
        }
        if let Some(stored) = stored_dims.filter(|s| *s != dims) {
            return Err(MnemoError::Config(format!(
                "{} holds {stored}-dimensional vectors, embedder produces {dims}",
                path.display()
            )));
        }

        info!(path = %path.display(), embedder = %identity, dims = %dims, "memory store opened");

        Ok(Self {
            conn,
            embedder,
            config,
            path,
        })
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embeds and persists `text` as a new memory.
    ///
    /// Unknown categories become `other`, importance is clamped to [0, 1]
    /// and an empty session key is stored as absent. Nothing is written if
    /// embedding fails.
    pub async fn store(
        &self,
        text: &str,
        importance: f32,
        category: &str,
        session_key: Option<&str>,
    ) -> Result<MemoryEntry, MnemoError> {
        if text.trim().is_empty() {
            return Err(MnemoError::Validation(
                "memory text must not be empty".into(),
            ));
        }

        let vector = self.embedder.embed(text).await?;
        if vector.len() != self.embedder.dimensions() {
            return Err(MnemoError::embedding(format!(
                "embedder returned {} dimensions, store expects {}",
                vector.len(),
                self.embedder.dimensions()
            )));
        }
        if l2_norm(&vector) == 0.0 {
            return Err(MnemoError::embedding(
                "text produced an empty embedding (no signal to store)",
            ));
        }

        let entry = MemoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            vector,
            importance: clamp_importance(importance),
            category: MemoryCategory::coerce(category),
            session_key: session_key
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            created_at: Utc::now().trunc_subsecs(6),
        };

        let row = entry.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO memories (id, text, vector, importance, category, session_key, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        row.id,
                        row.text,
                        vec_to_blob(&row.vector),
                        f64::from(row.importance),
                        row.category.as_str(),
                        row.session_key,
                        row.created_at.format(TIMESTAMP_FORMAT).to_string(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(
            id = %entry.id,
            category = %entry.category,
            importance = entry.importance,
            chars = entry.text.chars().count(),
            "memory stored"
        );
        Ok(entry)
    }

    /// Ranks the most recent memories by similarity to `query`.
    ///
    /// `limit == 0` and `min_score <= 0` fall back to the configured
    /// defaults. Results are ordered by score, then recency.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<MemorySearchResult>, MnemoError> {
        self.search_filtered(query, limit, min_score, None).await
    }

    /// Like [`MemoryStore::search`], restricted to one category.
    pub async fn search_in_category(
        &self,
        query: &str,
        limit: usize,
        min_score: f32,
        category: MemoryCategory,
    ) -> Result<Vec<MemorySearchResult>, MnemoError> {
        self.search_filtered(query, limit, min_score, Some(category))
            .await
    }

    async fn search_filtered(
        &self,
        query: &str,
        limit: usize,
        min_score: f32,
        category: Option<MemoryCategory>,
    ) -> Result<Vec<MemorySearchResult>, MnemoError> {
        if query.trim().is_empty() {
            return Err(MnemoError::Validation("search query must not be empty".into()));
        }
        let limit = if limit == 0 { self.config.max_results } else { limit };
        let min_score = if min_score > 0.0 {
            min_score
        } else {
            self.config.min_score
        };

        let query_vector = self.embedder.embed(query).await?;
        let candidates = self.load_candidates(category).await?;
        let scanned = candidates.len();
        let results = rank(&query_vector, candidates, limit, min_score);

        debug!(
            scanned,
            matched = results.len(),
            limit,
            min_score,
            category = ?category,
            "memory search complete"
        );
        Ok(results)
    }

    async fn load_candidates(
        &self,
        category: Option<MemoryCategory>,
    ) -> Result<Vec<MemoryEntry>, MnemoError> {
        let window = i64::try_from(self.config.candidate_window).unwrap_or(i64::MAX);
        let category = category.map(|c| c.as_str().to_string());
        self.conn
            .call(move |conn| {
                let entries = match category {
                    Some(category) => {
                        let mut stmt = conn.prepare(&format!(
                            "{SELECT_COLUMNS} WHERE category = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
                        ))?;
                        stmt.query_map(rusqlite::params![category, window], row_to_entry)?
                            .collect::<Result<Vec<_>, _>>()?
                    }
                    None => {
                        let mut stmt = conn.prepare(&format!(
                            "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                        ))?;
                        stmt.query_map(rusqlite::params![window], row_to_entry)?
                            .collect::<Result<Vec<_>, _>>()?
                    }
                };
                Ok(entries)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Fetches one memory by id.
    pub async fn get(&self, id: &str) -> Result<Option<MemoryEntry>, MnemoError> {
        let id = canonical_id(id)?;
        self.conn
            .call(move |conn| {
                let entry = conn
                    .query_row(
                        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                        [&id],
                        row_to_entry,
                    )
                    .optional()?;
                Ok(entry)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Permanently removes a memory.
    pub async fn delete(&self, id: &str) -> Result<(), MnemoError> {
        let id = canonical_id(id)?;
        let target = id.clone();
        let affected = self
            .conn
            .call(move |conn| {
                let n = conn.execute("DELETE FROM memories WHERE id = ?1", [&target])?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;

        if affected == 0 {
            return Err(MnemoError::NotFound(format!("memory {id}")));
        }
        debug!(id = %id, "memory deleted");
        Ok(())
    }

    /// Total number of stored memories.
    pub async fn count(&self) -> Result<usize, MnemoError> {
        let count = self
            .conn
            .call(|conn| {
                let n: i64 = conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Closes the database connection.
    ///
    /// Takes the store by value. A store shared through `Arc` must only be
    /// closed once every other holder is done with it.
    pub async fn close(self) -> Result<(), MnemoError> {
        debug!(path = %self.path.display(), "closing memory store");
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Lowercases `id` and checks it is a canonical hyphenated UUID.
fn canonical_id(id: &str) -> Result<String, MnemoError> {
    let id = id.trim().to_ascii_lowercase();
    if UUID_RE.is_match(&id) {
        Ok(id)
    } else {
        Err(MnemoError::Validation(format!("invalid memory id: {id:?}")))
    }
}

fn clamp_importance(importance: f32) -> f32 {
    if importance.is_finite() {
        importance.clamp(0.0, 1.0)
    } else {
        DEFAULT_IMPORTANCE
    }
}

/// Scores `candidates` (newest first) and keeps the best `limit` at or
/// above `min_score`.
///
/// The sort is stable, so equal scores keep the newer entry first.
/// Candidates whose vector length differs from the query are skipped.
fn rank(
    query: &[f32],
    candidates: Vec<MemoryEntry>,
    limit: usize,
    min_score: f32,
) -> Vec<MemorySearchResult> {
    let mut results: Vec<MemorySearchResult> = candidates
        .into_iter()
        .filter_map(|entry| {
            let score = cosine_similarity(query, &entry.vector)?;
            (score >= min_score).then_some(MemorySearchResult { entry, score })
        })
        .collect();
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(limit);
    results
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryEntry> {
    let blob: Vec<u8> = row.get(2)?;
    let importance: f64 = row.get(3)?;
    let category: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(MemoryEntry {
        id: row.get(0)?,
        text: row.get(1)?,
        vector: blob_to_vec(&blob),
        importance: importance as f32,
        category: MemoryCategory::coerce(&category),
        session_key: row.get(5)?,
        created_at,
    })
}
