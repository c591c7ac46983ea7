//! SQLite-backed fault store with in-memory cosine similarity search.
//!
//! Fault embeddings are write-once: each fault gets exactly one row in
//! `fault_embeddings`. Similarity search runs against a pre-normalized
//! matrix of all stored embeddings that is rebuilt lazily when marked dirty.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Axis};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::embedding::{decode_f32, encode_f32, normalized};
use crate::schema::SCHEMA_SQL;
use crate::types::*;
use wellsync_core::{Asset, AssetKind, AssetRef, Error, FaultRecord, NewFault, Result};

/// SQLite store for assets, faults and fault embeddings.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    embedding_dim: usize,
    /// Pre-loaded normalized embedding matrix for vector search: (N, dim) float32.
    embedding_matrix: Mutex<EmbeddingMatrix>,
}

struct EmbeddingMatrix {
    /// Normalized embeddings, shape (N, dim).
    matrix: Array2<f32>,
    /// Fault IDs corresponding to each row.
    fault_ids: Vec<String>,
    /// Whether the matrix needs reloading.
    dirty: bool,
}

impl SqliteStore {
    /// Open or create the SQLite store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/wellsync.db`.
    pub fn open(db_dir: impl AsRef<Path>, embedding_dim: usize) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("wellsync.db");

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
            embedding_dim,
            embedding_matrix: Mutex::new(EmbeddingMatrix {
                matrix: Array2::zeros((0, embedding_dim)),
                fault_ids: Vec::new(),
                dirty: true,
            }),
        };

        store.load_embedding_matrix()?;

        info!(
            "SqliteStore initialized: {} faults, {} embeddings, dim={}, path={}",
            store.count_faults()?,
            store.count_embeddings()?,
            embedding_dim,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    // ---------------------------------------------------------------
    // Assets
    // ---------------------------------------------------------------

    /// Insert or replace an asset.
    pub fn upsert_asset(&self, asset: &Asset) -> Result<()> {
        let details = asset
            .fault_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO assets (id, kind, name, status, fault_details_json, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(id) DO UPDATE SET kind = excluded.kind, name = excluded.name, \
             status = excluded.status, fault_details_json = excluded.fault_details_json, \
             updated_at = excluded.updated_at",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            asset.id,
            asset.kind.as_str(),
            asset.name,
            asset.status,
            details,
            asset.updated_at.to_rfc3339(),
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Get an asset by ID.
    pub fn get_asset(&self, id: &str) -> Result<Option<Asset>> {
        let conn = self.conn.lock();
        let asset = conn
            .prepare_cached("SELECT * FROM assets WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], Self::row_to_asset)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(asset)
    }

    /// Flip an asset's status to `Fault` and record the fault details.
    ///
    /// Returns `false` when no asset with that id and kind is registered.
    pub fn mark_asset_faulted(
        &self,
        asset: &AssetRef,
        details: &serde_json::Value,
    ) -> Result<bool> {
        let details = serde_json::to_string(details)?;
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE assets SET status = 'Fault', fault_details_json = ?1, updated_at = ?2 \
                 WHERE id = ?3 AND kind = ?4",
                params![details, Utc::now().to_rfc3339(), asset.id, asset.kind.as_str()],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    pub fn count_assets(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM assets")
    }

    // ---------------------------------------------------------------
    // Faults
    // ---------------------------------------------------------------

    /// Insert a fault. Returns the stored record.
    pub fn insert_fault(&self, fault: &NewFault) -> Result<FaultRecord> {
        let record = fault.to_record();
        let specs = fault
            .part_specifications
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO faults (fault_id, well_id, transformer_id, part_id, fault_type, \
             status, timestamp, description, part_specifications_json) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            record.fault_id,
            record.well_id,
            record.transformer_id,
            record.part_id,
            record.fault_type,
            record.status,
            fault.timestamp.to_rfc3339(),
            record.description,
            specs,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!("Inserted fault {} ({})", record.fault_id, record.fault_type);
        Ok(record)
    }

    /// Get the raw row for a fault.
    pub fn get_fault_row(&self, fault_id: &str) -> Result<Option<FaultRow>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM faults WHERE fault_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![fault_id], Self::row_to_fault)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// Get a fault by ID.
    pub fn get_fault(&self, fault_id: &str) -> Result<Option<FaultRecord>> {
        Ok(self.get_fault_row(fault_id)?.map(FaultRecord::from))
    }

    /// List faults newest first, optionally scoped to one asset.
    pub fn list_faults(&self, filter: &FaultFilter) -> Result<Vec<FaultRecord>> {
        let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM faults \
                 WHERE (?1 IS NULL OR well_id = ?1) AND (?2 IS NULL OR transformer_id = ?2) \
                 ORDER BY timestamp DESC LIMIT ?3",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![filter.well_id, filter.transformer_id, limit],
                Self::row_to_fault,
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let faults = rows
            .map(|r| r.map(FaultRecord::from).map_err(|e| Error::Database(e.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(faults)
    }

    pub fn count_faults(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM faults")
    }

    /// Faults that have no embedding yet, oldest first.
    pub fn get_faults_without_embedding(&self, limit: usize) -> Result<Vec<FaultRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT f.* FROM faults f \
                 LEFT JOIN fault_embeddings fe ON fe.fault_id = f.fault_id \
                 WHERE fe.fault_id IS NULL \
                 ORDER BY f.timestamp ASC LIMIT ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_fault)
            .map_err(|e| Error::Database(e.to_string()))?;
        let faults = rows
            .map(|r| r.map(FaultRecord::from).map_err(|e| Error::Database(e.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(faults)
    }

    // ---------------------------------------------------------------
    // Fault Embeddings
    // ---------------------------------------------------------------

    /// Store the embedding for a fault. Fails if one is already stored.
    pub fn add_fault_embedding(&self, fault_id: &str, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.embedding_dim {
            return Err(Error::Storage(format!(
                "Embedding for fault {} has dimension {}, expected {}",
                fault_id,
                embedding.len(),
                self.embedding_dim
            )));
        }

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO fault_embeddings (fault_id, embedding, dimension, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            fault_id,
            encode_f32(embedding),
            embedding.len() as i64,
            Utc::now().to_rfc3339(),
        ])
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                Error::DuplicateEmbedding(fault_id.to_string())
            } else if msg.contains("FOREIGN KEY constraint") {
                Error::NotFound(format!("fault {}", fault_id))
            } else {
                Error::Database(msg)
            }
        })?;
        drop(conn);

        self.append_to_matrix(fault_id, Array1::from(embedding.to_vec()));
        Ok(())
    }

    /// Whether a fault already has its embedding.
    pub fn has_fault_embedding(&self, fault_id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let found: Option<i64> = conn
            .prepare_cached("SELECT 1 FROM fault_embeddings WHERE fault_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![fault_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    pub fn count_embeddings(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM fault_embeddings")
    }

    /// Append a freshly stored embedding to the in-memory matrix without a full reload.
    fn append_to_matrix(&self, fault_id: &str, embedding: Array1<f32>) {
        let mut mat = self.embedding_matrix.lock();
        if mat.dirty {
            return;
        }
        let Some(unit) = normalized(&embedding) else {
            debug!("Zero-norm embedding for fault {} left out of matrix", fault_id);
            return;
        };
        if mat.matrix.nrows() == 0 {
            mat.matrix = unit.insert_axis(Axis(0));
        } else if let Err(e) = mat.matrix.push(Axis(0), unit.view()) {
            warn!("Matrix append failed for fault {}: {}; scheduling reload", fault_id, e);
            mat.dirty = true;
            return;
        }
        mat.fault_ids.push(fault_id.to_string());
    }

    // ---------------------------------------------------------------
    // Vector Search
    // ---------------------------------------------------------------

    /// Load and normalize all fault embeddings into a matrix for fast search.
    fn load_embedding_matrix(&self) -> Result<()> {
        let mut fault_ids = Vec::new();
        let mut rows: Vec<Array1<f32>> = Vec::new();

        {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare("SELECT fault_id, embedding FROM fault_embeddings")
                .map_err(|e| Error::Database(e.to_string()))?;
            let mapped = stmt
                .query_map([], |row| {
                    let fault_id: String = row.get(0)?;
                    let blob: Vec<u8> = row.get(1)?;
                    Ok((fault_id, blob))
                })
                .map_err(|e| Error::Database(e.to_string()))?;

            for row in mapped {
                let (fault_id, blob) = row.map_err(|e| Error::Database(e.to_string()))?;
                let unit = decode_f32(&blob)
                    .filter(|v| v.len() == self.embedding_dim)
                    .and_then(|v| normalized(&v));
                match unit {
                    Some(unit) => {
                        fault_ids.push(fault_id);
                        rows.push(unit);
                    }
                    None => warn!("Skipping unusable embedding for fault {}", fault_id),
                }
            }
        }

        let mut matrix = Array2::zeros((rows.len(), self.embedding_dim));
        for (i, row) in rows.iter().enumerate() {
            matrix.row_mut(i).assign(row);
        }

        let mut mat = self.embedding_matrix.lock();
        mat.matrix = matrix;
        mat.fault_ids = fault_ids;
        mat.dirty = false;
        debug!("Loaded {} fault embeddings into matrix", mat.fault_ids.len());
        Ok(())
    }

    fn ensure_matrix_loaded(&self) -> Result<()> {
        if self.embedding_matrix.lock().dirty {
            self.load_embedding_matrix()?;
        }
        Ok(())
    }

    /// Cosine similarity search over every stored fault embedding.
    ///
    /// Keeps rows with `similarity >= similarity_threshold`, sorted by
    /// descending similarity and capped at `match_count`.
    pub fn search_faults(&self, query: &SimilarityQuery) -> Result<Vec<FaultMatchRow>> {
        if query.query_embedding.len() != self.embedding_dim {
            return Err(Error::Search(format!(
                "Query embedding has dimension {}, expected {}",
                query.query_embedding.len(),
                self.embedding_dim
            )));
        }
        if query.match_count == 0 {
            return Ok(Vec::new());
        }

        self.ensure_matrix_loaded()?;

        let Some(q) = normalized(&Array1::from(query.query_embedding.clone())) else {
            debug!("Zero-norm query embedding; no similarity is defined");
            return Ok(Vec::new());
        };

        let top: Vec<(String, f32)> = {
            let mat = self.embedding_matrix.lock();
            if mat.matrix.nrows() == 0 {
                return Ok(Vec::new());
            }

            // (N, dim) @ (dim,) → (N,)
            let similarities = mat.matrix.dot(&q);

            let mut indexed: Vec<(usize, f32)> = similarities
                .iter()
                .enumerate()
                .map(|(i, &s)| (i, s))
                .filter(|&(_, s)| s >= query.similarity_threshold)
                .collect();
            indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            indexed.truncate(query.match_count);

            indexed
                .into_iter()
                .map(|(i, s)| (mat.fault_ids[i].clone(), s))
                .collect()
        };

        let mut results = Vec::with_capacity(top.len());
        for (fault_id, similarity) in top {
            match self.get_fault_row(&fault_id)? {
                Some(fault) => results.push(FaultMatchRow { fault, similarity }),
                None => debug!("Embedding for missing fault {} ignored", fault_id),
            }
        }
        Ok(results)
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Get store statistics.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let total_faults = self.count_faults()?;
        let embeddings_stored = self.count_embeddings()?;
        let total_assets = self.count_assets()?;

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        let mat = self.embedding_matrix.lock();
        let matrix_rows = mat.matrix.nrows();

        Ok(StoreStats {
            total_faults,
            embeddings_stored,
            faults_pending_embedding: (total_faults - embeddings_stored).max(0),
            total_assets,
            embedding_dimension: self.embedding_dim,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
            matrix_loaded: !mat.dirty,
            matrix_rows,
        })
    }

    fn count(&self, sql: &str) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Row Mapping Helpers
    // ---------------------------------------------------------------

    fn row_to_fault(row: &rusqlite::Row<'_>) -> rusqlite::Result<FaultRow> {
        Ok(FaultRow {
            fault_id: row.get("fault_id")?,
            well_id: row.get("well_id")?,
            transformer_id: row.get("transformer_id")?,
            part_id: row.get("part_id")?,
            fault_type: row.get("fault_type")?,
            status: row.get("status")?,
            timestamp: row.get("timestamp")?,
            description: row.get("description")?,
            part_specifications_json: row.get("part_specifications_json")?,
        })
    }

    fn row_to_asset(row: &rusqlite::Row<'_>) -> rusqlite::Result<Asset> {
        let kind: String = row.get("kind")?;
        let updated_at: String = row.get("updated_at")?;
        Ok(Asset {
            id: row.get("id")?,
            kind: kind.parse().unwrap_or(AssetKind::Well),
            name: row.get("name")?,
            status: row.get("status")?,
            fault_details: row
                .get::<_, Option<String>>("fault_details_json")?
                .and_then(|s| serde_json::from_str(&s).ok()),
            updated_at: DateTime::parse_from_rfc3339(&updated_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    const DIM: usize = 4;

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path(), DIM).unwrap();
        (store, dir)
    }

    fn new_fault(id: &str, well: &str, minutes_ago: i64) -> NewFault {
        NewFault {
            fault_id: id.into(),
            asset: AssetRef::well(well),
            part_id: "P100".into(),
            fault_type: "Oil Leakage".into(),
            status: "Fault".into(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            description: Some("Oil Leakage fault detected".into()),
            part_specifications: Some(serde_json::json!({"serial_number": "SN-1"})),
        }
    }

    /// Unit vector whose cosine similarity with e0 is exactly `sim`.
    fn vector_with_similarity(sim: f32) -> Vec<f32> {
        vec![sim, (1.0 - sim * sim).sqrt(), 0.0, 0.0]
    }

    fn query() -> SimilarityQuery {
        SimilarityQuery {
            query_embedding: vec![1.0, 0.0, 0.0, 0.0],
            similarity_threshold: 0.5,
            match_count: 30,
        }
    }

    #[test]
    fn test_insert_and_get_fault() {
        let (store, _dir) = test_store();
        let stored = store.insert_fault(&new_fault("f1", "w1", 0)).unwrap();

        let fetched = store.get_fault("f1").unwrap().unwrap();
        assert_eq!(fetched.fault_id, "f1");
        assert_eq!(fetched.well_id.as_deref(), Some("w1"));
        assert_eq!(fetched.part_specifications, stored.part_specifications);
        assert!(store.get_fault("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_faults_newest_first_with_filter() {
        let (store, _dir) = test_store();
        store.insert_fault(&new_fault("old", "w1", 30)).unwrap();
        store.insert_fault(&new_fault("new", "w1", 1)).unwrap();
        store.insert_fault(&new_fault("other", "w2", 5)).unwrap();

        let all = store.list_faults(&FaultFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].fault_id, "new");

        let w1 = store
            .list_faults(&FaultFilter {
                well_id: Some("w1".into()),
                ..Default::default()
            })
            .unwrap();
        let ids: Vec<_> = w1.iter().map(|f| f.fault_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        let limited = store
            .list_faults(&FaultFilter {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_embedding_is_write_once() {
        let (store, _dir) = test_store();
        store.insert_fault(&new_fault("f1", "w1", 0)).unwrap();

        store.add_fault_embedding("f1", &[1.0, 0.0, 0.0, 0.0]).unwrap();
        let err = store
            .add_fault_embedding("f1", &[0.0, 1.0, 0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmbedding(_)));
        assert_eq!(store.count_embeddings().unwrap(), 1);
    }

    #[test]
    fn test_embedding_dimension_checked() {
        let (store, _dir) = test_store();
        store.insert_fault(&new_fault("f1", "w1", 0)).unwrap();
        let err = store.add_fault_embedding("f1", &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!store.has_fault_embedding("f1").unwrap());
    }

    #[test]
    fn test_embedding_for_unknown_fault_rejected() {
        let (store, _dir) = test_store();
        let err = store
            .add_fault_embedding("ghost", &[1.0, 0.0, 0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_faults_without_embedding() {
        let (store, _dir) = test_store();
        store.insert_fault(&new_fault("f1", "w1", 10)).unwrap();
        store.insert_fault(&new_fault("f2", "w1", 5)).unwrap();
        store.add_fault_embedding("f1", &[1.0, 0.0, 0.0, 0.0]).unwrap();

        let pending = store.get_faults_without_embedding(10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fault_id, "f2");
    }

    #[test]
    fn test_search_threshold_order_and_cap() {
        let (store, _dir) = test_store();
        for (id, sim) in [("a", 0.7f32), ("b", 0.3), ("c", 0.6)] {
            store.insert_fault(&new_fault(id, "w1", 0)).unwrap();
            store
                .add_fault_embedding(id, &vector_with_similarity(sim))
                .unwrap();
        }

        let hits = store.search_faults(&query()).unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.fault.fault_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!((hits[0].similarity - 0.7).abs() < 1e-4);
        assert!((hits[1].similarity - 0.6).abs() < 1e-4);

        let capped = store
            .search_faults(&SimilarityQuery {
                match_count: 1,
                ..query()
            })
            .unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].fault.fault_id, "a");
    }

    #[test]
    fn test_search_threshold_monotonic() {
        let (store, _dir) = test_store();
        for (i, sim) in [0.95f32, 0.8, 0.65, 0.5, 0.2, -0.4].iter().enumerate() {
            let id = format!("f{}", i);
            store.insert_fault(&new_fault(&id, "w1", 0)).unwrap();
            store
                .add_fault_embedding(&id, &vector_with_similarity(*sim))
                .unwrap();
        }

        let mut previous = usize::MAX;
        for threshold in [-1.0f32, 0.0, 0.4, 0.6, 0.9, 1.0] {
            let n = store
                .search_faults(&SimilarityQuery {
                    similarity_threshold: threshold,
                    ..query()
                })
                .unwrap()
                .len();
            assert!(n <= previous, "threshold {} grew results", threshold);
            previous = n;
        }
    }

    #[test]
    fn test_search_empty_store() {
        let (store, _dir) = test_store();
        assert!(store.search_faults(&query()).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_dimension() {
        let (store, _dir) = test_store();
        let err = store
            .search_faults(&SimilarityQuery {
                query_embedding: vec![1.0, 0.0],
                ..query()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }

    #[test]
    fn test_matrix_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = SqliteStore::open(dir.path(), DIM).unwrap();
            store.insert_fault(&new_fault("f1", "w1", 0)).unwrap();
            store
                .add_fault_embedding("f1", &vector_with_similarity(0.9))
                .unwrap();
        }
        let store = SqliteStore::open(dir.path(), DIM).unwrap();
        let hits = store.search_faults(&query()).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].similarity - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_mark_asset_faulted() {
        let (store, _dir) = test_store();
        store
            .upsert_asset(&Asset {
                id: "w1".into(),
                kind: AssetKind::Well,
                name: "Well 1".into(),
                status: "Operational".into(),
                fault_details: None,
                updated_at: Utc::now(),
            })
            .unwrap();

        let details = serde_json::json!({"part_id": "P100", "fault_type": "Oil Leakage"});
        assert!(store.mark_asset_faulted(&AssetRef::well("w1"), &details).unwrap());
        assert!(!store
            .mark_asset_faulted(&AssetRef::transformer("w1"), &details)
            .unwrap());

        let asset = store.get_asset("w1").unwrap().unwrap();
        assert_eq!(asset.status, "Fault");
        assert_eq!(asset.fault_details.unwrap()["part_id"], "P100");
    }

    #[test]
    fn test_stats() {
        let (store, _dir) = test_store();
        store.insert_fault(&new_fault("f1", "w1", 0)).unwrap();
        store.insert_fault(&new_fault("f2", "w1", 0)).unwrap();
        store.add_fault_embedding("f1", &[1.0, 0.0, 0.0, 0.0]).unwrap();

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_faults, 2);
        assert_eq!(stats.embeddings_stored, 1);
        assert_eq!(stats.faults_pending_embedding, 1);
        assert_eq!(stats.embedding_dimension, DIM);
        assert_eq!(stats.matrix_rows, 1);
    }
}
