//! Embedded SQLite catalog store.
//!
//! Serves `--fixture` dumps and backs the HTTP tests. Queries match the PostgreSQL store
//! row for row; only the dialect differs (`?N` placeholders, no casts, rowid ids).

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};

use super::fixture::CatalogData;
use super::manager::{DatabaseError, DatabaseResult};
use super::models::{
    Dataset, DatasetMetadata, DatasetMetadataRow, PatientMetadataRow, PatientWithSampleCount, Project,
    RawFileSampleLink, SampleMetadataRow, SamplePatientRow, FILE_TYPE_RAW, SAMPLE_LINK_KEY,
};
use super::store::{schema_statements, CatalogSession, CatalogStore};

const SQLITE_SCHEMA: &str = include_str!("../../sql/sqlite_schema.sql");

const SAMPLE_METADATA_COLUMNS: &str = r#"
    s.id AS sample_id, s.patient_id, s.ext_sample_id, s.ext_sample_url,
    sm.id AS metadata_id, sm.key AS metadata_key, sm.value AS metadata_value
"#;

#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Fresh private in-memory database with the catalog schema applied.
    pub async fn in_memory() -> DatabaseResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // An in-memory database lives exactly as long as its connection, so the pool keeps
        // one connection open forever. Concurrent sessions queue on it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        let catalog = Self { pool };
        catalog.apply_schema().await?;
        Ok(catalog)
    }

    /// In-memory database seeded with `data`.
    pub async fn with_data(data: &CatalogData) -> DatabaseResult<Self> {
        let catalog = Self::in_memory().await?;
        catalog.load(data).await?;
        Ok(catalog)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn apply_schema(&self) -> DatabaseResult<()> {
        for statement in schema_statements(SQLITE_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert every row of `data` with its given id, parents first, in one transaction.
    pub async fn load(&self, data: &CatalogData) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        for p in &data.projects {
            sqlx::query("INSERT INTO projects (id, name, status) VALUES (?1, ?2, ?3)")
                .bind(p.id)
                .bind(&p.name)
                .bind(&p.status)
                .execute(&mut *tx)
                .await?;
        }
        for d in &data.datasets {
            sqlx::query("INSERT INTO datasets (id, project_id, name) VALUES (?1, ?2, ?3)")
                .bind(d.id)
                .bind(d.project_id)
                .bind(&d.name)
                .execute(&mut *tx)
                .await?;
        }
        for m in &data.datasets_metadata {
            sqlx::query("INSERT INTO datasets_metadata (id, dataset_id, key, value) VALUES (?1, ?2, ?3, ?4)")
                .bind(m.id)
                .bind(m.dataset_id)
                .bind(&m.key)
                .bind(&m.value)
                .execute(&mut *tx)
                .await?;
        }
        for p in &data.patients {
            sqlx::query(
                r#"
                INSERT INTO patients (id, project_id, ext_patient_id, ext_patient_url, public_patient_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(p.id)
            .bind(p.project_id)
            .bind(&p.ext_patient_id)
            .bind(&p.ext_patient_url)
            .bind(p.public_patient_id.as_deref())
            .execute(&mut *tx)
            .await?;
        }
        for m in &data.patients_metadata {
            sqlx::query("INSERT INTO patients_metadata (id, patient_id, key, value) VALUES (?1, ?2, ?3, ?4)")
                .bind(m.id)
                .bind(m.patient_id)
                .bind(&m.key)
                .bind(&m.value)
                .execute(&mut *tx)
                .await?;
        }
        for s in &data.samples {
            sqlx::query("INSERT INTO samples (id, patient_id, ext_sample_id, ext_sample_url) VALUES (?1, ?2, ?3, ?4)")
                .bind(s.id)
                .bind(s.patient_id)
                .bind(&s.ext_sample_id)
                .bind(&s.ext_sample_url)
                .execute(&mut *tx)
                .await?;
        }
        for m in &data.samples_metadata {
            sqlx::query("INSERT INTO samples_metadata (id, sample_id, key, value) VALUES (?1, ?2, ?3, ?4)")
                .bind(m.id)
                .bind(m.sample_id)
                .bind(&m.key)
                .bind(&m.value)
                .execute(&mut *tx)
                .await?;
        }
        for f in &data.files {
            sqlx::query("INSERT INTO files (id, dataset_id, path, file_type) VALUES (?1, ?2, ?3, ?4)")
                .bind(f.id)
                .bind(f.dataset_id)
                .bind(&f.path)
                .bind(&f.file_type)
                .execute(&mut *tx)
                .await?;
        }
        for m in &data.files_metadata {
            sqlx::query(
                "INSERT INTO files_metadata (id, raw_file_id, metadata_key, metadata_value) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(m.id)
            .bind(m.raw_file_id)
            .bind(&m.metadata_key)
            .bind(&m.metadata_value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            "Loaded catalog fixture: {} projects, {} datasets, {} patients, {} samples, {} files",
            data.projects.len(),
            data.datasets.len(),
            data.patients.len(),
            data.samples.len(),
            data.files.len()
        );
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn session(&self) -> DatabaseResult<Box<dyn CatalogSession>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteSession { tx: Some(tx) }))
    }

    async fn health_check(&self) -> DatabaseResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct SqliteSession {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteSession {
    fn conn(&mut self) -> DatabaseResult<&mut SqliteConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| DatabaseError::Query("session already committed".to_string()))
    }
}

fn row_id(rowid: i64) -> DatabaseResult<i32> {
    i32::try_from(rowid).map_err(|_| DatabaseError::Query(format!("rowid {} out of range", rowid)))
}

#[async_trait]
impl CatalogSession for SqliteSession {
    async fn projects(&mut self) -> DatabaseResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>("SELECT id, name, status FROM projects ORDER BY id")
            .fetch_all(self.conn()?)
            .await?;
        Ok(rows)
    }

    async fn datasets(&mut self, project_id: i32, dataset_id: Option<i32>) -> DatabaseResult<Vec<Dataset>> {
        let rows = sqlx::query_as::<_, Dataset>(
            r#"
            SELECT id, project_id, name
            FROM datasets
            WHERE project_id = ?1 AND (?2 IS NULL OR id = ?2)
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .bind(dataset_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn dataset_metadata_rows(&mut self, project_id: i32, dataset_id: i32) -> DatabaseResult<Vec<DatasetMetadataRow>> {
        let rows = sqlx::query_as::<_, DatasetMetadataRow>(
            r#"
            SELECT d.id AS dataset_id, d.project_id, d.name,
                   dm.id AS metadata_id, dm.key AS metadata_key, dm.value AS metadata_value
            FROM datasets d
            LEFT JOIN datasets_metadata dm ON d.id = dm.dataset_id
            WHERE d.id = ?1 AND d.project_id = ?2
            ORDER BY d.id, dm.id
            "#,
        )
        .bind(dataset_id)
        .bind(project_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn patient_metadata_rows(
        &mut self,
        project_id: i32,
        patient_id: Option<i32>,
    ) -> DatabaseResult<Vec<PatientMetadataRow>> {
        let rows = sqlx::query_as::<_, PatientMetadataRow>(
            r#"
            SELECT p.id AS patient_id, p.project_id, p.ext_patient_id, p.ext_patient_url, p.public_patient_id,
                   pm.id AS metadata_id, pm.key AS metadata_key, pm.value AS metadata_value
            FROM patients p
            LEFT JOIN patients_metadata pm ON p.id = pm.patient_id
            WHERE p.project_id = ?1 AND (?2 IS NULL OR p.id = ?2)
            ORDER BY p.id, pm.id
            "#,
        )
        .bind(project_id)
        .bind(patient_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn patient_sample_rows(&mut self, patient_id: i32) -> DatabaseResult<Vec<SampleMetadataRow>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM samples s
            LEFT JOIN samples_metadata sm ON s.id = sm.sample_id
            WHERE s.patient_id = ?1
            ORDER BY s.id, sm.id
            "#,
            SAMPLE_METADATA_COLUMNS
        );
        let rows = sqlx::query_as::<_, SampleMetadataRow>(&sql)
            .bind(patient_id)
            .fetch_all(self.conn()?)
            .await?;
        Ok(rows)
    }

    async fn sample_rows(&mut self, sample_id: i32) -> DatabaseResult<Vec<SampleMetadataRow>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM samples s
            LEFT JOIN samples_metadata sm ON s.id = sm.sample_id
            WHERE s.id = ?1
            ORDER BY s.id, sm.id
            "#,
            SAMPLE_METADATA_COLUMNS
        );
        let rows = sqlx::query_as::<_, SampleMetadataRow>(&sql)
            .bind(sample_id)
            .fetch_all(self.conn()?)
            .await?;
        Ok(rows)
    }

    async fn sample_patient_rows(
        &mut self,
        project_id: i32,
        sample_id: Option<i32>,
    ) -> DatabaseResult<Vec<SamplePatientRow>> {
        let sql = format!(
            r#"
            SELECT {},
                   p.project_id, p.ext_patient_id, p.ext_patient_url, p.public_patient_id
            FROM samples s
            JOIN patients p ON s.patient_id = p.id
            LEFT JOIN samples_metadata sm ON s.id = sm.sample_id
            WHERE p.project_id = ?1 AND (?2 IS NULL OR s.id = ?2)
            ORDER BY s.id, sm.id
            "#,
            SAMPLE_METADATA_COLUMNS
        );
        let rows = sqlx::query_as::<_, SamplePatientRow>(&sql)
            .bind(project_id)
            .bind(sample_id)
            .fetch_all(self.conn()?)
            .await?;
        Ok(rows)
    }

    async fn patients_with_sample_counts(&mut self, project_id: i32) -> DatabaseResult<Vec<PatientWithSampleCount>> {
        let rows = sqlx::query_as::<_, PatientWithSampleCount>(
            r#"
            SELECT p.id, p.project_id, p.ext_patient_id, p.ext_patient_url, p.public_patient_id,
                   COUNT(s.id) AS sample_count
            FROM patients p
            LEFT JOIN samples s ON p.id = s.patient_id
            WHERE p.project_id = ?1
            GROUP BY p.id
            ORDER BY p.id
            "#,
        )
        .bind(project_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn raw_file_sample_links(&mut self, dataset_id: i32) -> DatabaseResult<Vec<RawFileSampleLink>> {
        let rows = sqlx::query_as::<_, RawFileSampleLink>(
            r#"
            SELECT f.id AS raw_file_id, f.path, fm.metadata_value AS sample_id
            FROM files f
            JOIN files_metadata fm ON f.id = fm.raw_file_id
            WHERE f.dataset_id = ?1 AND fm.metadata_key = ?2
            ORDER BY f.id, fm.id
            "#,
        )
        .bind(dataset_id)
        .bind(SAMPLE_LINK_KEY)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn insert_raw_file(&mut self, dataset_id: i32, path: &str) -> DatabaseResult<i32> {
        let result = sqlx::query("INSERT INTO files (dataset_id, path, file_type) VALUES (?1, ?2, ?3)")
            .bind(dataset_id)
            .bind(path)
            .bind(FILE_TYPE_RAW)
            .execute(self.conn()?)
            .await?;
        row_id(result.last_insert_rowid())
    }

    async fn insert_raw_file_metadata(&mut self, raw_file_id: i32, key: &str, value: &str) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO files_metadata (raw_file_id, metadata_key, metadata_value) VALUES (?1, ?2, ?3)")
            .bind(raw_file_id)
            .bind(key)
            .bind(value)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn find_dataset_metadata(&mut self, dataset_id: i32, key: &str) -> DatabaseResult<Option<DatasetMetadata>> {
        let row = sqlx::query_as::<_, DatasetMetadata>(
            r#"
            SELECT id, dataset_id, key, value
            FROM datasets_metadata
            WHERE dataset_id = ?1 AND key = ?2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(dataset_id)
        .bind(key)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(row)
    }

    async fn update_dataset_metadata(&mut self, metadata_id: i32, value: &str) -> DatabaseResult<()> {
        sqlx::query("UPDATE datasets_metadata SET value = ?1 WHERE id = ?2")
            .bind(value)
            .bind(metadata_id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn insert_dataset_metadata(&mut self, dataset_id: i32, key: &str, value: &str) -> DatabaseResult<i32> {
        let result = sqlx::query("INSERT INTO datasets_metadata (dataset_id, key, value) VALUES (?1, ?2, ?3)")
            .bind(dataset_id)
            .bind(key)
            .bind(value)
            .execute(self.conn()?)
            .await?;
        row_id(result.last_insert_rowid())
    }

    async fn commit(&mut self) -> DatabaseResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| DatabaseError::Query("session already committed".to_string()))?;
        tx.commit().await?;
        debug!("Committed catalog session");
        Ok(())
    }
}
