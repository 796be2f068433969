//! PostgreSQL catalog store.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::manager::{DatabaseError, DatabaseResult};
use super::models::{
    Dataset, DatasetMetadata, DatasetMetadataRow, PatientMetadataRow, PatientWithSampleCount, Project,
    RawFileSampleLink, SampleMetadataRow, SamplePatientRow, FILE_TYPE_RAW, SAMPLE_LINK_KEY,
};
use super::store::{schema_statements, CatalogSession, CatalogStore, CATALOG_TABLES};

const POSTGRES_SCHEMA: &str = include_str!("../../sql/postgres_schema.sql");

const SAMPLE_METADATA_COLUMNS: &str = r#"
    s.id AS sample_id, s.patient_id, s.ext_sample_id, s.ext_sample_url,
    sm.id AS metadata_id, sm.key AS metadata_key, sm.value AS metadata_value
"#;

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing catalog tables. Existing tables are left as they are.
    pub async fn apply_schema(&self) -> DatabaseResult<()> {
        for statement in schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Applied catalog schema");
        Ok(())
    }

    /// Catalog tables absent from the `public` schema. The schema is owned elsewhere,
    /// so this is only reported, never repaired.
    pub async fn missing_tables(&self) -> DatabaseResult<Vec<&'static str>> {
        let existing: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = ANY($1)
            "#,
        )
        .bind(CATALOG_TABLES.iter().map(|t| t.to_string()).collect::<Vec<_>>())
        .fetch_all(&self.pool)
        .await?;

        Ok(CATALOG_TABLES
            .iter()
            .copied()
            .filter(|table| !existing.iter().any(|e| e == table))
            .collect())
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn session(&self) -> DatabaseResult<Box<dyn CatalogSession>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession { tx: Some(tx) }))
    }

    async fn health_check(&self) -> DatabaseResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// One pooled connection inside an open transaction. Dropping it without `commit`
/// rolls back and hands the connection back to the pool.
pub struct PgSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    fn conn(&mut self) -> DatabaseResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| DatabaseError::Query("session already committed".to_string()))
    }
}

#[async_trait]
impl CatalogSession for PgSession {
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
            WHERE project_id = $1 AND ($2::integer IS NULL OR id = $2)
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
            WHERE d.id = $1 AND d.project_id = $2
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
            WHERE p.project_id = $1 AND ($2::integer IS NULL OR p.id = $2)
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
            WHERE s.patient_id = $1
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
            WHERE s.id = $1
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
            WHERE p.project_id = $1 AND ($2::integer IS NULL OR s.id = $2)
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
            WHERE p.project_id = $1
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
            WHERE f.dataset_id = $1 AND fm.metadata_key = $2
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
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO files (dataset_id, path, file_type) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(dataset_id)
        .bind(path)
        .bind(FILE_TYPE_RAW)
        .fetch_one(self.conn()?)
        .await?;
        Ok(id)
    }

    async fn insert_raw_file_metadata(&mut self, raw_file_id: i32, key: &str, value: &str) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO files_metadata (raw_file_id, metadata_key, metadata_value) VALUES ($1, $2, $3)")
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
            WHERE dataset_id = $1 AND key = $2
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
        sqlx::query("UPDATE datasets_metadata SET value = $1 WHERE id = $2")
            .bind(value)
            .bind(metadata_id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn insert_dataset_metadata(&mut self, dataset_id: i32, key: &str, value: &str) -> DatabaseResult<i32> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO datasets_metadata (dataset_id, key, value) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(dataset_id)
        .bind(key)
        .bind(value)
        .fetch_one(self.conn()?)
        .await?;
        Ok(id)
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
