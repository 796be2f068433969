//! Store seam between the catalog service and a concrete backend.

use async_trait::async_trait;

use super::manager::DatabaseResult;
use super::models::{
    Dataset, DatasetMetadata, DatasetMetadataRow, PatientMetadataRow, PatientWithSampleCount, Project,
    RawFileSampleLink, SampleMetadataRow, SamplePatientRow,
};

/// Every table the catalog reads or writes.
pub const CATALOG_TABLES: &[&str] = &[
    "projects",
    "datasets",
    "datasets_metadata",
    "patients",
    "patients_metadata",
    "samples",
    "samples_metadata",
    "files",
    "files_metadata",
];

/// Split a schema file into executable statements, dropping comment-only fragments.
pub fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .map(str::trim)
        .filter(|statement| {
            statement.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            })
        })
        .collect()
}

/// Shared, read-only handle built once at startup.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Open a session for one request. The session holds a single connection for its
    /// whole lifetime; dropping it releases the connection and discards uncommitted writes.
    async fn session(&self) -> DatabaseResult<Box<dyn CatalogSession>>;

    async fn health_check(&self) -> DatabaseResult<()>;
}

/// Per-request unit of work. Join queries return rows ordered by parent id, then child id.
#[async_trait]
pub trait CatalogSession: Send {
    async fn projects(&mut self) -> DatabaseResult<Vec<Project>>;

    /// Datasets of a project, optionally narrowed to one id.
    async fn datasets(&mut self, project_id: i32, dataset_id: Option<i32>) -> DatabaseResult<Vec<Dataset>>;

    async fn dataset_metadata_rows(&mut self, project_id: i32, dataset_id: i32) -> DatabaseResult<Vec<DatasetMetadataRow>>;

    async fn patient_metadata_rows(
        &mut self,
        project_id: i32,
        patient_id: Option<i32>,
    ) -> DatabaseResult<Vec<PatientMetadataRow>>;

    /// All samples of one patient, joined to their metadata.
    async fn patient_sample_rows(&mut self, patient_id: i32) -> DatabaseResult<Vec<SampleMetadataRow>>;

    /// One sample joined to its metadata; empty when the sample does not exist.
    async fn sample_rows(&mut self, sample_id: i32) -> DatabaseResult<Vec<SampleMetadataRow>>;

    async fn sample_patient_rows(
        &mut self,
        project_id: i32,
        sample_id: Option<i32>,
    ) -> DatabaseResult<Vec<SamplePatientRow>>;

    async fn patients_with_sample_counts(&mut self, project_id: i32) -> DatabaseResult<Vec<PatientWithSampleCount>>;

    /// Files of a dataset paired with each of their `sample_id` metadata values.
    async fn raw_file_sample_links(&mut self, dataset_id: i32) -> DatabaseResult<Vec<RawFileSampleLink>>;

    /// Returns the new file id.
    async fn insert_raw_file(&mut self, dataset_id: i32, path: &str) -> DatabaseResult<i32>;

    async fn insert_raw_file_metadata(&mut self, raw_file_id: i32, key: &str, value: &str) -> DatabaseResult<()>;

    /// Lowest-id metadata entry with this key, if any.
    async fn find_dataset_metadata(&mut self, dataset_id: i32, key: &str) -> DatabaseResult<Option<DatasetMetadata>>;

    async fn update_dataset_metadata(&mut self, metadata_id: i32, value: &str) -> DatabaseResult<()>;

    /// Returns the new metadata id.
    async fn insert_dataset_metadata(&mut self, dataset_id: i32, key: &str, value: &str) -> DatabaseResult<i32>;

    /// Make this session's writes durable. Further calls on the session fail.
    async fn commit(&mut self) -> DatabaseResult<()>;
}
