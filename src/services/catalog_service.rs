use std::sync::Arc;

use tracing::debug;

use crate::assembly::{group_rows, IncompleteRow};
use crate::database::manager::DatabaseError;
use crate::database::models::{
    Dataset, DatasetSizeUpdate, DatasetWithMetadata, NewRawFile, PatientWithSampleCount, PatientWithSamples,
    Project, RawFileWithSample, SampleWithMetadata, SampleWithPatient,
};
use crate::database::store::{CatalogSession, CatalogStore};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    NotFound(String),
    #[error("Malformed sample_id '{value}' on raw file {raw_file_id}")]
    MalformedSampleLink { raw_file_id: i32, value: String },
}

// Incomplete rows are a data problem in the store and surface like any other store failure.
impl From<IncompleteRow> for CatalogError {
    fn from(err: IncompleteRow) -> Self {
        CatalogError::Database(DatabaseError::Query(err.to_string()))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// `0` in an id path segment means "every row of the project".
fn scope(id: i32) -> Option<i32> {
    (id != 0).then_some(id)
}

/// The catalog operations. Each call opens exactly one store session and runs all of its
/// queries on it; the session is dropped (and its connection released) on every return path.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    async fn session(&self) -> CatalogResult<Box<dyn CatalogSession>> {
        Ok(self.store.session().await?)
    }

    pub async fn health_check(&self) -> CatalogResult<()> {
        Ok(self.store.health_check().await?)
    }

    /// Insert every file with its metadata, then commit once. Any failure aborts the whole
    /// batch because the uncommitted session is dropped.
    pub async fn add_raw_files(&self, files: &[NewRawFile]) -> CatalogResult<usize> {
        let mut session = self.session().await?;
        let mut metadata_count = 0;

        for file in files {
            let raw_file_id = session.insert_raw_file(file.dataset_id, &file.path).await?;
            for entry in &file.metadata {
                session
                    .insert_raw_file_metadata(raw_file_id, &entry.metadata_key, &entry.metadata_value)
                    .await?;
                metadata_count += 1;
            }
        }

        session.commit().await?;
        debug!("Added {} raw files with {} metadata entries", files.len(), metadata_count);
        Ok(files.len())
    }

    /// Patient shells with metadata, then one sample query per patient (N+1). A single
    /// patient × metadata × sample × sample-metadata join would multiply rows instead.
    pub async fn patients_with_samples(&self, project_id: i32, patient_id: i32) -> CatalogResult<Vec<PatientWithSamples>> {
        let mut session = self.session().await?;

        let rows = session.patient_metadata_rows(project_id, scope(patient_id)).await?;
        let mut patients = group_rows(rows)?;

        for patient in patients.iter_mut() {
            let sample_rows = session.patient_sample_rows(patient.patient.id).await?;
            patient.samples = group_rows(sample_rows)?;
        }

        debug!("Assembled {} patients for project {}", patients.len(), project_id);
        Ok(patients)
    }

    pub async fn samples_with_patient(&self, project_id: i32, sample_id: i32) -> CatalogResult<Vec<SampleWithPatient>> {
        let mut session = self.session().await?;
        let rows = session.sample_patient_rows(project_id, scope(sample_id)).await?;
        let samples = group_rows(rows)?;
        debug!("Assembled {} samples for project {}", samples.len(), project_id);
        Ok(samples)
    }

    /// Always lists every patient of the project; `patient_id` does not narrow the result.
    pub async fn patients_with_sample_counts(
        &self,
        project_id: i32,
        patient_id: i32,
    ) -> CatalogResult<Vec<PatientWithSampleCount>> {
        let mut session = self.session().await?;
        let patients = session.patients_with_sample_counts(project_id).await?;
        debug!(
            "Listed {} patients with sample counts for project {} (requested patient {})",
            patients.len(),
            project_id,
            patient_id
        );
        Ok(patients)
    }

    pub async fn projects(&self) -> CatalogResult<Vec<Project>> {
        let mut session = self.session().await?;
        Ok(session.projects().await?)
    }

    pub async fn datasets(&self, project_id: i32, dataset_id: i32) -> CatalogResult<Vec<Dataset>> {
        let mut session = self.session().await?;
        Ok(session.datasets(project_id, scope(dataset_id)).await?)
    }

    pub async fn dataset_with_metadata(&self, project_id: i32, dataset_id: i32) -> CatalogResult<DatasetWithMetadata> {
        let mut session = self.session().await?;
        let rows = session.dataset_metadata_rows(project_id, dataset_id).await?;
        group_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound("Dataset not found".to_string()))
    }

    /// Files of a dataset that link to an existing sample through their `sample_id`
    /// metadata, each with that sample's metadata. Links to missing samples are skipped;
    /// a link that is not an integer fails the request.
    pub async fn raw_files_with_samples(&self, dataset_id: i32) -> CatalogResult<Vec<RawFileWithSample>> {
        let mut session = self.session().await?;
        let links = session.raw_file_sample_links(dataset_id).await?;

        let mut files = Vec::with_capacity(links.len());
        for link in links {
            let sample_id: i32 = link.sample_id.trim().parse().map_err(|_| CatalogError::MalformedSampleLink {
                raw_file_id: link.raw_file_id,
                value: link.sample_id.clone(),
            })?;

            let sample_rows = session.sample_rows(sample_id).await?;
            let Some(SampleWithMetadata { sample, metadata }) = group_rows(sample_rows)?.into_iter().next() else {
                debug!("Raw file {} links to missing sample {}", link.raw_file_id, sample_id);
                continue;
            };

            files.push(RawFileWithSample {
                id: link.raw_file_id,
                path: link.path,
                sample_id: link.sample_id,
                ext_sample_id: sample.ext_sample_id,
                sample_metadata: metadata,
            });
        }

        debug!("Assembled {} linked raw files for dataset {}", files.len(), dataset_id);
        Ok(files)
    }

    /// Upsert the size keys independently: update the first existing entry for a key,
    /// otherwise insert one.
    pub async fn update_dataset_size(&self, update: &DatasetSizeUpdate) -> CatalogResult<()> {
        let mut session = self.session().await?;

        for (key, value) in update.entries() {
            match session.find_dataset_metadata(update.dataset_id, key).await? {
                Some(existing) => session.update_dataset_metadata(existing.id, value).await?,
                None => {
                    session.insert_dataset_metadata(update.dataset_id, key, value).await?;
                }
            }
        }

        session.commit().await?;
        Ok(())
    }
}
