#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use redmane_api::config::ApiConfig;
use redmane_api::database::models::{
    Dataset, DatasetMetadata, Patient, PatientMetadata, Project, RawFile, RawFileMetadata, Sample, SampleMetadata,
};
use redmane_api::database::{CatalogData, CatalogSession, CatalogStore, DatabaseError, DatabaseResult, SqliteCatalog};
use redmane_api::services::CatalogService;

/// Two projects; project 1 has two datasets, two patients and three samples, with some
/// parents deliberately left without metadata.
pub fn seed_data() -> CatalogData {
    CatalogData {
        projects: vec![
            Project { id: 1, name: "Alpha".into(), status: "active".into() },
            Project { id: 2, name: "Beta".into(), status: "archived".into() },
        ],
        datasets: vec![
            Dataset { id: 7, project_id: 1, name: "WGS".into() },
            Dataset { id: 8, project_id: 1, name: "RNA".into() },
            Dataset { id: 9, project_id: 2, name: "Imaging".into() },
        ],
        datasets_metadata: vec![
            DatasetMetadata { id: 71, dataset_id: 7, key: "sequencer".into(), value: "NovaSeq".into() },
            DatasetMetadata { id: 72, dataset_id: 7, key: "coverage".into(), value: "30x".into() },
        ],
        patients: vec![
            Patient {
                id: 1,
                project_id: 1,
                ext_patient_id: "PT-1".into(),
                ext_patient_url: "https://registry.test/PT-1".into(),
                public_patient_id: Some("PUB-1".into()),
            },
            Patient {
                id: 2,
                project_id: 1,
                ext_patient_id: "PT-2".into(),
                ext_patient_url: "https://registry.test/PT-2".into(),
                public_patient_id: None,
            },
            Patient {
                id: 3,
                project_id: 2,
                ext_patient_id: "PT-3".into(),
                ext_patient_url: "https://registry.test/PT-3".into(),
                public_patient_id: None,
            },
        ],
        patients_metadata: vec![
            PatientMetadata { id: 11, patient_id: 1, key: "sex".into(), value: "F".into() },
            PatientMetadata { id: 12, patient_id: 1, key: "age".into(), value: "54".into() },
        ],
        samples: vec![
            Sample { id: 5, patient_id: 1, ext_sample_id: "S-5".into(), ext_sample_url: "https://registry.test/S-5".into() },
            Sample { id: 6, patient_id: 1, ext_sample_id: "S-6".into(), ext_sample_url: "https://registry.test/S-6".into() },
            Sample { id: 12, patient_id: 2, ext_sample_id: "S-12".into(), ext_sample_url: "https://registry.test/S-12".into() },
            Sample { id: 13, patient_id: 3, ext_sample_id: "S-13".into(), ext_sample_url: "https://registry.test/S-13".into() },
        ],
        samples_metadata: vec![
            SampleMetadata { id: 51, sample_id: 5, key: "tissue".into(), value: "liver".into() },
            SampleMetadata { id: 121, sample_id: 12, key: "tissue".into(), value: "blood".into() },
            SampleMetadata { id: 122, sample_id: 12, key: "tumour".into(), value: "yes".into() },
        ],
        files: vec![],
        files_metadata: vec![],
    }
}

/// Seed data plus raw files on dataset 7: one linked to sample 12, one to a sample that
/// does not exist, one without any link.
pub fn seed_data_with_files() -> CatalogData {
    let mut data = seed_data();
    data.files = vec![
        RawFile { id: 200, dataset_id: 7, path: "/data/a.fastq".into(), file_type: "raw".into() },
        RawFile { id: 201, dataset_id: 7, path: "/data/b.fastq".into(), file_type: "raw".into() },
        RawFile { id: 202, dataset_id: 7, path: "/data/c.fastq".into(), file_type: "raw".into() },
    ];
    data.files_metadata = vec![
        RawFileMetadata { id: 300, raw_file_id: 200, metadata_key: "sample_id".into(), metadata_value: "12".into() },
        RawFileMetadata { id: 301, raw_file_id: 201, metadata_key: "sample_id".into(), metadata_value: "999".into() },
        RawFileMetadata { id: 302, raw_file_id: 202, metadata_key: "lane".into(), metadata_value: "L001".into() },
    ];
    data
}

pub fn api_config() -> ApiConfig {
    ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
    }
}

pub fn router_for(store: Arc<dyn CatalogStore>) -> Router {
    redmane_api::app(CatalogService::new(store), &api_config())
}

/// Router over a fresh in-memory SQLite catalog seeded with `data`. The catalog is
/// returned so tests can inspect writes through its pool.
pub async fn sqlite_app(data: CatalogData) -> Result<(Router, SqliteCatalog)> {
    let catalog = SqliteCatalog::with_data(&data).await?;
    Ok((router_for(Arc::new(catalog.clone())), catalog))
}

pub async fn count(catalog: &SqliteCatalog, sql: &str) -> Result<i64> {
    Ok(sqlx::query_scalar(sql).fetch_one(catalog.pool()).await?)
}

pub async fn json_request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    Ok((status, value))
}

pub async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    json_request(app, "GET", uri, None).await
}

/// Store whose every call fails as if PostgreSQL were unreachable.
pub struct FailingStore;

#[async_trait]
impl CatalogStore for FailingStore {
    async fn session(&self) -> DatabaseResult<Box<dyn CatalogSession>> {
        Err(DatabaseError::Connection("connection refused".to_string()))
    }

    async fn health_check(&self) -> DatabaseResult<()> {
        Err(DatabaseError::Connection("connection refused".to_string()))
    }
}
