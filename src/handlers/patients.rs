// handlers/patients.rs - patient reads

use axum::{
    extract::{Extension, Path, Query},
    Json,
};

use crate::database::models::{PatientWithSampleCount, PatientWithSamples};
use crate::middleware::ApiResult;
use crate::services::CatalogService;

use super::ProjectScope;

/// GET /patients_metadata/:patient_id?project_id= - patients with metadata and nested samples
pub async fn with_samples(
    Path(patient_id): Path<i32>,
    Query(scope): Query<ProjectScope>,
    Extension(catalog): Extension<CatalogService>,
) -> ApiResult<Vec<PatientWithSamples>> {
    Ok(Json(catalog.patients_with_samples(scope.project_id, patient_id).await?))
}

/// GET /patients/:patient_id?project_id= - every patient of the project with its sample count
pub async fn with_sample_counts(
    Path(patient_id): Path<i32>,
    Query(scope): Query<ProjectScope>,
    Extension(catalog): Extension<CatalogService>,
) -> ApiResult<Vec<PatientWithSampleCount>> {
    Ok(Json(catalog.patients_with_sample_counts(scope.project_id, patient_id).await?))
}
