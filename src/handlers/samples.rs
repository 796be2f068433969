// handlers/samples.rs - GET /samples/:sample_id?project_id=

use axum::{
    extract::{Extension, Path, Query},
    Json,
};

use crate::database::models::SampleWithPatient;
use crate::middleware::ApiResult;
use crate::services::CatalogService;

use super::ProjectScope;

pub async fn with_patient(
    Path(sample_id): Path<i32>,
    Query(scope): Query<ProjectScope>,
    Extension(catalog): Extension<CatalogService>,
) -> ApiResult<Vec<SampleWithPatient>> {
    Ok(Json(catalog.samples_with_patient(scope.project_id, sample_id).await?))
}
