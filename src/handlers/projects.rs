// handlers/projects.rs - GET /projects/

use axum::{extract::Extension, Json};

use crate::database::models::Project;
use crate::middleware::ApiResult;
use crate::services::CatalogService;

pub async fn list(Extension(catalog): Extension<CatalogService>) -> ApiResult<Vec<Project>> {
    Ok(Json(catalog.projects().await?))
}
