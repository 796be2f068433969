// handlers/datasets.rs - dataset reads and the size metadata upsert

use axum::{
    extract::{Extension, Path, Query},
    Json,
};

use crate::database::models::{Dataset, DatasetSizeUpdate, DatasetWithMetadata};
use crate::middleware::ApiResult;
use crate::services::CatalogService;

use super::ProjectScope;

/// GET /datasets/:dataset_id?project_id= - `dataset_id = 0` lists the whole project
pub async fn list(
    Path(dataset_id): Path<i32>,
    Query(scope): Query<ProjectScope>,
    Extension(catalog): Extension<CatalogService>,
) -> ApiResult<Vec<Dataset>> {
    Ok(Json(catalog.datasets(scope.project_id, dataset_id).await?))
}

/// GET /datasets_with_metadata/:dataset_id?project_id= - 404 when the dataset is not in the project
pub async fn with_metadata(
    Path(dataset_id): Path<i32>,
    Query(scope): Query<ProjectScope>,
    Extension(catalog): Extension<CatalogService>,
) -> ApiResult<DatasetWithMetadata> {
    Ok(Json(catalog.dataset_with_metadata(scope.project_id, dataset_id).await?))
}

/// PUT /datasets_metadata/size_update - echoes the accepted update
pub async fn size_update(
    Extension(catalog): Extension<CatalogService>,
    Json(update): Json<DatasetSizeUpdate>,
) -> ApiResult<DatasetSizeUpdate> {
    catalog.update_dataset_size(&update).await?;
    Ok(Json(update))
}
