// handlers/raw_files.rs - raw file registration and sample-linked listing

use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::database::models::{NewRawFile, RawFileWithSample};
use crate::middleware::{ApiResult, StatusMessage};
use crate::services::CatalogService;

/**
 * POST /add_raw_files/ - register raw files with their metadata
 *
 * Expected Input:
 * ```json
 * [
 *   {
 *     "dataset_id": 1,
 *     "path": "/data/run1/sample_a.fastq.gz",
 *     "metadata": [{ "metadata_key": "sample_id", "metadata_value": "12" }]
 *   }
 * ]
 * ```
 *
 * The batch is written in one transaction; a failure on any row rejects the whole batch.
 */
pub async fn add(
    Extension(catalog): Extension<CatalogService>,
    Json(files): Json<Vec<NewRawFile>>,
) -> ApiResult<StatusMessage> {
    catalog.add_raw_files(&files).await?;
    Ok(Json(StatusMessage::success("Raw files and metadata added successfully")))
}

/// GET /raw_files_with_metadata/:dataset_id - files linked to a sample, with that sample's metadata
pub async fn with_sample_metadata(
    Path(dataset_id): Path<i32>,
    Extension(catalog): Extension<CatalogService>,
) -> ApiResult<Vec<RawFileWithSample>> {
    Ok(Json(catalog.raw_files_with_samples(dataset_id).await?))
}
