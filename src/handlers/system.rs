// handlers/system.rs - GET / and GET /health

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::CatalogService;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "REDMANE catalog API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "projects": "GET /projects/",
            "datasets": "GET /datasets/:dataset_id?project_id=",
            "dataset_metadata": "GET /datasets_with_metadata/:dataset_id?project_id=",
            "dataset_size": "PUT /datasets_metadata/size_update",
            "patients": "GET /patients/:patient_id?project_id=",
            "patients_metadata": "GET /patients_metadata/:patient_id?project_id=",
            "samples": "GET /samples/:sample_id?project_id=",
            "raw_files": "POST /add_raw_files/, GET /raw_files_with_metadata/:dataset_id",
            "health": "GET /health",
        }
    }))
}

pub async fn health(Extension(catalog): Extension<CatalogService>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match catalog.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                })),
            )
        }
    }
}
