use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers;
use crate::middleware::cors_layer;
use crate::services::CatalogService;

pub fn app(catalog: CatalogService, api: &ApiConfig) -> Router {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(catalog_routes())
        .layer(Extension(catalog))
        .layer(cors_layer(&api.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn catalog_routes() -> Router {
    use handlers::{datasets, patients, projects, raw_files, samples};

    Router::new()
        .route("/projects/", get(projects::list))
        .route("/projects", get(projects::list))
        .route("/datasets/:dataset_id", get(datasets::list))
        .route("/datasets_with_metadata/:dataset_id", get(datasets::with_metadata))
        .route("/datasets_metadata/size_update", put(datasets::size_update))
        .route("/patients/:patient_id", get(patients::with_sample_counts))
        .route("/patients_metadata/:patient_id", get(patients::with_samples))
        .route("/samples/:sample_id", get(samples::with_patient))
        .route("/add_raw_files/", post(raw_files::add))
        .route("/add_raw_files", post(raw_files::add))
        .route("/raw_files_with_metadata/:dataset_id", get(raw_files::with_sample_metadata))
}
