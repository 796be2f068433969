mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let (app, _) = common::sqlite_app(common::seed_data()).await?;
    let (status, body) = common::get(&app, "/").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "REDMANE catalog API");
    assert!(body["endpoints"].is_object(), "missing endpoints: {}", body);
    Ok(())
}

#[tokio::test]
async fn health_ok_with_reachable_store() -> Result<()> {
    let (app, _) = common::sqlite_app(common::seed_data()).await?;
    let (status, body) = common::get(&app, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string(), "timestamp should be a string: {}", body);
    Ok(())
}

#[tokio::test]
async fn health_degraded_when_store_unreachable() -> Result<()> {
    let app = common::router_for(Arc::new(common::FailingStore));
    let (status, body) = common::get(&app, "/health").await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database_error"], "Database error: connection refused");
    Ok(())
}

#[tokio::test]
async fn store_failure_surfaces_as_500_with_detail() -> Result<()> {
    let app = common::router_for(Arc::new(common::FailingStore));

    for uri in [
        "/projects/",
        "/datasets/0?project_id=1",
        "/datasets_with_metadata/7?project_id=1",
        "/patients/0?project_id=1",
        "/patients_metadata/0?project_id=1",
        "/samples/0?project_id=1",
        "/raw_files_with_metadata/7",
    ] {
        let (status, body) = common::get(&app, uri).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "unexpected status for {}", uri);
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["message"], "Database error: connection refused", "unexpected body for {}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn store_failure_on_writes_surfaces_as_500_with_detail() -> Result<()> {
    let app = common::router_for(Arc::new(common::FailingStore));

    let writes = [
        (
            "POST",
            "/add_raw_files/",
            json!([{"dataset_id": 7, "path": "/data/a.fastq", "metadata": []}]),
        ),
        (
            "PUT",
            "/datasets_metadata/size_update",
            json!({"dataset_id": 7, "raw_file_size": "1024", "last_size_update": "2024-05-01"}),
        ),
    ];

    for (method, uri, body) in writes {
        let (status, body) = common::json_request(&app, method, uri, Some(body)).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "unexpected status for {} {}", method, uri);
        assert_eq!(
            body,
            json!({"error": true, "message": "Database error: connection refused", "code": "DATABASE_ERROR"}),
            "unexpected body for {} {}",
            method,
            uri
        );
    }
    Ok(())
}

#[tokio::test]
async fn non_integer_path_segment_is_rejected() -> Result<()> {
    let (app, _) = common::sqlite_app(common::seed_data()).await?;
    let (status, _) = common::get(&app, "/datasets/abc?project_id=1").await?;

    assert!(status.is_client_error(), "expected 4xx, got {}", status);
    Ok(())
}

#[tokio::test]
async fn missing_project_id_is_rejected() -> Result<()> {
    let (app, _) = common::sqlite_app(common::seed_data()).await?;
    let (status, _) = common::get(&app, "/samples/0").await?;

    assert!(status.is_client_error(), "expected 4xx, got {}", status);
    Ok(())
}

#[tokio::test]
async fn cors_allows_configured_origin() -> Result<()> {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let (app, _) = common::sqlite_app(common::seed_data()).await?;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/projects/")
                .header("origin", "http://localhost:3001")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").map(|v| v.as_bytes()),
        Some("http://localhost:3001".as_bytes())
    );
    Ok(())
}
