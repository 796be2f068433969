mod common;

use anyhow::Result;
use axum::http::StatusCode;
use redmane_api::database::models::RawFileMetadata;
use serde_json::json;

#[tokio::test]
async fn only_files_linked_to_existing_samples_are_listed() -> Result<()> {
    let (app, _) = common::sqlite_app(common::seed_data_with_files()).await?;

    let (status, body) = common::get(&app, "/raw_files_with_metadata/7").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": 200,
            "path": "/data/a.fastq",
            "sample_id": "12",
            "ext_sample_id": "S-12",
            "sample_metadata": [
                {"id": 121, "sample_id": 12, "key": "tissue", "value": "blood"},
                {"id": 122, "sample_id": 12, "key": "tumour", "value": "yes"}
            ]
        }])
    );
    Ok(())
}

#[tokio::test]
async fn dataset_without_files_is_an_empty_list() -> Result<()> {
    let (app, _) = common::sqlite_app(common::seed_data_with_files()).await?;

    let (status, body) = common::get(&app, "/raw_files_with_metadata/8").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn added_file_is_listed_with_its_sample() -> Result<()> {
    let (app, catalog) = common::sqlite_app(common::seed_data()).await?;

    let (status, body) = common::json_request(
        &app,
        "POST",
        "/add_raw_files/",
        Some(json!([{
            "dataset_id": 7,
            "path": "/data/run1/s5.fastq.gz",
            "metadata": [
                {"metadata_key": "sample_id", "metadata_value": "5"},
                {"metadata_key": "lane", "metadata_value": "L002"}
            ]
        }])),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "message": "Raw files and metadata added successfully"}));

    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files WHERE file_type = 'raw'").await?, 1);
    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files_metadata").await?, 2);

    let (status, body) = common::get(&app, "/raw_files_with_metadata/7").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["path"], "/data/run1/s5.fastq.gz");
    assert_eq!(body[0]["sample_id"], "5");
    assert_eq!(body[0]["ext_sample_id"], "S-5");
    assert_eq!(body[0]["sample_metadata"][0]["value"], "liver");
    Ok(())
}

#[tokio::test]
async fn file_without_metadata_is_stored_but_not_listed() -> Result<()> {
    let (app, catalog) = common::sqlite_app(common::seed_data()).await?;

    let (status, _) = common::json_request(
        &app,
        "POST",
        "/add_raw_files/",
        Some(json!([{"dataset_id": 7, "path": "/data/bare.bam"}])),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files").await?, 1);

    let (_, body) = common::get(&app, "/raw_files_with_metadata/7").await?;
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn empty_batch_is_accepted() -> Result<()> {
    let (app, catalog) = common::sqlite_app(common::seed_data()).await?;

    let (status, body) = common::json_request(&app, "POST", "/add_raw_files/", Some(json!([]))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files").await?, 0);
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_rejected_without_writes() -> Result<()> {
    let (app, catalog) = common::sqlite_app(common::seed_data()).await?;

    let (status, _) = common::json_request(
        &app,
        "POST",
        "/add_raw_files/",
        Some(json!([{"dataset_id": "seven", "path": "/data/x"}])),
    )
    .await?;
    assert!(status.is_client_error(), "expected 4xx, got {}", status);
    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files").await?, 0);
    Ok(())
}

#[tokio::test]
async fn non_integer_sample_link_is_a_server_error() -> Result<()> {
    let mut data = common::seed_data_with_files();
    data.files_metadata.push(RawFileMetadata {
        id: 303,
        raw_file_id: 202,
        metadata_key: "sample_id".into(),
        metadata_value: "S-12".into(),
    });
    let (app, _) = common::sqlite_app(data).await?;

    let (status, body) = common::get(&app, "/raw_files_with_metadata/7").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "MALFORMED_SAMPLE_LINK");
    assert!(
        body["message"].as_str().unwrap_or_default().contains("S-12"),
        "message should name the bad value: {}",
        body
    );
    Ok(())
}

#[tokio::test]
async fn padded_sample_link_still_resolves() -> Result<()> {
    let mut data = common::seed_data_with_files();
    data.files_metadata[0].metadata_value = " 12 ".into();
    let (app, _) = common::sqlite_app(data).await?;

    let (status, body) = common::get(&app, "/raw_files_with_metadata/7").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["ext_sample_id"], "S-12");
    assert_eq!(body[0]["sample_id"], " 12 ");
    Ok(())
}

#[tokio::test]
async fn unknown_dataset_rejects_whole_batch() -> Result<()> {
    let (app, catalog) = common::sqlite_app(common::seed_data()).await?;

    let (status, body) = common::json_request(
        &app,
        "POST",
        "/add_raw_files/",
        Some(json!([
            {"dataset_id": 7, "path": "/data/good.fastq"},
            {
                "dataset_id": 424242,
                "path": "/data/orphan.fastq",
                "metadata": [{"metadata_key": "sample_id", "metadata_value": "5"}]
            }
        ])),
    )
    .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DATABASE_ERROR");
    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files").await?, 0);
    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files_metadata").await?, 0);

    let (status, body) = common::get(&app, "/raw_files_with_metadata/424242").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn add_raw_files_accepts_path_without_trailing_slash() -> Result<()> {
    let (app, catalog) = common::sqlite_app(common::seed_data()).await?;

    let (status, body) = common::json_request(
        &app,
        "POST",
        "/add_raw_files",
        Some(json!([{"dataset_id": 8, "path": "/data/rna.bam"}])),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(common::count(&catalog, "SELECT COUNT(*) FROM files WHERE dataset_id = 8").await?, 1);
    Ok(())
}
