use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::sample::SampleMetadata;

/// `file_type` written for every file created through the API.
pub const FILE_TYPE_RAW: &str = "raw";

/// File metadata key whose value names a `samples.id`.
pub const SAMPLE_LINK_KEY: &str = "sample_id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RawFile {
    pub id: i32,
    pub dataset_id: i32,
    pub path: String,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RawFileMetadata {
    pub id: i32,
    pub raw_file_id: i32,
    pub metadata_key: String,
    pub metadata_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRawFileMetadata {
    pub metadata_key: String,
    pub metadata_value: String,
}

/// One element of the `POST /add_raw_files/` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRawFile {
    pub dataset_id: i32,
    pub path: String,
    #[serde(default)]
    pub metadata: Vec<NewRawFileMetadata>,
}

/// `files JOIN files_metadata` restricted to the `sample_id` key. The link value is
/// carried verbatim; it is parsed before any sample lookup.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RawFileSampleLink {
    pub raw_file_id: i32,
    pub path: String,
    pub sample_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileWithSample {
    pub id: i32,
    pub path: String,
    pub sample_id: String,
    pub ext_sample_id: String,
    pub sample_metadata: Vec<SampleMetadata>,
}
