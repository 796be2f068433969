use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata key holding the summed size of all raw files in a dataset.
pub const RAW_FILE_SIZE_KEY: &str = "raw_file_extension_size_of_all_files";

/// Metadata key holding when the raw file size was last recomputed.
pub const LAST_SIZE_UPDATE_KEY: &str = "last_size_update";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Dataset {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DatasetMetadata {
    pub id: i32,
    pub dataset_id: i32,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetWithMetadata {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub metadata: Vec<DatasetMetadata>,
}

/// `datasets LEFT JOIN datasets_metadata`, one row per metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DatasetMetadataRow {
    pub dataset_id: i32,
    pub project_id: i32,
    pub name: String,
    pub metadata_id: Option<i32>,
    pub metadata_key: Option<String>,
    pub metadata_value: Option<String>,
}

/// Body of `PUT /datasets_metadata/size_update`. An empty string leaves that key untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSizeUpdate {
    pub dataset_id: i32,
    pub raw_file_size: String,
    pub last_size_update: String,
}

impl DatasetSizeUpdate {
    /// The `(key, value)` pairs this update should write, in write order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            (RAW_FILE_SIZE_KEY, self.raw_file_size.as_str()),
            (LAST_SIZE_UPDATE_KEY, self.last_size_update.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}
