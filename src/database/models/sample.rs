use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::patient::Patient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Sample {
    pub id: i32,
    pub patient_id: i32,
    pub ext_sample_id: String,
    pub ext_sample_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SampleMetadata {
    pub id: i32,
    pub sample_id: i32,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWithMetadata {
    #[serde(flatten)]
    pub sample: Sample,
    pub metadata: Vec<SampleMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWithPatient {
    #[serde(flatten)]
    pub sample: Sample,
    pub metadata: Vec<SampleMetadata>,
    pub patient: Patient,
}

/// `samples LEFT JOIN samples_metadata`, one row per metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SampleMetadataRow {
    pub sample_id: i32,
    pub patient_id: i32,
    pub ext_sample_id: String,
    pub ext_sample_url: String,
    pub metadata_id: Option<i32>,
    pub metadata_key: Option<String>,
    pub metadata_value: Option<String>,
}

/// `samples LEFT JOIN samples_metadata JOIN patients`; patient columns repeat on every row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SamplePatientRow {
    pub sample_id: i32,
    pub patient_id: i32,
    pub ext_sample_id: String,
    pub ext_sample_url: String,
    pub metadata_id: Option<i32>,
    pub metadata_key: Option<String>,
    pub metadata_value: Option<String>,
    pub project_id: i32,
    pub ext_patient_id: String,
    pub ext_patient_url: String,
    pub public_patient_id: Option<String>,
}
