use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::sample::SampleWithMetadata;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: i32,
    pub project_id: i32,
    pub ext_patient_id: String,
    pub ext_patient_url: String,
    pub public_patient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PatientMetadata {
    pub id: i32,
    pub patient_id: i32,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PatientWithSampleCount {
    pub id: i32,
    pub project_id: i32,
    pub ext_patient_id: String,
    pub ext_patient_url: String,
    pub public_patient_id: Option<String>,
    pub sample_count: i64,
}

/// Patient shell with its own metadata and the nested sample tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientWithSamples {
    #[serde(flatten)]
    pub patient: Patient,
    pub metadata: Vec<PatientMetadata>,
    pub samples: Vec<SampleWithMetadata>,
}

/// `patients LEFT JOIN patients_metadata`, one row per metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PatientMetadataRow {
    pub patient_id: i32,
    pub project_id: i32,
    pub ext_patient_id: String,
    pub ext_patient_url: String,
    pub public_patient_id: Option<String>,
    pub metadata_id: Option<i32>,
    pub metadata_key: Option<String>,
    pub metadata_value: Option<String>,
}
