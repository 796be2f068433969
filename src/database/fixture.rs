//! JSON catalog dumps loaded into the embedded store.

use serde::{Deserialize, Serialize};

use super::models::{
    Dataset, DatasetMetadata, Patient, PatientMetadata, Project, RawFile, RawFileMetadata, Sample, SampleMetadata,
};

/// Full catalog contents, one vector per table. Field names follow the table names so a
/// fixture file reads like a dump; missing tables default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogData {
    pub projects: Vec<Project>,
    pub datasets: Vec<Dataset>,
    pub datasets_metadata: Vec<DatasetMetadata>,
    pub patients: Vec<Patient>,
    pub patients_metadata: Vec<PatientMetadata>,
    pub samples: Vec<Sample>,
    pub samples_metadata: Vec<SampleMetadata>,
    pub files: Vec<RawFile>,
    pub files_metadata: Vec<RawFileMetadata>,
}

impl CatalogData {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
