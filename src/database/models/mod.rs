//! Typed records for every table and every joined query shape.
//!
//! `*Row` types mirror one flat row of an outer join exactly as the store returns it;
//! child columns are `Option` because a parent without children still yields one row
//! with NULLs on the child side.

pub mod dataset;
pub mod patient;
pub mod project;
pub mod raw_file;
pub mod sample;

pub use dataset::{
    Dataset, DatasetMetadata, DatasetMetadataRow, DatasetSizeUpdate, DatasetWithMetadata,
    LAST_SIZE_UPDATE_KEY, RAW_FILE_SIZE_KEY,
};
pub use patient::{Patient, PatientMetadata, PatientMetadataRow, PatientWithSampleCount, PatientWithSamples};
pub use project::Project;
pub use raw_file::{
    NewRawFile, NewRawFileMetadata, RawFile, RawFileMetadata, RawFileSampleLink, RawFileWithSample,
    FILE_TYPE_RAW, SAMPLE_LINK_KEY,
};
pub use sample::{Sample, SampleMetadata, SampleMetadataRow, SamplePatientRow, SampleWithMetadata, SampleWithPatient};
