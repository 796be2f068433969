// Join row shapes and the parent records they fold into.

use crate::database::models::{
    Dataset, DatasetMetadata, DatasetMetadataRow, DatasetWithMetadata, Patient, PatientMetadata,
    PatientMetadataRow, PatientWithSamples, Sample, SampleMetadata, SampleMetadataRow, SamplePatientRow,
    SampleWithMetadata, SampleWithPatient,
};

use super::{FlatRow, IncompleteRow, Nest};

impl Nest for PatientWithSamples {
    type Child = PatientMetadata;

    fn nest(&mut self, child: PatientMetadata) {
        self.metadata.push(child);
    }
}

impl Nest for SampleWithMetadata {
    type Child = SampleMetadata;

    fn nest(&mut self, child: SampleMetadata) {
        self.metadata.push(child);
    }
}

impl Nest for SampleWithPatient {
    type Child = SampleMetadata;

    fn nest(&mut self, child: SampleMetadata) {
        self.metadata.push(child);
    }
}

impl Nest for DatasetWithMetadata {
    type Child = DatasetMetadata;

    fn nest(&mut self, child: DatasetMetadata) {
        self.metadata.push(child);
    }
}

/// Key and value of a joined metadata entry. No entry yields `None`; an entry with a NULL
/// key or value is an error rather than an empty string.
fn metadata_entry(
    table: &'static str,
    id: Option<i32>,
    key: Option<String>,
    value: Option<String>,
) -> Result<Option<(i32, String, String)>, IncompleteRow> {
    let Some(id) = id else {
        return Ok(None);
    };
    let key = key.ok_or(IncompleteRow { table, id, column: "key" })?;
    let value = value.ok_or(IncompleteRow { table, id, column: "value" })?;
    Ok(Some((id, key, value)))
}

impl FlatRow for PatientMetadataRow {
    type Key = i32;
    type Parent = PatientWithSamples;

    fn parent_key(&self) -> i32 {
        self.patient_id
    }

    /// Samples are filled in by a second query per patient.
    fn parent(&self) -> PatientWithSamples {
        PatientWithSamples {
            patient: Patient {
                id: self.patient_id,
                project_id: self.project_id,
                ext_patient_id: self.ext_patient_id.clone(),
                ext_patient_url: self.ext_patient_url.clone(),
                public_patient_id: self.public_patient_id.clone(),
            },
            metadata: Vec::new(),
            samples: Vec::new(),
        }
    }

    fn into_child(self) -> Result<Option<PatientMetadata>, IncompleteRow> {
        let entry = metadata_entry("patients_metadata", self.metadata_id, self.metadata_key, self.metadata_value)?;
        Ok(entry.map(|(id, key, value)| PatientMetadata { id, patient_id: self.patient_id, key, value }))
    }
}

impl FlatRow for SampleMetadataRow {
    type Key = i32;
    type Parent = SampleWithMetadata;

    fn parent_key(&self) -> i32 {
        self.sample_id
    }

    fn parent(&self) -> SampleWithMetadata {
        SampleWithMetadata {
            sample: Sample {
                id: self.sample_id,
                patient_id: self.patient_id,
                ext_sample_id: self.ext_sample_id.clone(),
                ext_sample_url: self.ext_sample_url.clone(),
            },
            metadata: Vec::new(),
        }
    }

    fn into_child(self) -> Result<Option<SampleMetadata>, IncompleteRow> {
        let entry = metadata_entry("samples_metadata", self.metadata_id, self.metadata_key, self.metadata_value)?;
        Ok(entry.map(|(id, key, value)| SampleMetadata { id, sample_id: self.sample_id, key, value }))
    }
}

impl FlatRow for SamplePatientRow {
    type Key = i32;
    type Parent = SampleWithPatient;

    fn parent_key(&self) -> i32 {
        self.sample_id
    }

    fn parent(&self) -> SampleWithPatient {
        SampleWithPatient {
            sample: Sample {
                id: self.sample_id,
                patient_id: self.patient_id,
                ext_sample_id: self.ext_sample_id.clone(),
                ext_sample_url: self.ext_sample_url.clone(),
            },
            metadata: Vec::new(),
            patient: Patient {
                id: self.patient_id,
                project_id: self.project_id,
                ext_patient_id: self.ext_patient_id.clone(),
                ext_patient_url: self.ext_patient_url.clone(),
                public_patient_id: self.public_patient_id.clone(),
            },
        }
    }

    fn into_child(self) -> Result<Option<SampleMetadata>, IncompleteRow> {
        let entry = metadata_entry("samples_metadata", self.metadata_id, self.metadata_key, self.metadata_value)?;
        Ok(entry.map(|(id, key, value)| SampleMetadata { id, sample_id: self.sample_id, key, value }))
    }
}

impl FlatRow for DatasetMetadataRow {
    type Key = i32;
    type Parent = DatasetWithMetadata;

    fn parent_key(&self) -> i32 {
        self.dataset_id
    }

    fn parent(&self) -> DatasetWithMetadata {
        DatasetWithMetadata {
            dataset: Dataset {
                id: self.dataset_id,
                project_id: self.project_id,
                name: self.name.clone(),
            },
            metadata: Vec::new(),
        }
    }

    fn into_child(self) -> Result<Option<DatasetMetadata>, IncompleteRow> {
        let entry = metadata_entry("datasets_metadata", self.metadata_id, self.metadata_key, self.metadata_value)?;
        Ok(entry.map(|(id, key, value)| DatasetMetadata { id, dataset_id: self.dataset_id, key, value }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::group_rows;
    use super::*;

    fn patient_row(patient_id: i32, meta: Option<(i32, &str, &str)>) -> PatientMetadataRow {
        PatientMetadataRow {
            patient_id,
            project_id: 1,
            ext_patient_id: format!("EXT-{}", patient_id),
            ext_patient_url: format!("https://registry.example/p/{}", patient_id),
            public_patient_id: None,
            metadata_id: meta.map(|m| m.0),
            metadata_key: meta.map(|m| m.1.to_string()),
            metadata_value: meta.map(|m| m.2.to_string()),
        }
    }

    fn sample_patient_row(sample_id: i32, meta_id: Option<i32>) -> SamplePatientRow {
        SamplePatientRow {
            sample_id,
            patient_id: 40,
            ext_sample_id: format!("S-{}", sample_id),
            ext_sample_url: String::new(),
            metadata_id: meta_id,
            metadata_key: meta_id.map(|_| "tissue".to_string()),
            metadata_value: meta_id.map(|_| "liver".to_string()),
            project_id: 2,
            ext_patient_id: "EXT-40".to_string(),
            ext_patient_url: String::new(),
            public_patient_id: Some("PUB-40".to_string()),
        }
    }

    #[test]
    fn patient_rows_nest_metadata_and_leave_samples_empty() {
        let grouped = group_rows(vec![
            patient_row(1, Some((10, "sex", "F"))),
            patient_row(1, Some((11, "age", "54"))),
            patient_row(2, None),
        ])
        .unwrap();

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].patient.id, 1);
        assert_eq!(
            grouped[0].metadata,
            vec![
                PatientMetadata { id: 10, patient_id: 1, key: "sex".into(), value: "F".into() },
                PatientMetadata { id: 11, patient_id: 1, key: "age".into(), value: "54".into() },
            ]
        );
        assert!(grouped[0].samples.is_empty());
        assert_eq!(grouped[1].patient.ext_patient_id, "EXT-2");
        assert!(grouped[1].metadata.is_empty());
    }

    #[test]
    fn sample_rows_embed_patient_once() {
        let grouped = group_rows(vec![
            sample_patient_row(7, Some(70)),
            sample_patient_row(7, Some(71)),
            sample_patient_row(8, None),
        ])
        .unwrap();

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].metadata.iter().map(|m| m.id).collect::<Vec<_>>(), vec![70, 71]);
        assert_eq!(grouped[0].metadata[0].sample_id, 7);
        assert_eq!(grouped[0].patient.id, 40);
        assert_eq!(grouped[0].patient.public_patient_id.as_deref(), Some("PUB-40"));
        assert!(grouped[1].metadata.is_empty());
        assert_eq!(grouped[1].sample.id, 8);
    }

    #[test]
    fn dataset_rows_group_by_dataset() {
        let row = |metadata_id: Option<i32>| DatasetMetadataRow {
            dataset_id: 5,
            project_id: 9,
            name: "Proteomics".to_string(),
            metadata_id,
            metadata_key: metadata_id.map(|id| format!("k{}", id)),
            metadata_value: metadata_id.map(|id| format!("v{}", id)),
        };
        let grouped = group_rows(vec![row(Some(1)), row(Some(2))]).unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].dataset.name, "Proteomics");
        assert_eq!(grouped[0].metadata[1].key, "k2");
        assert_eq!(grouped[0].metadata[1].dataset_id, 5);
    }

    #[test]
    fn null_metadata_value_is_reported() {
        let mut broken = patient_row(1, Some((10, "sex", "F")));
        broken.metadata_value = None;

        let err = group_rows(vec![patient_row(1, Some((9, "age", "54"))), broken]).unwrap_err();
        assert_eq!(err, IncompleteRow { table: "patients_metadata", id: 10, column: "value" });
    }

    #[test]
    fn null_metadata_key_is_reported() {
        let mut broken = sample_patient_row(7, Some(70));
        broken.metadata_key = None;

        let err = group_rows(vec![broken]).unwrap_err();
        assert_eq!(err.to_string(), "samples_metadata row 70 has NULL key");
    }
}
