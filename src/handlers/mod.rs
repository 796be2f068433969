// handlers/mod.rs - one module per catalog resource
//
// Handlers only extract typed parameters, call CatalogService and convert its errors.

use serde::Deserialize;

pub mod datasets;
pub mod patients;
pub mod projects;
pub mod raw_files;
pub mod samples;
pub mod system;

/// `?project_id=` query parameter shared by the project-scoped reads.
#[derive(Debug, Deserialize)]
pub struct ProjectScope {
    pub project_id: i32,
}
