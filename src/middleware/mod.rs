pub mod cors;
pub mod response;

pub use cors::cors_layer;
pub use response::{ApiResult, StatusMessage};
