pub mod config;
pub mod inference;
pub mod records;
pub mod schema;

pub use config::{ConfigError, PipelineConfig};
pub use inference::{
    InferenceRequest, InferenceResult, Invoker, ResponseError, parse_response,
};
pub use records::{RecordError, RecordSet};
