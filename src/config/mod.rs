pub mod constants;
pub mod errors;
pub mod pipeline_config;
