mod init_tracing;
mod query_sanitizer;
mod request_id;
mod tracing_config;

pub use init_tracing::init_tracing;
pub use query_sanitizer::sanitize_query;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use tracing_config::TracingConfig;
