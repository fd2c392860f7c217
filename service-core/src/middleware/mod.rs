pub mod metrics;
pub mod security_headers;
pub mod signature;
pub mod tracing;
