//! service-core: Shared infrastructure for back-office services.
pub mod error;
pub mod middleware;
pub mod observability;
pub mod utils;

pub use async_trait;
pub use axum;
pub use tracing;
pub use validator;
