//! service-core: Shared infrastructure for integration microservices.
pub mod error;
pub mod middleware;

pub use async_trait;
pub use axum;
pub use serde;
pub use serde_json;
pub use tracing;
