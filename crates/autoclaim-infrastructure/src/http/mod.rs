pub mod adapters;
pub mod client;
pub mod endpoints;
pub mod registry;

pub use client::{ApiEnvelope, ApiResponse, HttpClient, RetryConfig};
pub use endpoints::PlatformEndpoints;
pub use registry::HttpAccountRegistry;
