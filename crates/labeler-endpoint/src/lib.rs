#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{EndpointClient, EndpointError};
