//! HTTP client for the Casefile REST backend.
//!
//! [`HttpTransport`] implements the uploader's [`PartTransport`] over the
//! `upload/*` endpoints; [`DocumentClient`] lists the files already attached
//! to a document.
//!
//! [`PartTransport`]: casefile_uploader::PartTransport

pub mod client;
pub mod documents;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use documents::DocumentClient;
pub use error::ApiError;
pub use transport::HttpTransport;
