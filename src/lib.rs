//! onedrive_client - A client library for the OneDrive v1.0 REST API.
//!
//! This library provides functionality to:
//! - List drives and fetch drive/item metadata
//! - Search, list children and thumbnails
//! - Create folders and upload files (multipart/related)
//! - Download item content to the local filesystem
//!
//! The HTTP transport is an injected dependency; the default is backed by
//! `reqwest`, and tests substitute a mock.
//!
//! # Example
//!
//! ```no_run
//! use onedrive_client::{OneDriveClient, QueryParams};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = OneDriveClient::new("access-token");
//!     client.select_drive("1234");
//!
//!     let children = client.list_children(None, None, QueryParams::new()).await?;
//!     println!("{children}");
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod multipart;
pub mod transport;
pub mod url;

// Re-exports for convenience
pub use client::OneDriveClient;
pub use error::{DriveError, Result};
pub use models::{ConflictBehavior, ItemReference};
pub use transport::{
    Headers, HttpRequest, HttpResponse, Method, QueryParams, ReqwestTransport, RequestOptions,
    Transport,
};
