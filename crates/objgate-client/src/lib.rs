//! # objgate Client
//!
//! Client for the objgate HTTP gateway.
//!
//! ## Example
//!
//! ```rust,ignore
//! use objgate_client::{GatewayClient, Config, PutRequest, GetRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GatewayClient::new(
//!         Config::new("http://localhost:8787").with_token("your-token"),
//!     )?;
//!
//!     client.put_object("audio/hello.txt", "Hello, World!", PutRequest::default()).await?;
//!
//!     let object = client.get_object("audio/hello.txt", GetRequest::default()).await?;
//!     println!("Content: {}", String::from_utf8_lossy(&object.data));
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;
pub mod upload;

pub use client::GatewayClient;
pub use config::Config;
pub use error::{ClientError, Result};
pub use types::*;
pub use upload::{upload_directory, UploadSummary, UploadedFile};
