//! # objgate Gateway
//!
//! Authenticated HTTP gateway in front of an object store.
//!
//! This crate provides:
//! - **Object API**: `PUT`, `GET` and `DELETE` on `/<key>`
//! - **Authentication**: optional static bearer token
//! - **Conditional requests**: `If-Match` family forwarded to the store
//! - **Byte ranges**: `Range` reads answered with 206 Partial Content
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │        (browser audio player, uploader, curl)       │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                   objgate Gateway                   │
//! ├─────────────────────────────────────────────────────┤
//! │  Request ID │ Logging │ Bearer Auth │ Body Limit    │
//! ├─────────────────────────────────────────────────────┤
//! │           Dispatch: PUT / GET / DELETE / 405        │
//! ├─────────────────────────────────────────────────────┤
//! │                   objgate-store                     │
//! │            (ObjectStore: memory, directory)         │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{GatewayConfig, StoreBackend};
pub use error::{ApiError, ErrorKind};
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
