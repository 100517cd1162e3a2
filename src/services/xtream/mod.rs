//! Xtream Codes Integration
//!
//! Client for the Xtream Codes Player API v2, the catalog/account backend
//! behind the app:
//!
//! - **Login**: validates the account and rejects anything not "Active"
//! - **Catalog**: categories, live/VOD/series listings and detail lookups
//! - **Playback URLs**: deterministic stream URLs from credentials + id + kind
//!
//! # Usage
//!
//! ```rust,ignore
//! use uniplay::services::xtream::{XtreamClient, XtreamCredentials};
//!
//! let client = XtreamClient::from_credentials(XtreamCredentials::new(server, user, pass))?;
//! client.login().await?;
//! let categories = client.refresh_categories().await?;
//! let url = client.build_stream_url("5", ContentKind::Live);
//! ```

pub mod client;
pub mod types;

// Re-exports for convenience
pub use client::{CategorySet, XtreamClient, XtreamError};
pub use types::{XtreamAuthResponse, XtreamCredentials, XtreamServerInfo, XtreamUserInfo};
