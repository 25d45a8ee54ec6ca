//! Instabot API - Rust Implementation
//!
//! An authenticated client for the Instagram private mobile API. It emulates
//! the Android app: signed request bodies, a device identity derived from the
//! credentials, cookie-based sessions and cursor pagination.
//!
//! # Architecture
//!
//! - [`api`]: the client, its signer, request executor and paginator
//! - [`endpoints`]: one method per API action, grouped by area
//! - [`config`]: settings from defaults, TOML file and environment
//! - [`cli`]: subcommands of the `instabot` binary
//!
//! # Usage
//!
//! ```bash
//! instabot --username alice follow 123
//! ```
//!
//! # Examples
//!
//! ```rust
//! use instabot_api::{InstagramApi, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let api = InstagramApi::new(Settings::default())?;
//! api.login(Some("alice"), Some("secret"), false, None).await?;
//! let followers = api.get_total_self_followers().await?;
//! println!("{} followers", followers.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod types;
pub mod utils;

pub use api::{InstagramApi, InstagramApiGeneric};
pub use config::Settings;
pub use error::{Error, Result};
pub use types::{DirectItem, FollowListKind, ResponseEnvelope, Session, SessionState, ThreadTarget};
