//! # Snowcap
//!
//! Snowcap is a small client for the ServiceNow REST table API.
//!
//! It reads records with encoded-query filters and creates incidents, either
//! one at a time or as a batch that reports a success or failure for every
//! item instead of stopping at the first error.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types distinguishing remote rejections from transport failures
//! - [`client`] - HTTP client for the table API
//! - [`batch`] - Sequential batch creation with per-item outcomes
//! - [`models`] - Incident payloads, batch reports and the query builder
//!
//! ## Configuration
//!
//! - `SNOW_BASE_URL`: table API base, e.g. `https://dev.service-now.com/api/now/table`
//! - `SNOW_USERNAME`: Basic-auth user
//! - `password`: Basic-auth password (optional, passed through unchecked)
//!
//! Optional:
//! - `SNOW_INCIDENT_URL`: create endpoint (default `{SNOW_BASE_URL}/incident`)
//! - `SNOW_DEFAULT_LIMIT`: default page size for reads (default 10)
//! - `SNOW_TIMEOUT_SECS`: request timeout (default: none)
//! - `RUST_LOG`: Log level (e.g., `snowcap=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use snowcap::client::TableClient;
//! use snowcap::config::Config;
//! use snowcap::models::IncidentSpec;
//!
//! async fn example() -> Result<(), snowcap::error::SnowcapError> {
//!     let config = Config::from_env()?;
//!     let client = TableClient::new(&config)?;
//!
//!     let report = client
//!         .create_multiple_incidents(&[
//!             IncidentSpec::new("Disk full on build agent", "<caller>", "<group>"),
//!             IncidentSpec::new("VPN drops every hour", "<caller>", "<group>"),
//!         ])
//!         .await;
//!
//!     for outcome in &report {
//!         println!("#{}: {}", outcome.index(), outcome.status());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
