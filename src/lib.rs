//! # Azion - A typed client for Azion's content delivery API
//!
//! This crate wraps Azion's REST API: token authentication, content delivery
//! configurations, their origins, and cache purges. Responses are decoded into
//! typed domain objects, failures into a typed error taxonomy keyed by HTTP
//! status code, and multi-status purge responses into per-status buckets.
//!
//! ## Quick Start
//!
//! ```no_run
//! use azion::{Client, ConfigurationUpdate, PurgeMethod};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), azion::Error> {
//!     // Reads the token from AZ_TOKEN
//!     let client = Client::builder()
//!         .token_from_env()?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     for configuration in client.list_configurations().await? {
//!         println!("{} -> {}", configuration.name, configuration.domain_name);
//!     }
//!
//!     let update = ConfigurationUpdate {
//!         delivery_protocol: Some("http,https".to_string()),
//!         ..Default::default()
//!     };
//!     client.partial_update_configuration(1528252734, &update).await?;
//!
//!     let purge = client
//!         .purge_url(["www.example.com/foo.jpg", "www.example.com/bar.jpg"], PurgeMethod::Delete)
//!         .await?;
//!     for (status, entry) in purge.failed() {
//!         eprintln!("{}: {} ({:?})", status, entry.details, entry.values);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Status codes the API documents as errors map to an [`ErrorKind`], carried
//! by [`Error::Api`] together with the `detail` messages of the response:
//!
//! ```no_run
//! use azion::{Client, Error, ErrorKind};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().token("my-token").build()?;
//! match client.delete_configuration(1528252734).await {
//!     Ok(deleted) => println!("Deleted: {}", deleted),
//!     Err(Error::Api(err)) => match err.kind {
//!         ErrorKind::NotFound => eprintln!("Already gone"),
//!         ErrorKind::Unauthorized => eprintln!("Token rejected: {:?}", err.details),
//!         _ => eprintln!("API error: {}", err),
//!     },
//!     Err(Error::UnclassifiedStatus { status, raw_response }) => {
//!         eprintln!("HTTP error {}: {}", status, raw_response);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Decoding Without The Client
//!
//! The decoding layer is plain synchronous functions over a [`RawResponse`],
//! usable with any transport:
//!
//! ```
//! use azion::{decode, hydrate_many, Configuration, RawResponse};
//! use http::StatusCode;
//!
//! let response = RawResponse::new(StatusCode::OK, "[]");
//! let configurations: Vec<Configuration> = hydrate_many(decode(Some(&response), StatusCode::OK)?)?;
//! assert!(configurations.is_empty());
//! # Ok::<(), azion::Error>(())
//! ```
//!
//! Diagnostics are emitted through `tracing`. Install a subscriber to see them.

mod client;
mod decode;
mod error;
pub mod metadata;
mod models;
pub mod multi_status;
mod payloads;
mod response;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, TOKEN_ENV_VAR};
pub use decode::{decode, decode_boolean, error_for};
pub use error::{ApiError, Error, ErrorKind, Result};
pub use models::{hydrate, hydrate_many, Address, Configuration, Origin, Token};
pub use multi_status::{MultiStatus, StatusEntry};
pub use payloads::{ConfigurationUpdate, NewAddress, NewConfiguration, NewOrigin, OriginUpdate, PurgeMethod};
pub use response::RawResponse;
