//! Client SDK for the CDNZZ CDN management API
//!
//! Manages CDN domains, sub-domain records, cache preload/purge and usage
//! statistics through the provider's form-encoded JSON RPC endpoint. Session
//! tokens are fetched on demand and refreshed once when the provider rejects
//! them.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod params;
pub mod token;

pub use api::{CdnzzApi, CdnzzClient, MockCdnzzClient};
pub use config::{ClientConfig, Config, Credentials};
pub use error::{Error, Result};
pub use models::{RecordType, VerifyType};
pub use params::Params;
pub use token::Token;
