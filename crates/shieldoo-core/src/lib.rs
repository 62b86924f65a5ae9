//! # shieldoo-core
//!
//! Core types, request signing and HTTP client for the Shieldoo management
//! API, shared by the firewall and server resource crates.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and conversions
//! - [`config`] - Provider configuration with environment fallbacks
//! - [`auth`] - HS512 request token signing
//! - [`client`] - Request description, transports and the typed client
//! - [`mockup`] - Canned-response transport used in test mode
//! - [`types`] - Entities and group references
//! - [`attributes`] - Mapping of host attribute trees into plain structs

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attributes;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod mockup;
pub mod types;

// Re-export commonly used types
pub use attributes::MappingPolicy;
pub use client::{ApiRequest, ShieldooClient, ShieldooClientBuilder, Transport};
pub use config::{ProviderConfig, ProviderSettings};
pub use error::{Error, Result};
pub use types::{Entity, Group, GroupRef};
