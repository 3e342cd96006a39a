//! Core traits for zonewright
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Hosted zone and record set calls against a DNS API
//! - [`ResourceStore`]: Desired state in, status out

pub mod dns_provider;
pub mod state_store;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
pub use state_store::{ResourceStore, ResourceStoreFactory};
