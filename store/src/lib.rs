//! # Tillcfg Store Library
//!
//! Configuration and theme storage for point-of-sale front ends. This library
//! provides the configuration data model, a uniform store API over several
//! backends, TTL caching with offline fallback and synchronous key-value
//! persistence.
//!
//! ## Modules
//!
//! - [`cache`] - TTL cache with request-generation tokens and composite keys
//! - [`common`] - Error types shared by every adapter
//! - [`config_store`] - The `ConfigStore` trait, adapters and factory
//! - [`model`] - Settings, tenant configuration and theme data contracts
//! - [`storage`] - Synchronous key-value persistence (memory and files)
//! - `testing` - Transport and store doubles (feature `test-utils`)

pub mod cache;
pub mod common;
pub mod config_store;
pub mod model;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
