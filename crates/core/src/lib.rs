//! RedSeam Core - Shared types library.
//!
//! This crate provides common types used across the RedSeam client
//! components:
//! - `storefront` - the client library (cart engine, gateways, session)
//! - `cli` - command-line surface driving the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
