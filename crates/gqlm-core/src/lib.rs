//! Core types, configuration, and errors for multi-client GraphQL binding
//! generation.
//!
//! This crate provides the foundational types and abstractions used across
//! all other crates in the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`ClientName`, `OperationName`)
//! - The shared error hierarchy with contextual information
//! - Client configuration resolution (hosts, tokens, headers, cookie
//!   forwarding, schema paths) with environment overrides
//! - The Operation Registry mapping clients to their operations

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod error_record;
mod registry;
mod types;

pub use config::{
    ClientConfig, ClientDescriptor, ClientSource, CorsConfig, EnvSource, GqlConfig,
    GqlConfigBuilder, ProcessEnv, TokenConfig,
};
pub use error::{Error, Result};
pub use error_record::{ErrorRecord, GqlError};
pub use registry::OperationRegistry;
pub use types::{AttributedOperation, ClientName, OperationName};
