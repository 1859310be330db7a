//! Runtime dispatch for generated multi-client GraphQL bindings.
//!
//! This crate executes the operations the codegen pipeline attributed and
//! cataloged: a [`Session`] lazily initializes one transport per configured
//! client, routes each operation to its owning client through the
//! operation registry, and exposes patch-based setters for headers, auth
//! tokens, and CORS options.
//!
//! # Error handling
//!
//! Every failed dispatch is captured as a [`gqlm_core::ErrorRecord`] and
//! delivered to the single registered error handler; a handler registered
//! after a failure is caught up with the most recent record.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod client;
mod session;
mod state;

pub use client::{DispatchFailure, GqlClient};
pub use session::{
    ClientContext, ErrorHandler, OperationCatalog, OperationEntry, OperationKind, Session,
};
pub use state::RequestOptions;
