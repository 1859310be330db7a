//! Binding generation over external GraphQL SDK generator output.
//!
//! Invokes the external generator with attributed documents, rewrites its
//! output so binding names match client attribution, and derives the
//! exported runtime surface (prefixed call wrappers plus the
//! client→operations map).

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod emit;
pub mod generator;
pub mod normalize;
pub mod orchestrator;

pub use emit::{Binding, BindingEmitter, extract_wrappers};
pub use generator::{GenerateRequest, SchemaDescriptor, SdkGenerator};
pub use normalize::normalize_template;
pub use orchestrator::{GeneratedOutput, Orchestrator};
