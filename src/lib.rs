//! Basalt - typed contract language to stack-machine operations
//!
//! This crate re-exports all layers of the basalt middle-end for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: basalt_compiler:   Scopes, builtins, lowering, jump resolution
//! Layer 0: basalt_foundation: Spans, identities, types, errors
//! ```

pub use basalt_compiler as compiler;
pub use basalt_foundation as foundation;
