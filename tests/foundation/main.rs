//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Span, SymbolId/TypeId, Type, and Error.

mod errors;
mod identities;
mod types;
