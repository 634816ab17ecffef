//! Spans, symbol identities, static types, and errors for basalt.
//!
//! This crate provides:
//! - [`Span`] - Source locations carried by every syntax node
//! - [`SymbolId`] / [`TypeId`] - Declaration identities minted by a [`SymbolTable`]
//! - [`Type`] - The static type shape consulted during lowering
//! - [`Error`] - Fatal compiler errors with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod intern;
pub mod span;
pub mod types;

pub use error::{Error, ErrorContext, ErrorKind, Result, SlotKind};
pub use intern::{SymbolId, SymbolTable, TypeId};
pub use span::Span;
pub use types::{Primitive, Type, TypeKey};
