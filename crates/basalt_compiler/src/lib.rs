//! Scope resolution, lowering, builtin binding, and jump patching for basalt.
//!
//! This crate provides:
//! - [`ast`] - The typed tree handed over by the front end
//! - [`Scope`] / [`CompileTimeObject`] - What every name compiles to
//! - [`builtins`] - Annotation-driven binding of the ambient library
//! - [`expression`] / [`statement`] - Lowering to [`Operation`]s with
//!   pending jump targets
//! - [`jumps`] - Rewriting pending targets into relative offsets
//! - [`compile_function`] / [`compile_project`] - The drivers
//!
//! # Example
//!
//! ```
//! use basalt_compiler::ast::{BinaryOp, NodeFactory};
//! use basalt_compiler::{CompilerConfig, Operation, Scope, compile_function};
//! use basalt_foundation::Type;
//!
//! let mut factory = NodeFactory::new();
//! let a = factory.param("a", Type::Integer);
//! let b = factory.param("b", Type::Integer);
//! let left = factory.name(&a.ident, Type::Integer);
//! let right = factory.name(&b.ident, Type::Integer);
//! let sum = factory.binary(BinaryOp::Add, left, right, Type::Integer);
//! let ret = factory.ret(Some(sum));
//! let decl = factory.function("add", vec![a, b], Type::Integer, vec![ret]);
//!
//! let (function, diagnostics) =
//!     compile_function(&decl, &Scope::empty(), &CompilerConfig::default()).unwrap();
//! assert!(diagnostics.is_empty());
//! assert_eq!(function.operations[3], Operation::Add);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod builtins;
pub mod config;
pub mod cto;
pub mod diagnostic;
pub mod expression;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod function;
pub mod jumps;
pub mod operation;
pub mod project;
pub mod scope;
pub mod statement;

pub use builtins::{Builtins, install};
pub use config::CompilerConfig;
pub use cto::{CompileTimeObject, CompileTimeType};
pub use diagnostic::{Outcome, ParseError};
pub use expression::{ExprContext, compile_effect, compile_expression};
pub use function::{CompiledFunction, LoweredFunction, compile_function, lower_function};
pub use operation::{JumpKind, JumpTarget, Operation, SentinelId};
pub use project::{CompiledProject, compile_project};
pub use scope::Scope;
pub use statement::{FoldContext, LocalVariable};
