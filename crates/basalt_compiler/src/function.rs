//! Function lowering.
//!
//! A function is lowered in its own [`FoldContext`] over the shared global
//! scope: parameters become argument slots, the body is lowered statement
//! by statement, and the result is resolved into final offsets.

use std::sync::Arc;

use basalt_foundation::{ErrorContext, Result, SlotKind, SymbolId};
use tracing::debug;

use crate::ast::{FunctionDecl, NodeRef};
use crate::config::CompilerConfig;
use crate::cto::CompileTimeObject;
use crate::diagnostic::ParseError;
use crate::jumps;
use crate::operation::Operation;
use crate::scope::Scope;
use crate::statement::{FoldContext, LocalVariable, slot_count};

/// A function body before jump resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct LoweredFunction {
    /// Operations with pending jump targets.
    pub operations: Vec<Operation>,
    /// Locals in slot order.
    pub locals: Vec<LocalVariable>,
    /// User diagnostics collected while lowering.
    pub diagnostics: Vec<ParseError>,
}

/// A finished function, ready for the container emitter.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledFunction {
    /// Function name.
    pub name: String,
    /// Declaring node. Diagnostics only.
    pub node: Option<NodeRef>,
    /// Function identity; `None` for synthesized functions.
    pub symbol: Option<SymbolId>,
    /// Resolved operations.
    pub operations: Vec<Operation>,
    /// Locals in slot order.
    pub locals: Vec<LocalVariable>,
}

/// Lowers `decl` against `scope` without resolving jumps.
///
/// # Errors
///
/// Fails when the function needs more argument or local slots than
/// [`CompilerConfig::max_slots`].
pub fn lower_function(
    decl: &FunctionDecl,
    scope: &Arc<Scope>,
    config: &CompilerConfig,
) -> Result<LoweredFunction> {
    let params = slot_count(SlotKind::Argument, decl.params.len(), config).map_err(|e| {
        let context = declaration_context(&decl.name, Some(decl.node));
        e.with_context(context.with_frame("binding parameters"))
    })?;

    let arguments = decl.params.iter().zip(0u8..).map(|(param, index)| {
        let symbol = param.ident.symbol;
        let cto = CompileTimeObject::slot(SlotKind::Argument, index, symbol, Some(param.ident.node));
        (symbol, Arc::new(cto))
    });
    let mut cx = FoldContext::new(decl.name.clone(), scope.bind(arguments), config);
    let mut body = Vec::new();
    cx.block(&decl.body, &mut body)?;
    cx.finish(Vec::new(), params, body)
}

/// Lowers and resolves one function.
///
/// Returns the function together with the diagnostics its body produced.
/// A function with diagnostics is still returned; callers decide whether
/// to keep it.
///
/// # Errors
///
/// Fails on slot overflow or an unresolvable jump.
pub fn compile_function(
    decl: &FunctionDecl,
    scope: &Arc<Scope>,
    config: &CompilerConfig,
) -> Result<(CompiledFunction, Vec<ParseError>)> {
    let lowered = lower_function(decl, scope, config)?;
    finalize(
        decl.name.clone(),
        Some(decl.node),
        Some(decl.symbol),
        lowered,
    )
}

/// Resolves a lowered body into a [`CompiledFunction`].
pub(crate) fn finalize(
    name: String,
    node: Option<NodeRef>,
    symbol: Option<SymbolId>,
    lowered: LoweredFunction,
) -> Result<(CompiledFunction, Vec<ParseError>)> {
    let operations = jumps::resolve(lowered.operations).map_err(|e| {
        e.with_context(declaration_context(&name, node).with_frame("resolving jumps"))
    })?;
    debug!(
        function = %name,
        operations = operations.len(),
        locals = lowered.locals.len(),
        diagnostics = lowered.diagnostics.len(),
        "compiled function"
    );
    let function = CompiledFunction {
        name,
        node,
        symbol,
        operations,
        locals: lowered.locals,
    };
    Ok((function, lowered.diagnostics))
}

/// Fatal-error context naming a declaration and where it starts.
pub(crate) fn declaration_context(name: &str, node: Option<NodeRef>) -> ErrorContext {
    let context = ErrorContext::new().with_source(name);
    match node {
        Some(node) => context.with_span(node.span),
        None => context,
    }
}
