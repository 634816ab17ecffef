//! Expression lowering.
//!
//! [`compile_expression`] lowers any expression to operations that push
//! exactly one value. [`compile_effect`] lowers an expression evaluated for
//! its side effects only and leaves the stack unchanged.
//!
//! Identifiers, member accesses and calls go through chain folding (see
//! [`chain`]); everything else is structural.

mod assignment;
mod chain;
mod operators;

use std::sync::Arc;

use tracing::trace;

use crate::ast::{Expr, ExprKind, PropertyAssignment};
use crate::config::CompilerConfig;
use crate::cto::reverse_concat;
use crate::diagnostic::{Outcome, ParseError, accumulate, at_node};
use crate::operation::{Operation, SentinelAllocator};
use crate::scope::Scope;

pub use chain::{Fold, fold, resolve_member};
pub(crate) use operators::binary_operation;

/// Everything expression lowering reads.
#[derive(Clone, Copy)]
pub struct ExprContext<'a> {
    /// Bindings visible at the expression.
    pub scope: &'a Arc<Scope>,
    /// Jump destinations for short-circuiting operators.
    pub sentinels: &'a SentinelAllocator,
    /// Active configuration.
    pub config: &'a CompilerConfig,
}

impl<'a> ExprContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        scope: &'a Arc<Scope>,
        sentinels: &'a SentinelAllocator,
        config: &'a CompilerConfig,
    ) -> Self {
        Self {
            scope,
            sentinels,
            config,
        }
    }
}

/// Lowers `expr` to operations pushing exactly one value.
pub fn compile_expression(expr: &Expr, cx: &ExprContext<'_>) -> Outcome<Vec<Operation>> {
    at_node(lower(expr, cx), expr.node)
}

/// Lowers `expr` for its side effects, leaving the stack as it was.
pub fn compile_effect(expr: &Expr, cx: &ExprContext<'_>) -> Outcome<Vec<Operation>> {
    let outcome = match &expr.kind {
        ExprKind::Assignment { op, target, value } => {
            assignment::assign(*op, target, value, assignment::Position::Effect, cx)
        }
        ExprKind::Update { op, target, .. } => {
            assignment::update(*op, true, target, assignment::Position::Effect, cx)
        }
        ExprKind::Paren(inner) => return compile_effect(inner, cx),
        kind if chain::is_chain(kind) => chain::compile(expr, cx).map(|folded| {
            let mut ops = folded.ops;
            if !folded.void {
                ops.push(Operation::Drop);
            }
            ops
        }),
        _ => lower(expr, cx).map(|mut ops| {
            ops.push(Operation::Drop);
            ops
        }),
    };
    at_node(outcome, expr.node)
}

fn lower(expr: &Expr, cx: &ExprContext<'_>) -> Outcome<Vec<Operation>> {
    trace!(node = expr.node.id.0, "lowering expression");
    match &expr.kind {
        ExprKind::Literal(literal) => Ok(vec![Operation::push_literal(literal)]),
        ExprKind::Unary { op, operand } => operators::unary(*op, operand, cx),
        ExprKind::Binary { op, left, right } => operators::binary(*op, left, right, cx),
        ExprKind::Logical { op, left, right } => operators::logical(*op, left, right, cx),
        ExprKind::Conditional {
            condition,
            when_true,
            when_false,
        } => operators::conditional(condition, when_true, when_false, cx),
        ExprKind::Assignment { op, target, value } => {
            assignment::assign(*op, target, value, assignment::Position::Value, cx)
        }
        ExprKind::Update { op, prefix, target } => {
            assignment::update(*op, *prefix, target, assignment::Position::Value, cx)
        }
        ExprKind::ArrayLiteral(elements) => array_literal(elements, cx),
        ExprKind::ObjectLiteral(properties) => object_literal(expr, properties, cx),
        ExprKind::Identifier(_)
        | ExprKind::Call { .. }
        | ExprKind::New { .. }
        | ExprKind::PropertyAccess { .. }
        | ExprKind::ElementAccess { .. }
        | ExprKind::NonNull(_)
        | ExprKind::Paren(_)
        | ExprKind::TypeAssertion(_) => {
            let folded = chain::compile(expr, cx)?;
            if folded.void {
                return Err(ParseError::new("expression of type void has no value", expr.node).into());
            }
            Ok(folded.ops)
        }
    }
}

// =============================================================================
// Literals
// =============================================================================

fn array_literal(elements: &[Expr], cx: &ExprContext<'_>) -> Outcome<Vec<Operation>> {
    if elements.is_empty() {
        return Ok(vec![Operation::NewArray0]);
    }
    let groups = accumulate(elements.iter().map(|element| compile_expression(element, cx)))?;
    let mut ops = reverse_concat(groups);
    ops.push(Operation::push_index(elements.len()));
    ops.push(Operation::Pack);
    Ok(ops)
}

fn object_literal(
    expr: &Expr,
    properties: &[PropertyAssignment],
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let layout = expr
        .ty
        .non_null()
        .key()
        .and_then(|key| cx.scope.resolve_type(key))
        .and_then(|ctt| ctt.layout.clone());
    match layout {
        Some(layout) => struct_literal(expr, &layout, properties, cx),
        None => map_literal(properties, cx),
    }
}

/// Fixed-layout literal: values in field order, packed positionally.
fn struct_literal(
    expr: &Expr,
    layout: &[basalt_foundation::SymbolId],
    properties: &[PropertyAssignment],
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let mut errors = Vec::new();
    for property in properties {
        if !property.symbol.is_some_and(|symbol| layout.contains(&symbol)) {
            errors.push(ParseError::new(
                format!("'{}' is not a field of {}", property.name, expr.ty),
                property.node,
            ));
        }
    }

    let fields = layout.iter().map(|field| {
        match properties.iter().find(|p| p.symbol == Some(*field)) {
            Some(property) => compile_expression(&property.value, cx),
            None => Err(ParseError::new(
                format!("missing field of {} in struct literal", expr.ty),
                expr.node,
            )
            .into()),
        }
    });
    let groups = match accumulate(fields) {
        Ok(groups) if errors.is_empty() => groups,
        Ok(_) => return Err(errors),
        Err(mut more) => {
            errors.append(&mut more);
            return Err(errors);
        }
    };

    let mut ops = reverse_concat(groups);
    ops.push(Operation::push_index(layout.len()));
    ops.push(Operation::PackStruct);
    Ok(ops)
}

/// Name-keyed literal built entry by entry.
fn map_literal(properties: &[PropertyAssignment], cx: &ExprContext<'_>) -> Outcome<Vec<Operation>> {
    let entries = accumulate(properties.iter().map(|property| {
        let value = compile_expression(&property.value, cx)?;
        let mut ops = vec![Operation::Dup, Operation::push_string(&property.name)];
        ops.extend(value);
        ops.push(Operation::SetItem);
        Ok(ops)
    }))?;
    let mut ops = vec![Operation::NewMap];
    ops.extend(entries.into_iter().flatten());
    Ok(ops)
}
