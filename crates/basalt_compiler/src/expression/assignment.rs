//! Assignments and `++`/`--`.
//!
//! Identifier targets store through their object's store resolver and work
//! in both value and effect position. Member and element targets consume
//! their container on store, so they are accepted as statements only.
//!
//! Compound updates of a member or element read the old value by replaying
//! a receiver made of plain loads. Any other receiver is evaluated once and
//! duplicated on the stack.

use basalt_foundation::Type;

use super::chain;
use super::operators::binary_operation;
use super::{ExprContext, compile_expression};
use crate::ast::{BinaryOp, Expr, ExprKind, Ident, UpdateOp};
use crate::cto::StoreResolver;
use crate::diagnostic::{Outcome, ParseError, accumulate};
use crate::operation::Operation;

/// Whether the assigned value is left on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Position {
    /// The expression's value is used.
    Value,
    /// The expression is a statement.
    Effect,
}

/// How the new value is derived from the old one.
#[derive(Clone, Copy)]
enum Change<'e> {
    /// `target = value`
    Replace(&'e Expr),
    /// `target op= value`
    Compound(BinaryOp, &'e Expr),
    /// `++` / `--`
    Step(UpdateOp, Order),
}

/// Whether an update yields the value before or after the step.
#[derive(Clone, Copy)]
enum Order {
    Prefix,
    Postfix,
}

/// `target = value` and `target op= value`.
pub(super) fn assign(
    op: Option<BinaryOp>,
    target: &Expr,
    value: &Expr,
    position: Position,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let change = match op {
        Some(op) => Change::Compound(op, value),
        None => Change::Replace(value),
    };
    place(target, change, position, cx)
}

/// `++target`, `target++`, `--target`, `target--`.
pub(super) fn update(
    op: UpdateOp,
    prefix: bool,
    target: &Expr,
    position: Position,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let order = if prefix { Order::Prefix } else { Order::Postfix };
    place(target, Change::Step(op, order), position, cx)
}

fn place(
    target: &Expr,
    change: Change<'_>,
    position: Position,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let target = strip(target);
    match &target.kind {
        ExprKind::Identifier(ident) => identifier(ident, &target.ty, change, position, cx),
        ExprKind::PropertyAccess { .. } | ExprKind::ElementAccess { .. }
            if position == Position::Value =>
        {
            Err(ParseError::new(
                "assignment to a member cannot be used as a value",
                target.node,
            )
            .into())
        }
        ExprKind::PropertyAccess { object, member } => {
            property(object, member, &target.ty, change, cx)
        }
        ExprKind::ElementAccess { object, index } => element(object, index, &target.ty, change, cx),
        _ => Err(ParseError::new("invalid assignment target", target.node).into()),
    }
}

/// Peels wrappers that do not change what is assigned.
fn strip(mut expr: &Expr) -> &Expr {
    while let ExprKind::Paren(inner) | ExprKind::NonNull(inner) | ExprKind::TypeAssertion(inner) =
        &expr.kind
    {
        expr = inner;
    }
    expr
}

// =============================================================================
// Targets
// =============================================================================

fn identifier(
    ident: &Ident,
    ty: &Type,
    change: Change<'_>,
    position: Position,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let cto = cx.scope.resolve_ident(ident).ok_or_else(|| {
        ParseError::new(format!("cannot find name '{}'", ident.name), ident.node)
    })?;
    let store = writable(cto.store.as_ref(), &ident.name, ident)?;
    let current = || -> Outcome<Vec<Operation>> {
        cto.load.clone().ok_or_else(|| {
            ParseError::new(format!("'{}' cannot be used as a value", ident.name), ident.node)
                .into()
        })
    };

    let mut ops = match change {
        Change::Replace(value) => compile_expression(value, cx)?,
        Change::Compound(op, value) => combine(current()?, op, ty, value, cx)?,
        Change::Step(op, order) => {
            let mut ops = current()?;
            match (position, order) {
                (Position::Effect, _) => ops.push(step(op)),
                (Position::Value, Order::Prefix) => ops.extend([step(op), Operation::Dup]),
                (Position::Value, Order::Postfix) => ops.extend([Operation::Dup, step(op)]),
            }
            return store(ops, Vec::new());
        }
    };
    if position == Position::Value {
        ops.push(Operation::Dup);
    }
    store(ops, Vec::new())
}

fn property(
    object: &Expr,
    member: &Ident,
    ty: &Type,
    change: Change<'_>,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let receiver = chain::fold(object, cx)?;
    let resolver = chain::resolve_member(receiver.cto.as_deref(), &receiver.ty, member, cx.scope)?;
    let replay = || receiver.ops.clone();
    let (current, target) = resolver(&replay)?;
    let store = writable(target.store.as_ref(), &member.name, member)?;

    // Singleton surfaces have no value of their own; their stores ignore
    // the container.
    let container = receiver.ops.clone().unwrap_or_default();
    match change {
        Change::Replace(value) => store(compile_expression(value, cx)?, container),
        _ if container.iter().all(Operation::is_pure_load) => {
            store(modify(current, change, ty, cx)?, container)
        }
        _ => {
            // The receiver runs once. The new value is computed from a copy
            // and swapped under the key the store pushes.
            let on_stack = || -> Outcome<Vec<Operation>> { Ok(Vec::new()) };
            let (read, _) = resolver(&on_stack)?;
            let mut ops = container;
            ops.push(Operation::Dup);
            ops.extend(modify(read, change, ty, cx)?);
            store(vec![Operation::Swap], ops)
        }
    }
}

fn element(
    object: &Expr,
    index: &Expr,
    ty: &Type,
    change: Change<'_>,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let mut parts = accumulate([compile_expression(object, cx), compile_expression(index, cx)])?;
    let key = parts.pop().unwrap_or_default();
    let container = parts.pop().unwrap_or_default();

    let value = match change {
        Change::Replace(value) => compile_expression(value, cx)?,
        _ if container.iter().chain(&key).all(Operation::is_pure_load) => {
            let mut current = container.clone();
            current.extend(key.iter().cloned());
            current.push(Operation::PickItem);
            modify(current, change, ty, cx)?
        }
        _ => modify(vec![Operation::Over, Operation::Over, Operation::PickItem], change, ty, cx)?,
    };

    let mut ops = container;
    ops.extend(key);
    ops.extend(value);
    ops.push(Operation::SetItem);
    Ok(ops)
}

// =============================================================================
// Helpers
// =============================================================================

fn writable<'s>(
    store: Option<&'s StoreResolver>,
    name: &str,
    ident: &Ident,
) -> Outcome<&'s StoreResolver> {
    store.ok_or_else(|| ParseError::new(format!("cannot assign to '{name}'"), ident.node).into())
}

/// New value of a member or element derived from its `current` value.
fn modify(
    current: Vec<Operation>,
    change: Change<'_>,
    ty: &Type,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    match change {
        Change::Replace(value) => compile_expression(value, cx),
        Change::Compound(op, value) => combine(current, op, ty, value, cx),
        Change::Step(op, _) => {
            let mut ops = current;
            ops.push(step(op));
            Ok(ops)
        }
    }
}

fn combine(
    mut current: Vec<Operation>,
    op: BinaryOp,
    ty: &Type,
    value: &Expr,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    current.extend(compile_expression(value, cx)?);
    current.push(binary_operation(op, ty, &value.ty, cx.config));
    Ok(current)
}

const fn step(op: UpdateOp) -> Operation {
    match op {
        UpdateOp::Increment => Operation::Inc,
        UpdateOp::Decrement => Operation::Dec,
    }
}
