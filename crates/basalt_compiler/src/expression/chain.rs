//! Chain folding.
//!
//! `root.link.link(args)...` is flattened into its root and an ordered list
//! of links, then folded left to right. The fold state carries the
//! operations so far, the object they evaluate to, and its static type.
//! Each link hands the operations so far to a resolver as a replayable
//! thunk, and the resolver's output becomes the new state.

use std::sync::Arc;

use basalt_foundation::Type;

use super::{ExprContext, compile_expression};
use crate::ast::{Expr, ExprKind, Ident};
use crate::cto::{CompileTimeObject, PropertyMap, PropertyResolver, Thunk};
use crate::diagnostic::{Outcome, ParseError, at_node};
use crate::operation::Operation;
use crate::scope::Scope;

/// State of a chain after some prefix of it has been folded.
#[derive(Debug)]
pub struct Fold {
    /// Operations evaluating the prefix, or why it has no value.
    ///
    /// Kept as an outcome so an object without a value (an enum, a
    /// singleton surface) only fails if a link actually evaluates it.
    pub ops: Outcome<Vec<Operation>>,
    /// Object the prefix resolved to, if it has one.
    pub cto: Option<Arc<CompileTimeObject>>,
    /// Static type of the prefix.
    pub ty: Type,
}

/// A folded chain.
pub(super) struct Folded {
    pub(super) ops: Vec<Operation>,
    /// The chain ends in a call that leaves nothing on the stack.
    pub(super) void: bool,
}

/// Returns true for expression kinds that are folded as chains.
pub(super) fn is_chain(kind: &ExprKind) -> bool {
    matches!(
        kind,
        ExprKind::Identifier(_)
            | ExprKind::Call { .. }
            | ExprKind::New { .. }
            | ExprKind::PropertyAccess { .. }
            | ExprKind::ElementAccess { .. }
            | ExprKind::NonNull(_)
            | ExprKind::Paren(_)
            | ExprKind::TypeAssertion(_)
    )
}

/// Folds a chain to operations.
pub(super) fn compile(expr: &Expr, cx: &ExprContext<'_>) -> Outcome<Folded> {
    let folded = fold(expr, cx)?;
    if matches!(folded.ty, Type::Function { .. }) {
        return Err(ParseError::new("functions cannot be used as values", expr.node).into());
    }
    Ok(Folded {
        void: folded.ty.is_void_like(),
        ops: folded.ops?,
    })
}

/// Folds a chain to its final state without forcing its value.
pub fn fold(expr: &Expr, cx: &ExprContext<'_>) -> Outcome<Fold> {
    let (root, links) = flatten(expr);
    let start = fold_root(root, cx)?;
    links
        .into_iter()
        .try_fold(start, |state, link| at_node(apply(state, link, cx), link.node))
}

/// Splits a chain into its root and its links, innermost first.
fn flatten(expr: &Expr) -> (&Expr, Vec<&Expr>) {
    let mut links = Vec::new();
    let mut current = expr;
    loop {
        let next = match &current.kind {
            ExprKind::Call { callee, .. } | ExprKind::New { callee, .. } => callee,
            ExprKind::PropertyAccess { object, .. } | ExprKind::ElementAccess { object, .. } => {
                object
            }
            ExprKind::NonNull(inner) | ExprKind::Paren(inner) | ExprKind::TypeAssertion(inner) => {
                inner
            }
            _ => break,
        };
        links.push(current);
        current = next;
    }
    links.reverse();
    (current, links)
}

fn fold_root(root: &Expr, cx: &ExprContext<'_>) -> Outcome<Fold> {
    let ExprKind::Identifier(ident) = &root.kind else {
        return Ok(Fold {
            ops: Ok(compile_expression(root, cx)?),
            cto: None,
            ty: root.ty.clone(),
        });
    };

    let cto = cx.scope.resolve_ident(ident).ok_or_else(|| {
        ParseError::new(format!("cannot find name '{}'", ident.name), ident.node)
    })?;
    let ops = cto.load.clone().ok_or_else(|| {
        vec![ParseError::new(
            format!("'{}' cannot be used as a value", ident.name),
            ident.node,
        )]
    });
    Ok(Fold {
        ops,
        cto: Some(cto),
        ty: root.ty.clone(),
    })
}

fn apply(state: Fold, link: &Expr, cx: &ExprContext<'_>) -> Outcome<Fold> {
    match &link.kind {
        ExprKind::Call { args, .. } | ExprKind::New { args, .. } => call(state, args, &link.ty, cx),
        ExprKind::PropertyAccess { member, .. } => property(state, member, &link.ty, cx),
        ExprKind::ElementAccess { index, .. } => element(state, index, &link.ty, cx),
        _ => Ok(Fold {
            ty: link.ty.clone(),
            ..state
        }),
    }
}

fn call(state: Fold, args: &[Expr], ty: &Type, cx: &ExprContext<'_>) -> Outcome<Fold> {
    let Some(resolver) = state.cto.as_ref().and_then(|cto| cto.call.clone()) else {
        return Err(ParseError::detached(format!("value of type {} is not callable", state.ty)).into());
    };

    let receiver = state.ops;
    let replay = || receiver.clone();
    let thunks: Vec<Box<Thunk<'_>>> = args
        .iter()
        .map(|arg| Box::new(move || compile_expression(arg, cx)) as Box<Thunk<'_>>)
        .collect();
    let arguments: Vec<&Thunk<'_>> = thunks.iter().map(AsRef::as_ref).collect();

    let ops = resolver(&replay, &arguments)?;
    let cto = (!ty.is_void_like()).then(|| Arc::new(CompileTimeObject::value()));
    Ok(Fold {
        ops: Ok(ops),
        cto,
        ty: ty.clone(),
    })
}

fn property(state: Fold, member: &Ident, ty: &Type, cx: &ExprContext<'_>) -> Outcome<Fold> {
    let resolver = resolve_member(state.cto.as_deref(), &state.ty, member, cx.scope)?;
    let receiver = state.ops;
    let replay = || receiver.clone();
    let (ops, next) = resolver(&replay)?;
    Ok(Fold {
        ops: Ok(ops),
        cto: Some(next),
        ty: ty.clone(),
    })
}

fn element(state: Fold, index: &Expr, ty: &Type, cx: &ExprContext<'_>) -> Outcome<Fold> {
    let mut ops = state.ops?;
    ops.extend(compile_expression(index, cx)?);
    ops.push(Operation::PickItem);
    Ok(Fold {
        ops: Ok(ops),
        cto: None,
        ty: ty.clone(),
    })
}

/// Finds the resolver for `member` on an object of type `ty`.
///
/// The object's own members are consulted before its type's.
pub fn resolve_member(
    cto: Option<&CompileTimeObject>,
    ty: &Type,
    member: &Ident,
    scope: &Scope,
) -> Outcome<PropertyResolver> {
    let own = cto.and_then(|cto| cto.properties.as_ref());
    let ctt = ty.non_null().key().and_then(|key| scope.resolve_type(key));
    if own.is_none() && ctt.is_none() {
        return Err(ParseError::new(
            format!("cannot read '{}': {ty} is not an object", member.name),
            member.node,
        )
        .into());
    }

    let lookup = |map: &PropertyMap| {
        map.get(&member.symbol)
            .or_else(|| member.alias.and_then(|alias| map.get(&alias)))
            .cloned()
    };
    own.and_then(lookup)
        .or_else(|| ctt.as_ref().and_then(|ctt| lookup(&ctt.properties)))
        .ok_or_else(|| {
            ParseError::new(
                format!("property '{}' does not exist on {ty}", member.name),
                member.node,
            )
            .into()
        })
}
