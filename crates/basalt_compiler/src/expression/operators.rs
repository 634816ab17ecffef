//! Unary, binary, short-circuit and conditional operators.

use basalt_foundation::Type;

use super::{ExprContext, compile_expression};
use crate::ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, UnaryOp};
use crate::config::CompilerConfig;
use crate::diagnostic::{Outcome, accumulate};
use crate::operation::{JumpKind, Operation};

pub(super) fn unary(op: UnaryOp, operand: &Expr, cx: &ExprContext<'_>) -> Outcome<Vec<Operation>> {
    if let (UnaryOp::Negate, ExprKind::Literal(Literal::Integer(value))) = (op, &operand.kind) {
        if let Some(negated) = value.checked_neg() {
            return Ok(vec![Operation::PushInt(negated)]);
        }
    }

    let mut ops = compile_expression(operand, cx)?;
    match op {
        UnaryOp::Negate => ops.push(Operation::Negate),
        UnaryOp::Plus => {}
        UnaryOp::Not => ops.push(Operation::Not),
        UnaryOp::BitNot => ops.push(Operation::Invert),
    }
    Ok(ops)
}

/// Left operand, right operand, operator.
pub(super) fn binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let (mut ops, rhs) = operands(left, right, cx)?;
    ops.extend(rhs);
    ops.push(binary_operation(op, &left.ty, &right.ty, cx.config));
    Ok(ops)
}

/// Maps a binary operator to its instruction given the operand types.
pub(crate) fn binary_operation(
    op: BinaryOp,
    left: &Type,
    right: &Type,
    config: &CompilerConfig,
) -> Operation {
    let numeric = left.is_integer() && right.is_integer();
    match op {
        BinaryOp::Add if config.concat_strings && left.is_string() && right.is_string() => {
            Operation::Cat
        }
        BinaryOp::Add => Operation::Add,
        BinaryOp::Sub => Operation::Sub,
        BinaryOp::Mul => Operation::Mul,
        BinaryOp::Div => Operation::Div,
        BinaryOp::Mod => Operation::Mod,
        BinaryOp::Pow => Operation::Pow,
        BinaryOp::Shl => Operation::Shl,
        BinaryOp::Shr => Operation::Shr,
        BinaryOp::BitAnd => Operation::And,
        BinaryOp::BitOr => Operation::Or,
        BinaryOp::BitXor => Operation::Xor,
        BinaryOp::Lt => Operation::Lt,
        BinaryOp::Le => Operation::Le,
        BinaryOp::Gt => Operation::Gt,
        BinaryOp::Ge => Operation::Ge,
        BinaryOp::StrictEq | BinaryOp::LooseEq if numeric => Operation::NumEqual,
        BinaryOp::StrictEq | BinaryOp::LooseEq => Operation::Equal,
        BinaryOp::StrictNe | BinaryOp::LooseNe if numeric => Operation::NumNotEqual,
        BinaryOp::StrictNe | BinaryOp::LooseNe => Operation::NotEqual,
    }
}

/// `&&`, `||` and `??`, keeping the deciding operand's value.
pub(super) fn logical(
    op: LogicalOp,
    left: &Expr,
    right: &Expr,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let (mut ops, rhs) = operands(left, right, cx)?;
    let end = cx.sentinels.fresh();
    ops.push(Operation::Dup);
    match op {
        LogicalOp::And => ops.push(Operation::jump_if(JumpKind::IfFalse, end)),
        LogicalOp::Or => ops.push(Operation::jump_if(JumpKind::IfTrue, end)),
        LogicalOp::Coalesce => {
            ops.push(Operation::IsNull);
            ops.push(Operation::jump_if(JumpKind::IfFalse, end));
        }
    }
    ops.push(Operation::Drop);
    ops.extend(rhs);
    ops.push(Operation::Sentinel(end));
    Ok(ops)
}

/// `condition ? when_true : when_false`
pub(super) fn conditional(
    condition: &Expr,
    when_true: &Expr,
    when_false: &Expr,
    cx: &ExprContext<'_>,
) -> Outcome<Vec<Operation>> {
    let mut parts = accumulate([condition, when_true, when_false].map(|e| compile_expression(e, cx)))?;
    let otherwise = parts.pop().unwrap_or_default();
    let then = parts.pop().unwrap_or_default();
    let mut ops = parts.pop().unwrap_or_default();

    let else_label = cx.sentinels.fresh();
    let end = cx.sentinels.fresh();
    ops.push(Operation::jump_if(JumpKind::IfFalse, else_label));
    ops.extend(then);
    ops.push(Operation::jump(end));
    ops.push(Operation::Sentinel(else_label));
    ops.extend(otherwise);
    ops.push(Operation::Sentinel(end));
    Ok(ops)
}

/// Compiles both operands, reporting failures of either.
fn operands(
    left: &Expr,
    right: &Expr,
    cx: &ExprContext<'_>,
) -> Outcome<(Vec<Operation>, Vec<Operation>)> {
    let mut both = accumulate([compile_expression(left, cx), compile_expression(right, cx)])?;
    let rhs = both.pop().unwrap_or_default();
    let lhs = both.pop().unwrap_or_default();
    Ok((lhs, rhs))
}
