//! `while`, `do`/`while`, `for` and `for`/`of`.
//!
//! Every loop has a `continue` sentinel and a `break` sentinel. The loop
//! body is lowered in a child scope with those two as the innermost
//! targets.

use basalt_foundation::{Result, Type};

use super::FoldContext;
use crate::ast::{Binding, Expr, ForInit, NodeRef, Stmt};
use crate::operation::{JumpKind, Operation, SentinelId};

impl FoldContext<'_> {
    /// `top: cond; ifnot break; body; jmp top; break:`
    pub(super) fn while_loop(
        &mut self,
        condition: &Expr,
        body: &Stmt,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        let top = self.fresh();
        let end = self.fresh();
        ops.push(Operation::Sentinel(top));
        let condition = self.expression(condition);
        ops.extend(condition);
        ops.push(Operation::jump_if(JumpKind::IfFalse, end));
        self.loop_body(body, end, top, ops)?;
        ops.push(Operation::jump(top));
        ops.push(Operation::Sentinel(end));
        Ok(())
    }

    /// `top: body; next: cond; if top; break:`
    pub(super) fn do_while_loop(
        &mut self,
        body: &Stmt,
        condition: &Expr,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        let top = self.fresh();
        let next = self.fresh();
        let end = self.fresh();
        ops.push(Operation::Sentinel(top));
        self.loop_body(body, end, next, ops)?;
        ops.push(Operation::Sentinel(next));
        let condition = self.expression(condition);
        ops.extend(condition);
        ops.push(Operation::jump_if(JumpKind::IfTrue, top));
        ops.push(Operation::Sentinel(end));
        Ok(())
    }

    /// `init; top: cond; ifnot break; body; next: update; jmp top; break:`
    pub(super) fn for_loop(
        &mut self,
        init: Option<&ForInit>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        self.scoped(|cx| {
            match init {
                Some(ForInit::Variable(statement)) => cx.variable_statement(statement, ops)?,
                Some(ForInit::Expression(expr)) => {
                    let effect = cx.effect(expr);
                    ops.extend(effect);
                }
                None => {}
            }

            let top = cx.fresh();
            let next = cx.fresh();
            let end = cx.fresh();
            ops.push(Operation::Sentinel(top));
            if let Some(condition) = condition {
                let condition = cx.expression(condition);
                ops.extend(condition);
                ops.push(Operation::jump_if(JumpKind::IfFalse, end));
            }
            cx.loop_body(body, end, next, ops)?;
            ops.push(Operation::Sentinel(next));
            if let Some(update) = update {
                let effect = cx.effect(update);
                ops.extend(effect);
            }
            ops.push(Operation::jump(top));
            ops.push(Operation::Sentinel(end));
            Ok(())
        })
    }

    /// Iterates an array by index.
    ///
    /// The array and the index live in two hidden locals so nothing stays
    /// on the stack across the body.
    pub(super) fn for_of_loop(
        &mut self,
        binding: &Binding,
        iterable: &Expr,
        body: &Stmt,
        node: NodeRef,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        self.scoped(|cx| {
            let array_ops = cx.expression(iterable);
            let array = cx.hidden_local("array", &iterable.ty)?;
            let index = cx.hidden_local("index", &Type::Integer)?;
            ops.extend(array_ops);
            ops.extend([
                Operation::StoreLocal(array),
                Operation::PushInt(0),
                Operation::StoreLocal(index),
            ]);

            let top = cx.fresh();
            let next = cx.fresh();
            let end = cx.fresh();
            ops.extend([
                Operation::Sentinel(top),
                Operation::LoadLocal(index),
                Operation::LoadLocal(array),
                Operation::Size,
                Operation::Lt,
                Operation::jump_if(JumpKind::IfFalse, end),
            ]);

            cx.scoped(|cx| {
                let element = vec![
                    Operation::LoadLocal(array),
                    Operation::LoadLocal(index),
                    Operation::PickItem,
                ];
                match binding {
                    Binding::Identifier(target) => {
                        let store = cx.bind_name(&target.ident, &target.ty)?;
                        ops.extend(element);
                        ops.push(store);
                    }
                    pattern => cx.destructure(pattern, element, node, ops)?,
                }
                cx.loop_body(body, end, next, ops)
            })?;

            ops.extend([
                Operation::Sentinel(next),
                Operation::LoadLocal(index),
                Operation::Inc,
                Operation::StoreLocal(index),
                Operation::jump(top),
                Operation::Sentinel(end),
            ]);
            Ok(())
        })
    }

    fn loop_body(
        &mut self,
        body: &Stmt,
        brk: SentinelId,
        cont: SentinelId,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        self.in_loop(brk, cont, |cx| cx.scoped(|cx| cx.statement(body, ops)))
    }
}
