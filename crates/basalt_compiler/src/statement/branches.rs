//! `if` and `switch`.

use basalt_foundation::Result;

use super::FoldContext;
use crate::ast::{BinaryOp, Expr, Stmt, SwitchCase};
use crate::expression::binary_operation;
use crate::operation::{JumpKind, Operation};

impl FoldContext<'_> {
    pub(super) fn if_statement(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        let condition = self.expression(condition);
        ops.extend(condition);
        let otherwise = self.fresh();
        ops.push(Operation::jump_if(JumpKind::IfFalse, otherwise));
        self.scoped(|cx| cx.statement(then_branch, ops))?;

        let Some(else_branch) = else_branch else {
            ops.push(Operation::Sentinel(otherwise));
            return Ok(());
        };
        let end = self.fresh();
        ops.push(Operation::jump(end));
        ops.push(Operation::Sentinel(otherwise));
        self.scoped(|cx| cx.statement(else_branch, ops))?;
        ops.push(Operation::Sentinel(end));
        Ok(())
    }

    /// Dispatches on a discriminant held in a hidden local.
    ///
    /// Case tests run in source order with strict equality; bodies follow
    /// in source order so control falls through until a `break`.
    pub(super) fn switch(
        &mut self,
        discriminant: &Expr,
        cases: &[SwitchCase],
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        self.scoped(|cx| {
            let value = cx.expression(discriminant);
            let slot = cx.hidden_local("switch", &discriminant.ty)?;
            ops.extend(value);
            ops.push(Operation::StoreLocal(slot));

            let labels: Vec<_> = cases.iter().map(|_| cx.fresh()).collect();
            let end = cx.fresh();
            let mut default = None;
            for (case, &label) in cases.iter().zip(&labels) {
                let Some(test) = &case.test else {
                    if default.replace(label).is_some() {
                        cx.fail("switch has more than one default clause", case.node);
                    }
                    continue;
                };
                let test_ops = cx.expression(test);
                ops.push(Operation::LoadLocal(slot));
                ops.extend(test_ops);
                ops.push(binary_operation(
                    BinaryOp::StrictEq,
                    &discriminant.ty,
                    &test.ty,
                    cx.config,
                ));
                ops.push(Operation::jump_if(JumpKind::IfTrue, label));
            }
            ops.push(Operation::jump(default.unwrap_or(end)));

            cx.breaks.push(cx.exit_to(end));
            let mut result = Ok(());
            for (case, label) in cases.iter().zip(labels) {
                ops.push(Operation::Sentinel(label));
                result = cx.statements(&case.body, ops);
                if result.is_err() {
                    break;
                }
            }
            cx.breaks.pop();
            result?;

            ops.push(Operation::Sentinel(end));
            Ok(())
        })
    }
}
