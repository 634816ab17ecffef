//! Statement lowering.
//!
//! A [`FoldContext`] threads through the statements of one function. It
//! owns the current scope, the local slots declared so far, the
//! `break`/`continue` targets of the enclosing loops, the diagnostics
//! collected so far, and the function's single return sentinel.
//!
//! Every control transfer is emitted against a sentinel; [`crate::jumps`]
//! turns them into offsets once the function is complete.
//!
//! User mistakes are recorded and lowering carries on with the next
//! statement. Only compiler and frame-limit defects return `Err`.

mod branches;
mod exceptions;
mod loops;
mod variables;

use std::sync::Arc;

use basalt_foundation::{Error, Result, SlotKind, SymbolId, Type};
use tracing::trace;

use crate::ast::{Block, Expr, Ident, NodeRef, Stmt, StmtKind};
use crate::config::CompilerConfig;
use crate::cto::CompileTimeObject;
use crate::diagnostic::{Outcome, ParseError};
use crate::expression::{ExprContext, compile_effect, compile_expression};
use crate::function::{LoweredFunction, declaration_context};
use crate::operation::{JumpTarget, Operation, SentinelAllocator, SentinelId};
use crate::scope::Scope;

/// A slot-allocated variable of a function frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalVariable {
    /// Declared name; synthesized slots use a `$` prefix.
    pub name: String,
    /// Declared type.
    pub ty: Type,
    /// Slot index.
    pub slot: u8,
}

/// Destination of `break`, `continue` or `return`, with the nesting it was
/// opened at.
#[derive(Clone, Copy, Debug)]
struct Exit {
    sentinel: SentinelId,
    try_depth: usize,
    finally_depth: usize,
}

/// Mutable state of one function's statement lowering.
pub struct FoldContext<'a> {
    function: String,
    scope: Arc<Scope>,
    locals: Vec<LocalVariable>,
    statics: im::HashMap<SymbolId, u8>,
    breaks: Vec<Exit>,
    continues: Vec<Exit>,
    errors: Vec<ParseError>,
    exit: Exit,
    sentinels: SentinelAllocator,
    config: &'a CompilerConfig,
    try_depth: usize,
    finally_depth: usize,
}

impl<'a> FoldContext<'a> {
    /// Creates a context lowering the body of `function` in `scope`.
    #[must_use]
    pub fn new(function: impl Into<String>, scope: Arc<Scope>, config: &'a CompilerConfig) -> Self {
        let sentinels = SentinelAllocator::new();
        let exit = Exit {
            sentinel: sentinels.fresh(),
            try_depth: 0,
            finally_depth: 0,
        };
        Self {
            function: function.into(),
            scope,
            locals: Vec::new(),
            statics: im::HashMap::new(),
            breaks: Vec::new(),
            continues: Vec::new(),
            errors: Vec::new(),
            exit,
            sentinels,
            config,
            try_depth: 0,
            finally_depth: 0,
        }
    }

    /// Builder method to make declarations of the given identities store
    /// into static slots instead of allocating locals.
    #[must_use]
    pub fn with_statics(mut self, statics: im::HashMap<SymbolId, u8>) -> Self {
        self.statics = statics;
        self
    }

    /// The sentinel every `return` jumps to.
    #[must_use]
    pub fn return_sentinel(&self) -> SentinelId {
        self.exit.sentinel
    }

    /// Scope at the current point of lowering.
    #[must_use]
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    /// Locals declared so far, in slot order.
    #[must_use]
    pub fn locals(&self) -> &[LocalVariable] {
        &self.locals
    }

    /// Diagnostics collected so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Lowers one statement, appending to `ops`.
    pub fn statement(&mut self, stmt: &Stmt, ops: &mut Vec<Operation>) -> Result<()> {
        trace!(node = stmt.node.id.0, "lowering statement");
        match &stmt.kind {
            StmtKind::Block(block) => self.block(block, ops),
            StmtKind::Variable(statement) => self.variable_statement(statement, ops),
            StmtKind::Expression(expr) => {
                let effect = self.effect(expr);
                ops.extend(effect);
                Ok(())
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    let value = self.expression(value);
                    ops.extend(value);
                }
                self.leave(self.exit, "return", stmt.node, ops);
                Ok(())
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.if_statement(condition, then_branch, else_branch.as_deref(), ops),
            StmtKind::While { condition, body } => self.while_loop(condition, body, ops),
            StmtKind::DoWhile { body, condition } => self.do_while_loop(body, condition, ops),
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => self.for_loop(init.as_ref(), condition.as_ref(), update.as_ref(), body, ops),
            StmtKind::ForOf {
                binding,
                iterable,
                body,
            } => self.for_of_loop(binding, iterable, body, stmt.node, ops),
            StmtKind::Switch {
                discriminant,
                cases,
            } => self.switch(discriminant, cases, ops),
            StmtKind::Break => {
                match self.breaks.last().copied() {
                    Some(exit) => self.leave(exit, "break", stmt.node, ops),
                    None => self.fail("'break' outside of a loop or switch", stmt.node),
                }
                Ok(())
            }
            StmtKind::Continue => {
                match self.continues.last().copied() {
                    Some(exit) => self.leave(exit, "continue", stmt.node, ops),
                    None => self.fail("'continue' outside of a loop", stmt.node),
                }
                Ok(())
            }
            StmtKind::Throw(value) => {
                let value = self.expression(value);
                ops.extend(value);
                ops.push(Operation::Throw);
                Ok(())
            }
            StmtKind::Try {
                block,
                catch,
                finally,
            } => self.try_statement(block, catch.as_ref(), finally.as_ref(), stmt.node, ops),
            StmtKind::Empty => Ok(()),
        }
    }

    /// Lowers a block in a child scope.
    pub fn block(&mut self, block: &Block, ops: &mut Vec<Operation>) -> Result<()> {
        self.scoped(|cx| cx.statements(&block.statements, ops))
    }

    /// Finishes the function: slot initialization, body, return point.
    ///
    /// `prologue` comes first (the static initializer's `INITSSLOT`).
    pub fn finish(
        self,
        prologue: Vec<Operation>,
        params: u8,
        body: Vec<Operation>,
    ) -> Result<LoweredFunction> {
        let locals = slot_count(SlotKind::Local, self.locals.len(), self.config)
            .map_err(|e| e.with_context(declaration_context(&self.function, None)))?;

        let mut operations = prologue;
        if locals > 0 || params > 0 {
            operations.push(Operation::InitSlot { locals, params });
        }
        operations.extend(body);
        operations.push(Operation::Sentinel(self.exit.sentinel));

        Ok(LoweredFunction {
            operations,
            locals: self.locals,
            diagnostics: self.errors,
        })
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    fn statements(&mut self, statements: &[Stmt], ops: &mut Vec<Operation>) -> Result<()> {
        for statement in statements {
            self.statement(statement, ops)?;
        }
        Ok(())
    }

    /// Runs `lower` in a child scope, restoring the current scope after.
    fn scoped<T>(&mut self, lower: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = Arc::clone(&self.scope);
        let result = lower(self);
        self.scope = saved;
        result
    }

    fn expr_context(&self) -> ExprContext<'_> {
        ExprContext::new(&self.scope, &self.sentinels, self.config)
    }

    /// Lowers an expression, recording its failures.
    ///
    /// A failed expression contributes no operations; the function as a
    /// whole fails through its diagnostics.
    fn expression(&mut self, expr: &Expr) -> Vec<Operation> {
        let outcome = compile_expression(expr, &self.expr_context());
        self.record(outcome)
    }

    /// Lowers an expression statement, recording its failures.
    fn effect(&mut self, expr: &Expr) -> Vec<Operation> {
        let outcome = compile_effect(expr, &self.expr_context());
        self.record(outcome)
    }

    fn record(&mut self, outcome: Outcome<Vec<Operation>>) -> Vec<Operation> {
        match outcome {
            Ok(ops) => ops,
            Err(errors) => {
                self.errors.extend(errors);
                Vec::new()
            }
        }
    }

    fn fail(&mut self, message: impl Into<String>, node: NodeRef) {
        self.errors.push(ParseError::new(message, node));
    }

    fn fresh(&self) -> SentinelId {
        self.sentinels.fresh()
    }

    fn exit_to(&self, sentinel: SentinelId) -> Exit {
        Exit {
            sentinel,
            try_depth: self.try_depth,
            finally_depth: self.finally_depth,
        }
    }

    /// Emits the transfer to `exit`: a jump, or `ENDTRY` when it leaves
    /// one protected region.
    fn leave(&mut self, exit: Exit, what: &str, node: NodeRef, ops: &mut Vec<Operation>) {
        if self.finally_depth > exit.finally_depth {
            return self.fail(format!("'{what}' cannot leave a finally block"), node);
        }
        match self.try_depth - exit.try_depth {
            0 => ops.push(Operation::jump(exit.sentinel)),
            1 => ops.push(Operation::EndTry(JumpTarget::Pending(exit.sentinel))),
            _ => self.fail(format!("'{what}' cannot leave more than one try block"), node),
        }
    }

    /// Runs `lower` with `brk`/`cont` as the innermost loop targets.
    fn in_loop(
        &mut self,
        brk: SentinelId,
        cont: SentinelId,
        lower: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        self.breaks.push(self.exit_to(brk));
        self.continues.push(self.exit_to(cont));
        let result = lower(self);
        self.continues.pop();
        self.breaks.pop();
        result
    }

    /// Allocates the next local slot, binding `ident` to it if given.
    fn declare_local(&mut self, name: &str, ident: Option<&Ident>, ty: &Type) -> Result<u8> {
        let index = self.locals.len();
        let slot = u8::try_from(index)
            .ok()
            .filter(|_| index < self.config.max_slots)
            .ok_or_else(|| {
                Error::slot_overflow(SlotKind::Local, index + 1, self.config.max_slots)
                    .with_context(declaration_context(&self.function, ident.map(|i| i.node)))
            })?;
        self.locals.push(LocalVariable {
            name: name.to_string(),
            ty: ty.clone(),
            slot,
        });
        if let Some(ident) = ident {
            let cto = CompileTimeObject::slot(SlotKind::Local, slot, ident.symbol, Some(ident.node));
            self.scope = self.scope.bind([(ident.symbol, Arc::new(cto))]);
        }
        trace!(name, slot, "declared local");
        Ok(slot)
    }

    /// A local no source name refers to.
    fn hidden_local(&mut self, purpose: &str, ty: &Type) -> Result<u8> {
        self.declare_local(&format!("${purpose}"), None, ty)
    }
}

/// Converts a slot count to its operand, failing past the frame limit.
pub(crate) fn slot_count(kind: SlotKind, count: usize, config: &CompilerConfig) -> Result<u8> {
    u8::try_from(count)
        .ok()
        .filter(|_| count <= config.max_slots)
        .ok_or_else(|| Error::slot_overflow(kind, count, config.max_slots))
}
