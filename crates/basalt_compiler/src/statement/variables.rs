//! Variable declarations and destructuring.

use basalt_foundation::{Result, Type};
use tracing::trace;

use super::FoldContext;
use crate::ast::{Binding, Ident, NodeRef, VariableDeclarator, VariableStatement};
use crate::operation::Operation;

/// One bound position of a destructuring pattern.
struct Position<'b> {
    key: Operation,
    ident: &'b Ident,
    ty: &'b Type,
}

impl FoldContext<'_> {
    /// Lowers a `let`/`const` statement, declarator by declarator.
    pub fn variable_statement(
        &mut self,
        statement: &VariableStatement,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        for declarator in &statement.declarations {
            self.declarator(declarator, ops)?;
        }
        Ok(())
    }

    fn declarator(&mut self, declarator: &VariableDeclarator, ops: &mut Vec<Operation>) -> Result<()> {
        // The initializer sees the scope before the new names.
        let value = declarator.init.as_ref().map(|init| self.expression(init));
        match (&declarator.binding, value) {
            (Binding::Identifier(element), value) => {
                let store = self.bind_name(&element.ident, &element.ty)?;
                if let Some(value) = value {
                    ops.extend(value);
                    ops.push(store);
                }
                Ok(())
            }
            (binding, Some(value)) => self.destructure(binding, value, declarator.node, ops),
            (_, None) => {
                self.fail(
                    "destructuring declaration requires an initializer",
                    declarator.node,
                );
                Ok(())
            }
        }
    }

    /// Binds a pattern to `value`, evaluated once.
    ///
    /// Every bound position but the last works on a duplicate of the value;
    /// the last consumes it. A pattern binding nothing still evaluates the
    /// value for its side effects.
    pub(super) fn destructure(
        &mut self,
        binding: &Binding,
        value: Vec<Operation>,
        node: NodeRef,
        ops: &mut Vec<Operation>,
    ) -> Result<()> {
        let positions = positions(binding);
        ops.extend(value);

        let Some(last) = positions.len().checked_sub(1) else {
            ops.push(Operation::Drop);
            return Ok(());
        };
        for (index, position) in positions.into_iter().enumerate() {
            let store = self.bind_name(position.ident, position.ty)?;
            if index < last {
                ops.push(Operation::Dup);
            }
            ops.extend([position.key, Operation::PickItem, store]);
        }
        trace!(node = node.id.0, "destructured");
        Ok(())
    }

    /// Declares `ident`, returning the operation that stores into it.
    ///
    /// Top-level names of the static initializer store to their static
    /// slot; everything else gets a fresh local.
    pub(super) fn bind_name(&mut self, ident: &Ident, ty: &Type) -> Result<Operation> {
        if let Some(&slot) = self.statics.get(&ident.symbol) {
            return Ok(Operation::StoreStatic(slot));
        }
        let slot = self.declare_local(&ident.name, Some(ident), ty)?;
        Ok(Operation::StoreLocal(slot))
    }
}

/// Bound positions of a pattern, in source order.
fn positions(binding: &Binding) -> Vec<Position<'_>> {
    match binding {
        Binding::Identifier(_) => Vec::new(),
        Binding::Array(elements) => elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                element.as_ref().map(|element| Position {
                    key: Operation::push_index(index),
                    ident: &element.ident,
                    ty: &element.ty,
                })
            })
            .collect(),
        Binding::Object(elements) => elements
            .iter()
            .map(|element| Position {
                key: Operation::push_string(&element.key),
                ident: &element.ident,
                ty: &element.ty,
            })
            .collect(),
    }
}
