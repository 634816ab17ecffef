//! Constant enums: every member reference is a single push.

use std::sync::Arc;

use basalt_foundation::SymbolId;

use crate::ast::{EnumMember, NodeRef};
use crate::cto::{CompileTimeObject, PropertyMap, static_member};
use crate::operation::Operation;

/// Binds an enum and its members.
///
/// The enum object resolves `E.Member` without evaluating `E`; each member
/// is also bound under its own identity.
#[must_use]
pub fn bind(
    symbol: SymbolId,
    node: Option<NodeRef>,
    members: &[EnumMember],
) -> Vec<(SymbolId, Arc<CompileTimeObject>)> {
    let mut bindings = Vec::with_capacity(members.len() + 1);
    let mut properties = PropertyMap::new();
    for member in members {
        let constant = Arc::new(CompileTimeObject::constant(
            member.symbol,
            Some(member.node),
            vec![Operation::push_literal(&member.value)],
        ));
        properties.insert(member.symbol, static_member(Arc::clone(&constant)));
        bindings.push((member.symbol, constant));
    }
    let object = CompileTimeObject::new(symbol, node).with_properties(properties);
    bindings.push((symbol, Arc::new(object)));
    bindings
}
