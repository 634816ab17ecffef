//! `@syscall` bindings: a single named host call.

use basalt_foundation::SymbolId;

use super::{Receiver, host_function, host_member};
use crate::ast::{MemberDeclaration, NodeRef, Signature};
use crate::cto::{CompileTimeObject, PropertyResolver};
use crate::operation::Operation;

/// `declare function f(...)`: arguments, then the host call.
pub(super) fn function(
    symbol: SymbolId,
    node: Option<NodeRef>,
    label: &str,
    signature: &Signature,
    name: String,
) -> CompileTimeObject {
    host_function(symbol, node, label, signature, Operation::Syscall(name))
}

/// `declare const x: T`: every reference performs the host call.
pub(super) fn variable(symbol: SymbolId, node: Option<NodeRef>, name: String) -> CompileTimeObject {
    CompileTimeObject::new(symbol, node).with_load(vec![Operation::Syscall(name)])
}

/// Interface member backed by a host call.
pub(super) fn member(
    label: &str,
    member: &MemberDeclaration,
    receiver: Receiver,
    name: String,
) -> PropertyResolver {
    host_member(label, member, receiver, Operation::Syscall(name))
}
