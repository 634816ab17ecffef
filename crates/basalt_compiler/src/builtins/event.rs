//! `@event` bindings: notifications packed into an array.

use basalt_foundation::SymbolId;

use super::call_arguments;
use crate::ast::{NodeRef, Signature};
use crate::cto::CompileTimeObject;
use crate::operation::Operation;

/// `declare function E(...): void` emitting event `name`.
///
/// Lowers to the packed arguments, the event name, and the notify host
/// call, which pops the name first and the state array second.
pub(super) fn function(
    symbol: SymbolId,
    node: Option<NodeRef>,
    signature: &Signature,
    name: String,
    notify: String,
) -> CompileTimeObject {
    let signature = signature.clone();
    CompileTimeObject::new(symbol, node).with_call(move |_receiver, args| {
        let mut ops = call_arguments(&name, &signature, None, args)?;
        ops.push(Operation::push_index(signature.params.len()));
        ops.push(Operation::Pack);
        ops.push(Operation::push_string(&name));
        ops.push(Operation::Syscall(notify.clone()));
        Ok(ops)
    })
}
