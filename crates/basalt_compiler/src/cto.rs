//! Compile-time objects and types.
//!
//! A [`CompileTimeObject`] is anything with a value and possibly a call or
//! assign capability: a local, a parameter, a builtin, a member produced by
//! chain folding. What it compiles to is decided by its resolvers, so the
//! expression compiler never needs to know which kind of thing it holds.
//!
//! Resolvers receive [`Thunk`]s instead of finished operation lists. A
//! resolver may skip its receiver entirely (static members), or replay it
//! as often as it needs.

use std::fmt;
use std::sync::Arc;

use basalt_foundation::{SlotKind, SymbolId, TypeKey};

use crate::ast::NodeRef;
use crate::diagnostic::{Outcome, ParseError, accumulate};
use crate::operation::Operation;

/// Deferred compilation of a sub-expression.
pub type Thunk<'a> = dyn Fn() -> Outcome<Vec<Operation>> + 'a;

/// Combines already-computed value operations and container operations
/// into a store.
///
/// A store that uses its container emits the container, then at most one
/// key operand, then the value.
pub type StoreResolver =
    Arc<dyn Fn(Vec<Operation>, Vec<Operation>) -> Outcome<Vec<Operation>> + Send + Sync>;

/// Lowers a call given its receiver and argument thunks.
///
/// The receiver thunk replays everything folded so far, so the output
/// supersedes the operations accumulated before the call. A resolver that
/// does not consume its receiver must still emit what [`discard`] returns
/// for it.
pub type CallResolver =
    Arc<dyn Fn(&Thunk<'_>, &[&Thunk<'_>]) -> Outcome<Vec<Operation>> + Send + Sync>;

/// Lowers a member access given its receiver thunk, yielding the member's
/// operations and the object the chain continues with.
pub type PropertyResolver =
    Arc<dyn Fn(&Thunk<'_>) -> Outcome<(Vec<Operation>, Arc<CompileTimeObject>)> + Send + Sync>;

/// Member name identity to member resolver.
pub type PropertyMap = im::HashMap<SymbolId, PropertyResolver>;

/// Resolvable compile-time representation of a value.
#[derive(Clone, Default)]
pub struct CompileTimeObject {
    /// Originating declaration. Diagnostics only.
    pub node: Option<NodeRef>,
    /// Identity this object is bound under, if any.
    pub symbol: Option<SymbolId>,
    /// Fixed operations that push the value.
    pub load: Option<Vec<Operation>>,
    /// Assignment capability.
    pub store: Option<StoreResolver>,
    /// Call capability.
    pub call: Option<CallResolver>,
    /// Members this object resolves on its own, ahead of its type's.
    pub properties: Option<PropertyMap>,
}

impl CompileTimeObject {
    /// Creates an object bound to a declaration, with no capabilities yet.
    #[must_use]
    pub fn new(symbol: SymbolId, node: Option<NodeRef>) -> Self {
        Self {
            node,
            symbol: Some(symbol),
            ..Self::default()
        }
    }

    /// An anonymous computed value (a call result, a literal, ...).
    ///
    /// Its members come from its static type.
    #[must_use]
    pub fn value() -> Self {
        Self::default()
    }

    /// Builder method to set the load operations.
    #[must_use]
    pub fn with_load(mut self, load: Vec<Operation>) -> Self {
        self.load = Some(load);
        self
    }

    /// Builder method to set the store resolver.
    #[must_use]
    pub fn with_store<F>(mut self, store: F) -> Self
    where
        F: Fn(Vec<Operation>, Vec<Operation>) -> Outcome<Vec<Operation>> + Send + Sync + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }

    /// Builder method to set the call resolver.
    #[must_use]
    pub fn with_call<F>(mut self, call: F) -> Self
    where
        F: Fn(&Thunk<'_>, &[&Thunk<'_>]) -> Outcome<Vec<Operation>> + Send + Sync + 'static,
    {
        self.call = Some(Arc::new(call));
        self
    }

    /// Builder method to set the member table.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = Some(properties);
        self
    }

    /// A slot-backed variable: argument, local, or static.
    #[must_use]
    pub fn slot(kind: SlotKind, index: u8, symbol: SymbolId, node: Option<NodeRef>) -> Self {
        let (load, store) = match kind {
            SlotKind::Argument => (Operation::LoadArg(index), Operation::StoreArg(index)),
            SlotKind::Local => (Operation::LoadLocal(index), Operation::StoreLocal(index)),
            SlotKind::Static => (Operation::LoadStatic(index), Operation::StoreStatic(index)),
        };
        Self::new(symbol, node)
            .with_load(vec![load])
            .with_store(move |mut value, _container| {
                value.push(store.clone());
                Ok(value)
            })
    }

    /// A compile-time constant: every reference becomes `load`.
    #[must_use]
    pub fn constant(symbol: SymbolId, node: Option<NodeRef>, load: Vec<Operation>) -> Self {
        Self::new(symbol, node).with_load(load)
    }

    /// Returns true if this object can be called.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.call.is_some()
    }
}

impl fmt::Debug for CompileTimeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileTimeObject")
            .field("symbol", &self.symbol)
            .field("load", &self.load)
            .field("store", &self.store.is_some())
            .field("call", &self.call.is_some())
            .field(
                "properties",
                &self.properties.as_ref().map(im::HashMap::len),
            )
            .finish_non_exhaustive()
    }
}

/// Member-resolution table of a structural type.
#[derive(Clone)]
pub struct CompileTimeType {
    /// Key the table is registered under.
    pub key: TypeKey,
    /// Member name identity to resolver.
    pub properties: PropertyMap,
    /// Positional field order of fixed-layout types.
    pub layout: Option<Vec<SymbolId>>,
}

impl CompileTimeType {
    /// Creates a member table.
    #[must_use]
    pub fn new(key: TypeKey, properties: PropertyMap) -> Self {
        Self {
            key,
            properties,
            layout: None,
        }
    }

    /// Builder method to mark the type as fixed-layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Vec<SymbolId>) -> Self {
        self.layout = Some(layout);
        self
    }
}

impl fmt::Debug for CompileTimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileTimeType")
            .field("key", &self.key)
            .field("properties", &self.properties.len())
            .field("layout", &self.layout)
            .finish()
    }
}

/// Evaluates every argument thunk, collecting all failures.
pub fn evaluate_arguments(args: &[&Thunk<'_>]) -> Outcome<Vec<Vec<Operation>>> {
    accumulate(args.iter().map(|arg| arg()))
}

/// Concatenates argument groups last-to-first, so the first argument ends
/// up on top of the stack.
#[must_use]
pub fn reverse_concat(groups: Vec<Vec<Operation>>) -> Vec<Operation> {
    groups.into_iter().rev().flatten().collect()
}

/// Checks an argument count against a declared parameter range.
pub fn check_arity(name: &str, required: usize, total: usize, given: usize) -> Outcome<()> {
    if given < required || given > total {
        let expected = if required == total {
            format!("{total}")
        } else {
            format!("{required}-{total}")
        };
        return Err(vec![ParseError::detached(format!(
            "'{name}' expects {expected} argument(s), got {given}"
        ))]);
    }
    Ok(())
}

/// Wraps a closure as a [`PropertyResolver`].
pub fn property_resolver<F>(resolve: F) -> PropertyResolver
where
    F: Fn(&Thunk<'_>) -> Outcome<(Vec<Operation>, Arc<CompileTimeObject>)> + Send + Sync + 'static,
{
    Arc::new(resolve)
}

/// Property resolver that ignores its receiver and yields `object`'s load.
#[must_use]
pub fn static_member(object: Arc<CompileTimeObject>) -> PropertyResolver {
    property_resolver(move |receiver| {
        let mut ops = discard(receiver);
        ops.extend(object.load.iter().flatten().cloned());
        Ok((ops, Arc::clone(&object)))
    })
}

/// Operations that keep the side effects of a receiver whose value is not
/// used.
///
/// Plain loads and receivers without a value (singleton surfaces) leave
/// nothing behind. Anything else is evaluated and dropped.
#[must_use]
pub fn discard(receiver: &Thunk<'_>) -> Vec<Operation> {
    match receiver() {
        Ok(mut ops) if !ops.iter().all(Operation::is_pure_load) => {
            ops.push(Operation::Drop);
            ops
        }
        _ => Vec::new(),
    }
}
