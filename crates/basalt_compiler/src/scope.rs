//! Chained, immutable symbol scopes.
//!
//! A [`Scope`] maps declaration identities to [`CompileTimeObject`]s and
//! type keys to [`CompileTimeType`]s. Scopes are never mutated after
//! construction: [`Scope::extend`] builds a child layered over a shared
//! parent, so every statement of a block can hold the same parent cheaply.

use std::sync::Arc;

use basalt_foundation::{SymbolId, TypeKey};

use crate::ast::Ident;
use crate::cto::{CompileTimeObject, CompileTimeType};

/// One lexical layer of bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    parent: Option<Arc<Scope>>,
    objects: im::HashMap<SymbolId, Arc<CompileTimeObject>>,
    types: im::HashMap<TypeKey, Arc<CompileTimeType>>,
}

impl Scope {
    /// Creates a root scope from the given bindings.
    #[must_use]
    pub fn root<O, T>(objects: O, types: T) -> Arc<Self>
    where
        O: IntoIterator<Item = (SymbolId, Arc<CompileTimeObject>)>,
        T: IntoIterator<Item = Arc<CompileTimeType>>,
    {
        Arc::new(Self {
            parent: None,
            objects: objects.into_iter().collect(),
            types: types.into_iter().map(|ctt| (ctt.key, ctt)).collect(),
        })
    }

    /// Creates an empty root scope.
    #[must_use]
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Builds a child scope whose bindings shadow this one's.
    ///
    /// Later entries win over earlier entries with the same identity.
    #[must_use]
    pub fn extend<O, T>(self: &Arc<Self>, objects: O, types: T) -> Arc<Self>
    where
        O: IntoIterator<Item = (SymbolId, Arc<CompileTimeObject>)>,
        T: IntoIterator<Item = Arc<CompileTimeType>>,
    {
        Arc::new(Self {
            parent: Some(Arc::clone(self)),
            objects: objects.into_iter().collect(),
            types: types.into_iter().map(|ctt| (ctt.key, ctt)).collect(),
        })
    }

    /// Builds a child scope with object bindings only.
    #[must_use]
    pub fn bind<O>(self: &Arc<Self>, objects: O) -> Arc<Self>
    where
        O: IntoIterator<Item = (SymbolId, Arc<CompileTimeObject>)>,
    {
        self.extend(objects, std::iter::empty())
    }

    /// Resolves a declaration identity, nearest layer first.
    ///
    /// At each layer the identity itself is tried before `alias`.
    #[must_use]
    pub fn resolve(
        &self,
        symbol: SymbolId,
        alias: Option<SymbolId>,
    ) -> Option<Arc<CompileTimeObject>> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(found) = scope.objects.get(&symbol) {
                return Some(Arc::clone(found));
            }
            if let Some(found) = alias.and_then(|alias| scope.objects.get(&alias)) {
                return Some(Arc::clone(found));
            }
            current = scope.parent.as_deref();
        }
        None
    }

    /// Resolves an identifier through its symbol and alias.
    #[must_use]
    pub fn resolve_ident(&self, ident: &Ident) -> Option<Arc<CompileTimeObject>> {
        self.resolve(ident.symbol, ident.alias)
    }

    /// Resolves a type's member table, nearest layer first.
    #[must_use]
    pub fn resolve_type(&self, key: TypeKey) -> Option<Arc<CompileTimeType>> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(found) = scope.types.get(&key) {
                return Some(Arc::clone(found));
            }
            current = scope.parent.as_deref();
        }
        None
    }
}
