//! Declaration identities for symbols and types.
//!
//! Unlike names, identities are never deduplicated: two declarations of `x`
//! in different blocks are different symbols. Names are interned separately
//! so diagnostics can print them without cloning strings around.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of a value declaration (variable, parameter, function, member, ...).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Returns the raw index of this symbol.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Identity of a type declaration (interface, struct, enum, ...).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Returns the raw index of this type.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Mints symbol and type identities and remembers their names.
///
/// It is not thread-safe; the front end owns one per compilation.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    /// Name storage shared across symbols and types.
    strings: Vec<Arc<str>>,
    /// Map from name to index.
    string_to_index: HashMap<Arc<str>, u32>,
    /// Name index for each symbol.
    symbols: Vec<u32>,
    /// Name index for each type.
    types: Vec<u32>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a name, returning its index.
    fn intern_string(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.string_to_index.get(s) {
            return idx;
        }

        let idx = u32::try_from(self.strings.len()).expect("too many interned names");
        let arc: Arc<str> = s.into();
        self.strings.push(arc.clone());
        self.string_to_index.insert(arc, idx);
        idx
    }

    /// Declares a new symbol. Every call returns a fresh identity.
    ///
    /// # Panics
    ///
    /// Panics if the number of symbols exceeds `u32::MAX`.
    pub fn declare_symbol(&mut self, name: &str) -> SymbolId {
        let string_idx = self.intern_string(name);
        let id = SymbolId(u32::try_from(self.symbols.len()).expect("too many symbols"));
        self.symbols.push(string_idx);
        id
    }

    /// Declares a new type. Every call returns a fresh identity.
    ///
    /// # Panics
    ///
    /// Panics if the number of types exceeds `u32::MAX`.
    pub fn declare_type(&mut self, name: &str) -> TypeId {
        let string_idx = self.intern_string(name);
        let id = TypeId(u32::try_from(self.types.len()).expect("too many types"));
        self.types.push(string_idx);
        id
    }

    /// Gets the declared name of a symbol.
    #[must_use]
    pub fn symbol_name(&self, id: SymbolId) -> Option<&str> {
        self.symbols
            .get(id.0 as usize)
            .and_then(|&idx| self.strings.get(idx as usize))
            .map(AsRef::as_ref)
    }

    /// Gets the declared name of a type.
    #[must_use]
    pub fn type_name(&self, id: TypeId) -> Option<&str> {
        self.types
            .get(id.0 as usize)
            .and_then(|&idx| self.strings.get(idx as usize))
            .map(AsRef::as_ref)
    }

    /// Returns the number of declared symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Returns the number of declared types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
