//! Static type shapes.
//!
//! The front end's type checker is assumed sound. The compiler only reads
//! these shapes to find member tables and to pick between a few lowering
//! variants (void calls, string concatenation, numeric comparison).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::intern::TypeId;

/// Statically inferred type of an expression or declaration.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// No value (`void`).
    Void,
    /// Never produces a value (`never`).
    Never,
    /// The `undefined` type.
    Undefined,
    /// The `null` type.
    Null,
    /// Boolean type.
    Boolean,
    /// Arbitrary-precision integer (`number`/`bigint` in source).
    Integer,
    /// UTF-8 string.
    String,
    /// Opaque or unchecked value.
    Any,
    /// A declared interface, struct, class, or enum, with type arguments.
    Object {
        /// Identity of the declaration.
        id: TypeId,
        /// Type arguments (e.g. the element type of `Array<T>`).
        args: Vec<Type>,
    },
    /// Fixed-length tuple.
    Tuple(Vec<Type>),
    /// Union of alternatives.
    Union(Vec<Type>),
    /// Function value.
    Function {
        /// Parameter types.
        params: Vec<Type>,
        /// Return type.
        ret: Box<Type>,
    },
}

/// Primitive types that can carry a member table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Primitive {
    /// `boolean`
    Boolean,
    /// `number` / `bigint`
    Integer,
    /// `string`
    String,
}

/// Key under which a compile-time type is registered in a scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeKey {
    /// A declared type.
    Declared(TypeId),
    /// A primitive augmented by a library interface of the same name.
    Primitive(Primitive),
}

impl Type {
    /// Creates a declared object type without type arguments.
    #[must_use]
    pub fn object(id: TypeId) -> Self {
        Self::Object {
            id,
            args: Vec::new(),
        }
    }

    /// Creates a declared generic type, e.g. `Array<T>`.
    #[must_use]
    pub fn generic(id: TypeId, args: Vec<Type>) -> Self {
        Self::Object { id, args }
    }

    /// Creates a function type.
    #[must_use]
    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Self::Function {
            params,
            ret: Box::new(ret),
        }
    }

    /// Returns true if expressions of this type leave nothing on the stack.
    #[must_use]
    pub const fn is_void_like(&self) -> bool {
        matches!(self, Self::Void | Self::Never)
    }

    /// Returns true if this is the `string` primitive.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self.non_null(), Self::String)
    }

    /// Returns true if this is the integer primitive.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self.non_null(), Self::Integer)
    }

    /// Returns true if this type can hold `null` or `undefined`.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Null | Self::Undefined | Self::Any => true,
            Self::Union(alternatives) => alternatives.iter().any(Self::is_nullable),
            _ => false,
        }
    }

    /// Strips `null` and `undefined` from a union.
    ///
    /// A union that narrows to a single alternative collapses to it.
    #[must_use]
    pub fn non_null(&self) -> Type {
        match self {
            Self::Union(alternatives) => {
                let mut rest: Vec<Type> = alternatives
                    .iter()
                    .filter(|t| !matches!(t, Self::Null | Self::Undefined))
                    .cloned()
                    .collect();
                if rest.len() == 1 {
                    rest.remove(0)
                } else {
                    Self::Union(rest)
                }
            }
            other => other.clone(),
        }
    }

    /// Returns the key of the member table for this type, if it has one.
    #[must_use]
    pub fn key(&self) -> Option<TypeKey> {
        match self.non_null() {
            Self::Object { id, .. } => Some(TypeKey::Declared(id)),
            Self::Boolean => Some(TypeKey::Primitive(Primitive::Boolean)),
            Self::Integer => Some(TypeKey::Primitive(Primitive::Integer)),
            Self::String => Some(TypeKey::Primitive(Primitive::String)),
            _ => None,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Never => write!(f, "never"),
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::Any => write!(f, "any"),
            Self::Object { id, args } => {
                write!(f, "#{}", id.index())?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg:?}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Self::Tuple(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                write!(f, "]")
            }
            Self::Union(alternatives) => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{alt:?}")?;
                }
                Ok(())
            }
            Self::Function { params, ret } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param:?}")?;
                }
                write!(f, ") => {ret:?}")
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
