//! Builtin binding layer.
//!
//! Runs once over the ambient library declarations and produces the
//! objects and types of the root scope. Each declaration's annotations
//! select a strategy:
//!
//! | Annotation | Binding |
//! |---|---|
//! | `@syscall Name` | host call |
//! | `@methodToken 0x<hash> <method> [Flags]` | native-contract call token |
//! | `@event [name]` | packed notification |
//! | `@struct` | positional field layout |
//! | `const enum` | one constant push per member |
//!
//! After installation nothing else in the compiler knows a binding is a
//! builtin: the rest of the pipeline only sees scope entries.

mod annotation;
mod constant_enum;
mod event;
mod intrinsics;
mod layout;
mod method_token;
mod syscall;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use basalt_foundation::{Error, Primitive, Result, SymbolId, Type, TypeId, TypeKey};
use tracing::{debug, trace, warn};

pub use annotation::{AnnotationError, Strategy};
pub use constant_enum::bind as bind_enum;
pub use intrinsics::decode_hex_literal;
pub use method_token::{TokenSpec, parse_token};

use crate::ast::{
    LibraryDeclaration, LibraryKind, MemberDeclaration, MemberKind, NodeRef, Signature,
};
use crate::config::CompilerConfig;
use crate::cto::{
    CompileTimeObject, CompileTimeType, PropertyMap, PropertyResolver, Thunk, check_arity, discard,
    evaluate_arguments, property_resolver, reverse_concat,
};
use crate::diagnostic::{Outcome, ParseError};
use crate::operation::Operation;
use crate::scope::Scope;

/// Root-scope bindings produced from a library.
#[derive(Debug, Default)]
pub struct Builtins {
    /// Bound objects by declaration identity.
    pub objects: Vec<(SymbolId, Arc<CompileTimeObject>)>,
    /// Member tables by type key.
    pub types: Vec<Arc<CompileTimeType>>,
    /// Bindings that could not be installed.
    pub diagnostics: Vec<ParseError>,
}

impl Builtins {
    /// Builds the root scope holding every installed binding.
    #[must_use]
    pub fn scope(&self) -> Arc<Scope> {
        Scope::root(self.objects.iter().cloned(), self.types.iter().cloned())
    }
}

/// How a library member treats the object it is accessed on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// The member belongs to a singleton surface; the receiver is never
    /// evaluated.
    Ignored,
    /// The receiver is passed as the first argument.
    Leading,
}

/// Installs every binding the library declares.
///
/// A malformed binding is reported and skipped. A declaration required by
/// an intrinsic that is missing entirely is fatal when
/// [`CompilerConfig::require_intrinsics`] is set.
pub fn install(library: &[LibraryDeclaration], config: &CompilerConfig) -> Result<Builtins> {
    let mut installer = Installer::new(library, config);
    for declaration in library {
        installer.declaration(declaration);
    }
    intrinsics::install(&mut installer)?;

    let builtins = installer.finish();
    debug!(
        objects = builtins.objects.len(),
        types = builtins.types.len(),
        disabled = builtins.diagnostics.len(),
        "installed builtins"
    );
    Ok(builtins)
}

// =============================================================================
// Installer
// =============================================================================

pub(crate) struct Installer<'a> {
    library: &'a [LibraryDeclaration],
    config: &'a CompilerConfig,
    singletons: HashSet<TypeId>,
    objects: HashMap<SymbolId, CompileTimeObject>,
    types: HashMap<TypeKey, CompileTimeType>,
    diagnostics: Vec<ParseError>,
}

impl<'a> Installer<'a> {
    fn new(library: &'a [LibraryDeclaration], config: &'a CompilerConfig) -> Self {
        // Interfaces that type a declared constant describe that constant's
        // members, not instances passed around at run time.
        let singletons = library
            .iter()
            .filter_map(|decl| match &decl.kind {
                LibraryKind::Variable { ty } => match ty.non_null() {
                    Type::Object { id, .. } => Some(id),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        Self {
            library,
            config,
            singletons,
            objects: HashMap::new(),
            types: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    fn declaration(&mut self, decl: &LibraryDeclaration) {
        match self.bind(decl) {
            Ok(()) => trace!(name = %decl.name, "bound builtin"),
            Err(error) => self.disable(&decl.name, decl.node, &error),
        }
    }

    fn disable(&mut self, name: &str, node: NodeRef, error: &AnnotationError) {
        warn!(name, %error, "builtin binding disabled");
        self.diagnostics
            .push(ParseError::new(format!("cannot bind '{name}': {error}"), node));
    }

    fn bind(&mut self, decl: &LibraryDeclaration) -> std::result::Result<(), AnnotationError> {
        let strategy = annotation::strategy(&decl.annotations)?;
        let node = Some(decl.node);

        match (&decl.kind, strategy) {
            // Only `declare const enum` produces this kind, so the `const`
            // modifier is the marker.
            (LibraryKind::Enum { members, .. }, None) => {
                for (symbol, cto) in constant_enum::bind(decl.symbol, node, members) {
                    self.objects.insert(symbol, Arc::unwrap_or_clone(cto));
                }
            }
            (LibraryKind::Function(signature), Some(Strategy::Syscall(name))) => {
                let cto = syscall::function(decl.symbol, node, &decl.name, signature, name);
                self.objects.insert(decl.symbol, cto);
            }
            (LibraryKind::Function(signature), Some(Strategy::MethodToken(spec))) => {
                let cto = method_token::function(decl.symbol, node, &decl.name, signature, &spec);
                self.objects.insert(decl.symbol, cto);
            }
            (LibraryKind::Function(signature), Some(Strategy::Event(name))) => {
                let name = name.unwrap_or_else(|| decl.name.clone());
                let cto = event::function(
                    decl.symbol,
                    node,
                    signature,
                    name,
                    self.config.notify_syscall.clone(),
                );
                self.objects.insert(decl.symbol, cto);
            }
            (LibraryKind::Function(_), None) => {
                trace!(name = %decl.name, "function without binding");
            }
            (LibraryKind::Variable { .. }, Some(Strategy::Syscall(name))) => {
                self.objects
                    .insert(decl.symbol, syscall::variable(decl.symbol, node, name));
            }
            (LibraryKind::Variable { .. }, Some(Strategy::MethodToken(spec))) => {
                self.objects
                    .insert(decl.symbol, method_token::variable(decl.symbol, node, &spec));
            }
            (LibraryKind::Variable { .. }, None) => {
                self.objects
                    .insert(decl.symbol, CompileTimeObject::new(decl.symbol, node));
            }
            (LibraryKind::Interface { type_id, members }, Some(Strategy::Struct)) => {
                let ctt = layout::struct_type(interface_key(&decl.name, *type_id), members);
                self.types.insert(ctt.key, ctt);
            }
            (LibraryKind::Interface { type_id, members }, None) => {
                self.interface(decl, *type_id, members);
            }
            (kind, Some(strategy)) => {
                return Err(AnnotationError::UnsupportedTarget {
                    tag: strategy.tag(),
                    target: describe(kind),
                });
            }
        }
        Ok(())
    }

    fn interface(
        &mut self,
        decl: &LibraryDeclaration,
        type_id: TypeId,
        members: &[MemberDeclaration],
    ) {
        let receiver = if self.singletons.contains(&type_id) {
            Receiver::Ignored
        } else {
            Receiver::Leading
        };
        let key = interface_key(&decl.name, type_id);
        self.types
            .entry(key)
            .or_insert_with(|| CompileTimeType::new(key, PropertyMap::new()));

        for member in members {
            let label = format!("{}.{}", decl.name, member.name);
            match member_resolver(&label, member, receiver) {
                Ok(Some(resolver)) => self.add_member(key, member.symbol, resolver),
                Ok(None) => {}
                Err(error) => self.disable(&label, member.node, &error),
            }
        }
    }

    pub(crate) fn add_member(&mut self, key: TypeKey, member: SymbolId, resolver: PropertyResolver) {
        self.types
            .entry(key)
            .or_insert_with(|| CompileTimeType::new(key, PropertyMap::new()))
            .properties
            .insert(member, resolver);
    }

    pub(crate) fn object_mut(&mut self, symbol: SymbolId) -> Option<&mut CompileTimeObject> {
        self.objects.get_mut(&symbol)
    }

    pub(crate) fn declaration_named(&self, name: &str) -> Option<&'a LibraryDeclaration> {
        self.library.iter().find(|decl| decl.name == name)
    }

    /// Reports a missing declaration: fatal or a warning, per configuration.
    pub(crate) fn missing(&self, what: &str) -> Result<()> {
        if self.config.require_intrinsics {
            return Err(Error::missing_library_declaration(what));
        }
        warn!(what, "intrinsic skipped: declaration missing");
        Ok(())
    }

    fn finish(self) -> Builtins {
        Builtins {
            objects: self
                .objects
                .into_iter()
                .map(|(symbol, cto)| (symbol, Arc::new(cto)))
                .collect(),
            types: self.types.into_values().map(Arc::new).collect(),
            diagnostics: self.diagnostics,
        }
    }
}

fn member_resolver(
    label: &str,
    member: &MemberDeclaration,
    receiver: Receiver,
) -> std::result::Result<Option<PropertyResolver>, AnnotationError> {
    let resolver = match annotation::strategy(&member.annotations)? {
        Some(Strategy::Syscall(name)) => syscall::member(label, member, receiver, name),
        Some(Strategy::MethodToken(spec)) => method_token::member(label, member, receiver, &spec),
        Some(other) => {
            return Err(AnnotationError::UnsupportedTarget {
                tag: other.tag(),
                target: "an interface member",
            });
        }
        None => match &member.kind {
            MemberKind::Property { readonly, .. } => layout::keyed(&member.name, *readonly),
            MemberKind::Method(_) => return Ok(None),
        },
    };
    Ok(Some(resolver))
}

/// Key an interface's member table is registered under.
///
/// Library interfaces named after a primitive augment that primitive.
pub(crate) fn interface_key(name: &str, type_id: TypeId) -> TypeKey {
    match name {
        "String" => TypeKey::Primitive(Primitive::String),
        "Boolean" => TypeKey::Primitive(Primitive::Boolean),
        "Number" | "BigInt" => TypeKey::Primitive(Primitive::Integer),
        _ => TypeKey::Declared(type_id),
    }
}

fn describe(kind: &LibraryKind) -> &'static str {
    match kind {
        LibraryKind::Function(_) => "a function",
        LibraryKind::Variable { .. } => "a variable",
        LibraryKind::Interface { .. } => "an interface",
        LibraryKind::Enum { .. } => "an enum",
    }
}

// =============================================================================
// Host-call plumbing shared by the strategies
// =============================================================================

/// Compiles the argument list of a host call.
///
/// Missing optional arguments are padded with `PUSHNULL` so the callee
/// always sees its declared parameter count. With a `receiver` it becomes
/// the first argument.
pub(crate) fn call_arguments(
    label: &str,
    signature: &Signature,
    receiver: Option<&Thunk<'_>>,
    args: &[&Thunk<'_>],
) -> Outcome<Vec<Operation>> {
    let total = signature.params.len();
    check_arity(label, signature.required_params(), total, args.len())?;

    let mut groups = Vec::with_capacity(total + 1);
    if let Some(receiver) = receiver {
        groups.push(receiver()?);
    }
    groups.extend(evaluate_arguments(args)?);
    groups.extend((args.len()..total).map(|_| vec![Operation::PushNull]));
    Ok(reverse_concat(groups))
}

/// A declared function lowering to its arguments followed by `trailing`.
pub(crate) fn host_function(
    symbol: SymbolId,
    node: Option<NodeRef>,
    label: &str,
    signature: &Signature,
    trailing: Operation,
) -> CompileTimeObject {
    let label = label.to_string();
    let signature = signature.clone();
    CompileTimeObject::new(symbol, node).with_call(move |_receiver, args| {
        let mut ops = call_arguments(&label, &signature, None, args)?;
        ops.push(trailing.clone());
        Ok(ops)
    })
}

/// An interface member lowering to `trailing`.
///
/// Properties emit the host call directly; methods yield a callable object
/// whose call emits it after the arguments.
pub(crate) fn host_member(
    label: &str,
    member: &MemberDeclaration,
    receiver: Receiver,
    trailing: Operation,
) -> PropertyResolver {
    match &member.kind {
        MemberKind::Property { .. } => {
            let value = Arc::new(CompileTimeObject::value());
            property_resolver(move |this| {
                let mut ops = match receiver {
                    Receiver::Leading => this()?,
                    Receiver::Ignored => discard(this),
                };
                ops.push(trailing.clone());
                Ok((ops, Arc::clone(&value)))
            })
        }
        MemberKind::Method(signature) => {
            let label = label.to_string();
            let signature = signature.clone();
            let method = Arc::new(CompileTimeObject::value().with_call(move |this, args| {
                // An ignored receiver arrives already discarded by the
                // member access.
                let (mut ops, leading) = match receiver {
                    Receiver::Leading => (Vec::new(), Some(this)),
                    Receiver::Ignored => (this()?, None),
                };
                ops.extend(call_arguments(&label, &signature, leading, args)?);
                ops.push(trailing.clone());
                Ok(ops)
            }));
            property_resolver(move |this| {
                let ops = match receiver {
                    Receiver::Leading => this()?,
                    Receiver::Ignored => discard(this),
                };
                Ok((ops, Arc::clone(&method)))
            })
        }
    }
}
