//! A programmatic ambient library and tree helpers.
//!
//! [`Ambient`] declares the surface every intrinsic needs, plus one binding
//! per annotation strategy, and remembers the identities it minted so
//! tests can write references to them.

use std::collections::HashMap;

use basalt_foundation::{SymbolId, Type, TypeId};

use crate::ast::{
    Annotation, EnumMember, Expr, Ident, LibraryDeclaration, LibraryKind, Literal,
    MemberDeclaration, MemberKind, NodeFactory, Signature, SignatureParam,
};

/// Script hash of the native contract-management contract.
pub const CONTRACT_MANAGEMENT: &str = "0xfffdc93764dbaddd97c48f252a53ea4643faa3fd";

/// An ambient library together with the factory that minted it.
pub struct Ambient {
    /// Factory shared with the trees written against this library.
    pub factory: NodeFactory,
    /// Library declarations in declaration order.
    pub declarations: Vec<LibraryDeclaration>,
    types: HashMap<String, TypeId>,
}

impl Ambient {
    /// Builds the standard library surface.
    #[must_use]
    pub fn new() -> Self {
        let mut ambient = Self {
            factory: NodeFactory::new(),
            declarations: Vec::new(),
            types: HashMap::new(),
        };
        ambient.standard();
        ambient
    }

    fn standard(&mut self) {
        // Byte strings and their constructor surface.
        let byte_string = self.factory.type_id("ByteString");
        self.types.insert("ByteString".into(), byte_string);
        let bytes = Type::object(byte_string);
        let from = |name: &str, ty: Type| method(name, &[("value", ty)], bytes.clone());
        self.interface(
            "ByteStringConstructor",
            vec![
                from("fromHex", Type::String),
                from("fromString", Type::String),
                from("fromInteger", Type::Integer),
            ],
        );
        // The interface comes first: intrinsics look declarations up by
        // name and the instance surface shares its name with the value.
        self.interface(
            "ByteString",
            vec![
                property("length", Type::Integer),
                method("asInteger", &[], Type::Integer),
                method("concat", &[("other", bytes.clone())], bytes.clone()),
            ],
        );
        self.singleton("ByteString", "ByteStringConstructor");
        self.interface("String", vec![property("length", Type::Integer)]);
        self.interface(
            "Array",
            vec![
                property("length", Type::Integer),
                method("push", &[("item", Type::Any)], Type::Void),
            ],
        );
        self.interface("ErrorConstructor", Vec::new());
        self.singleton("Error", "ErrorConstructor");

        // Host calls.
        self.interface(
            "RuntimeConstructor",
            vec![
                property("time", Type::Integer)
                    .annotated("syscall", Some("System.Runtime.GetTime")),
                method("checkWitness", &[("account", bytes.clone())], Type::Boolean)
                    .annotated("syscall", Some("System.Runtime.CheckWitness")),
            ],
        );
        self.singleton("Runtime", "RuntimeConstructor");
        let context = self.factory.type_id("StorageContext");
        self.types.insert("StorageContext".into(), context);
        self.variable("storageContext", Type::object(context))
            .annotations
            .push(Annotation::new("syscall", Some("System.Storage.GetContext")));
        self.function(
            "storageGet",
            &[("context", Type::object(context)), ("key", bytes.clone())],
            bytes.clone(),
            Annotation::new("syscall", Some("System.Storage.Get")),
        );

        // Events, native contracts, fixed layouts and enums.
        self.function(
            "onTransfer",
            &[("from", bytes.clone()), ("to", bytes.clone()), ("amount", Type::Integer)],
            Type::Void,
            Annotation::new("event", Some("Transfer")),
        );
        self.function(
            "getContract",
            &[("hash", bytes)],
            Type::Any,
            Annotation::new(
                "methodToken",
                Some(&format!("{CONTRACT_MANAGEMENT} getContract ReadStates")),
            ),
        );
        let point = self.interface(
            "Point",
            vec![property("x", Type::Integer), property("y", Type::Integer)],
        );
        point.annotations.push(Annotation::new("struct", None));
        let items = self.type_of("Array");
        let bag = self.interface(
            "Bag",
            vec![property("label", Type::String), property("items", items)],
        );
        bag.annotations.push(Annotation::new("struct", None));
        self.enumeration("Direction", &[("Up", 1), ("Down", 2)]);
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// The declaration named `name`, preferring values over interfaces.
    ///
    /// # Panics
    ///
    /// Panics if the library has no such declaration.
    #[must_use]
    pub fn declaration(&self, name: &str) -> &LibraryDeclaration {
        let mut named = self.declarations.iter().filter(|decl| decl.name == name);
        let first = named
            .next()
            .unwrap_or_else(|| panic!("no library declaration '{name}'"));
        if first.interface_type().is_none() {
            return first;
        }
        named.next().unwrap_or(first)
    }

    /// A reference to the top-level declaration `name`.
    pub fn ident(&mut self, name: &str) -> Ident {
        let symbol = self.declaration(name).symbol;
        self.factory.ident_for(name, symbol)
    }

    /// The static type of the value `name` refers to.
    #[must_use]
    pub fn value_type(&self, name: &str) -> Type {
        match &self.declaration(name).kind {
            LibraryKind::Variable { ty } => ty.clone(),
            LibraryKind::Function(signature) => Type::function(
                signature.params.iter().map(|p| p.ty.clone()).collect(),
                signature.return_type.clone(),
            ),
            LibraryKind::Interface { .. } | LibraryKind::Enum { .. } => Type::Any,
        }
    }

    /// A reference to member `member` of `owner`.
    ///
    /// `owner` names an interface, an enum, or a value whose type is a
    /// library interface.
    ///
    /// # Panics
    ///
    /// Panics if `owner` has no such member.
    pub fn member(&mut self, owner: &str, member: &str) -> Ident {
        let symbol = self
            .declarations
            .iter()
            .filter(|decl| decl.name == owner)
            .flat_map(|decl| self.surfaces(decl))
            .find_map(|surface| member_symbol(surface, member))
            .unwrap_or_else(|| panic!("no member '{owner}.{member}'"));
        self.factory.ident_for(member, symbol)
    }

    /// Declarations whose members `decl` exposes.
    fn surfaces<'a>(&'a self, decl: &'a LibraryDeclaration) -> Vec<&'a LibraryDeclaration> {
        match &decl.kind {
            LibraryKind::Variable {
                ty: Type::Object { id, .. },
            } => self
                .declarations
                .iter()
                .filter(|candidate| candidate.interface_type() == Some(*id))
                .collect(),
            _ => vec![decl],
        }
    }

    /// The instance type named `name`: an interface, enum or declared type.
    ///
    /// # Panics
    ///
    /// Panics if no such type was declared.
    #[must_use]
    pub fn type_of(&self, name: &str) -> Type {
        if let Some(id) = self.types.get(name) {
            return Type::object(*id);
        }
        self.declarations
            .iter()
            .filter(|decl| decl.name == name)
            .find_map(|decl| match &decl.kind {
                LibraryKind::Interface { type_id, .. } | LibraryKind::Enum { type_id, .. } => {
                    Some(Type::object(*type_id))
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no library type '{name}'"))
    }

    /// An identifier expression for a top-level declaration, typed by its
    /// value.
    pub fn name(&mut self, name: &str) -> Expr {
        let ident = self.ident(name);
        let ty = self.value_type(name);
        self.factory.name(&ident, ty)
    }

    /// `owner.member` where `owner` is a top-level declaration.
    pub fn access(&mut self, owner: &str, member: &str, ty: Type) -> Expr {
        let object = self.name(owner);
        let member = self.member(owner, member);
        self.factory.property(object, &member, ty)
    }

    // =========================================================================
    // Builders
    // =========================================================================

    fn interface(&mut self, name: &str, members: Vec<Member>) -> &mut LibraryDeclaration {
        let type_id = self
            .types
            .get(name)
            .copied()
            .unwrap_or_else(|| self.factory.type_id(name));
        let members = members
            .into_iter()
            .map(|member| MemberDeclaration {
                symbol: self.factory.symbol(&member.name),
                name: member.name,
                kind: member.kind,
                annotations: member.annotations,
                node: self.factory.node(),
            })
            .collect();
        self.push(name, LibraryKind::Interface { type_id, members })
    }

    fn singleton(&mut self, name: &str, interface: &str) {
        let ty = self.type_of(interface);
        self.variable(name, ty);
    }

    fn variable(&mut self, name: &str, ty: Type) -> &mut LibraryDeclaration {
        self.push(name, LibraryKind::Variable { ty })
    }

    fn function(&mut self, name: &str, params: &[(&str, Type)], ret: Type, annotation: Annotation) {
        let signature = signature(params, ret);
        self.push(name, LibraryKind::Function(signature))
            .annotations
            .push(annotation);
    }

    fn enumeration(&mut self, name: &str, members: &[(&str, i128)]) {
        let type_id = self.factory.type_id(name);
        let members = members
            .iter()
            .map(|(member, value)| EnumMember {
                name: (*member).to_string(),
                symbol: self.factory.symbol(member),
                value: Literal::Integer(*value),
                node: self.factory.node(),
            })
            .collect();
        self.push(name, LibraryKind::Enum { type_id, members });
    }

    fn push(&mut self, name: &str, kind: LibraryKind) -> &mut LibraryDeclaration {
        let index = self.declarations.len();
        self.declarations.push(LibraryDeclaration {
            name: name.to_string(),
            symbol: self.factory.symbol(name),
            kind,
            annotations: Vec::new(),
            node: self.factory.node(),
        });
        &mut self.declarations[index]
    }
}

impl Default for Ambient {
    fn default() -> Self {
        Self::new()
    }
}

/// A member waiting for its identities.
struct Member {
    name: String,
    kind: MemberKind,
    annotations: Vec<Annotation>,
}

impl Member {
    fn annotated(mut self, tag: &str, text: Option<&str>) -> Self {
        self.annotations.push(Annotation::new(tag, text));
        self
    }
}

fn property(name: &str, ty: Type) -> Member {
    Member {
        name: name.to_string(),
        kind: MemberKind::Property { ty, readonly: true },
        annotations: Vec::new(),
    }
}

fn method(name: &str, params: &[(&str, Type)], ret: Type) -> Member {
    Member {
        name: name.to_string(),
        kind: MemberKind::Method(signature(params, ret)),
        annotations: Vec::new(),
    }
}

fn member_symbol(decl: &LibraryDeclaration, member: &str) -> Option<SymbolId> {
    match &decl.kind {
        LibraryKind::Enum { members, .. } => members
            .iter()
            .find(|m| m.name == member)
            .map(|m| m.symbol),
        _ => decl.member(member).map(|m| m.symbol),
    }
}

fn signature(params: &[(&str, Type)], ret: Type) -> Signature {
    Signature {
        params: params
            .iter()
            .map(|(name, ty)| SignatureParam {
                name: (*name).to_string(),
                ty: ty.clone(),
                optional: false,
            })
            .collect(),
        return_type: ret,
    }
}
