//! Syntax tree handed over by the front end.
//!
//! Parsing and type checking happen elsewhere. By the time a tree reaches
//! this crate every identifier carries its declaration identity and every
//! expression carries its statically inferred [`Type`].

use basalt_foundation::{Span, SymbolId, Type, TypeId};

mod factory;

pub use factory::NodeFactory;

/// Identity of a syntax node, unique within one compilation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Reference to the syntax node a construct came from. Diagnostics only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Node identity.
    pub id: NodeId,
    /// Source location.
    pub span: Span,
}

/// A resolved identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    /// Name as written in source.
    pub name: String,
    /// Identity the reference resolves to.
    pub symbol: SymbolId,
    /// Underlying declaration identity, when the reference presents under
    /// a second one (parameter properties, shorthand bindings, exports).
    pub alias: Option<SymbolId>,
    /// Reference site.
    pub node: NodeRef,
}

// =============================================================================
// Expressions
// =============================================================================

/// Literal values.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `true` / `false`
    Boolean(bool),
    /// Integer literal.
    Integer(i128),
    /// String literal.
    String(String),
}

/// An expression with its static type.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// What kind of expression this is.
    pub kind: ExprKind,
    /// Statically inferred type.
    pub ty: Type,
    /// Source node.
    pub node: NodeRef,
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// A literal.
    Literal(Literal),
    /// A name reference.
    Identifier(Ident),
    /// `-x`, `+x`, `!x`, `~x`
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// `a op b` for arithmetic, bitwise and comparison operators.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `a && b`, `a || b`, `a ?? b`
    Logical {
        /// Operator.
        op: LogicalOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `c ? a : b`
    Conditional {
        /// Condition.
        condition: Box<Expr>,
        /// Value when the condition holds.
        when_true: Box<Expr>,
        /// Value otherwise.
        when_false: Box<Expr>,
    },
    /// `target = value` or `target op= value`
    Assignment {
        /// Operator of a compound assignment.
        op: Option<BinaryOp>,
        /// Assigned place.
        target: Box<Expr>,
        /// Assigned value.
        value: Box<Expr>,
    },
    /// `++x`, `x++`, `--x`, `x--`
    Update {
        /// Increment or decrement.
        op: UpdateOp,
        /// True for the prefix form.
        prefix: bool,
        /// Updated place.
        target: Box<Expr>,
    },
    /// `callee(args)`
    Call {
        /// Called expression.
        callee: Box<Expr>,
        /// Arguments in source order.
        args: Vec<Expr>,
    },
    /// `new callee(args)`
    New {
        /// Constructed expression.
        callee: Box<Expr>,
        /// Arguments in source order.
        args: Vec<Expr>,
    },
    /// `object.member`
    PropertyAccess {
        /// Receiver.
        object: Box<Expr>,
        /// Member name and identity.
        member: Ident,
    },
    /// `object[index]`
    ElementAccess {
        /// Receiver.
        object: Box<Expr>,
        /// Index or key.
        index: Box<Expr>,
    },
    /// `x!`
    NonNull(Box<Expr>),
    /// `(x)`
    Paren(Box<Expr>),
    /// `x as T` / `<T>x`
    TypeAssertion(Box<Expr>),
    /// `[a, b, c]`
    ArrayLiteral(Vec<Expr>),
    /// `{ a: 1, b }`
    ObjectLiteral(Vec<PropertyAssignment>),
}

/// One `name: value` entry of an object literal.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyAssignment {
    /// Property name.
    pub name: String,
    /// Identity of the member in the contextual type, if known.
    pub symbol: Option<SymbolId>,
    /// Property value.
    pub value: Expr,
    /// Source node.
    pub node: NodeRef,
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `+x`
    Plus,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
}

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNe,
    /// `==`
    LooseEq,
    /// `!=`
    LooseNe,
}

/// Short-circuiting operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    Coalesce,
}

/// `++` / `--`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpdateOp {
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

// =============================================================================
// Statements
// =============================================================================

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    /// What kind of statement this is.
    pub kind: StmtKind,
    /// Source node.
    pub node: NodeRef,
}

/// Statement kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `{ ... }`
    Block(Block),
    /// `const`/`let`/`var` declarations.
    Variable(VariableStatement),
    /// An expression evaluated for its effect.
    Expression(Expr),
    /// `return` with an optional value.
    Return(Option<Expr>),
    /// `if (c) a else b`
    If {
        /// Condition.
        condition: Expr,
        /// Taken when the condition holds.
        then_branch: Box<Stmt>,
        /// Taken otherwise.
        else_branch: Option<Box<Stmt>>,
    },
    /// `while (c) body`
    While {
        /// Condition.
        condition: Expr,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// `do body while (c)`
    DoWhile {
        /// Loop body.
        body: Box<Stmt>,
        /// Condition.
        condition: Expr,
    },
    /// `for (init; condition; update) body`
    For {
        /// Initializer.
        init: Option<ForInit>,
        /// Condition; absent means forever.
        condition: Option<Expr>,
        /// Evaluated after each iteration.
        update: Option<Expr>,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// `for (const x of array) body`
    ForOf {
        /// Per-iteration binding.
        binding: Binding,
        /// Iterated array.
        iterable: Expr,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// `switch (d) { case ...: }`
    Switch {
        /// Value being dispatched on.
        discriminant: Expr,
        /// Cases in source order.
        cases: Vec<SwitchCase>,
    },
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `throw e`
    Throw(Expr),
    /// `try { } catch (e) { } finally { }`
    Try {
        /// Protected block.
        block: Block,
        /// Handler.
        catch: Option<CatchClause>,
        /// Always-run block.
        finally: Option<Block>,
    },
    /// `;`
    Empty,
}

/// A braced list of statements.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Statements in source order.
    pub statements: Vec<Stmt>,
    /// Source node.
    pub node: NodeRef,
}

/// Initializer clause of a `for` loop.
#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    /// `for (let i = 0; ...)`
    Variable(VariableStatement),
    /// `for (i = 0; ...)`
    Expression(Expr),
}

/// One `case`/`default` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    /// Case value; `None` for `default`.
    pub test: Option<Expr>,
    /// Statements of the clause.
    pub body: Vec<Stmt>,
    /// Source node.
    pub node: NodeRef,
}

/// `catch (e) { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    /// Exception binding, if named.
    pub binding: Option<Ident>,
    /// Handler body.
    pub block: Block,
    /// Source node.
    pub node: NodeRef,
}

/// `const`, `let` or `var`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VariableKind {
    /// `const`
    Const,
    /// `let`
    Let,
    /// `var`
    Var,
}

/// A declaration list such as `let a = 1, [b, c] = pair;`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableStatement {
    /// Declaration keyword.
    pub kind: VariableKind,
    /// Declarators in source order.
    pub declarations: Vec<VariableDeclarator>,
}

/// A single `binding = init` declarator.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclarator {
    /// Bound names.
    pub binding: Binding,
    /// Initializer.
    pub init: Option<Expr>,
    /// Source node.
    pub node: NodeRef,
}

/// Left-hand side of a declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// `x`
    Identifier(BindingElement),
    /// `[a, , c]`; holes are `None`.
    Array(Vec<Option<BindingElement>>),
    /// `{ a, b: c }`
    Object(Vec<ObjectBindingElement>),
}

impl Binding {
    /// Every name the binding introduces, in source order.
    #[must_use]
    pub fn names(&self) -> Vec<(&Ident, &Type)> {
        match self {
            Self::Identifier(element) => vec![(&element.ident, &element.ty)],
            Self::Array(elements) => elements
                .iter()
                .flatten()
                .map(|element| (&element.ident, &element.ty))
                .collect(),
            Self::Object(elements) => elements
                .iter()
                .map(|element| (&element.ident, &element.ty))
                .collect(),
        }
    }
}

/// A bound name with its declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingElement {
    /// Bound name.
    pub ident: Ident,
    /// Declared or inferred type.
    pub ty: Type,
}

/// `key: name` inside an object binding pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectBindingElement {
    /// Property key read from the initializer.
    pub key: String,
    /// Bound name.
    pub ident: Ident,
    /// Declared or inferred type.
    pub ty: Type,
}

// =============================================================================
// Declarations
// =============================================================================

/// A function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// Parameter name and identity.
    pub ident: Ident,
    /// Declared type.
    pub ty: Type,
}

/// A function declaration from user source.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    /// Declared name.
    pub name: String,
    /// Identity of the function.
    pub symbol: SymbolId,
    /// Parameters in order.
    pub params: Vec<Parameter>,
    /// Declared return type.
    pub return_type: Type,
    /// Function body.
    pub body: Block,
    /// Source node.
    pub node: NodeRef,
}

/// A `const enum` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    /// Declared name.
    pub name: String,
    /// Identity of the enum object.
    pub symbol: SymbolId,
    /// Identity of the enum type.
    pub type_id: TypeId,
    /// Members in declaration order.
    pub members: Vec<EnumMember>,
    /// Source node.
    pub node: NodeRef,
}

/// A member of a `const enum`.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumMember {
    /// Member name.
    pub name: String,
    /// Member identity.
    pub symbol: SymbolId,
    /// Constant value.
    pub value: Literal,
    /// Source node.
    pub node: NodeRef,
}

/// A top-level declaration of a contract source file.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceDeclaration {
    /// A function.
    Function(FunctionDecl),
    /// A static variable statement.
    Variable {
        /// The declarations.
        statement: VariableStatement,
        /// Source node.
        node: NodeRef,
    },
    /// A `const enum`.
    Enum(EnumDecl),
}

// =============================================================================
// Library declarations
// =============================================================================

/// A `@tag text` annotation attached to a library declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// Tag name without the `@`.
    pub tag: String,
    /// Text following the tag, trimmed.
    pub text: Option<String>,
}

impl Annotation {
    /// Creates an annotation.
    #[must_use]
    pub fn new(tag: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            tag: tag.into(),
            text: text.map(str::to_string),
        }
    }

    /// Extracts the `@tag text` lines of a doc comment.
    ///
    /// Comment markers (`//`, `/*`, `*`, `*/`) are stripped; lines without a
    /// leading `@` are ignored.
    #[must_use]
    pub fn from_comment(comment: &str) -> Vec<Self> {
        comment
            .lines()
            .filter_map(|line| {
                let line = line
                    .trim()
                    .trim_start_matches("/**")
                    .trim_start_matches("/*")
                    .trim_start_matches("//")
                    .trim_end_matches("*/")
                    .trim_start_matches('*')
                    .trim();
                let rest = line.strip_prefix('@')?;
                let (tag, text) = match rest.split_once(char::is_whitespace) {
                    Some((tag, text)) => (tag, Some(text.trim()).filter(|t| !t.is_empty())),
                    None => (rest, None),
                };
                (!tag.is_empty()).then(|| Self::new(tag, text))
            })
            .collect()
    }
}

/// Parameter of a declared signature.
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureParam {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty: Type,
    /// True for `name?: T`.
    pub optional: bool,
}

/// A declared call signature.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    /// Parameters in order.
    pub params: Vec<SignatureParam>,
    /// Declared return type.
    pub return_type: Type,
}

impl Signature {
    /// Number of parameters that must be supplied.
    #[must_use]
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }
}

/// A member of a library interface.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberDeclaration {
    /// Member name.
    pub name: String,
    /// Member identity.
    pub symbol: SymbolId,
    /// Property or method.
    pub kind: MemberKind,
    /// Annotations on the member.
    pub annotations: Vec<Annotation>,
    /// Source node.
    pub node: NodeRef,
}

/// Shape of an interface member.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberKind {
    /// `name: T`
    Property {
        /// Declared type.
        ty: Type,
        /// True for `readonly`.
        readonly: bool,
    },
    /// `name(params): T`
    Method(Signature),
}

/// Shape of a library declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum LibraryKind {
    /// `declare function f(...): T`
    Function(Signature),
    /// `declare const x: T`
    Variable {
        /// Declared type.
        ty: Type,
    },
    /// `interface I { ... }`
    Interface {
        /// Identity of the interface type.
        type_id: TypeId,
        /// Members in declaration order.
        members: Vec<MemberDeclaration>,
    },
    /// `declare const enum E { ... }`
    Enum {
        /// Identity of the enum type.
        type_id: TypeId,
        /// Members in declaration order.
        members: Vec<EnumMember>,
    },
}

/// An ambient top-level declaration of the library surface.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryDeclaration {
    /// Declared name.
    pub name: String,
    /// Identity of the declaration.
    pub symbol: SymbolId,
    /// Declaration shape.
    pub kind: LibraryKind,
    /// Annotations on the declaration.
    pub annotations: Vec<Annotation>,
    /// Source node.
    pub node: NodeRef,
}

impl LibraryDeclaration {
    /// Returns the first annotation with the given tag.
    #[must_use]
    pub fn annotation(&self, tag: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.tag == tag)
    }

    /// Returns the interface type identity, if this is an interface.
    #[must_use]
    pub fn interface_type(&self) -> Option<TypeId> {
        match &self.kind {
            LibraryKind::Interface { type_id, .. } => Some(*type_id),
            _ => None,
        }
    }

    /// Finds an interface member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberDeclaration> {
        match &self.kind {
            LibraryKind::Interface { members, .. } => members.iter().find(|m| m.name == name),
            _ => None,
        }
    }
}
