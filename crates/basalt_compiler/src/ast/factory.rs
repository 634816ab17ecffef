//! Construction helpers for syntax trees.
//!
//! Front ends and tests use a [`NodeFactory`] to mint node identities and
//! declaration identities consistently.

use basalt_foundation::{Span, SymbolId, SymbolTable, Type, TypeId};

use super::{
    BinaryOp, Binding, BindingElement, Block, Expr, ExprKind, FunctionDecl, Ident, Literal,
    NodeId, NodeRef, Parameter, Stmt, StmtKind, VariableDeclarator, VariableKind,
    VariableStatement,
};

/// Mints nodes and identities for one compilation.
#[derive(Debug, Default)]
pub struct NodeFactory {
    next_node: u32,
    symbols: SymbolTable,
}

impl NodeFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol table backing this factory.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Mints a node reference with an empty span.
    pub fn node(&mut self) -> NodeRef {
        self.node_at(Span::default())
    }

    /// Mints a node reference at the given span.
    pub fn node_at(&mut self, span: Span) -> NodeRef {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        NodeRef { id, span }
    }

    /// Declares a fresh symbol.
    pub fn symbol(&mut self, name: &str) -> SymbolId {
        self.symbols.declare_symbol(name)
    }

    /// Declares a fresh type.
    pub fn type_id(&mut self, name: &str) -> TypeId {
        self.symbols.declare_type(name)
    }

    /// Declares a fresh symbol and returns an identifier for it.
    pub fn ident(&mut self, name: &str) -> Ident {
        let symbol = self.symbol(name);
        self.ident_for(name, symbol)
    }

    /// Creates a reference to an existing symbol.
    pub fn ident_for(&mut self, name: &str, symbol: SymbolId) -> Ident {
        Ident {
            name: name.to_string(),
            symbol,
            alias: None,
            node: self.node(),
        }
    }

    /// Wraps an expression kind into a typed expression.
    pub fn expr(&mut self, kind: ExprKind, ty: Type) -> Expr {
        Expr {
            kind,
            ty,
            node: self.node(),
        }
    }

    /// Integer literal.
    pub fn int(&mut self, value: i128) -> Expr {
        self.expr(ExprKind::Literal(Literal::Integer(value)), Type::Integer)
    }

    /// String literal.
    pub fn string(&mut self, value: &str) -> Expr {
        self.expr(
            ExprKind::Literal(Literal::String(value.to_string())),
            Type::String,
        )
    }

    /// Boolean literal.
    pub fn boolean(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::Literal(Literal::Boolean(value)), Type::Boolean)
    }

    /// `null` literal.
    pub fn null(&mut self) -> Expr {
        self.expr(ExprKind::Literal(Literal::Null), Type::Null)
    }

    /// Reference to an existing identifier.
    pub fn name(&mut self, ident: &Ident, ty: Type) -> Expr {
        let reference = self.ident_for(&ident.name, ident.symbol);
        self.expr(ExprKind::Identifier(reference), ty)
    }

    /// Binary operation.
    pub fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr, ty: Type) -> Expr {
        self.expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        )
    }

    /// Call expression.
    pub fn call(&mut self, callee: Expr, args: Vec<Expr>, ty: Type) -> Expr {
        self.expr(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            ty,
        )
    }

    /// Property access `object.member`.
    pub fn property(&mut self, object: Expr, member: &Ident, ty: Type) -> Expr {
        let member = self.ident_for(&member.name, member.symbol);
        self.expr(
            ExprKind::PropertyAccess {
                object: Box::new(object),
                member,
            },
            ty,
        )
    }

    /// Assignment `target = value`.
    pub fn assign(&mut self, target: Expr, value: Expr) -> Expr {
        let ty = value.ty.clone();
        self.expr(
            ExprKind::Assignment {
                op: None,
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
        )
    }

    /// Wraps a statement kind into a statement.
    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            kind,
            node: self.node(),
        }
    }

    /// Block of statements.
    pub fn block(&mut self, statements: Vec<Stmt>) -> Block {
        Block {
            statements,
            node: self.node(),
        }
    }

    /// Expression statement.
    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expression(expr))
    }

    /// `return expr;`
    pub fn ret(&mut self, expr: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(expr))
    }

    /// `let ident: ty = init;`. The identifier must already be declared.
    pub fn let_(&mut self, ident: &Ident, ty: Type, init: Option<Expr>) -> Stmt {
        let binding = Binding::Identifier(BindingElement {
            ident: ident.clone(),
            ty,
        });
        self.declare(VariableKind::Let, binding, init)
    }

    /// `kind binding = init;`
    pub fn declare(&mut self, kind: VariableKind, binding: Binding, init: Option<Expr>) -> Stmt {
        let declarator = VariableDeclarator {
            binding,
            init,
            node: self.node(),
        };
        self.stmt(StmtKind::Variable(VariableStatement {
            kind,
            declarations: vec![declarator],
        }))
    }

    /// Parameter declaration.
    pub fn param(&mut self, name: &str, ty: Type) -> Parameter {
        Parameter {
            ident: self.ident(name),
            ty,
        }
    }

    /// Function declaration with a fresh symbol.
    pub fn function(
        &mut self,
        name: &str,
        params: Vec<Parameter>,
        return_type: Type,
        statements: Vec<Stmt>,
    ) -> FunctionDecl {
        let symbol = self.symbol(name);
        let body = self.block(statements);
        FunctionDecl {
            name: name.to_string(),
            symbol,
            params,
            return_type,
            body,
            node: self.node(),
        }
    }
}
