//! Integration tests for destructuring declarations

use basalt_compiler::Operation;
use basalt_compiler::ast::{
    BinaryOp, Binding, BindingElement, Expr, ExprKind, FunctionDecl, NodeFactory,
    ObjectBindingElement, StmtKind, VariableKind,
};
use basalt_compiler::fixtures::Ambient;
use basalt_foundation::Type;

use crate::{body, compile};

fn element(factory: &mut NodeFactory, name: &str) -> BindingElement {
    BindingElement {
        ident: factory.ident(name),
        ty: Type::Integer,
    }
}

/// `function pair(): any { return [1, 2, 3]; }`
fn pair(factory: &mut NodeFactory) -> FunctionDecl {
    let items = vec![factory.int(1), factory.int(2), factory.int(3)];
    let array = factory.expr(ExprKind::ArrayLiteral(items), Type::Any);
    let ret = factory.ret(Some(array));
    factory.function("pair", Vec::new(), Type::Any, vec![ret])
}

fn call(factory: &mut NodeFactory, callee: &FunctionDecl) -> Expr {
    let ident = factory.ident_for(&callee.name, callee.symbol);
    let ty = Type::function(Vec::new(), Type::Any);
    let name = factory.name(&ident, ty);
    factory.call(name, Vec::new(), Type::Any)
}

#[test]
fn array_pattern_with_hole_calls_the_initializer_once() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let pair = pair(factory);
    let a = element(factory, "a");
    let c = element(factory, "c");
    let (a_ident, c_ident) = (a.ident.clone(), c.ident.clone());
    let init = call(factory, &pair);
    let pattern = Binding::Array(vec![Some(a), None, Some(c)]);
    let declare = factory.declare(VariableKind::Const, pattern, Some(init));
    let left = factory.name(&a_ident, Type::Integer);
    let right = factory.name(&c_ident, Type::Integer);
    let sum = factory.binary(BinaryOp::Add, left, right, Type::Integer);
    let ret = factory.ret(Some(sum));
    let main = factory.function("main", Vec::new(), Type::Integer, vec![declare, ret]);
    let pair_symbol = pair.symbol;

    let project = compile(&ambient, vec![pair, main]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    let ops = body(&project, "main");
    assert_eq!(
        ops[..8],
        [
            Operation::Call(pair_symbol),
            Operation::Dup,
            Operation::PushInt(0),
            Operation::PickItem,
            Operation::StoreLocal(0),
            Operation::PushInt(2),
            Operation::PickItem,
            Operation::StoreLocal(1),
        ]
    );
    assert_eq!(ops[8..11], [Operation::LoadLocal(0), Operation::LoadLocal(1), Operation::Add]);
    let calls = ops.iter().filter(|op| matches!(op, Operation::Call(_))).count();
    assert_eq!(calls, 1);
}

#[test]
fn object_pattern_reads_keys_not_local_names() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let source = factory.param("size", Type::Any);
    let elements = vec![
        ObjectBindingElement {
            key: "width".into(),
            ident: factory.ident("width"),
            ty: Type::Integer,
        },
        ObjectBindingElement {
            key: "height".into(),
            ident: factory.ident("h"),
            ty: Type::Integer,
        },
    ];
    let init = factory.name(&source.ident, Type::Any);
    let declare = factory.declare(VariableKind::Let, Binding::Object(elements), Some(init));
    let main = factory.function("main", vec![source], Type::Void, vec![declare]);

    let project = compile(&ambient, vec![main]);
    let function = project.function("main").unwrap();
    let names: Vec<_> = function.locals.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["width", "h"]);
    assert_eq!(
        body(&project, "main"),
        [
            Operation::LoadArg(0),
            Operation::Dup,
            Operation::push_string("width"),
            Operation::PickItem,
            Operation::StoreLocal(0),
            Operation::push_string("height"),
            Operation::PickItem,
            Operation::StoreLocal(1),
        ]
    );
}

#[test]
fn for_of_destructures_each_element() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let rows = factory.param("rows", Type::Any);
    let key = element(factory, "key");
    let value = element(factory, "value");
    let iterable = factory.name(&rows.ident, Type::Any);
    let empty = factory.block(Vec::new());
    let loop_body = factory.stmt(StmtKind::Block(empty));
    let stmt = factory.stmt(StmtKind::ForOf {
        binding: Binding::Array(vec![Some(key), Some(value)]),
        iterable,
        body: Box::new(loop_body),
    });
    let main = factory.function("main", vec![rows], Type::Void, vec![stmt]);

    let project = compile(&ambient, vec![main]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    let function = project.function("main").unwrap();
    let names: Vec<_> = function.locals.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["$array", "$index", "key", "value"]);

    let element_read = [
        Operation::LoadLocal(0),
        Operation::LoadLocal(1),
        Operation::PickItem,
        Operation::Dup,
        Operation::PushInt(0),
        Operation::PickItem,
        Operation::StoreLocal(2),
        Operation::PushInt(1),
        Operation::PickItem,
        Operation::StoreLocal(3),
    ];
    assert!(function
        .operations
        .windows(element_read.len())
        .any(|window| window == element_read));
}

#[test]
fn pattern_without_initializer_is_a_diagnostic() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let a = element(factory, "a");
    let declare = factory.declare(VariableKind::Let, Binding::Array(vec![Some(a)]), None);
    let main = factory.function("main", Vec::new(), Type::Void, vec![declare]);

    let project = compile(&ambient, vec![main]);
    assert_eq!(project.diagnostics.len(), 1);
    assert!(project.diagnostics[0].message.contains("initializer"));
}
