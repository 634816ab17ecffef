//! Whole-project compilation against the fixture library

use basalt_compiler::ast::{BinaryOp, SourceDeclaration, StmtKind};
use basalt_compiler::fixtures::Ambient;
use basalt_compiler::{
    CompilerConfig, JumpKind, JumpTarget, Operation, SentinelId, compile_project,
};
use basalt_foundation::Type;

use crate::{body, compile};

#[test]
fn two_argument_add_compiles_to_the_expected_sequence() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let a = factory.param("a", Type::Integer);
    let b = factory.param("b", Type::Integer);
    let left = factory.name(&a.ident, Type::Integer);
    let right = factory.name(&b.ident, Type::Integer);
    let sum = factory.binary(BinaryOp::Add, left, right, Type::Integer);
    let ret = factory.ret(Some(sum));
    let f = factory.function("f", vec![a, b], Type::Integer, vec![ret]);

    let project = compile(&ambient, vec![f]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert!(project.statics.is_empty());
    assert_eq!(project.functions.len(), 1);
    assert_eq!(
        project.functions[0].operations,
        vec![
            Operation::InitSlot {
                locals: 0,
                params: 2
            },
            Operation::LoadArg(0),
            Operation::LoadArg(1),
            Operation::Add,
            Operation::Jump(JumpKind::Always, JumpTarget::Offset(1)),
            Operation::Sentinel(SentinelId(0)),
        ]
    );
}

#[test]
fn member_chain_evaluates_receiver_before_arguments() {
    let mut ambient = Ambient::new();
    let bag_type = ambient.type_of("Bag");
    let array = ambient.type_of("Array");
    let items = ambient.member("Bag", "items");
    let push = ambient.member("Array", "push");
    let factory = &mut ambient.factory;
    let bag = factory.param("bag", bag_type.clone());
    let x = factory.param("x", Type::Integer);
    let object = factory.name(&bag.ident, bag_type);
    let field = factory.property(object, &items, array);
    let method = factory.property(field, &push, Type::function(vec![Type::Any], Type::Void));
    let arg = factory.name(&x.ident, Type::Integer);
    let call = factory.call(method, vec![arg], Type::Void);
    let stmt = factory.expr_stmt(call);
    let fill = factory.function("fill", vec![bag, x], Type::Void, vec![stmt]);

    let project = compile(&ambient, vec![fill]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "fill"),
        [
            Operation::LoadArg(0),
            Operation::PushInt(1),
            Operation::PickItem,
            Operation::LoadArg(1),
            Operation::Append,
        ]
    );
}

#[test]
fn functions_may_call_later_declarations() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let helper_ident = factory.ident("helper");
    let helper_type = Type::function(vec![Type::Integer, Type::Integer], Type::Integer);
    let callee = factory.name(&helper_ident, helper_type);
    let args = vec![factory.int(1), factory.int(2)];
    let call = factory.call(callee, args, Type::Integer);
    let ret = factory.ret(Some(call));
    let main = factory.function("main", Vec::new(), Type::Integer, vec![ret]);

    let p = factory.param("p", Type::Integer);
    let q = factory.param("q", Type::Integer);
    let value = factory.name(&p.ident, Type::Integer);
    let ret = factory.ret(Some(value));
    let mut helper = factory.function("helper", vec![p, q], Type::Integer, vec![ret]);
    helper.symbol = helper_ident.symbol;

    let project = compile(&ambient, vec![main, helper]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "main")[..3],
        [
            Operation::PushInt(2),
            Operation::PushInt(1),
            Operation::Call(helper_ident.symbol),
        ]
    );
}

#[test]
fn statics_are_initialized_before_any_function() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let total = factory.ident("total");
    let five = factory.int(5);
    let declaration = factory.let_(&total, Type::Integer, Some(five));
    let StmtKind::Variable(statement) = declaration.kind else {
        unreachable!("let_ builds a variable statement");
    };
    let read = factory.name(&total, Type::Integer);
    let ret = factory.ret(Some(read));
    let get = factory.function("get", Vec::new(), Type::Integer, vec![ret]);

    let sources = vec![
        SourceDeclaration::Function(get),
        SourceDeclaration::Variable {
            statement,
            node: declaration.node,
        },
    ];
    let config = CompilerConfig::strict().with_initializer_name("_deploy");
    let project = compile_project(&ambient.declarations, &sources, &config).unwrap();

    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(project.functions[0].name, "_deploy");
    assert_eq!(project.functions[0].symbol, None);
    assert_eq!(
        project.functions[0].operations[..3],
        [
            Operation::InitStaticSlot(1),
            Operation::PushInt(5),
            Operation::StoreStatic(0),
        ]
    );
    assert_eq!(body(&project, "get")[0], Operation::LoadStatic(0));
    assert_eq!(project.statics[0].name, "total");
}

#[test]
fn string_addition_concatenates() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let greeting = factory.param("greeting", Type::String);
    let left = factory.name(&greeting.ident, Type::String);
    let right = factory.string("!");
    let joined = factory.binary(BinaryOp::Add, left, right, Type::String);
    let ret = factory.ret(Some(joined));
    let shout = factory.function("shout", vec![greeting], Type::String, vec![ret]);

    let project = compile(&ambient, vec![shout]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "shout")[..3],
        [Operation::LoadArg(0), Operation::push_string("!"), Operation::Cat]
    );
}

#[test]
fn throwing_an_error_throws_its_message() {
    let mut ambient = Ambient::new();
    let error = ambient.name("Error");
    let factory = &mut ambient.factory;
    let message = factory.string("boom");
    let call = factory.call(error, vec![message], Type::Any);
    let throw = factory.stmt(StmtKind::Throw(call));
    let fail = factory.function("fail", Vec::new(), Type::Never, vec![throw]);

    let project = compile(&ambient, vec![fail]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "fail"),
        [Operation::push_string("boom"), Operation::Throw]
    );
}

#[test]
fn diagnostics_from_every_function_are_collected() {
    let mut ambient = Ambient::new();
    let factory = &mut ambient.factory;
    let functions = ["first", "second"]
        .iter()
        .map(|name| {
            let ghost = factory.ident("ghost");
            let read = factory.name(&ghost, Type::Integer);
            let stmt = factory.expr_stmt(read);
            factory.function(name, Vec::new(), Type::Void, vec![stmt])
        })
        .collect();

    let project = compile(&ambient, functions);
    assert_eq!(project.functions.len(), 2);
    assert_eq!(project.diagnostics.len(), 2);
    assert!(!project.is_clean());
}
