//! Integration tests for annotation-driven library bindings

use basalt_compiler::ast::{ExprKind, PropertyAssignment, SourceDeclaration};
use basalt_compiler::fixtures::{Ambient, CONTRACT_MANAGEMENT};
use basalt_compiler::operation::CallFlags;
use basalt_compiler::{CompilerConfig, Operation, compile_project};
use basalt_foundation::{ErrorKind, Type};

use crate::{body, compile};

#[test]
fn syscall_function_takes_arguments_last_first() {
    let mut ambient = Ambient::new();
    let bytes = ambient.type_of("ByteString");
    let key = ambient.factory.param("key", bytes.clone());
    let callee = ambient.name("storageGet");
    let context = ambient.name("storageContext");
    let factory = &mut ambient.factory;
    let key_ref = factory.name(&key.ident, bytes.clone());
    let call = factory.call(callee, vec![context, key_ref], bytes.clone());
    let ret = factory.ret(Some(call));
    let read = factory.function("read", vec![key], bytes, vec![ret]);

    let project = compile(&ambient, vec![read]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "read")[..3],
        [
            Operation::LoadArg(0),
            Operation::Syscall("System.Storage.GetContext".into()),
            Operation::Syscall("System.Storage.Get".into()),
        ]
    );
}

#[test]
fn singleton_members_ignore_the_receiver() {
    let mut ambient = Ambient::new();
    let time = ambient.access("Runtime", "time", Type::Integer);
    let ret = ambient.factory.ret(Some(time));
    let now = ambient.factory.function("now", Vec::new(), Type::Integer, vec![ret]);

    let project = compile(&ambient, vec![now]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "now")[0],
        Operation::Syscall("System.Runtime.GetTime".into())
    );
}

#[test]
fn event_packs_arguments_and_notifies() {
    let mut ambient = Ambient::new();
    let bytes = ambient.type_of("ByteString");
    let callee = ambient.name("onTransfer");
    let factory = &mut ambient.factory;
    let from = factory.param("from", bytes.clone());
    let to = factory.param("to", bytes.clone());
    let args = vec![
        factory.name(&from.ident, bytes.clone()),
        factory.name(&to.ident, bytes),
        factory.int(5),
    ];
    let call = factory.call(callee, args, Type::Void);
    let stmt = factory.expr_stmt(call);
    let send = factory.function("send", vec![from, to], Type::Void, vec![stmt]);

    let project = compile(&ambient, vec![send]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "send"),
        [
            Operation::PushInt(5),
            Operation::LoadArg(1),
            Operation::LoadArg(0),
            Operation::PushInt(3),
            Operation::Pack,
            Operation::push_string("Transfer"),
            Operation::Syscall("System.Runtime.Notify".into()),
        ]
    );
}

#[test]
fn method_token_carries_hash_and_flags() {
    let mut ambient = Ambient::new();
    let bytes = ambient.type_of("ByteString");
    let callee = ambient.name("getContract");
    let factory = &mut ambient.factory;
    let hash = factory.param("hash", bytes.clone());
    let arg = factory.name(&hash.ident, bytes);
    let call = factory.call(callee, vec![arg], Type::Any);
    let ret = factory.ret(Some(call));
    let lookup = factory.function("lookup", vec![hash], Type::Any, vec![ret]);

    let project = compile(&ambient, vec![lookup]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    let ops = body(&project, "lookup");
    assert_eq!(ops[0], Operation::LoadArg(0));
    let Operation::CallToken(token) = &ops[1] else {
        panic!("expected a method token call, got {:?}", ops[1]);
    };
    // Displayed big-endian, stored little-endian.
    assert!(CONTRACT_MANAGEMENT.ends_with("fd"));
    assert_eq!(token.hash[0], 0xfd);
    assert_eq!(token.hash[19], 0xff);
    assert_eq!(token.method, "getContract");
    assert_eq!(token.parameter_count, 1);
    assert!(token.has_return_value);
    assert_eq!(token.call_flags, CallFlags::READ_STATES);
}

#[test]
fn struct_literal_follows_declaration_order() {
    let mut ambient = Ambient::new();
    let point = ambient.type_of("Point");
    let x = ambient.member("Point", "x");
    let y = ambient.member("Point", "y");
    let factory = &mut ambient.factory;
    let properties = vec![
        PropertyAssignment {
            name: "y".into(),
            symbol: Some(y.symbol),
            value: factory.int(20),
            node: factory.node(),
        },
        PropertyAssignment {
            name: "x".into(),
            symbol: Some(x.symbol),
            value: factory.int(10),
            node: factory.node(),
        },
    ];
    let literal = factory.expr(ExprKind::ObjectLiteral(properties), point.clone());
    let ret = factory.ret(Some(literal));
    let origin = factory.function("origin", Vec::new(), point, vec![ret]);

    let project = compile(&ambient, vec![origin]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "origin")[..4],
        [
            Operation::PushInt(20),
            Operation::PushInt(10),
            Operation::PushInt(2),
            Operation::PackStruct,
        ]
    );
}

#[test]
fn struct_field_reads_are_positional() {
    let mut ambient = Ambient::new();
    let point = ambient.type_of("Point");
    let y = ambient.member("Point", "y");
    let factory = &mut ambient.factory;
    let p = factory.param("p", point.clone());
    let object = factory.name(&p.ident, point);
    let read = factory.property(object, &y, Type::Integer);
    let ret = factory.ret(Some(read));
    let get_y = factory.function("getY", vec![p], Type::Integer, vec![ret]);

    let project = compile(&ambient, vec![get_y]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(
        body(&project, "getY")[..3],
        [Operation::LoadArg(0), Operation::PushInt(1), Operation::PickItem]
    );
}

#[test]
fn library_enum_members_are_constants() {
    let mut ambient = Ambient::new();
    let direction = ambient.type_of("Direction");
    let down = ambient.access("Direction", "Down", direction.clone());
    let ret = ambient.factory.ret(Some(down));
    let heading = ambient.factory.function("heading", Vec::new(), direction, vec![ret]);

    let project = compile(&ambient, vec![heading]);
    assert!(project.is_clean(), "{:?}", project.diagnostics);
    assert_eq!(body(&project, "heading")[0], Operation::PushInt(2));
}

fn from_hex(text: &str) -> (Vec<Operation>, Vec<String>) {
    let mut ambient = Ambient::new();
    let bytes = ambient.type_of("ByteString");
    let signature = Type::function(vec![Type::String], bytes.clone());
    let callee = ambient.access("ByteString", "fromHex", signature);
    let literal = ambient.factory.string(text);
    let call = ambient.factory.call(callee, vec![literal], bytes.clone());
    let ret = ambient.factory.ret(Some(call));
    let decode = ambient.factory.function("decode", Vec::new(), bytes, vec![ret]);

    let project = compile(&ambient, vec![decode]);
    let messages = project.diagnostics.iter().map(|d| d.message.clone()).collect();
    (body(&project, "decode").to_vec(), messages)
}

#[test]
fn hex_literals_decode_at_compile_time() {
    let (ops, diagnostics) = from_hex("0xFF");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(ops[0], Operation::PushData(vec![0xff]));

    let (ops, diagnostics) = from_hex("0x00ab");
    assert!(diagnostics.is_empty());
    assert_eq!(ops[0], Operation::PushData(vec![0x00, 0xab]));
}

#[test]
fn malformed_hex_literals_are_diagnostics() {
    let (_, diagnostics) = from_hex("0xABC");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("odd"));

    let (_, diagnostics) = from_hex("0xZZ");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("hex"));
}

#[test]
fn missing_intrinsic_surface_is_fatal_only_when_strict() {
    let mut ambient = Ambient::new();
    ambient.declarations.retain(|decl| decl.name != "ErrorConstructor");
    let sources: Vec<SourceDeclaration> = Vec::new();

    let strict = compile_project(&ambient.declarations, &sources, &CompilerConfig::strict());
    let error = strict.unwrap_err();
    assert!(matches!(
        error.kind,
        ErrorKind::MissingLibraryDeclaration(ref name) if name == "ErrorConstructor"
    ));

    let lenient = compile_project(&ambient.declarations, &sources, &CompilerConfig::lenient());
    let project = lenient.unwrap();
    assert!(project.functions.is_empty());
}
