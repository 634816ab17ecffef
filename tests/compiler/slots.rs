//! Integration tests for frame slot allocation

use basalt_compiler::ast::{Binding, BindingElement, NodeFactory, StmtKind, VariableKind};
use basalt_compiler::{CompilerConfig, Operation, Scope, compile_function};
use basalt_foundation::{ErrorKind, SlotKind, Span, Type};
use proptest::prelude::*;

proptest! {
    #[test]
    fn locals_get_consecutive_slots_across_nested_blocks(
        nesting in prop::collection::vec(0usize..3, 1..20),
    ) {
        let mut factory = NodeFactory::new();
        // Each entry opens that many blocks around one declaration.
        let mut statements = Vec::new();
        for (index, depth) in nesting.iter().enumerate() {
            let ident = factory.ident(&format!("v{index}"));
            let value = factory.int(i128::try_from(index).unwrap());
            let mut stmt = factory.let_(&ident, Type::Integer, Some(value));
            for _ in 0..*depth {
                let block = factory.block(vec![stmt]);
                stmt = factory.stmt(StmtKind::Block(block));
            }
            statements.push(stmt);
        }
        let decl = factory.function("f", Vec::new(), Type::Void, statements);
        let (function, diagnostics) =
            compile_function(&decl, &Scope::empty(), &CompilerConfig::default()).unwrap();

        prop_assert!(diagnostics.is_empty());
        let slots: Vec<u8> = function.locals.iter().map(|local| local.slot).collect();
        let expected: Vec<u8> = (0..nesting.len()).map(|i| u8::try_from(i).unwrap()).collect();
        prop_assert_eq!(slots, expected.clone());

        let stores: Vec<u8> = function
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::StoreLocal(slot) => Some(*slot),
                _ => None,
            })
            .collect();
        prop_assert_eq!(stores, expected);
        let count = u8::try_from(nesting.len()).unwrap();
        prop_assert_eq!(
            &function.operations[0],
            &Operation::InitSlot { locals: count, params: 0 }
        );
    }
}

#[test]
fn pattern_names_take_slots_in_source_order() {
    let mut factory = NodeFactory::new();
    let pair = factory.param("pair", Type::Any);
    let elements: Vec<_> = ["first", "second"]
        .iter()
        .map(|name| {
            Some(BindingElement {
                ident: factory.ident(name),
                ty: Type::Integer,
            })
        })
        .collect();
    let init = factory.name(&pair.ident, Type::Any);
    let stmt = factory.declare(VariableKind::Const, Binding::Array(elements), Some(init));
    let decl = factory.function("f", vec![pair], Type::Void, vec![stmt]);

    let (function, _) = compile_function(&decl, &Scope::empty(), &CompilerConfig::default()).unwrap();
    let names: Vec<&str> = function.locals.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
    assert_eq!(
        function.operations[0],
        Operation::InitSlot {
            locals: 2,
            params: 1
        }
    );
}

#[test]
fn local_overflow_names_the_function_and_the_declaration() {
    let mut factory = NodeFactory::new();
    let statements: Vec<_> = (0..3)
        .map(|i| {
            let mut ident = factory.ident(&format!("v{i}"));
            let line = u32::try_from(i).unwrap() + 2;
            ident.node.span = Span::new(0, 2, line, 9);
            let value = factory.int(i);
            factory.let_(&ident, Type::Integer, Some(value))
        })
        .collect();
    let decl = factory.function("crowded", Vec::new(), Type::Void, statements);
    let config = CompilerConfig::default().with_max_slots(2);

    let error = compile_function(&decl, &Scope::empty(), &config).unwrap_err();
    assert!(matches!(
        error.kind,
        ErrorKind::SlotOverflow {
            kind: SlotKind::Local,
            ..
        }
    ));
    let context = error.context.unwrap();
    assert_eq!(context.source.as_deref(), Some("crowded"));
    assert_eq!(context.span, Some(Span::new(0, 2, 4, 9)));
}
