//! Integration tests for scope chains

use std::sync::Arc;

use basalt_compiler::ast::NodeFactory;
use basalt_compiler::{CompileTimeObject, Operation, Scope};
use basalt_foundation::SymbolId;
use proptest::prelude::*;

fn constant(factory: &mut NodeFactory, name: &str, value: i128) -> (SymbolId, Arc<CompileTimeObject>) {
    let symbol = factory.symbol(name);
    let cto = CompileTimeObject::constant(symbol, None, vec![Operation::PushInt(value)]);
    (symbol, Arc::new(cto))
}

#[test]
fn child_scopes_leave_the_parent_untouched() {
    let mut factory = NodeFactory::new();
    let (x, outer) = constant(&mut factory, "x", 1);
    let root = Scope::root([(x, outer)], []);
    let inner = Arc::new(CompileTimeObject::constant(x, None, vec![Operation::PushInt(2)]));
    let child = root.bind([(x, inner)]);

    assert_eq!(child.resolve(x, None).unwrap().load.clone(), Some(vec![Operation::PushInt(2)]));
    assert_eq!(root.resolve(x, None).unwrap().load.clone(), Some(vec![Operation::PushInt(1)]));
}

#[test]
fn alias_is_tried_after_the_identity_at_each_layer() {
    let mut factory = NodeFactory::new();
    let (declared, object) = constant(&mut factory, "value", 7);
    let shorthand = factory.symbol("value");
    let scope = Scope::root([(declared, object)], []).bind([]);

    assert!(scope.resolve(shorthand, None).is_none());
    let found = scope.resolve(shorthand, Some(declared)).unwrap();
    assert_eq!(found.symbol, Some(declared));
}

proptest! {
    #[test]
    fn innermost_binding_wins(depth in 1usize..12, back in 0usize..12) {
        let mut factory = NodeFactory::new();
        let x = factory.symbol("x");
        let mut layers = vec![Scope::empty()];
        for level in 0..depth {
            let value = i128::try_from(level).unwrap();
            let ops = vec![Operation::PushInt(value)];
            let cto = Arc::new(CompileTimeObject::constant(x, None, ops));
            let child = layers[layers.len() - 1].bind([(x, cto)]);
            layers.push(child);
        }
        let expected = i128::try_from(depth - 1).unwrap();
        prop_assert_eq!(
            layers[depth].resolve(x, None).unwrap().load.clone(),
            Some(vec![Operation::PushInt(expected)])
        );

        // Older layers still see their own binding.
        let back = back.min(depth - 1);
        let seen = i128::try_from(depth - 1 - back).unwrap();
        prop_assert_eq!(
            layers[depth - back].resolve(x, None).unwrap().load.clone(),
            Some(vec![Operation::PushInt(seen)])
        );
        prop_assert!(layers[0].resolve(x, None).is_none());
    }
}
