//! Integration tests for the static type model

use basalt_foundation::{Primitive, SymbolTable, Type, TypeKey};
use proptest::prelude::*;

#[test]
fn void_like_types_push_nothing() {
    assert!(Type::Void.is_void_like());
    assert!(Type::Never.is_void_like());
    assert!(!Type::Integer.is_void_like());
    assert!(!Type::Any.is_void_like());
}

#[test]
fn optional_string_is_still_a_string() {
    let optional = Type::Union(vec![Type::String, Type::Null]);
    assert!(optional.is_nullable());
    assert!(optional.is_string());
    assert_eq!(optional.key(), Some(TypeKey::Primitive(Primitive::String)));
}

#[test]
fn declared_types_key_by_identity() {
    let mut table = SymbolTable::new();
    let point = table.declare_type("Point");
    let other = table.declare_type("Point");
    assert_eq!(Type::object(point).key(), Some(TypeKey::Declared(point)));
    assert_ne!(Type::object(point).key(), Type::object(other).key());
}

#[test]
fn functions_have_no_member_table() {
    let f = Type::function(vec![Type::Integer], Type::Boolean);
    assert_eq!(f.key(), None);
}

fn primitive() -> impl Strategy<Value = Type> {
    prop_oneof![
        Just(Type::Boolean),
        Just(Type::Integer),
        Just(Type::String),
        Just(Type::Any),
    ]
}

proptest! {
    #[test]
    fn non_null_removes_only_null_and_undefined(
        base in primitive(),
        nulls in prop::collection::vec(prop_oneof![Just(Type::Null), Just(Type::Undefined)], 1..3),
    ) {
        let mut alternatives = vec![base.clone()];
        alternatives.extend(nulls);
        let union = Type::Union(alternatives);
        prop_assert!(union.is_nullable());
        prop_assert_eq!(union.non_null(), base);
    }
}
