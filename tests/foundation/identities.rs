//! Integration tests for declaration identities and spans

use basalt_foundation::{Span, SymbolTable};

#[test]
fn same_name_declares_distinct_symbols() {
    let mut table = SymbolTable::new();
    let outer = table.declare_symbol("x");
    let inner = table.declare_symbol("x");
    assert_ne!(outer, inner);
    assert_eq!(table.symbol_name(outer), Some("x"));
    assert_eq!(table.symbol_name(inner), Some("x"));
    assert_eq!(table.symbol_count(), 2);
}

#[test]
fn symbols_and_types_are_counted_separately() {
    let mut table = SymbolTable::new();
    let ty = table.declare_type("ByteString");
    let sym = table.declare_symbol("ByteString");
    assert_eq!(ty.index(), 0);
    assert_eq!(sym.index(), 0);
    assert_eq!(table.type_name(ty), Some("ByteString"));
    assert_eq!(table.type_count(), 1);
}

#[test]
fn default_span_displays_origin() {
    let span = Span::default();
    assert_eq!(span.start, span.end);
    assert_eq!(span.to_string(), "0:0");
}
