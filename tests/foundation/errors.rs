//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use basalt_foundation::{Error, ErrorContext, ErrorKind, SlotKind, Span};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_missing_sentinel() {
    let err = Error::missing_sentinel(3);
    assert!(matches!(err.kind, ErrorKind::MissingSentinel { sentinel: 3 }));
    assert!(err.context.is_none());
}

#[test]
fn error_jump_out_of_range() {
    let err = Error::jump_out_of_range(i64::from(i32::MAX) + 1);
    assert!(matches!(err.kind, ErrorKind::JumpOutOfRange { .. }));
    assert!(format!("{err}").contains("2147483648"));
}

#[test]
fn error_missing_library_declaration() {
    let err = Error::missing_library_declaration("ErrorConstructor");
    assert!(matches!(
        err.kind,
        ErrorKind::MissingLibraryDeclaration(ref name) if name == "ErrorConstructor"
    ));
}

#[test]
fn error_slot_overflow() {
    let err = Error::slot_overflow(SlotKind::Static, 256, 255);
    let msg = format!("{err}");
    assert!(msg.contains("static"));
    assert!(msg.contains("256"));
}

#[test]
fn error_internal() {
    let err = Error::internal("sentinel 4 emitted twice");
    assert!(matches!(err.kind, ErrorKind::Internal(_)));
    assert!(format!("{err}").starts_with("internal error"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_carries_function_name() {
    let err = Error::slot_overflow(SlotKind::Local, 3, 2)
        .with_context(ErrorContext::new().with_source("transfer"));
    let ctx = err.context.unwrap();
    assert_eq!(ctx.source.as_deref(), Some("transfer"));
    assert!(ctx.stack.is_empty());
}

#[test]
fn context_display() {
    let ctx = ErrorContext::new()
        .with_source("balanceOf")
        .with_span(Span::new(40, 52, 4, 9))
        .with_frame("binding parameters")
        .with_frame("resolving jumps");
    let msg = format!("{ctx}");
    assert!(msg.starts_with("in balanceOf at 4:9"));
    assert!(msg.contains("while binding parameters"));
    assert!(msg.contains("while resolving jumps"));
}

#[test]
fn slot_kinds_display() {
    assert_eq!(SlotKind::Argument.to_string(), "argument");
    assert_eq!(SlotKind::Local.to_string(), "local");
    assert_eq!(SlotKind::Static.to_string(), "static");
}
