//! Hand-coded bindings the annotation table cannot express.
//!
//! Each intrinsic attaches to a library declaration found by name. Byte
//! strings are the machine's native string representation, so most of
//! these are a receiver followed by one or two operations.

use std::sync::Arc;

use basalt_foundation::{Result, TypeKey};

use super::{Installer, interface_key};
use crate::ast::LibraryDeclaration;
use crate::cto::{
    CompileTimeObject, PropertyResolver, check_arity, discard, evaluate_arguments,
    property_resolver,
};
use crate::diagnostic::{Outcome, ParseError};
use crate::operation::{Operation, StackItemType};

pub(super) fn install(installer: &mut Installer<'_>) -> Result<()> {
    byte_string_constructor(installer)?;
    byte_string(installer)?;
    string(installer)?;
    array(installer)?;
    error_constructor(installer)
}

/// Decodes the text of a hex literal, with or without a `0x` prefix.
pub fn decode_hex_literal(text: &str) -> std::result::Result<Vec<u8>, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.len() % 2 != 0 {
        return Err(format!("hex literal '{text}' has an odd number of digits"));
    }
    hex::decode(digits).map_err(|_| format!("'{text}' is not a hex literal"))
}

// =============================================================================
// Declarations
// =============================================================================

fn byte_string_constructor(installer: &mut Installer<'_>) -> Result<()> {
    let Some(decl) = interface(installer, "ByteStringConstructor")? else {
        return Ok(());
    };
    attach(installer, decl, "fromHex", static_method("ByteString.fromHex", 1, from_hex))?;
    attach(installer, decl, "fromString", static_method("ByteString.fromString", 1, |mut args| {
        Ok(args.remove(0))
    }))?;
    attach(installer, decl, "fromInteger", static_method("ByteString.fromInteger", 1, |mut args| {
        let mut ops = args.remove(0);
        ops.push(Operation::Convert(StackItemType::ByteString));
        Ok(ops)
    }))
}

fn byte_string(installer: &mut Installer<'_>) -> Result<()> {
    let Some(decl) = interface(installer, "ByteString")? else {
        return Ok(());
    };
    attach(installer, decl, "length", getter(vec![Operation::Size]))?;
    attach(installer, decl, "asInteger", instance_method("ByteString.asInteger", 0, |mut ops, _| {
        ops.push(Operation::Convert(StackItemType::Integer));
        Ok(ops)
    }))?;
    attach(installer, decl, "concat", instance_method("ByteString.concat", 1, |mut ops, args| {
        ops.extend(args.into_iter().flatten());
        ops.push(Operation::Cat);
        Ok(ops)
    }))
}

fn string(installer: &mut Installer<'_>) -> Result<()> {
    let Some(decl) = interface(installer, "String")? else {
        return Ok(());
    };
    attach(installer, decl, "length", getter(vec![Operation::Size]))
}

fn array(installer: &mut Installer<'_>) -> Result<()> {
    let Some(decl) = interface(installer, "Array")? else {
        return Ok(());
    };
    attach(installer, decl, "length", getter(vec![Operation::Size]))?;
    attach(installer, decl, "push", instance_method("Array.push", 1, |mut ops, args| {
        ops.extend(args.into_iter().flatten());
        ops.push(Operation::Append);
        Ok(ops)
    }))
}

/// `Error(message)` and `new Error(message)` evaluate to the message.
fn error_constructor(installer: &mut Installer<'_>) -> Result<()> {
    if interface(installer, "ErrorConstructor")?.is_none() {
        return Ok(());
    }
    let Some(symbol) = installer.declaration_named("Error").map(|decl| decl.symbol) else {
        return installer.missing("Error");
    };
    let Some(object) = installer.object_mut(symbol) else {
        return installer.missing("Error");
    };
    let call = CompileTimeObject::value().with_call(|_receiver, args| {
        check_arity("Error", 0, 1, args.len())?;
        let mut groups = evaluate_arguments(args)?;
        Ok(groups.pop().unwrap_or_else(|| vec![Operation::push_string("")]))
    });
    object.call = call.call;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn interface<'a>(installer: &Installer<'a>, name: &str) -> Result<Option<&'a LibraryDeclaration>> {
    match installer.declaration_named(name) {
        Some(decl) if decl.interface_type().is_some() => Ok(Some(decl)),
        _ => installer.missing(name).map(|()| None),
    }
}

fn attach(
    installer: &mut Installer<'_>,
    decl: &LibraryDeclaration,
    member: &str,
    resolver: PropertyResolver,
) -> Result<()> {
    let Some(type_id) = decl.interface_type() else {
        return installer.missing(&decl.name);
    };
    let Some(declared) = decl.member(member) else {
        return installer.missing(&format!("{}.{member}", decl.name));
    };
    let key: TypeKey = interface_key(&decl.name, type_id);
    installer.add_member(key, declared.symbol, resolver);
    Ok(())
}

/// Property computed from the receiver.
fn getter(tail: Vec<Operation>) -> PropertyResolver {
    let value = Arc::new(CompileTimeObject::value());
    property_resolver(move |this| {
        let mut ops = this()?;
        ops.extend(tail.iter().cloned());
        Ok((ops, Arc::clone(&value)))
    })
}

/// Method of a singleton surface; `lower` receives the compiled arguments
/// in source order.
fn static_method<F>(label: &'static str, arity: usize, lower: F) -> PropertyResolver
where
    F: Fn(Vec<Vec<Operation>>) -> Outcome<Vec<Operation>> + Send + Sync + 'static,
{
    let method = Arc::new(CompileTimeObject::value().with_call(move |discarded, args| {
        check_arity(label, arity, arity, args.len())?;
        let mut ops = discarded()?;
        ops.extend(lower(evaluate_arguments(args)?)?);
        Ok(ops)
    }));
    property_resolver(move |this| Ok((discard(this), Arc::clone(&method))))
}

/// Method of an instance; `lower` receives the compiled receiver and the
/// compiled arguments in source order.
fn instance_method<F>(label: &'static str, arity: usize, lower: F) -> PropertyResolver
where
    F: Fn(Vec<Operation>, Vec<Vec<Operation>>) -> Outcome<Vec<Operation>> + Send + Sync + 'static,
{
    let method = Arc::new(CompileTimeObject::value().with_call(move |this, args| {
        check_arity(label, arity, arity, args.len())?;
        let receiver = this()?;
        lower(receiver, evaluate_arguments(args)?)
    }));
    property_resolver(move |this| Ok((this()?, Arc::clone(&method))))
}

/// `ByteString.fromHex("0x..")`: decoded at compile time into one push.
fn from_hex(args: Vec<Vec<Operation>>) -> Outcome<Vec<Operation>> {
    let ops = args.concat();
    let [Operation::PushData(text)] = ops.as_slice() else {
        return Err(ParseError::detached("ByteString.fromHex requires a string literal").into());
    };
    let text = String::from_utf8(text.clone())
        .map_err(|_| ParseError::detached("ByteString.fromHex requires a string literal"))?;
    let bytes = decode_hex_literal(&text).map_err(ParseError::detached)?;
    Ok(vec![Operation::PushData(bytes)])
}
