//! Field access by position (`@struct`) or by name.

use std::sync::Arc;

use basalt_foundation::TypeKey;

use crate::ast::{MemberDeclaration, MemberKind};
use crate::cto::{CompileTimeObject, CompileTimeType, PropertyMap, PropertyResolver, property_resolver};
use crate::operation::Operation;

/// Member table of a fixed-layout type.
///
/// Properties are numbered in declaration order; methods take no slot.
pub(super) fn struct_type(key: TypeKey, members: &[MemberDeclaration]) -> CompileTimeType {
    let mut properties = PropertyMap::new();
    let mut layout = Vec::new();
    for member in members {
        if let MemberKind::Property { readonly, .. } = member.kind {
            properties.insert(member.symbol, positional(layout.len(), readonly));
            layout.push(member.symbol);
        }
    }
    CompileTimeType::new(key, properties).with_layout(layout)
}

/// Field at `index` of a struct.
pub(super) fn positional(index: usize, readonly: bool) -> PropertyResolver {
    field(Operation::push_index(index), readonly)
}

/// Entry `name` of a map-shaped object.
pub(super) fn keyed(name: &str, readonly: bool) -> PropertyResolver {
    field(Operation::push_string(name), readonly)
}

fn field(key: Operation, readonly: bool) -> PropertyResolver {
    let mut value = CompileTimeObject::value();
    if !readonly {
        let key = key.clone();
        value = value.with_store(move |value, container| {
            let mut ops = container;
            ops.push(key.clone());
            ops.extend(value);
            ops.push(Operation::SetItem);
            Ok(ops)
        });
    }
    let value = Arc::new(value);

    property_resolver(move |this| {
        let mut ops = this()?;
        ops.push(key.clone());
        ops.push(Operation::PickItem);
        Ok((ops, Arc::clone(&value)))
    })
}
