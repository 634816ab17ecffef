//! `@methodToken` bindings: native-contract calls through the token table.

use basalt_foundation::SymbolId;

use super::annotation::{AnnotationError, METHOD_TOKEN};
use super::{Receiver, host_function, host_member};
use crate::ast::{MemberDeclaration, MemberKind, NodeRef, Signature};
use crate::cto::{CompileTimeObject, PropertyResolver};
use crate::operation::{CallFlags, MethodToken, Operation};

/// A parsed `@methodToken` annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenSpec {
    /// Contract script hash, little-endian.
    pub hash: [u8; 20],
    /// Method name on the contract.
    pub method: String,
    /// Permissions granted to the callee.
    pub call_flags: CallFlags,
}

impl TokenSpec {
    /// Builds the call token for a call pushing `parameter_count` values.
    #[must_use]
    pub fn token(&self, parameter_count: usize, has_return_value: bool) -> MethodToken {
        MethodToken {
            hash: self.hash,
            method: self.method.clone(),
            parameter_count: u16::try_from(parameter_count).unwrap_or(u16::MAX),
            has_return_value,
            call_flags: self.call_flags,
        }
    }
}

/// Parses `0x<hash> <method> [Flags]`.
///
/// The hash is written big-endian, as contract hashes are displayed, and
/// stored little-endian. Flags default to `All`.
pub fn parse_token(text: &str) -> Result<TokenSpec, AnnotationError> {
    let mut words = text.split_whitespace();
    let hash_text = words
        .next()
        .ok_or(AnnotationError::MissingText { tag: METHOD_TOKEN })?;
    let method = words
        .next()
        .ok_or(AnnotationError::MissingText { tag: METHOD_TOKEN })?;
    let call_flags = match words.next() {
        Some(name) => {
            CallFlags::from_name(name).ok_or_else(|| AnnotationError::UnknownFlags(name.into()))?
        }
        None => CallFlags::ALL,
    };
    if let Some(extra) = words.next() {
        return Err(AnnotationError::TrailingText(extra.to_string()));
    }

    let digits = hash_text
        .strip_prefix("0x")
        .or_else(|| hash_text.strip_prefix("0X"))
        .unwrap_or(hash_text);
    let mut bytes =
        hex::decode(digits).map_err(|_| AnnotationError::InvalidHash(hash_text.into()))?;
    bytes.reverse();
    let hash: [u8; 20] = bytes
        .try_into()
        .map_err(|_| AnnotationError::InvalidHash(hash_text.into()))?;

    Ok(TokenSpec {
        hash,
        method: method.to_string(),
        call_flags,
    })
}

/// `declare function f(...)` calling a native contract method.
pub(super) fn function(
    symbol: SymbolId,
    node: Option<NodeRef>,
    label: &str,
    signature: &Signature,
    spec: &TokenSpec,
) -> CompileTimeObject {
    let token = spec.token(
        signature.params.len(),
        !signature.return_type.is_void_like(),
    );
    host_function(symbol, node, label, signature, Operation::CallToken(token))
}

/// `declare const x: T` read through a parameterless contract method.
pub(super) fn variable(
    symbol: SymbolId,
    node: Option<NodeRef>,
    spec: &TokenSpec,
) -> CompileTimeObject {
    let token = spec.token(0, true);
    CompileTimeObject::new(symbol, node).with_load(vec![Operation::CallToken(token)])
}

/// Interface member calling a native contract method.
pub(super) fn member(
    label: &str,
    member: &MemberDeclaration,
    receiver: Receiver,
    spec: &TokenSpec,
) -> PropertyResolver {
    let leading = usize::from(receiver == Receiver::Leading);
    let token = match &member.kind {
        MemberKind::Property { .. } => spec.token(leading, true),
        MemberKind::Method(signature) => spec.token(
            signature.params.len() + leading,
            !signature.return_type.is_void_like(),
        ),
    };
    host_member(label, member, receiver, Operation::CallToken(token))
}
