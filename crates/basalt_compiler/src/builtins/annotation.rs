//! Annotation recognition.
//!
//! Maps the `@tag text` annotations of a library declaration to the binding
//! strategy they select.

use thiserror::Error;

use super::method_token::{TokenSpec, parse_token};
use crate::ast::Annotation;

/// Tag selecting a host-call binding.
pub const SYSCALL: &str = "syscall";
/// Tag selecting a native-contract method binding.
pub const METHOD_TOKEN: &str = "methodToken";
/// Tag selecting an event binding.
pub const EVENT: &str = "event";
/// Tag selecting a fixed-layout type.
pub const STRUCT: &str = "struct";

/// Binding strategy selected by a declaration's annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Single named host call.
    Syscall(String),
    /// Native-contract call through the token table.
    MethodToken(TokenSpec),
    /// Notification with an explicit or declared name.
    Event(Option<String>),
    /// Positional field layout.
    Struct,
}

impl Strategy {
    /// Tag this strategy was selected by.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Syscall(_) => SYSCALL,
            Self::MethodToken(_) => METHOD_TOKEN,
            Self::Event(_) => EVENT,
            Self::Struct => STRUCT,
        }
    }
}

/// Malformed or misplaced annotations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnnotationError {
    /// The tag needs text and has none.
    #[error("@{tag} requires an argument")]
    MissingText {
        /// Offending tag.
        tag: &'static str,
    },

    /// The contract hash is not 20 hex-encoded bytes.
    #[error("invalid contract hash '{0}'")]
    InvalidHash(String),

    /// The call-flags word is not a known flag name.
    #[error("unknown call flags '{0}'")]
    UnknownFlags(String),

    /// The method token text has trailing words.
    #[error("unexpected '{0}' in @methodToken")]
    TrailingText(String),

    /// Two strategy tags on one declaration.
    #[error("conflicting annotations @{first} and @{second}")]
    Conflict {
        /// First recognized tag.
        first: &'static str,
        /// Second recognized tag.
        second: &'static str,
    },

    /// The tag does not apply to this kind of declaration.
    #[error("@{tag} cannot be applied to {target}")]
    UnsupportedTarget {
        /// Offending tag.
        tag: &'static str,
        /// Description of the declaration.
        target: &'static str,
    },
}

/// Selects the strategy named by `annotations`, if any.
///
/// Unrecognized tags are ignored.
pub fn strategy(annotations: &[Annotation]) -> Result<Option<Strategy>, AnnotationError> {
    let mut selected: Option<Strategy> = None;
    for annotation in annotations {
        let Some(found) = recognize(annotation)? else {
            continue;
        };
        if let Some(first) = &selected {
            return Err(AnnotationError::Conflict {
                first: first.tag(),
                second: found.tag(),
            });
        }
        selected = Some(found);
    }
    Ok(selected)
}

fn recognize(annotation: &Annotation) -> Result<Option<Strategy>, AnnotationError> {
    let text = annotation.text.as_deref();
    let strategy = match annotation.tag.as_str() {
        SYSCALL => {
            let name = text.ok_or(AnnotationError::MissingText { tag: SYSCALL })?;
            Strategy::Syscall(name.to_string())
        }
        METHOD_TOKEN => {
            let text = text.ok_or(AnnotationError::MissingText { tag: METHOD_TOKEN })?;
            Strategy::MethodToken(parse_token(text)?)
        }
        EVENT => Strategy::Event(text.map(str::to_string)),
        STRUCT => Strategy::Struct,
        _ => return Ok(None),
    };
    Ok(Some(strategy))
}
