//! User-facing diagnostics.
//!
//! Lowering never aborts on a user mistake. Failures are collected as
//! [`ParseError`]s and compilation continues with the next independent
//! sibling (argument, statement, declaration).

use thiserror::Error;

use crate::ast::NodeRef;

/// A diagnostic tied to an optional source node.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}{}", location(.node))]
pub struct ParseError {
    /// Human-readable description.
    pub message: String,
    /// Node the problem was found at.
    pub node: Option<NodeRef>,
}

impl ParseError {
    /// Creates a diagnostic at a node.
    #[must_use]
    pub fn new(message: impl Into<String>, node: NodeRef) -> Self {
        Self {
            message: message.into(),
            node: Some(node),
        }
    }

    /// Creates a diagnostic without a node; the nearest enclosing node is
    /// attached as it propagates.
    #[must_use]
    pub fn detached(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node: None,
        }
    }

    /// Attaches `node` unless a more precise one is already present.
    #[must_use]
    pub fn or_node(mut self, node: NodeRef) -> Self {
        if self.node.is_none() {
            self.node = Some(node);
        }
        self
    }
}

fn location(node: &Option<NodeRef>) -> String {
    node.map(|node| format!(" at {}", node.span)).unwrap_or_default()
}

/// Result of lowering a construct: the value, or every independent failure.
pub type Outcome<T> = Result<T, Vec<ParseError>>;

impl From<ParseError> for Vec<ParseError> {
    fn from(error: ParseError) -> Self {
        vec![error]
    }
}

/// Attaches `node` to every detached diagnostic of a failed outcome.
pub fn at_node<T>(outcome: Outcome<T>, node: NodeRef) -> Outcome<T> {
    outcome.map_err(|errors| errors.into_iter().map(|e| e.or_node(node)).collect())
}

/// Runs every item, collecting all successes or all failures.
///
/// Unlike `collect::<Result<Vec<_>, _>>()`, a failing item does not stop
/// the remaining ones from being attempted.
pub fn accumulate<T, I>(items: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = Outcome<T>>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for item in items {
        match item {
            Ok(value) => values.push(value),
            Err(mut errs) => errors.append(&mut errs),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}
