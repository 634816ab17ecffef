//! Fatal error types for basalt.
//!
//! These cover compiler and library-surface defects that abort a whole
//! compilation. User mistakes are reported as diagnostics by the compiler
//! crate instead and never reach this type.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::Span;

/// Convenience alias for results carrying a fatal [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The fatal error type for basalt compilations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a missing jump sentinel error.
    #[must_use]
    pub fn missing_sentinel(sentinel: u32) -> Self {
        Self::new(ErrorKind::MissingSentinel { sentinel })
    }

    /// Creates a jump offset overflow error.
    #[must_use]
    pub fn jump_out_of_range(offset: i64) -> Self {
        Self::new(ErrorKind::JumpOutOfRange { offset })
    }

    /// Creates a missing library declaration error.
    #[must_use]
    pub fn missing_library_declaration(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingLibraryDeclaration(name.into()))
    }

    /// Creates a slot overflow error.
    #[must_use]
    pub fn slot_overflow(kind: SlotKind, count: usize, limit: usize) -> Self {
        Self::new(ErrorKind::SlotOverflow { kind, count, limit })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A jump references a sentinel that was never emitted.
    #[error("jump target sentinel #{sentinel} was never emitted")]
    MissingSentinel {
        /// The dangling sentinel id.
        sentinel: u32,
    },

    /// A resolved jump offset does not fit the operand.
    #[error("jump offset {offset} out of range")]
    JumpOutOfRange {
        /// The offending offset.
        offset: i64,
    },

    /// A builtin requires a library declaration that is not present.
    #[error("library declaration not found: {0}")]
    MissingLibraryDeclaration(String),

    /// A frame needs more slots than the machine supports.
    #[error("too many {kind} slots: {count} (limit {limit})")]
    SlotOverflow {
        /// Which slot table overflowed.
        kind: SlotKind,
        /// Number of slots requested.
        count: usize,
        /// Maximum allowed.
        limit: usize,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Slot tables of a stack-machine frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Function arguments.
    Argument,
    /// Function locals.
    Local,
    /// Contract statics.
    Static,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument => write!(f, "argument"),
            Self::Local => write!(f, "local"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Function or declaration being compiled.
    pub source: Option<String>,
    /// Where the declaration starts in source.
    pub span: Option<Span>,
    /// Enclosing compilation stages, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            span: None,
            stack: Vec::new(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the source position.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
            if let Some(span) = self.span {
                write!(f, " at {span}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  while {frame}")?;
            }
        }
        Ok(())
    }
}
