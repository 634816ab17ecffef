//! Configuration for a compilation run.

/// Host call used by event bindings.
pub const NOTIFY_SYSCALL: &str = "System.Runtime.Notify";

/// Configuration for a compilation run.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Lower `+` on two string operands to `CAT` instead of `ADD`.
    pub concat_strings: bool,

    /// Treat a missing declaration needed by an intrinsic as fatal.
    pub require_intrinsics: bool,

    /// Maximum number of argument, local, or static slots per table.
    pub max_slots: usize,

    /// Name of the synthesized static-initializer function.
    pub initializer_name: String,

    /// Host call used to emit events.
    pub notify_syscall: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            concat_strings: true,
            require_intrinsics: true,
            max_slots: usize::from(u8::MAX),
            initializer_name: "_initialize".to_string(),
            notify_syscall: NOTIFY_SYSCALL.to_string(),
        }
    }
}

impl CompilerConfig {
    /// The default configuration: every invariant enforced.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// A configuration for partial library surfaces.
    ///
    /// Intrinsics whose declarations are missing are skipped with a warning.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            require_intrinsics: false,
            ..Self::default()
        }
    }

    /// Builder method to enable/disable string concatenation for `+`.
    #[must_use]
    pub fn with_concat_strings(mut self, enabled: bool) -> Self {
        self.concat_strings = enabled;
        self
    }

    /// Builder method to set intrinsic strictness.
    #[must_use]
    pub fn with_require_intrinsics(mut self, required: bool) -> Self {
        self.require_intrinsics = required;
        self
    }

    /// Builder method to set the slot limit.
    #[must_use]
    pub fn with_max_slots(mut self, limit: usize) -> Self {
        self.max_slots = limit;
        self
    }

    /// Builder method to rename the static initializer.
    #[must_use]
    pub fn with_initializer_name(mut self, name: impl Into<String>) -> Self {
        self.initializer_name = name.into();
        self
    }

    /// Builder method to set the event host call.
    #[must_use]
    pub fn with_notify_syscall(mut self, name: impl Into<String>) -> Self {
        self.notify_syscall = name.into();
        self
    }
}
