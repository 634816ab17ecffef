//! Operation set of the target stack machine.
//!
//! The machine is stack-based. Most operations consume operands from the
//! evaluation stack and push results back. Control transfers carry a
//! [`JumpTarget`] which stays symbolic until [`crate::jumps::resolve`] runs.

#![allow(clippy::doc_markdown)]

use std::cell::Cell;
use std::fmt;

use basalt_foundation::SymbolId;

use crate::ast::Literal;

/// Identity of a jump destination placeholder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SentinelId(pub u32);

/// Where a control transfer lands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpTarget {
    /// The `Sentinel` operation with this id, wherever it ends up.
    Pending(SentinelId),
    /// Relative offset from the transferring operation.
    Offset(i32),
}

/// Condition of a jump.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    /// Unconditional.
    Always,
    /// Pops a value, jumps if truthy.
    IfTrue,
    /// Pops a value, jumps if falsy.
    IfFalse,
    /// Pops two values, jumps if numerically equal.
    Eq,
    /// Pops two values, jumps if numerically different.
    Ne,
    /// Pops `[a, b]`, jumps if `a > b`.
    Gt,
    /// Pops `[a, b]`, jumps if `a >= b`.
    Ge,
    /// Pops `[a, b]`, jumps if `a < b`.
    Lt,
    /// Pops `[a, b]`, jumps if `a <= b`.
    Le,
}

/// Stack item types understood by `Convert`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StackItemType {
    /// Any
    Any,
    /// Boolean
    Boolean,
    /// Integer
    Integer,
    /// ByteString
    ByteString,
    /// Buffer
    Buffer,
    /// Array
    Array,
    /// Struct
    Struct,
    /// Map
    Map,
}

/// Call permissions attached to a method token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallFlags(pub u8);

impl CallFlags {
    /// No permissions.
    pub const NONE: CallFlags = CallFlags(0x00);
    /// May read contract state.
    pub const READ_STATES: CallFlags = CallFlags(0x01);
    /// May write contract state.
    pub const WRITE_STATES: CallFlags = CallFlags(0x02);
    /// May call other contracts.
    pub const ALLOW_CALL: CallFlags = CallFlags(0x04);
    /// May emit notifications.
    pub const ALLOW_NOTIFY: CallFlags = CallFlags(0x08);
    /// Read and write state.
    pub const STATES: CallFlags = CallFlags(0x03);
    /// Read state and call.
    pub const READ_ONLY: CallFlags = CallFlags(0x05);
    /// Everything.
    pub const ALL: CallFlags = CallFlags(0x0f);

    /// Parses a flag name as written in annotations.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let flags = match name {
            "None" => Self::NONE,
            "ReadStates" => Self::READ_STATES,
            "WriteStates" => Self::WRITE_STATES,
            "AllowCall" => Self::ALLOW_CALL,
            "AllowNotify" => Self::ALLOW_NOTIFY,
            "States" => Self::STATES,
            "ReadOnly" => Self::READ_ONLY,
            "All" => Self::ALL,
            _ => return None,
        };
        Some(flags)
    }
}

/// A call into a native or deployed contract through the token table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodToken {
    /// Contract script hash, little-endian.
    pub hash: [u8; 20],
    /// Method name.
    pub method: String,
    /// Number of parameters popped by the call.
    pub parameter_count: u16,
    /// Whether the call pushes a result.
    pub has_return_value: bool,
    /// Permissions granted to the callee.
    pub call_flags: CallFlags,
}

/// A single stack-machine operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    // === Constants ===
    /// Push an integer.
    PushInt(i128),
    /// Push a byte string.
    PushData(Vec<u8>),
    /// Push a boolean.
    PushBool(bool),
    /// Push null.
    PushNull,

    // === Flow control ===
    /// No operation.
    Noop,
    /// Addressable destination of pending jumps. Lowers to `NOP`.
    Sentinel(SentinelId),
    /// Conditional or unconditional jump.
    Jump(JumpKind, JumpTarget),
    /// Call a user function.
    Call(SymbolId),
    /// Call through the method token table.
    CallToken(MethodToken),
    /// Call a host service by name.
    Syscall(String),
    /// Enter a protected region.
    Try {
        /// Start of the catch handler.
        catch: Option<JumpTarget>,
        /// Start of the finally handler.
        finally: Option<JumpTarget>,
    },
    /// Leave a protected region, running its finally handler first.
    EndTry(JumpTarget),
    /// End of a finally handler.
    EndFinally,
    /// Pop a value and raise it.
    Throw,
    /// Abort execution unconditionally.
    Abort,

    // === Stack ===
    /// `[a] -> [a, a]`
    Dup,
    /// `[a] -> []`
    Drop,
    /// `[a, b] -> [b]`
    Nip,
    /// `[a, b] -> [a, b, a]`
    Over,
    /// `[a, b] -> [b, a]`
    Swap,
    /// `[a, b, c] -> [b, c, a]`
    Rot,
    /// `[a, b, c] -> [c, b, a]`
    Reverse3,
    /// `[a, b, c, d] -> [d, c, b, a]`
    Reverse4,

    // === Slots ===
    /// Allocate the frame: `locals` local slots and `params` argument slots.
    InitSlot {
        /// Local slot count.
        locals: u8,
        /// Argument slot count.
        params: u8,
    },
    /// Allocate the contract's static slots.
    InitStaticSlot(u8),
    /// Push local slot.
    LoadLocal(u8),
    /// Pop into local slot.
    StoreLocal(u8),
    /// Push argument slot.
    LoadArg(u8),
    /// Pop into argument slot.
    StoreArg(u8),
    /// Push static slot.
    LoadStatic(u8),
    /// Pop into static slot.
    StoreStatic(u8),

    // === Byte strings ===
    /// `[a, b] -> [a ++ b]`
    Cat,
    /// `[a] -> [len(a)]`
    Size,
    /// Convert the top item.
    Convert(StackItemType),
    /// `[a] -> [a == null]`
    IsNull,

    // === Bitwise ===
    /// `[a] -> [~a]`
    Invert,
    /// `[a, b] -> [a & b]`
    And,
    /// `[a, b] -> [a | b]`
    Or,
    /// `[a, b] -> [a ^ b]`
    Xor,
    /// `[a, b] -> [a equals b]` (any item)
    Equal,
    /// `[a, b] -> [a not-equals b]` (any item)
    NotEqual,

    // === Arithmetic ===
    /// `[a] -> [sign(a)]`
    Sign,
    /// `[a] -> [|a|]`
    Abs,
    /// `[a] -> [-a]`
    Negate,
    /// `[a] -> [a + 1]`
    Inc,
    /// `[a] -> [a - 1]`
    Dec,
    /// `[a, b] -> [a + b]`
    Add,
    /// `[a, b] -> [a - b]`
    Sub,
    /// `[a, b] -> [a * b]`
    Mul,
    /// `[a, b] -> [a / b]`
    Div,
    /// `[a, b] -> [a % b]`
    Mod,
    /// `[a, b] -> [a ** b]`
    Pow,
    /// `[a, b] -> [a << b]`
    Shl,
    /// `[a, b] -> [a >> b]`
    Shr,
    /// `[a] -> [!a]`
    Not,
    /// `[a, b] -> [a && b]` (booleans, no short circuit)
    BoolAnd,
    /// `[a, b] -> [a || b]` (booleans, no short circuit)
    BoolOr,
    /// `[a, b] -> [a == b]` (integers)
    NumEqual,
    /// `[a, b] -> [a != b]` (integers)
    NumNotEqual,
    /// `[a, b] -> [a < b]`
    Lt,
    /// `[a, b] -> [a <= b]`
    Le,
    /// `[a, b] -> [a > b]`
    Gt,
    /// `[a, b] -> [a >= b]`
    Ge,

    // === Compound types ===
    /// `[xn .. x1, n] -> [[x1 .. xn]]`
    Pack,
    /// `[xn .. x1, n] -> [struct(x1 .. xn)]`
    PackStruct,
    /// `[] -> [[]]`
    NewArray0,
    /// `[] -> [{}]`
    NewMap,
    /// `[c, k] -> [c[k]]`
    PickItem,
    /// `[c, k, v] -> []`
    SetItem,
    /// `[c, v] -> []`
    Append,
    /// `[c, k] -> [k in c]`
    HasKey,
}

impl Operation {
    /// Returns the jump targets this operation carries.
    #[must_use]
    pub fn targets(&self) -> Vec<JumpTarget> {
        match self {
            Self::Jump(_, target) | Self::EndTry(target) => vec![*target],
            Self::Try { catch, finally } => catch.iter().chain(finally.iter()).copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true if this operation transfers control through a target.
    #[must_use]
    pub fn is_control_transfer(&self) -> bool {
        matches!(self, Self::Jump(..) | Self::EndTry(_) | Self::Try { .. })
    }

    /// Returns true if evaluating this operation twice is unobservable.
    ///
    /// Used to decide whether a receiver may be replayed instead of
    /// duplicated on the stack.
    #[must_use]
    pub fn is_pure_load(&self) -> bool {
        matches!(
            self,
            Self::PushInt(_)
                | Self::PushData(_)
                | Self::PushBool(_)
                | Self::PushNull
                | Self::LoadLocal(_)
                | Self::LoadArg(_)
                | Self::LoadStatic(_)
                | Self::PickItem
                | Self::Noop
        )
    }

    /// Creates the push of a literal's exact value.
    #[must_use]
    pub fn push_literal(literal: &Literal) -> Self {
        match literal {
            Literal::Null | Literal::Undefined => Self::PushNull,
            Literal::Boolean(value) => Self::PushBool(*value),
            Literal::Integer(value) => Self::PushInt(*value),
            Literal::String(value) => Self::push_string(value),
        }
    }

    /// Creates the push of a position or count.
    #[must_use]
    pub fn push_index(index: usize) -> Self {
        Self::PushInt(index as i128)
    }

    /// Creates a push of a UTF-8 string.
    #[must_use]
    pub fn push_string(value: &str) -> Self {
        Self::PushData(value.as_bytes().to_vec())
    }

    /// Creates an unconditional jump to a sentinel.
    #[must_use]
    pub fn jump(sentinel: SentinelId) -> Self {
        Self::Jump(JumpKind::Always, JumpTarget::Pending(sentinel))
    }

    /// Creates a conditional jump to a sentinel.
    #[must_use]
    pub fn jump_if(kind: JumpKind, sentinel: SentinelId) -> Self {
        Self::Jump(kind, JumpTarget::Pending(sentinel))
    }
}

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(id) => write!(f, "@{}", id.0),
            Self::Offset(offset) => write!(f, "{offset:+}"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushInt(value) => write!(f, "PUSHINT {value}"),
            Self::PushData(bytes) => {
                write!(f, "PUSHDATA 0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::PushBool(value) => write!(f, "PUSH{}", if *value { "T" } else { "F" }),
            Self::Sentinel(id) => write!(f, "NOP ; @{}", id.0),
            Self::Jump(kind, target) => {
                let name = match kind {
                    JumpKind::Always => "JMP",
                    JumpKind::IfTrue => "JMPIF",
                    JumpKind::IfFalse => "JMPIFNOT",
                    JumpKind::Eq => "JMPEQ",
                    JumpKind::Ne => "JMPNE",
                    JumpKind::Gt => "JMPGT",
                    JumpKind::Ge => "JMPGE",
                    JumpKind::Lt => "JMPLT",
                    JumpKind::Le => "JMPLE",
                };
                write!(f, "{name} {target}")
            }
            Self::Call(symbol) => write!(f, "CALL #{}", symbol.index()),
            Self::CallToken(token) => write!(
                f,
                "CALLT {}({}) flags={:#04x}",
                token.method, token.parameter_count, token.call_flags.0
            ),
            Self::Syscall(name) => write!(f, "SYSCALL {name}"),
            Self::Try { catch, finally } => {
                write!(f, "TRY")?;
                match catch {
                    Some(target) => write!(f, " {target}")?,
                    None => write!(f, " -")?,
                }
                match finally {
                    Some(target) => write!(f, " {target}"),
                    None => write!(f, " -"),
                }
            }
            Self::EndTry(target) => write!(f, "ENDTRY {target}"),
            Self::InitSlot { locals, params } => write!(f, "INITSLOT {locals} {params}"),
            Self::InitStaticSlot(count) => write!(f, "INITSSLOT {count}"),
            Self::LoadLocal(slot) => write!(f, "LDLOC {slot}"),
            Self::StoreLocal(slot) => write!(f, "STLOC {slot}"),
            Self::LoadArg(slot) => write!(f, "LDARG {slot}"),
            Self::StoreArg(slot) => write!(f, "STARG {slot}"),
            Self::LoadStatic(slot) => write!(f, "LDSFLD {slot}"),
            Self::StoreStatic(slot) => write!(f, "STSFLD {slot}"),
            Self::Convert(ty) => write!(f, "CONVERT {ty:?}"),
            other => write!(f, "{}", format!("{other:?}").to_uppercase()),
        }
    }
}

/// Hands out fresh sentinel ids.
///
/// Shared by reference between the expression and statement compilers, so
/// expression thunks can allocate without needing mutable access.
#[derive(Debug, Default)]
pub struct SentinelAllocator {
    next: Cell<u32>,
}

impl SentinelAllocator {
    /// Creates an allocator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh sentinel id.
    pub fn fresh(&self) -> SentinelId {
        let id = self.next.get();
        self.next.set(id + 1);
        SentinelId(id)
    }

    /// Number of sentinels handed out so far.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.next.get()
    }
}
