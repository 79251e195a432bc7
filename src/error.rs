use std::fmt;

/// RAM access outside the configured address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamError {
    pub address: u32,
    pub size: usize,
}

impl fmt::Display for RamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "address {:#06x} out of bounds (ram size {})",
            self.address, self.size
        )
    }
}

impl std::error::Error for RamError {}

/// Fatal CPU faults. A fault halts the CPU (`running` is cleared) before
/// being returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuFault {
    IllegalOpcode { address: u16, opcode: u8 },
    OutOfBounds { address: u16 },
}

impl fmt::Display for CpuFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuFault::IllegalOpcode { address, opcode } => write!(
                f,
                "illegal opcode {:#04x} at {:#06x}",
                opcode, address
            ),
            CpuFault::OutOfBounds { address } => {
                write!(f, "ram access out of bounds at {:#06x}", address)
            }
        }
    }
}

impl std::error::Error for CpuFault {}

impl From<RamError> for CpuFault {
    fn from(err: RamError) -> Self {
        CpuFault::OutOfBounds {
            address: err.address as u16,
        }
    }
}

/// A location in assembly source, attached to `AssemblyError` where cheap
/// to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// Errors surfaced by the lex -> parse -> compile pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    LexError { message: String, at: SourceLocation },
    ParseError { message: String, at: SourceLocation },
    UnknownLabel { name: String },
    UnsupportedOperands { mnemonic: String },
    ProgramTooLarge { size: usize, limit: usize },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyError::LexError { message, at } => {
                write!(f, "lex error at {}:{}: {}", at.line, at.column, message)
            }
            AssemblyError::ParseError { message, at } => {
                write!(f, "parse error at {}:{}: {}", at.line, at.column, message)
            }
            AssemblyError::UnknownLabel { name } => write!(f, "unknown label: {}", name),
            AssemblyError::UnsupportedOperands { mnemonic } => {
                write!(f, "unsupported operand combination for `{}`", mnemonic)
            }
            AssemblyError::ProgramTooLarge { size, limit } => write!(
                f,
                "program too large: {} bytes exceeds limit of {} bytes",
                size, limit
            ),
        }
    }
}

impl std::error::Error for AssemblyError {}

/// Errors surfaced while decoding a TAPE container. A header checksum
/// mismatch is not one of these variants: `tape::decode` only logs a
/// warning and returns the payload anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapeError {
    MalformedTape { len: usize },
    NotATape,
    ProgramTooLarge { size: usize, limit: usize },
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapeError::MalformedTape { len } => {
                write!(f, "tape buffer too short ({} bytes)", len)
            }
            TapeError::NotATape => write!(f, "buffer does not start with the TAPE magic"),
            TapeError::ProgramTooLarge { size, limit } => write!(
                f,
                "payload too large: {} bytes exceeds tape capacity of {} bytes",
                size, limit
            ),
        }
    }
}

impl std::error::Error for TapeError {}
