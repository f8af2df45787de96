use super::class_file::{Constant, ConstantIndex};
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug)]
pub enum Error {
    /// Bytes are not a well-formed class file (bad magic, truncation, trailing data, inconsistent
    /// constant pool indices, unknown opcodes)
    MalformedClass(String),

    /// Adding a constant would push the pool past its `u16` index space
    ConstantPoolOverflow {
        constant: Constant,
        offset: usize,
    },

    /// Constant pool index is out of bounds, zero, or points at the unusable slot after a wide
    /// constant
    MissingConstant(ConstantIndex),

    /// Constant exists but has the wrong kind for its use site
    UnexpectedConstant {
        index: ConstantIndex,
        expected: &'static str,
    },

    /// A conditional branch no longer fits in a signed 16-bit offset after code was re-laid out
    BranchOffsetOverflow {
        offset: u32,
        target: u32,
    },

    /// Re-laid out method body is longer than the 65535 bytes a `Code` attribute may hold
    MethodCodeOverflow(usize),

    /// A descriptor string could not be parsed
    BadDescriptor(String),

    IoError(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::MalformedClass(msg) => write!(f, "malformed class: {}", msg),
            Error::ConstantPoolOverflow { constant, offset } => write!(
                f,
                "constant pool overflow inserting {:?} at offset {}",
                constant, offset
            ),
            Error::MissingConstant(index) => write!(f, "missing constant #{}", index.0),
            Error::UnexpectedConstant { index, expected } => {
                write!(f, "constant #{} is not a {}", index.0, expected)
            }
            Error::BranchOffsetOverflow { offset, target } => write!(
                f,
                "branch at {} to {} does not fit in a 16-bit offset",
                offset, target
            ),
            Error::MethodCodeOverflow(len) => {
                write!(f, "method code of {} bytes exceeds the 65535 byte limit", len)
            }
            Error::BadDescriptor(msg) => write!(f, "bad descriptor: {}", msg),
            Error::IoError(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

/// Reading a class always goes through an in-memory cursor, so any IO error while decoding means
/// the bytes ran out or were otherwise unusable.
pub(crate) fn malformed(err: std::io::Error) -> Error {
    Error::MalformedClass(err.to_string())
}
