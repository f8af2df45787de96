//! Bytecode decoding and encoding
//!
//! ### Structure
//!
//! Method bodies stay as raw bytes inside [the `Code` attribute](crate::jvm::class_file::Code)
//! until something needs to look inside. [`decode`] turns the bytes into a flat list of
//! [`Instruction`]s where every operand that points into the constant pool or at another
//! instruction is explicit, which is all that reference collection and constant relocation need.
//!
//! ### Re-layout
//!
//! Relocating constants into another pool can turn a one byte `ldc` index into a two byte one.
//! Widening `ldc` to `ldc_w` shifts everything after it, so [`assemble`] recomputes instruction
//! offsets (switch padding included), rewrites relative jumps, promotes `goto`/`jsr` to their
//! `_w` forms when needed, and returns an [`OffsetMap`] for fixing up offset-carrying attributes.

mod instruction;
mod layout;
pub mod opcodes;

pub use instruction::*;
pub use layout::*;
