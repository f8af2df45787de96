//! Read, edit, and write JVM class files
//!
//! The model stays close to the binary format: a [`class_file::ClassFile`] owns its constant
//! pool, and members, attributes, and instructions refer to constants by index. Only the parts
//! that splitting needs are decoded (member names and descriptors, annotations, and method bodies
//! when a member moves between classes).
//!
//! ### Simple example
//!
//! ```
//! use codev_split::jvm::class_file::{ClassFile, Version};
//! use codev_split::jvm::*;
//!
//! # fn generate_class() -> Result<(), Error> {
//! let mut class = ClassFile::new(
//!     Version::JAVA17,
//!     ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
//!     "net/minecraft/client/Minecraft",
//!     Some("java/lang/Object"),
//! )?;
//! class.add_field(FieldAccessFlags::PRIVATE, "instance", "Lnet/minecraft/client/Minecraft;")?;
//! class.add_invisible_annotation("Lnet/msrandom/minecraftcodev/annotations/UnsafeForCommon;")?;
//!
//! let bytes = class.to_bytes()?;
//! let parsed = ClassFile::parse(&bytes)?;
//! assert_eq!(parsed.name()?, "net/minecraft/client/Minecraft");
//! # Ok(())
//! # }
//! # generate_class().unwrap();
//! ```

mod access_flags;
mod binary_format;
pub mod class_file;
pub mod code;
mod descriptors;
mod errors;
mod names;
pub mod relocate;

pub use access_flags::*;
pub use binary_format::*;
pub use descriptors::*;
pub use errors::*;
pub use names::*;
