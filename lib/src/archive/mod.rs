//! Zip archives (jars) viewed as flat trees of named entries
//!
//! Input archives are read in place. Output archives are built up in memory and only written to
//! disk when released, with entries in a deterministic order, so that splitting the same inputs
//! twice produces byte-identical jars.

mod assets;
mod errors;
mod manifest;
mod scope;
mod zip_fs;

pub use assets::*;
pub use errors::*;
pub use manifest::*;
pub use scope::*;
pub use zip_fs::*;

/// Compression of written archives, see [`ZipFileSystem::create`]
pub use zip::CompressionMethod;
