//! Split Minecraft jars into a common jar and a client-only jar
//!
//! Minecraft ships a client and a server that share most of their code. Depending on the common
//! part and the client-only part separately needs those parts as jars of their own. This crate
//! produces them, either from the vanilla client and server jars ([`split::split_legacy`],
//! [`split::split_bundled_client`]) or from a patched jar mixing both
//! ([`split::split_merged`]).
//!
//! The pieces underneath are usable on their own:
//!
//!   - [`jvm`] reads, edits, and writes class files, including copying members between classes
//!   - [`references`] lists the classes a class or method refers to
//!   - [`archive`] wraps zip files, releases groups of them together, and handles the manifest
//!     marker that identifies produced jars

pub mod archive;
pub mod jvm;
pub mod references;
pub mod split;
