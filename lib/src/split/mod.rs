//! Split Minecraft jars into a common jar and a client-only jar
//!
//! Three situations are handled:
//!
//!   - [`split_legacy`]: old versions ship a client jar and a server jar that are both complete
//!     programs. Classes in both are merged member by member, and whatever exists only in the
//!     client goes to the client-only jar.
//!
//!   - [`split_merged`]: a single patched jar with client and server code mixed. Classes are
//!     classified through a [`NameOracle`] and the common jar is the closure of everything
//!     reachable from server classes.
//!
//!   - [`split_bundled_client`]: newer versions where the server jar is a strict subset of the
//!     client. Only the client-only part needs producing.

mod bundled;
mod errors;
mod legacy;
mod mappings;
mod merge;
mod oracle;
mod reachability;
mod report;
mod settings;

pub use bundled::*;
pub use errors::*;
pub use legacy::*;
pub use mappings::*;
pub use merge::*;
pub use oracle::*;
pub use reachability::*;
pub use report::*;
pub use settings::*;
