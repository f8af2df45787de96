use crate::jvm::BinaryName;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// Outcome of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    pub common: PathBuf,
    pub client: PathBuf,

    /// Number of classes written to each output
    pub common_classes: usize,
    pub client_classes: usize,

    /// Client-only classes also written to the common jar because common code refers to them
    pub closure: BTreeSet<BinaryName>,

    /// References from common classes to classes known to be client-only
    pub inconsistencies: Vec<InconsistentClassification>,
}

/// A class placed in the common jar refers to a class whose origin is the client jar
///
/// The referencing class stays common but nothing more is pulled in through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InconsistentClassification {
    pub referencing: BinaryName,
    pub referenced: BinaryName,
}

impl Display for InconsistentClassification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "common class {} refers to client class {}",
            self.referencing, self.referenced
        )
    }
}
