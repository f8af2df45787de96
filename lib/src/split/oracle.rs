use crate::archive::ZipFileSystem;
use crate::jvm::BinaryName;

/// Maps a class name from a merged archive back to its name in the vanilla archives
///
/// `None` means the class is not vanilla (a mod loader added it). Closures work as oracles:
///
/// ```
/// use codev_split::jvm::BinaryName;
/// use codev_split::split::NameOracle;
///
/// let identity = |name: &BinaryName| Some(name.clone());
/// let name = BinaryName::from_string(String::from("net/minecraft/a")).unwrap();
/// assert_eq!(identity.original_name(&name), Some(name));
/// ```
pub trait NameOracle {
    fn original_name(&self, name: &BinaryName) -> Option<BinaryName>;
}

impl<F> NameOracle for F
where
    F: Fn(&BinaryName) -> Option<BinaryName>,
{
    fn original_name(&self, name: &BinaryName) -> Option<BinaryName> {
        self(name)
    }
}

/// Where a class of a merged archive came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The vanilla client jar
    Client,

    /// The vanilla server jar
    Server,

    /// Neither, eg. injected by a mod loader
    Modded,
}

/// Vanilla name of a class, falling back to its enclosing classes
///
/// Mappings often omit anonymous and local classes, which share the fate of their outer class.
pub fn working_name(oracle: &dyn NameOracle, name: &BinaryName) -> Option<BinaryName> {
    let mut current = name.clone();
    loop {
        if let Some(original) = oracle.original_name(&current) {
            return Some(original);
        }
        current = current.outer_class()?;
    }
}

/// Classify a class by looking its vanilla name up in the server jar
pub fn classify(oracle: &dyn NameOracle, name: &BinaryName, server: &ZipFileSystem) -> Origin {
    match working_name(oracle, name) {
        None => Origin::Modded,
        Some(original) if server.exists(&original.class_file_name()) => Origin::Server,
        Some(_) => Origin::Client,
    }
}
