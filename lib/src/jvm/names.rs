use std::borrow::Cow;
use std::fmt::{Debug, Display, Error as FmtError, Formatter};

/// Internal name of a class or interface (`net/minecraft/client/Minecraft`)
///
/// Obfuscated archives use very short and sometimes unusual names, so the only names rejected are
/// ones that could not possibly be a class (empty, or containing descriptor syntax).
///
/// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.1>
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BinaryName(Cow<'static, str>);

/// Extracts the raw underlying string name
impl AsRef<str> for BinaryName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl BinaryName {
    pub const OBJECT: BinaryName = BinaryName(Cow::Borrowed("java/lang/Object"));

    /// Check if a string would be a valid binary name
    pub fn check_valid(name: impl AsRef<str>) -> Result<(), String> {
        let name = name.as_ref();
        if name.is_empty() {
            Err(String::from("Binary name is empty"))
        } else if name.contains(&[';', '[', '.'][..]) {
            Err(format!("Binary name '{}' contains an illegal character", name))
        } else if name.split('/').any(str::is_empty) {
            Err(format!("Binary name '{}' has an empty segment", name))
        } else {
            Ok(())
        }
    }

    /// Try to construct a name from a string
    pub fn from_string(name: String) -> Result<BinaryName, String> {
        BinaryName::check_valid(&name)?;
        Ok(BinaryName(Cow::Owned(name)))
    }

    /// Recover the class name from an archive entry path (`a/b/C.class`)
    pub fn from_class_file_name(path: &str) -> Option<BinaryName> {
        let name = path.strip_prefix('/').unwrap_or(path).strip_suffix(".class")?;
        BinaryName::from_string(name.to_owned()).ok()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    /// Archive entry path of the class (`a/b/C.class`)
    pub fn class_file_name(&self) -> String {
        format!("{}.class", self.as_str())
    }

    /// Enclosing class name, assuming the usual `Outer$Inner` naming convention
    pub fn outer_class(&self) -> Option<BinaryName> {
        let (outer, _) = self.as_str().rsplit_once('$')?;
        BinaryName::from_string(outer.to_owned()).ok()
    }
}

impl Debug for BinaryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.0.as_ref())
    }
}

impl Display for BinaryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.0.as_ref())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn class_file_names() {
        let name = BinaryName::from_class_file_name("net/minecraft/a$b.class").unwrap();
        assert_eq!(name.as_str(), "net/minecraft/a$b");
        assert_eq!(name.class_file_name(), "net/minecraft/a$b.class");
        assert_eq!(name.outer_class().unwrap().as_str(), "net/minecraft/a");
        assert_eq!(BinaryName::from_class_file_name("assets/lang/en_us.json"), None);
    }

    #[test]
    fn rejects_descriptor_syntax() {
        assert!(BinaryName::from_string(String::from("[I")).is_err());
        assert!(BinaryName::from_string(String::from("Lfoo;")).is_err());
        assert!(BinaryName::from_string(String::from("a//b")).is_err());
        assert!(BinaryName::from_string(String::from("a")).is_ok());
    }
}
