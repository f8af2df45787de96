use super::{Error, Release, ZipFileSystem};
use std::path::Path;
use zip::CompressionMethod;

/// Main attribute stamped on jars produced by this toolchain
pub const MINECRAFT_MARKER_ATTRIBUTE: &str = "Codev-Minecraft-Marker";

/// Main attribute recording the mapping namespace of a produced jar
pub const MAPPING_NAMESPACE_ATTRIBUTE: &str = "Codev-Mapping-Namespace";

/// Jar manifest (`META-INF/MANIFEST.MF`)
///
/// Only the main section is interpreted. Per-entry sections are kept as they were read and
/// written back unchanged. Attribute names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    main: Vec<(String, String)>,
    sections: Vec<Vec<(String, String)>>,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest::new()
    }
}

impl Manifest {
    pub const PATH: &'static str = "META-INF/MANIFEST.MF";

    /// Longest line a manifest may contain, in bytes (not counting the line break)
    const LINE_LIMIT: usize = 72;

    /// Empty manifest with just a `Manifest-Version`
    pub fn new() -> Manifest {
        Manifest {
            main: vec![(String::from("Manifest-Version"), String::from("1.0"))],
            sections: vec![],
        }
    }

    /// Parse a manifest, tolerating malformed lines (they are skipped)
    pub fn parse(bytes: &[u8]) -> Manifest {
        let text = String::from_utf8_lossy(bytes);
        let mut main = None;
        let mut sections = vec![];
        let mut current: Vec<(String, String)> = vec![];
        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                if main.is_none() {
                    main = Some(std::mem::take(&mut current));
                } else if !current.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
            } else if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = current.last_mut() {
                    value.push_str(continuation);
                }
            } else if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                current.push((name.to_owned(), value.to_owned()));
            }
        }
        if main.is_none() {
            main = Some(current);
        } else if !current.is_empty() {
            sections.push(current);
        }
        Manifest {
            main: main.unwrap_or_default(),
            sections,
        }
    }

    pub fn main_attribute(&self, name: &str) -> Option<&str> {
        self.main
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a main attribute, replacing an existing value in place
    pub fn set_main_attribute(&mut self, name: &str, value: &str) {
        match self.main.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => self.main.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Serialize with CRLF line endings and lines folded at 72 bytes
    ///
    /// `Manifest-Version` always comes first in the main section.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        let version = self
            .main
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case("Manifest-Version"));
        let others = self
            .main
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("Manifest-Version"));
        for (name, value) in version.chain(others) {
            write_line(&mut out, name, value);
        }
        out.push_str("\r\n");

        for section in &self.sections {
            for (name, value) in section {
                write_line(&mut out, name, value);
            }
            out.push_str("\r\n");
        }
        out.into_bytes()
    }

    /// Read the manifest of an archive, if it has one
    pub fn read_from(fs: &mut ZipFileSystem) -> Result<Option<Manifest>, Error> {
        if !fs.exists(Manifest::PATH) {
            return Ok(None);
        }
        Ok(Some(Manifest::parse(&fs.read(Manifest::PATH)?)))
    }

    /// Set one main attribute in the manifest of a writable archive, creating the manifest if
    /// needed
    pub fn update(fs: &mut ZipFileSystem, name: &str, value: &str) -> Result<(), Error> {
        let mut manifest = Manifest::read_from(fs)?.unwrap_or_default();
        if manifest.main_attribute("Manifest-Version").is_none() {
            manifest.set_main_attribute("Manifest-Version", "1.0");
        }
        manifest.set_main_attribute(name, value);
        fs.write(Manifest::PATH, manifest.to_bytes())
    }
}

fn write_line(out: &mut String, name: &str, value: &str) {
    let line = format!("{}: {}", name, value);
    let mut limit = Manifest::LINE_LIMIT;
    let mut written = 0;
    for (idx, c) in line.char_indices() {
        if idx + c.len_utf8() - written > limit {
            out.push_str("\r\n ");
            written = idx;
            limit = Manifest::LINE_LIMIT - 1;
        }
        out.push(c);
    }
    out.push_str("\r\n");
}

/// Stamp the marker attribute into an archive that is open for writing
pub fn mark_minecraft_jar(fs: &mut ZipFileSystem) -> Result<(), Error> {
    Manifest::update(fs, MINECRAFT_MARKER_ATTRIBUTE, "true")
}

/// Stamp the marker attribute into an existing jar on disk
pub fn add_minecraft_marker(path: impl AsRef<Path>) -> Result<(), Error> {
    let mut fs = ZipFileSystem::open_writable(path, CompressionMethod::Deflated)?;
    mark_minecraft_jar(&mut fs)?;
    fs.release()
}

/// Whether a jar carries the marker attribute (with value `true`, in any case)
pub fn is_codev_generated_minecraft_jar(path: impl AsRef<Path>) -> Result<bool, Error> {
    let mut fs = ZipFileSystem::open(path)?;
    let marked = Manifest::read_from(&mut fs)?
        .and_then(|manifest| {
            manifest
                .main_attribute(MINECRAFT_MARKER_ATTRIBUTE)
                .map(|value| value.eq_ignore_ascii_case("true"))
        })
        .unwrap_or(false);
    fs.release()?;
    Ok(marked)
}

/// Record the mapping namespace in the manifest of an archive that is open for writing
pub fn add_namespace_manifest(fs: &mut ZipFileSystem, namespace: &str) -> Result<(), Error> {
    Manifest::update(fs, MAPPING_NAMESPACE_ATTRIBUTE, namespace)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_with_continuations_and_sections() {
        let text = concat!(
            "Manifest-Version: 1.0\r\n",
            "Main-Class: net.minecraft.client.ma\r\n",
            " in.Main\r\n",
            "\r\n",
            "Name: a/b.class\r\n",
            "SHA-256-Digest: xyz\r\n",
            "\r\n",
        );
        let manifest = Manifest::parse(text.as_bytes());
        assert_eq!(
            manifest.main_attribute("main-class"),
            Some("net.minecraft.client.main.Main")
        );
        assert_eq!(manifest.sections.len(), 1);
        assert_eq!(manifest.sections[0][1].1, "xyz");
    }

    #[test]
    fn long_lines_are_folded() {
        let mut manifest = Manifest::new();
        let value = "x".repeat(100);
        manifest.set_main_attribute("Long-Value", &value);
        let bytes = manifest.to_bytes();
        let text = String::from_utf8(bytes.clone()).unwrap();
        for line in text.split("\r\n") {
            assert!(line.len() <= 72, "line too long: {:?}", line);
        }
        assert!(text.starts_with("Manifest-Version: 1.0\r\n"));
        assert_eq!(Manifest::parse(&bytes), manifest);
    }

    #[test]
    fn marker_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.jar");

        let mut fs = ZipFileSystem::create(&path, CompressionMethod::Deflated).unwrap();
        fs.write(
            Manifest::PATH,
            b"Manifest-Version: 1.0\r\nMain-Class: a.Main\r\n\r\n".to_vec(),
        )
        .unwrap();
        fs.write("a/Main.class", vec![1, 2, 3]).unwrap();
        fs.release().unwrap();
        assert!(!is_codev_generated_minecraft_jar(&path).unwrap());

        add_minecraft_marker(&path).unwrap();
        assert!(is_codev_generated_minecraft_jar(&path).unwrap());

        let mut fs = ZipFileSystem::open(&path).unwrap();
        let manifest = Manifest::read_from(&mut fs).unwrap().unwrap();
        assert_eq!(manifest.main_attribute("Main-Class"), Some("a.Main"));
        assert_eq!(manifest.main_attribute(MINECRAFT_MARKER_ATTRIBUTE), Some("true"));
        assert_eq!(fs.read("a/Main.class").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn jar_without_manifest_is_not_marked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jar");
        let mut fs = ZipFileSystem::create(&path, CompressionMethod::Deflated).unwrap();
        fs.write("a.txt", vec![]).unwrap();
        add_namespace_manifest(&mut fs, "obf").unwrap();
        fs.release().unwrap();

        assert!(!is_codev_generated_minecraft_jar(&path).unwrap());
        let mut fs = ZipFileSystem::open(&path).unwrap();
        let manifest = Manifest::read_from(&mut fs).unwrap().unwrap();
        assert_eq!(manifest.main_attribute(MAPPING_NAMESPACE_ATTRIBUTE), Some("obf"));
        assert_eq!(manifest.main_attribute("Manifest-Version"), Some("1.0"));
    }
}
