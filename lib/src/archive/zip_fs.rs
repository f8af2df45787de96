use super::{Error, Release};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Zip archive addressed by entry name (`net/minecraft/a.class`, `assets/lang/en_us.json`)
///
/// Directory entries are not tracked: a directory exists whenever some entry lives under it.
/// Leading `/` in names is ignored.
pub struct ZipFileSystem {
    path: PathBuf,
    mode: Mode,
}

enum Mode {
    Read {
        archive: ZipArchive<BufReader<File>>,
        names: BTreeSet<String>,
    },
    Write {
        entries: BTreeMap<String, Vec<u8>>,
        compression: CompressionMethod,
    },
    Released,
}

impl ZipFileSystem {
    /// Open an existing archive for reading
    pub fn open(path: impl AsRef<Path>) -> Result<ZipFileSystem, Error> {
        let path = path.as_ref().to_path_buf();
        let archive = ZipArchive::new(BufReader::new(File::open(&path)?))?;
        let names = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(|name| normalize(name).to_owned())
            .collect();
        log::debug!("Opened {} for reading", path.display());
        Ok(ZipFileSystem {
            path,
            mode: Mode::Read { archive, names },
        })
    }

    /// Start a new, empty archive which replaces whatever is at `path` once released
    pub fn create(
        path: impl AsRef<Path>,
        compression: CompressionMethod,
    ) -> Result<ZipFileSystem, Error> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        log::debug!("Creating {}", path.display());
        Ok(ZipFileSystem {
            path,
            mode: Mode::Write {
                entries: BTreeMap::new(),
                compression,
            },
        })
    }

    /// Open an existing archive for editing. Its contents are loaded eagerly and the archive is
    /// rewritten when released.
    pub fn open_writable(
        path: impl AsRef<Path>,
        compression: CompressionMethod,
    ) -> Result<ZipFileSystem, Error> {
        let mut original = ZipFileSystem::open(&path)?;
        let mut entries = BTreeMap::new();
        for name in original.file_names() {
            let bytes = original.read(&name)?;
            entries.insert(name, bytes);
        }
        original.release()?;
        Ok(ZipFileSystem {
            path: original.path,
            mode: Mode::Write {
                entries,
                compression,
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a file entry with this name exists
    pub fn exists(&self, name: &str) -> bool {
        let name = normalize(name);
        match &self.mode {
            Mode::Read { names, .. } => names.contains(name),
            Mode::Write { entries, .. } => entries.contains_key(name),
            Mode::Released => false,
        }
    }

    /// Whether any entry lives under the directory `name`
    pub fn is_dir(&self, name: &str) -> bool {
        let name = normalize(name).trim_end_matches('/');
        if name.is_empty() {
            return !self.file_names().is_empty();
        }
        let prefix = format!("{}/", name);
        let under = |entry: &String| entry.starts_with(&prefix);
        match &self.mode {
            Mode::Read { names, .. } => names.range(prefix.clone()..).next().map_or(false, under),
            Mode::Write { entries, .. } => entries
                .range(prefix.clone()..)
                .next()
                .map_or(false, |(entry, _)| under(entry)),
            Mode::Released => false,
        }
    }

    /// Names of all file entries, sorted
    pub fn file_names(&self) -> Vec<String> {
        match &self.mode {
            Mode::Read { names, .. } => names.iter().cloned().collect(),
            Mode::Write { entries, .. } => entries.keys().cloned().collect(),
            Mode::Released => vec![],
        }
    }

    /// Names of the `.class` entries, sorted
    pub fn class_file_names(&self) -> Vec<String> {
        let mut names = self.file_names();
        names.retain(|name| name.ends_with(".class"));
        names
    }

    pub fn read(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        let name = normalize(name);
        let missing = || Error::MissingEntry {
            archive: self.path.clone(),
            name: name.to_owned(),
        };
        match &mut self.mode {
            Mode::Read { archive, names } => {
                if !names.contains(name) {
                    return Err(missing());
                }
                let mut file = archive.by_name(name)?;
                let mut bytes = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
            Mode::Write { entries, .. } => entries.get(name).cloned().ok_or_else(missing),
            Mode::Released => Err(Error::Released(self.path.clone())),
        }
    }

    /// Add or replace an entry
    pub fn write(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), Error> {
        match &mut self.mode {
            Mode::Write { entries, .. } => {
                entries.insert(normalize(name).to_owned(), bytes);
                Ok(())
            }
            Mode::Read { .. } => Err(Error::ReadOnly(self.path.clone())),
            Mode::Released => Err(Error::Released(self.path.clone())),
        }
    }

    fn flush(
        path: &Path,
        entries: &BTreeMap<String, Vec<u8>>,
        compression: CompressionMethod,
    ) -> Result<(), Error> {
        let options = SimpleFileOptions::default()
            .compression_method(compression)
            .last_modified_time(zip::DateTime::default());
        let mut writer = ZipWriter::new(BufWriter::new(File::create(path)?));

        // Jar readers expect the manifest to come first
        let manifest = entries.get_key_value(super::Manifest::PATH);
        let rest = entries
            .iter()
            .filter(|(name, _)| name.as_str() != super::Manifest::PATH);
        for (name, bytes) in manifest.into_iter().chain(rest) {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(bytes)?;
        }
        writer.finish()?.flush()?;
        Ok(())
    }
}

impl Release for ZipFileSystem {
    fn release(&mut self) -> Result<(), Error> {
        match std::mem::replace(&mut self.mode, Mode::Released) {
            Mode::Write {
                entries,
                compression,
            } => {
                log::debug!("Writing {} entries to {}", entries.len(), self.path.display());
                ZipFileSystem::flush(&self.path, &entries, compression)
            }
            Mode::Read { .. } | Mode::Released => Ok(()),
        }
    }
}

fn normalize(name: &str) -> &str {
    name.trim_start_matches('/')
}
