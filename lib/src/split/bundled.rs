use super::{Error, Settings};
use crate::archive::{
    add_namespace_manifest, asset_names, is_client_resource, use_archives, ArchiveScope, Manifest,
    ZipFileSystem,
};
use std::path::{Path, PathBuf};

/// Namespace recorded in the manifest of a bundled client split
pub const OBFUSCATED_NAMESPACE: &str = "obf";

/// Produce the client-only jar for versions whose server jar is a subset of the client jar
///
/// The common jar for these versions is the server jar itself, so only `client_out` is written:
/// classes missing from the server, plus client resources (those missing from the server,
/// language files, and hidden files directly under `assets`).
pub fn split_bundled_client(
    client: impl AsRef<Path>,
    server: impl AsRef<Path>,
    client_out: impl AsRef<Path>,
    settings: &Settings,
) -> Result<PathBuf, Error> {
    let client_out = client_out.as_ref();
    log::info!("Extracting client-only part of {}", client.as_ref().display());

    use_archives(|scope: &mut ArchiveScope<ZipFileSystem>| -> Result<PathBuf, Error> {
        let client = scope.acquire(ZipFileSystem::open(client.as_ref()))?;
        let server = scope.acquire(ZipFileSystem::open(server.as_ref()))?;
        let output = scope.acquire(ZipFileSystem::create(client_out, settings.compression))?;

        let mut classes = 0;
        for entry in scope[client].class_file_names() {
            if !scope[server].exists(&entry) {
                let bytes = scope[client].read(&entry)?;
                scope[output].write(&entry, bytes)?;
                classes += 1;
            }
        }

        let mut resources = 0;
        for name in asset_names(&scope[client]) {
            if !scope[server].exists(&name) || is_client_resource(&name) {
                let bytes = scope[client].read(&name)?;
                scope[output].write(&name, bytes)?;
                resources += 1;
            }
        }

        add_namespace_manifest(&mut scope[output], OBFUSCATED_NAMESPACE)?;
        Manifest::update(&mut scope[output], &settings.marker_attribute, "true")?;
        log::info!("Wrote {} client classes and {} resources", classes, resources);
        Ok(client_out.to_path_buf())
    })
}
