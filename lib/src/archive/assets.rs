use super::{ArchiveId, ArchiveScope, Error, ZipFileSystem};

/// Whether an entry is a resource rather than code
///
/// Signature files under `META-INF` are not assets: they would be invalid for any jar produced
/// here.
pub fn is_asset(name: &str) -> bool {
    let name = name.trim_start_matches('/');
    let signature =
        name.starts_with("META-INF") && (name.ends_with(".DSA") || name.ends_with(".SF"));
    !name.ends_with('/') && !name.ends_with(".class") && !signature
}

/// Resources that belong to the client even when the server jar has a copy: language files, and
/// hidden files directly inside an `assets` directory (eg. `assets/.mcassetsroot`)
pub fn is_client_resource(name: &str) -> bool {
    if name.contains("lang") {
        return true;
    }
    match name.trim_start_matches('/').rsplit_once('/') {
        Some((parent, file)) => {
            parent.rsplit('/').next() == Some("assets") && file.starts_with('.')
        }
        None => false,
    }
}

/// Server jars from before data packs have no `data` directory. Their resources are only split
/// by presence.
pub fn is_legacy_layout(server: &ZipFileSystem) -> bool {
    !server.is_dir("data")
}

pub fn asset_names(fs: &ZipFileSystem) -> Vec<String> {
    let mut names = fs.file_names();
    names.retain(|name| is_asset(name));
    names
}

/// Copy the resources of a client/server pair into split outputs
///
/// Every server resource goes to `common_out`. A client resource goes to `client_out` if the
/// server lacks it or, unless `legacy` is set, if it is a client resource (see
/// [`is_client_resource`]). Returns the number of resources written.
pub fn copy_assets(
    scope: &mut ArchiveScope<ZipFileSystem>,
    client: ArchiveId,
    server: ArchiveId,
    common_out: ArchiveId,
    client_out: ArchiveId,
    legacy: bool,
) -> Result<usize, Error> {
    let mut copied = 0;
    for name in asset_names(&scope[client]) {
        if !scope[server].exists(&name) || (!legacy && is_client_resource(&name)) {
            let bytes = scope[client].read(&name)?;
            scope[client_out].write(&name, bytes)?;
            copied += 1;
        }
    }
    for name in asset_names(&scope[server]) {
        let bytes = scope[server].read(&name)?;
        scope[common_out].write(&name, bytes)?;
        copied += 1;
    }
    log::debug!("Copied {} resources", copied);
    Ok(copied)
}

/// Route the resources of a merged jar
///
/// A resource goes to `client_out` when its top-level directory already exists there (and it is
/// not a language file), otherwise to `common_out`. Existing entries are replaced.
pub fn route_merged_assets(
    scope: &mut ArchiveScope<ZipFileSystem>,
    merged: ArchiveId,
    common_out: ArchiveId,
    client_out: ArchiveId,
) -> Result<(), Error> {
    for name in asset_names(&scope[merged]) {
        let to_client = !name.contains("lang")
            && match name.split_once('/') {
                Some((root, _)) => scope[client_out].is_dir(root),
                None => false,
            };
        let bytes = scope[merged].read(&name)?;
        let target = if to_client { client_out } else { common_out };
        scope[target].write(&name, bytes)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::archive::{use_archives, Release, ResourceReleaseError};
    use zip::CompressionMethod;

    #[test]
    fn asset_classification() {
        assert!(is_asset("assets/minecraft/textures/a.png"));
        assert!(is_asset("META-INF/MANIFEST.MF"));
        assert!(!is_asset("META-INF/MOJANGCS.SF"));
        assert!(!is_asset("META-INF/MOJANGCS.DSA"));
        assert!(!is_asset("net/minecraft/a.class"));

        assert!(is_client_resource("assets/minecraft/lang/en_us.json"));
        assert!(is_client_resource("assets/.mcassetsroot"));
        assert!(!is_client_resource("data/.mcassetsroot"));
        assert!(!is_client_resource("assets/minecraft/.hidden/a.png"));
        assert!(!is_client_resource("pack.png"));
    }

    fn archive(path: &std::path::Path, entries: &[&str]) {
        let mut fs = ZipFileSystem::create(path, CompressionMethod::Deflated).unwrap();
        for name in entries {
            fs.write(name, name.as_bytes().to_vec()).unwrap();
        }
        fs.release().unwrap();
    }

    fn copy(legacy: Option<bool>) -> (Vec<String>, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let client = dir.path().join("client.jar");
        let server = dir.path().join("server.jar");
        archive(
            &client,
            &[
                "a.class",
                "assets/.mcassetsroot",
                "assets/minecraft/lang/en_us.json",
                "assets/minecraft/textures/a.png",
                "pack.png",
            ],
        );
        archive(
            &server,
            &[
                "assets/.mcassetsroot",
                "assets/minecraft/lang/en_us.json",
                "data/minecraft/recipes/a.json",
                "pack.png",
            ],
        );

        let result: Result<_, ResourceReleaseError> = use_archives(|scope| {
            let client = scope.add(ZipFileSystem::open(&client).unwrap());
            let server = scope.add(ZipFileSystem::open(&server).unwrap());
            let common_out = scope.add(
                ZipFileSystem::create(dir.path().join("c.jar"), CompressionMethod::Stored)
                    .unwrap(),
            );
            let client_out = scope.add(
                ZipFileSystem::create(dir.path().join("d.jar"), CompressionMethod::Stored)
                    .unwrap(),
            );
            let legacy = legacy.unwrap_or_else(|| is_legacy_layout(&scope[server]));
            copy_assets(scope, client, server, common_out, client_out, legacy).unwrap();
            Ok((scope[common_out].file_names(), scope[client_out].file_names()))
        });
        result.unwrap()
    }

    #[test]
    fn modern_layout_keeps_client_resources_on_the_client() {
        let (common, client) = copy(None);
        assert_eq!(
            common,
            vec![
                "assets/.mcassetsroot",
                "assets/minecraft/lang/en_us.json",
                "data/minecraft/recipes/a.json",
                "pack.png",
            ]
        );
        assert_eq!(
            client,
            vec![
                "assets/.mcassetsroot",
                "assets/minecraft/lang/en_us.json",
                "assets/minecraft/textures/a.png",
            ]
        );
    }

    #[test]
    fn legacy_layout_splits_by_presence() {
        let (_, client) = copy(Some(true));
        assert_eq!(client, vec!["assets/minecraft/textures/a.png"]);
    }
}
