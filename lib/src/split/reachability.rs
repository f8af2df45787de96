use super::{
    classify, Error, InconsistentClassification, NameOracle, Origin, Settings, SplitReport,
};
use crate::archive::{
    copy_assets, is_legacy_layout, route_merged_assets, use_archives, ArchiveId, ArchiveScope,
    Manifest, ZipFileSystem,
};
use crate::jvm::class_file::ClassFile;
use crate::jvm::BinaryName;
use crate::references::collect_class_references;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Split a merged (patched) jar into a common jar and a client-only jar
///
/// `client` and `server` are the vanilla jars the merged jar was made from. Every class of the
/// merged jar is classified with `oracle` (see [`classify`]), and the common jar receives:
///
///   - server classes and everything they reach through the classes they use, their outer class
///     and their nested classes
///   - classes that are not vanilla, unless their entry name contains
///     [`Settings::client_name_hint`]
///
/// Everything else goes to the client-only jar. A common class using a client class is reported
/// in [`SplitReport::inconsistencies`] and nothing more is pulled in through its used classes.
pub fn split_merged(
    merged: impl AsRef<Path>,
    client: impl AsRef<Path>,
    server: impl AsRef<Path>,
    common_out: impl AsRef<Path>,
    client_out: impl AsRef<Path>,
    oracle: &dyn NameOracle,
    settings: &Settings,
) -> Result<SplitReport, Error> {
    let merged = merged.as_ref();
    log::info!("Splitting merged jar {}", merged.display());

    use_archives(|scope: &mut ArchiveScope<ZipFileSystem>| -> Result<SplitReport, Error> {
        let ids = Archives {
            merged: scope.acquire(ZipFileSystem::open(merged))?,
            client: scope.acquire(ZipFileSystem::open(client.as_ref()))?,
            server: scope.acquire(ZipFileSystem::open(server.as_ref()))?,
            common_out: scope.acquire(ZipFileSystem::create(
                common_out.as_ref(),
                settings.compression,
            ))?,
            client_out: scope.acquire(ZipFileSystem::create(
                client_out.as_ref(),
                settings.compression,
            ))?,
        };
        let mut walk = Reachability {
            scope,
            ids: &ids,
            oracle,
            settings,
            common: BTreeSet::new(),
            blacklist: HashSet::new(),
            inconsistencies: vec![],
        };
        walk.classify_all()?;

        let Reachability {
            scope,
            common,
            inconsistencies,
            ..
        } = walk;
        write_outputs(scope, &ids, &common)?;

        let legacy = is_legacy_layout(&scope[ids.server]);
        copy_assets(scope, ids.client, ids.server, ids.common_out, ids.client_out, legacy)?;
        route_merged_assets(scope, ids.merged, ids.common_out, ids.client_out)?;
        Manifest::update(&mut scope[ids.common_out], &settings.marker_attribute, "true")?;
        Manifest::update(&mut scope[ids.client_out], &settings.marker_attribute, "true")?;

        let report = SplitReport {
            common: scope[ids.common_out].path().to_path_buf(),
            client: scope[ids.client_out].path().to_path_buf(),
            common_classes: scope[ids.common_out].class_file_names().len(),
            client_classes: scope[ids.client_out].class_file_names().len(),
            closure: BTreeSet::new(),
            inconsistencies,
        };
        log::info!(
            "Wrote {} common classes and {} client classes ({} inconsistencies)",
            report.common_classes,
            report.client_classes,
            report.inconsistencies.len()
        );
        Ok(report)
    })
}

struct Archives {
    merged: ArchiveId,
    client: ArchiveId,
    server: ArchiveId,
    common_out: ArchiveId,
    client_out: ArchiveId,
}

/// Pending class in the walk. A tainted class is common, but only its outer and nested classes
/// are followed.
struct Visit {
    name: BinaryName,
    tainted: bool,
}

struct Reachability<'a> {
    scope: &'a mut ArchiveScope<ZipFileSystem>,
    ids: &'a Archives,
    oracle: &'a dyn NameOracle,
    settings: &'a Settings,

    /// Classes placed in the common jar
    common: BTreeSet<BinaryName>,

    /// Referenced classes that are not in the merged jar
    blacklist: HashSet<BinaryName>,
    inconsistencies: Vec<InconsistentClassification>,
}

impl<'a> Reachability<'a> {
    fn classify_all(&mut self) -> Result<(), Error> {
        for entry in self.scope[self.ids.merged].class_file_names() {
            // `module-info`, `package-info`, and multi-release variants
            if entry.contains('-') {
                continue;
            }
            let name = match BinaryName::from_class_file_name(&entry) {
                Some(name) => name,
                None => {
                    log::warn!("Skipping {}: not a valid class name", entry);
                    continue;
                }
            };
            if self.common.contains(&name) {
                continue;
            }

            match self.origin(&name) {
                Origin::Modded if entry.contains(&self.settings.client_name_hint) => {
                    log::debug!("{} is not vanilla and looks client-only", name);
                }
                Origin::Modded => {
                    log::debug!("{} is not vanilla, assuming common", name);
                    self.common.insert(name);
                }
                Origin::Server => self.expand(name)?,
                Origin::Client => (),
            }
        }
        log::debug!(
            "{} classes reachable from common roots, {} missing references",
            self.common.len(),
            self.blacklist.len()
        );
        Ok(())
    }

    fn origin(&self, name: &BinaryName) -> Origin {
        classify(self.oracle, name, &self.scope[self.ids.server])
    }

    /// Whether a referenced class can be placed, remembering the ones that can't
    fn is_placeable(&mut self, name: &BinaryName) -> bool {
        if self.blacklist.contains(name) || self.common.contains(name) {
            return false;
        }
        if !self.scope[self.ids.merged].exists(&name.class_file_name()) {
            self.blacklist.insert(name.clone());
            return false;
        }
        true
    }

    /// Place `root` and everything reachable from it in the common jar
    fn expand(&mut self, root: BinaryName) -> Result<(), Error> {
        let mut stack = vec![Visit {
            name: root,
            tainted: false,
        }];

        while let Some(visit) = stack.pop() {
            if !self.common.insert(visit.name.clone()) {
                continue;
            }
            let entry = visit.name.class_file_name();
            let bytes = self.scope[self.ids.merged].read(&entry)?;
            let class = ClassFile::parse(&bytes).map_err(Error::in_class(&entry))?;
            let references =
                collect_class_references(&class, &self.settings.side_only_annotations)
                    .map_err(Error::in_class(&entry))?;

            let mut tainted = visit.tainted;
            if !tainted {
                let mut used = vec![];
                for reference in references.used {
                    if !self.is_placeable(&reference) {
                        continue;
                    }
                    if self.origin(&reference) == Origin::Client {
                        let inconsistency = InconsistentClassification {
                            referencing: visit.name.clone(),
                            referenced: reference,
                        };
                        log::warn!("{}, not following its references", inconsistency);
                        self.inconsistencies.push(inconsistency);
                        tainted = true;
                        break;
                    }
                    used.push(reference);
                }
                if !tainted {
                    stack.extend(used.into_iter().map(|name| Visit {
                        name,
                        tainted: false,
                    }));
                }
            }

            // Outer and nested classes go where this class goes, whatever their origin
            for reference in references.associated {
                if self.is_placeable(&reference) {
                    stack.push(Visit {
                        name: reference,
                        tainted,
                    });
                }
            }
        }
        Ok(())
    }
}

fn write_outputs(
    scope: &mut ArchiveScope<ZipFileSystem>,
    ids: &Archives,
    common: &BTreeSet<BinaryName>,
) -> Result<(), Error> {
    for entry in scope[ids.merged].class_file_names() {
        if entry.contains('-') {
            continue;
        }
        let is_common = BinaryName::from_class_file_name(&entry)
            .map_or(false, |name| common.contains(&name));
        let bytes = scope[ids.merged].read(&entry)?;
        let target = if is_common { ids.common_out } else { ids.client_out };
        scope[target].write(&entry, bytes)?;
    }
    Ok(())
}
