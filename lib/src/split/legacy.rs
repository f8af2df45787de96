use super::{merge_lists, Error, Settings, SplitReport};
use crate::archive::{
    copy_assets, is_legacy_layout, use_archives, ArchiveId, ArchiveScope, Manifest, ZipFileSystem,
};
use crate::jvm::class_file::{ClassFile, MemberKey};
use crate::jvm::relocate::MemberImporter;
use crate::jvm::{self, BinaryName};
use crate::references::{
    collect_class_references, collect_field_references, collect_method_references,
};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Split a vanilla client jar and server jar into a common jar and a client-only jar
///
/// Classes present in both jars are merged member by member into the common jar, with members
/// unique to one side annotated with the matching exclusivity annotation from `settings`.
/// Classes only in the server go to the common jar, classes only in the client go to the
/// client-only jar. Client-only classes that common code ends up referring to are also copied
/// into the common jar, annotated client-exclusive (see [`SplitReport::closure`]).
pub fn split_legacy(
    client: impl AsRef<Path>,
    server: impl AsRef<Path>,
    common_out: impl AsRef<Path>,
    client_out: impl AsRef<Path>,
    settings: &Settings,
) -> Result<SplitReport, Error> {
    let (client, server) = (client.as_ref(), server.as_ref());
    let (common_out, client_out) = (common_out.as_ref(), client_out.as_ref());
    log::info!(
        "Splitting {} and {} into {} and {}",
        client.display(),
        server.display(),
        common_out.display(),
        client_out.display()
    );

    use_archives(|scope: &mut ArchiveScope<ZipFileSystem>| -> Result<SplitReport, Error> {
        let outputs = Outputs {
            client: scope.acquire(ZipFileSystem::open(client))?,
            server: scope.acquire(ZipFileSystem::open(server))?,
            common_out: scope.acquire(ZipFileSystem::create(common_out, settings.compression))?,
            client_out: scope.acquire(ZipFileSystem::create(client_out, settings.compression))?,
        };
        split(scope, &outputs, settings)
    })
}

struct Outputs {
    client: ArchiveId,
    server: ArchiveId,
    common_out: ArchiveId,
    client_out: ArchiveId,
}

fn split(
    scope: &mut ArchiveScope<ZipFileSystem>,
    ids: &Outputs,
    settings: &Settings,
) -> Result<SplitReport, Error> {
    // Classes that client-only members refer to
    let mut extra_common = BTreeSet::new();

    log::info!("Merging shared classes");
    for entry in scope[ids.client].class_file_names() {
        if scope[ids.server].exists(&entry) {
            let client_class = read_class(&mut scope[ids.client], &entry)?;
            let server_class = read_class(&mut scope[ids.server], &entry)?;
            let merged = merge_class(&client_class, server_class, settings, &mut extra_common)
                .map_err(Error::in_class(&entry))?;
            let bytes = merged.to_bytes().map_err(Error::in_class(&entry))?;
            scope[ids.common_out].write(&entry, bytes)?;
        } else {
            let bytes = scope[ids.client].read(&entry)?;
            scope[ids.client_out].write(&entry, bytes)?;
        }
    }

    log::info!("Copying client classes used by common code");
    let mut closure = BTreeSet::new();
    let mut pending: Vec<BinaryName> = extra_common.into_iter().collect();
    while let Some(name) = pending.pop() {
        let entry = name.class_file_name();
        if closure.contains(&name) || !scope[ids.client_out].exists(&entry) {
            continue;
        }
        let mut class = read_class(&mut scope[ids.client], &entry)?;
        let references = collect_class_references(&class, &[]).map_err(Error::in_class(&entry))?;
        pending.extend(references.used);

        class
            .add_invisible_annotation(&settings.client_exclusive_annotation)
            .map_err(Error::in_class(&entry))?;
        let bytes = class.to_bytes().map_err(Error::in_class(&entry))?;
        scope[ids.common_out].write(&entry, bytes)?;
        log::debug!("{} is client-only but used by common code", name);
        closure.insert(name);
    }

    log::info!("Copying server-only classes");
    for entry in scope[ids.server].class_file_names() {
        if scope[ids.client].exists(&entry) {
            continue;
        }
        let mut class = read_class(&mut scope[ids.server], &entry)?;
        class
            .add_invisible_annotation(&settings.server_exclusive_annotation)
            .map_err(Error::in_class(&entry))?;
        let bytes = class.to_bytes().map_err(Error::in_class(&entry))?;
        scope[ids.common_out].write(&entry, bytes)?;
    }

    let legacy = is_legacy_layout(&scope[ids.server]);
    copy_assets(
        scope,
        ids.client,
        ids.server,
        ids.common_out,
        ids.client_out,
        legacy,
    )?;
    Manifest::update(&mut scope[ids.common_out], &settings.marker_attribute, "true")?;
    Manifest::update(&mut scope[ids.client_out], &settings.marker_attribute, "true")?;

    let report = SplitReport {
        common: scope[ids.common_out].path().to_path_buf(),
        client: scope[ids.client_out].path().to_path_buf(),
        common_classes: scope[ids.common_out].class_file_names().len(),
        client_classes: scope[ids.client_out].class_file_names().len(),
        closure,
        inconsistencies: vec![],
    };
    log::info!(
        "Wrote {} common classes ({} from the client closure) and {} client classes",
        report.common_classes,
        report.closure.len(),
        report.client_classes
    );
    Ok(report)
}

fn read_class(fs: &mut ZipFileSystem, entry: &str) -> Result<ClassFile, Error> {
    let bytes = fs.read(entry)?;
    ClassFile::parse(&bytes).map_err(Error::in_class(entry))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Client,
    Server,
}

/// Position of a member in either the client or server version of a class
#[derive(Debug, Clone)]
struct Slot {
    side: Side,
    index: usize,
    key: MemberKey,
}

fn slots(
    side: Side,
    keys: impl Iterator<Item = Result<MemberKey, jvm::Error>>,
) -> Result<Vec<Slot>, jvm::Error> {
    keys.enumerate()
        .map(|(index, key)| Ok(Slot { side, index, key: key? }))
        .collect()
}

/// Which members of the merged class are annotated, and with what
struct Exclusive {
    client: Vec<usize>,
    server: Vec<usize>,
}

impl Exclusive {
    fn of(merged: &[Slot], server_only: &[Slot]) -> Exclusive {
        let server_only: HashSet<usize> = server_only.iter().map(|slot| slot.index).collect();
        let mut exclusive = Exclusive {
            client: vec![],
            server: vec![],
        };
        for (position, slot) in merged.iter().enumerate() {
            match slot.side {
                Side::Client => exclusive.client.push(position),
                Side::Server if server_only.contains(&slot.index) => {
                    exclusive.server.push(position)
                }
                Side::Server => (),
            }
        }
        exclusive
    }
}

/// Merge the client version of a class into the server version
///
/// Shared members keep their server definition. Classes referenced by client-only interfaces and
/// members are added to `extra_common`.
fn merge_class(
    client: &ClassFile,
    mut server: ClassFile,
    settings: &Settings,
    extra_common: &mut BTreeSet<BinaryName>,
) -> Result<ClassFile, jvm::Error> {
    let interfaces = merge_lists(
        &client.interface_names()?,
        &server.interface_names()?,
        String::clone,
    );
    for interface in &interfaces.client_only {
        extra_common.extend(BinaryName::from_string(interface.clone()).ok());
    }
    let mut merged_interfaces = Vec::with_capacity(interfaces.merged.len());
    for interface in &interfaces.merged {
        merged_interfaces.push(server.constants.get_class(interface)?);
    }
    server.interfaces = merged_interfaces;

    let fields = merge_lists(
        &slots(Side::Client, client.fields.iter().map(|f| f.key(&client.constants)))?,
        &slots(Side::Server, server.fields.iter().map(|f| f.key(&server.constants)))?,
        |slot| slot.key.clone(),
    );
    let methods = merge_lists(
        &slots(Side::Client, client.methods.iter().map(|m| m.key(&client.constants)))?,
        &slots(Side::Server, server.methods.iter().map(|m| m.key(&server.constants)))?,
        |slot| slot.key.clone(),
    );

    for slot in &fields.client_only {
        extra_common.extend(collect_field_references(&slot.key.descriptor)?);
    }
    for slot in &methods.client_only {
        extra_common.extend(collect_method_references(client, &client.methods[slot.index])?);
    }

    let mut bootstrap_methods = server.bootstrap_methods()?;
    let bootstrap_count = bootstrap_methods.len();
    let mut merged_fields = Vec::with_capacity(fields.merged.len());
    let mut merged_methods = Vec::with_capacity(methods.merged.len());
    {
        let mut importer =
            MemberImporter::new(client, &mut server.constants, &mut bootstrap_methods)?;
        for slot in &fields.merged {
            merged_fields.push(match slot.side {
                Side::Server => server.fields[slot.index].clone(),
                Side::Client => importer.import_field(&client.fields[slot.index])?,
            });
        }
        for slot in &methods.merged {
            merged_methods.push(match slot.side {
                Side::Server => server.methods[slot.index].clone(),
                Side::Client => importer.import_method(&client.methods[slot.index])?,
            });
        }
    }
    server.fields = merged_fields;
    server.methods = merged_methods;
    if bootstrap_methods.len() != bootstrap_count {
        server.set_bootstrap_methods(bootstrap_methods)?;
    }

    let exclusive_fields = Exclusive::of(&fields.merged, &fields.server_only);
    for idx in exclusive_fields.client {
        server.add_field_annotation(idx, &settings.client_exclusive_annotation)?;
    }
    for idx in exclusive_fields.server {
        server.add_field_annotation(idx, &settings.server_exclusive_annotation)?;
    }
    let exclusive_methods = Exclusive::of(&methods.merged, &methods.server_only);
    for idx in exclusive_methods.client {
        server.add_method_annotation(idx, &settings.client_exclusive_annotation)?;
    }
    for idx in exclusive_methods.server {
        server.add_method_annotation(idx, &settings.server_exclusive_annotation)?;
    }

    Ok(server)
}
