mod common;

use codev_split::archive::{is_codev_generated_minecraft_jar, CompressionMethod, Release};
use codev_split::archive::{Manifest, ZipFileSystem};
use codev_split::jvm::BinaryName;
use codev_split::split::{split_merged, ClassMappings, Settings, SplitReport};
use common::*;
use std::path::Path;

const MAPPINGS: &str = "\
CL: srv net/minecraft/server/Server
CL: wld net/minecraft/world/World
CL: bad net/minecraft/server/Bad
CL: mc net/minecraft/client/Minecraft
CL: scr net/minecraft/client/Screen
";

/// Vanilla jars (obfuscated names) and a merged jar (mapped names, plus loader classes)
fn inputs(dir: &Path) {
    let vanilla = |names: &[&str]| names.iter().map(|name| class(name)).collect::<Vec<_>>();
    let client_classes = vanilla(&["srv", "wld", "bad", "mc", "scr"]);
    let server_classes = vanilla(&["srv", "wld", "bad"]);
    jar(
        &dir.join("client.jar"),
        &client_classes.iter().collect::<Vec<_>>(),
        &[
            ("assets/minecraft/textures/gui.png", "png"),
            ("assets/minecraft/lang/en_us.json", "{}"),
        ],
    );
    jar(
        &dir.join("server.jar"),
        &server_classes.iter().collect::<Vec<_>>(),
        &[("data/minecraft/recipes/a.json", "{}")],
    );

    let mut server = class("net/minecraft/server/Server");
    field(&mut server, "world", "Lnet/minecraft/world/World;");
    field(&mut server, "loader", "Lnet/minecraftforge/fml/Loader;");
    abstract_method(&mut server, "renderHud", "(Lnet/minecraft/client/Minecraft;)V");
    only_in_client(&mut server);
    let server_inner = class("net/minecraft/server/Server$1");

    let mut world = class("net/minecraft/world/World");
    field(&mut world, "name", "Ljava/lang/String;");

    let mut bad = class("net/minecraft/server/Bad");
    field(&mut bad, "screen", "Lnet/minecraft/client/Screen;");
    field(&mut bad, "tooltip", "Lnet/minecraftforge/client/Tooltip;");

    let mut loader = class("net/minecraftforge/fml/Loader");
    field(&mut loader, "overlay", "Lnet/minecraftforge/client/Overlay;");

    let classes = [
        server,
        server_inner,
        world,
        bad,
        loader,
        class("net/minecraft/client/Minecraft"),
        class("net/minecraft/client/Screen"),
        class("net/minecraftforge/common/Hooks"),
        class("net/minecraftforge/client/Overlay"),
        class("net/minecraftforge/client/Tooltip"),
    ];
    jar(
        &dir.join("merged.jar"),
        &classes.iter().collect::<Vec<_>>(),
        &[
            ("assets/minecraft/textures/gui.png", "png"),
            ("assets/minecraft/lang/en_us.json", "{}"),
            ("data/minecraft/recipes/a.json", "{}"),
        ],
    );

    let mut merged =
        ZipFileSystem::open_writable(dir.join("merged.jar"), CompressionMethod::Stored).unwrap();
    merged.write("module-info.class", vec![0xCA, 0xFE, 0xBA, 0xBE]).unwrap();
    merged.release().unwrap();
}

fn split(dir: &Path, settings: &Settings) -> SplitReport {
    inputs(dir);
    let mappings = ClassMappings::parse(MAPPINGS).unwrap().reversed();
    split_merged(
        dir.join("merged.jar"),
        dir.join("client.jar"),
        dir.join("server.jar"),
        dir.join("common.jar"),
        dir.join("client-only.jar"),
        &mappings,
        settings,
    )
    .unwrap()
}

#[test]
fn common_is_the_closure_of_server_classes() {
    let dir = tempfile::tempdir().unwrap();
    let report = split(dir.path(), &Settings::default());
    let common = dir.path().join("common.jar");
    let client = dir.path().join("client-only.jar");

    assert_eq!(
        class_names(&common),
        names(&[
            "net/minecraft/server/Bad",
            "net/minecraft/server/Server",
            "net/minecraft/server/Server$1",
            "net/minecraft/world/World",
            "net/minecraftforge/client/Overlay",
            "net/minecraftforge/common/Hooks",
            "net/minecraftforge/fml/Loader",
        ])
    );
    assert_eq!(
        class_names(&client),
        names(&[
            "net/minecraft/client/Minecraft",
            "net/minecraft/client/Screen",
            "net/minecraftforge/client/Tooltip",
        ])
    );
    assert_eq!(report.common_classes, 7);
    assert_eq!(report.client_classes, 3);
    assert!(report.closure.is_empty());
}

#[test]
fn client_references_from_common_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let report = split(dir.path(), &Settings::default());

    assert_eq!(report.inconsistencies.len(), 1);
    let inconsistency = &report.inconsistencies[0];
    assert_eq!(inconsistency.referencing.as_str(), "net/minecraft/server/Bad");
    assert_eq!(inconsistency.referenced.as_str(), "net/minecraft/client/Screen");

    // Nothing else is pulled in through the class with the bad reference
    let client = class_names(&dir.path().join("client-only.jar"));
    assert!(client.contains("net/minecraft/client/Screen"));
    assert!(client.contains("net/minecraftforge/client/Tooltip"));
}

#[test]
fn resources_and_markers() {
    let dir = tempfile::tempdir().unwrap();
    split(dir.path(), &Settings::default());
    let common = dir.path().join("common.jar");
    let client = dir.path().join("client-only.jar");

    let common_entries = entries(&common);
    let client_entries = entries(&client);
    assert!(client_entries.contains("assets/minecraft/textures/gui.png"));
    assert!(!common_entries.contains("assets/minecraft/textures/gui.png"));
    assert!(common_entries.contains("data/minecraft/recipes/a.json"));
    assert!(common_entries.contains("assets/minecraft/lang/en_us.json"));
    assert!(!common_entries.contains("module-info.class"));
    assert!(!client_entries.contains("module-info.class"));

    assert!(is_codev_generated_minecraft_jar(&common).unwrap());
    assert!(is_codev_generated_minecraft_jar(&client).unwrap());
}

#[test]
fn settings_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        side_only_annotations: vec![],
        client_name_hint: String::from("common"),
        marker_attribute: String::from("X-Split"),
        ..Settings::default()
    };
    let report = split(dir.path(), &settings);

    // Without side annotations, `renderHud` makes the server class refer to a client class
    let referencing: Vec<&BinaryName> = report
        .inconsistencies
        .iter()
        .map(|inconsistency| &inconsistency.referencing)
        .collect();
    assert_eq!(referencing.len(), 2);
    assert_eq!(referencing[0].as_str(), "net/minecraft/server/Bad");
    assert_eq!(referencing[1].as_str(), "net/minecraft/server/Server");

    let client = class_names(&dir.path().join("client-only.jar"));
    assert!(client.contains("net/minecraftforge/common/Hooks"));

    let mut common = ZipFileSystem::open(dir.path().join("common.jar")).unwrap();
    let manifest = Manifest::read_from(&mut common).unwrap().unwrap();
    assert_eq!(manifest.main_attribute("X-Split"), Some("true"));
}
