mod common;

use codev_split::archive::{add_minecraft_marker, is_codev_generated_minecraft_jar, Manifest};
use codev_split::archive::{ZipFileSystem, MAPPING_NAMESPACE_ATTRIBUTE};
use codev_split::split::{split_bundled_client, Settings};
use common::*;

#[test]
fn only_the_client_part_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let client = dir.path().join("client.jar");
    let server = dir.path().join("server.jar");
    let output = dir.path().join("client-only.jar");

    jar(
        &client,
        &[&class("a"), &class("b")],
        &[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\r\n\r\n"),
            ("assets/.mcassetsroot", ""),
            ("assets/minecraft/lang/en_us.json", "{}"),
            ("assets/minecraft/textures/a.png", "png"),
            ("data/minecraft/recipes/a.json", "{}"),
        ],
    );
    jar(
        &server,
        &[&class("a")],
        &[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\r\n\r\n"),
            ("assets/.mcassetsroot", ""),
            ("assets/minecraft/lang/en_us.json", "{}"),
            ("data/minecraft/recipes/a.json", "{}"),
        ],
    );

    let written = split_bundled_client(&client, &server, &output, &Settings::default()).unwrap();
    assert_eq!(written, output);
    assert_eq!(
        entries(&output),
        names(&[
            "META-INF/MANIFEST.MF",
            "assets/.mcassetsroot",
            "assets/minecraft/lang/en_us.json",
            "assets/minecraft/textures/a.png",
            "b.class",
        ])
    );

    let mut fs = ZipFileSystem::open(&output).unwrap();
    let manifest = Manifest::read_from(&mut fs).unwrap().unwrap();
    assert_eq!(manifest.main_attribute(MAPPING_NAMESPACE_ATTRIBUTE), Some("obf"));
    assert!(is_codev_generated_minecraft_jar(&output).unwrap());
}

#[test]
fn marking_an_existing_jar_keeps_its_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vanilla.jar");
    jar(
        &path,
        &[&class("a")],
        &[(
            "META-INF/MANIFEST.MF",
            "Manifest-Version: 1.0\r\nMain-Class: a\r\n\r\n",
        )],
    );
    assert!(!is_codev_generated_minecraft_jar(&path).unwrap());

    add_minecraft_marker(&path).unwrap();
    assert!(is_codev_generated_minecraft_jar(&path).unwrap());
    assert_eq!(entries(&path), names(&["META-INF/MANIFEST.MF", "a.class"]));

    let mut fs = ZipFileSystem::open(&path).unwrap();
    let manifest = Manifest::read_from(&mut fs).unwrap().unwrap();
    assert_eq!(manifest.main_attribute("Main-Class"), Some("a"));
}
