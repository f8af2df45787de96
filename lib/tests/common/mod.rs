#![allow(dead_code)]

use codev_split::archive::{CompressionMethod, Release, ZipFileSystem};
use codev_split::jvm::class_file::*;
use codev_split::jvm::code::opcodes::{NEW, POP, RETURN};
use codev_split::jvm::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use std::collections::BTreeSet;
use std::path::Path;

pub const ONLY_IN: &str = "Lnet/minecraftforge/api/distmarker/OnlyIn;";

pub fn class(name: &str) -> ClassFile {
    ClassFile::new(
        Version::JAVA8,
        ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        name,
        Some("java/lang/Object"),
    )
    .unwrap()
}

pub fn field(class: &mut ClassFile, name: &str, descriptor: &str) -> usize {
    class
        .add_field(FieldAccessFlags::PUBLIC, name, descriptor)
        .unwrap();
    class.fields.len() - 1
}

/// Add `void name() { new <instantiated>; }`
pub fn instantiating_method(class: &mut ClassFile, name: &str, instantiated: &str) {
    let [hi, lo] = class.constants.get_class(instantiated).unwrap().0 .0.to_be_bytes();
    let code = Code {
        max_stack: 1,
        max_locals: 1,
        code_array: vec![NEW, hi, lo, POP, RETURN],
        exception_table: vec![],
        attributes: vec![],
    };
    class
        .add_method(MethodAccessFlags::PUBLIC, name, "()V", Some(code))
        .unwrap();
}

/// Mark the last method added with `@OnlyIn(Dist.CLIENT)`
pub fn only_in_client(class: &mut ClassFile) {
    let constants = &mut class.constants;
    let annotation = Annotation {
        type_index: constants.get_utf8(ONLY_IN).unwrap(),
        element_value_pairs: vec![ElementValuePair {
            element_name: constants.get_utf8("value").unwrap(),
            value: ElementValue::Enum {
                type_name: constants
                    .get_utf8("Lnet/minecraftforge/api/distmarker/Dist;")
                    .unwrap(),
                const_name: constants.get_utf8("CLIENT").unwrap(),
            },
        }],
    };
    let attribute = constants
        .get_attribute(RuntimeVisibleAnnotations(vec![annotation]))
        .unwrap();
    class.methods.last_mut().unwrap().attributes.push(attribute);
}

pub fn abstract_method(class: &mut ClassFile, name: &str, descriptor: &str) {
    class
        .add_method(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
            name,
            descriptor,
            None,
        )
        .unwrap();
}

/// Write a jar with the given classes and resources
pub fn jar(path: &Path, classes: &[&ClassFile], resources: &[(&str, &str)]) {
    let mut fs = ZipFileSystem::create(path, CompressionMethod::Deflated).unwrap();
    for class in classes {
        let entry = format!("{}.class", class.name().unwrap());
        fs.write(&entry, class.to_bytes().unwrap()).unwrap();
    }
    for (name, contents) in resources {
        fs.write(name, contents.as_bytes().to_vec()).unwrap();
    }
    fs.release().unwrap();
}

pub fn entries(path: &Path) -> BTreeSet<String> {
    ZipFileSystem::open(path).unwrap().file_names().into_iter().collect()
}

pub fn class_names(path: &Path) -> BTreeSet<String> {
    ZipFileSystem::open(path)
        .unwrap()
        .class_file_names()
        .into_iter()
        .map(|entry| entry.trim_end_matches(".class").to_owned())
        .collect()
}

pub fn read_class(path: &Path, name: &str) -> ClassFile {
    let mut fs = ZipFileSystem::open(path).unwrap();
    let bytes = fs.read(&format!("{}.class", name)).unwrap();
    ClassFile::parse(&bytes).unwrap()
}

pub fn read_bytes(path: &Path, entry: &str) -> Vec<u8> {
    ZipFileSystem::open(path).unwrap().read(entry).unwrap()
}

pub fn class_annotations(class: &ClassFile) -> Vec<String> {
    annotation_types(&class.attributes, &class.constants).unwrap()
}

pub fn names(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}
