use super::{
    add_invisible_annotation, decode_attribute, find_attribute, Attribute, AttributeLike,
    BootstrapMethod, BootstrapMethods, ClassConstantIndex, Code, ConstantIndex, ConstantPool,
    Field, InnerClasses, Method, Version,
};
use crate::jvm::errors::malformed;
use crate::jvm::{
    ClassAccessFlags, Deserialize, Error, FieldAccessFlags, MethodAccessFlags, Serialize,
};
use byteorder::WriteBytesExt;
use std::io::Cursor;

/// Representation of the [`class` file format of the JVM][0]
///
/// Everything not needed for splitting (method bodies, unrecognized attributes) stays as raw
/// bytes, so parsing and then writing an unmodified class reproduces the input exactly.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub version: Version,
    pub constants: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: ClassConstantIndex,

    /// `None` only for `java/lang/Object` and module descriptors
    pub super_class: Option<ClassConstantIndex>,
    pub interfaces: Vec<ClassConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

/// Identity of a member within its class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub name: String,
    pub descriptor: String,
}

/// Entry from the `InnerClasses` attribute, resolved to names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
    pub inner_class: String,
    pub outer_class: Option<String>,
}

impl ClassFile {
    /// Magic header bytes that go at the front of the serialized class file
    pub const MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

    /// Start an empty class
    pub fn new(
        version: Version,
        access_flags: ClassAccessFlags,
        name: &str,
        super_name: Option<&str>,
    ) -> Result<ClassFile, Error> {
        let mut constants = ConstantPool::new();
        let this_class = constants.get_class(name)?;
        let super_class = super_name.map(|s| constants.get_class(s)).transpose()?;
        Ok(ClassFile {
            version,
            constants,
            access_flags,
            this_class,
            super_class,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        })
    }

    /// Decode a class file
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, Error> {
        let mut reader = Cursor::new(bytes);

        let mut magic = [0u8; 4];
        std::io::Read::read_exact(&mut reader, &mut magic).map_err(malformed)?;
        if magic != ClassFile::MAGIC {
            return Err(Error::MalformedClass(format!("bad magic {:02x?}", magic)));
        }

        let version = Version::deserialize(&mut reader).map_err(malformed)?;
        let constants = ConstantPool::read(&mut reader)?;
        let access_flags = ClassAccessFlags::deserialize(&mut reader).map_err(malformed)?;
        let this_class = ClassConstantIndex::deserialize(&mut reader).map_err(malformed)?;
        let super_class = ConstantIndex::deserialize(&mut reader).map_err(malformed)?;
        let super_class = if super_class.is_none() {
            None
        } else {
            Some(ClassConstantIndex(super_class))
        };
        let interfaces = Vec::<ClassConstantIndex>::deserialize(&mut reader).map_err(malformed)?;
        let fields = Vec::<Field>::deserialize(&mut reader).map_err(malformed)?;
        let methods = Vec::<Method>::deserialize(&mut reader).map_err(malformed)?;
        let attributes = Vec::<Attribute>::deserialize(&mut reader).map_err(malformed)?;

        let consumed = reader.position() as usize;
        if consumed != bytes.len() {
            return Err(Error::MalformedClass(format!(
                "{} trailing bytes after class",
                bytes.len() - consumed
            )));
        }

        let class = ClassFile {
            version,
            constants,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        };
        class.check_indices()?;
        Ok(class)
    }

    /// Make sure the indices stored outside of the pool resolve to the expected kinds
    fn check_indices(&self) -> Result<(), Error> {
        let dangling = |err: Error| match err {
            Error::MissingConstant(index) => {
                Error::MalformedClass(format!("dangling constant pool index #{}", index.0))
            }
            other => other,
        };
        let class_indices = std::iter::once(&self.this_class)
            .chain(self.super_class.iter())
            .chain(self.interfaces.iter());
        for class in class_indices {
            self.constants.class_name(*class).map_err(dangling)?;
        }

        let utf8s = self
            .fields
            .iter()
            .flat_map(|f| [f.name_index, f.descriptor_index])
            .chain(
                self.methods
                    .iter()
                    .flat_map(|m| [m.name_index, m.descriptor_index]),
            );
        for utf8 in utf8s {
            self.constants.utf8_bytes(utf8).map_err(dangling)?;
        }

        let attributes = self
            .attributes
            .iter()
            .chain(self.fields.iter().flat_map(|f| f.attributes.iter()))
            .chain(self.methods.iter().flat_map(|m| m.attributes.iter()));
        for attribute in attributes {
            self.constants
                .utf8_bytes(attribute.name_index)
                .map_err(dangling)?;
        }
        Ok(())
    }

    /// Encode the class file
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = vec![];
        self.serialize(&mut bytes)?;
        Ok(bytes)
    }

    /// Internal name of the class
    pub fn name(&self) -> Result<String, Error> {
        self.constants.class_name(self.this_class)
    }

    pub fn super_name(&self) -> Result<Option<String>, Error> {
        self.super_class
            .map(|class| self.constants.class_name(class))
            .transpose()
    }

    pub fn interface_names(&self) -> Result<Vec<String>, Error> {
        self.interfaces
            .iter()
            .map(|class| self.constants.class_name(*class))
            .collect()
    }

    pub fn add_interface(&mut self, name: &str) -> Result<(), Error> {
        let class = self.constants.get_class(name)?;
        self.interfaces.push(class);
        Ok(())
    }

    pub fn add_field(
        &mut self,
        access_flags: FieldAccessFlags,
        name: &str,
        descriptor: &str,
    ) -> Result<&mut Field, Error> {
        let field = Field {
            access_flags,
            name_index: self.constants.get_utf8(name)?,
            descriptor_index: self.constants.get_utf8(descriptor)?,
            attributes: vec![],
        };
        let idx = self.fields.len();
        self.fields.push(field);
        Ok(&mut self.fields[idx])
    }

    pub fn add_method(
        &mut self,
        access_flags: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        code: Option<Code>,
    ) -> Result<&mut Method, Error> {
        let mut attributes = vec![];
        if let Some(code) = code {
            attributes.push(self.constants.get_attribute(code)?);
        }
        let method = Method {
            access_flags,
            name_index: self.constants.get_utf8(name)?,
            descriptor_index: self.constants.get_utf8(descriptor)?,
            attributes,
        };
        let idx = self.methods.len();
        self.methods.push(method);
        Ok(&mut self.methods[idx])
    }

    /// Attach a marker annotation to the class itself
    pub fn add_invisible_annotation(&mut self, descriptor: &str) -> Result<(), Error> {
        add_invisible_annotation(&mut self.attributes, &mut self.constants, descriptor)
    }

    pub fn add_field_annotation(&mut self, field: usize, descriptor: &str) -> Result<(), Error> {
        add_invisible_annotation(
            &mut self.fields[field].attributes,
            &mut self.constants,
            descriptor,
        )
    }

    pub fn add_method_annotation(&mut self, method: usize, descriptor: &str) -> Result<(), Error> {
        add_invisible_annotation(
            &mut self.methods[method].attributes,
            &mut self.constants,
            descriptor,
        )
    }

    /// Entries of the `BootstrapMethods` attribute (empty if there is none)
    pub fn bootstrap_methods(&self) -> Result<Vec<BootstrapMethod>, Error> {
        let methods: Option<BootstrapMethods> =
            decode_attribute(&self.attributes, &self.constants)?;
        Ok(methods.map(|m| m.0).unwrap_or_default())
    }

    /// Replace the `BootstrapMethods` attribute
    pub fn set_bootstrap_methods(&mut self, methods: Vec<BootstrapMethod>) -> Result<(), Error> {
        let existing = self.attribute_position(BootstrapMethods::NAME.as_bytes())?;
        match existing {
            Some(idx) => {
                self.attributes[idx] = self.constants.get_attribute(BootstrapMethods(methods))?
            }
            None if methods.is_empty() => (),
            None => {
                let attribute = self.constants.get_attribute(BootstrapMethods(methods))?;
                self.attributes.push(attribute);
            }
        }
        Ok(())
    }

    fn attribute_position(&self, name: &[u8]) -> Result<Option<usize>, Error> {
        for (idx, attribute) in self.attributes.iter().enumerate() {
            if self.constants.utf8_bytes(attribute.name_index)? == name {
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    /// Inner class entries, with names resolved
    pub fn inner_classes(&self) -> Result<Vec<InnerClassEntry>, Error> {
        let inner_classes: Option<InnerClasses> =
            decode_attribute(&self.attributes, &self.constants)?;
        let mut entries = vec![];
        for inner in inner_classes.map(|i| i.0).unwrap_or_default() {
            let outer_class = if inner.outer_class.is_none() {
                None
            } else {
                Some(self.constants.class_name(ClassConstantIndex(inner.outer_class))?)
            };
            entries.push(InnerClassEntry {
                inner_class: self.constants.class_name(inner.inner_class)?,
                outer_class,
            });
        }
        Ok(entries)
    }

    /// Whether the class has an attribute with the given name
    pub fn has_attribute(&self, name: &str) -> Result<bool, Error> {
        Ok(find_attribute(&self.attributes, &self.constants, name)?.is_some())
    }
}

impl Serialize for ClassFile {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&ClassFile::MAGIC)?;
        self.version.serialize(writer)?;
        self.constants.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        self.this_class.serialize(writer)?;
        self.super_class
            .map_or(ConstantIndex::NONE, |class| class.0)
            .serialize(writer)?;
        self.interfaces.serialize(writer)?;
        self.fields.serialize(writer)?;
        self.methods.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}
