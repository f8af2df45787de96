use super::{decode_attribute, Attribute, Code, ConstantPool, MemberKey, Utf8ConstantIndex};
use crate::jvm::{Deserialize, Error, MethodAccessFlags, Serialize};
use byteorder::{ReadBytesExt, WriteBytesExt};

/// Method declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub access_flags: MethodAccessFlags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Method {
    pub fn name(&self, constants: &ConstantPool) -> Result<String, Error> {
        constants.utf8(self.name_index)
    }

    pub fn descriptor(&self, constants: &ConstantPool) -> Result<String, Error> {
        constants.utf8(self.descriptor_index)
    }

    pub fn key(&self, constants: &ConstantPool) -> Result<MemberKey, Error> {
        Ok(MemberKey {
            name: self.name(constants)?,
            descriptor: self.descriptor(constants)?,
        })
    }

    /// Decoded `Code` attribute (absent for abstract and native methods)
    pub fn code(&self, constants: &ConstantPool) -> Result<Option<Code>, Error> {
        decode_attribute(&self.attributes, constants)
    }
}

impl Serialize for Method {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Method {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Method {
            access_flags: MethodAccessFlags::deserialize(reader)?,
            name_index: Utf8ConstantIndex::deserialize(reader)?,
            descriptor_index: Utf8ConstantIndex::deserialize(reader)?,
            attributes: Vec::deserialize(reader)?,
        })
    }
}
