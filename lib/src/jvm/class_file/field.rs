use super::{Attribute, ConstantPool, MemberKey, Utf8ConstantIndex};
use crate::jvm::{Deserialize, Error, FieldAccessFlags, Serialize};
use byteorder::{ReadBytesExt, WriteBytesExt};

/// Field declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub access_flags: FieldAccessFlags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Field {
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
}

impl Serialize for Field {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Field {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Field {
            access_flags: FieldAccessFlags::deserialize(reader)?,
            name_index: Utf8ConstantIndex::deserialize(reader)?,
            descriptor_index: Utf8ConstantIndex::deserialize(reader)?,
            attributes: Vec::deserialize(reader)?,
        })
    }
}
