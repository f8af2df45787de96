use super::{Attribute, AttributeLike};
use crate::jvm::errors::malformed;
use crate::jvm::{read_bytes, Deserialize, Error, Serialize};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;

/// Class file constant pool
///
/// Indexing starts at 1 and `Long`/`Double` constants take two slots, so the pool is stored as a
/// vector indexed directly by constant index with `None` in the unusable slots. Inserting goes
/// through [`ConstantPool::intern`], which returns an existing equal constant when there is one.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<Option<Constant>>,
    lookup: HashMap<Constant, ConstantIndex>,
}

impl Default for ConstantPool {
    fn default() -> ConstantPool {
        ConstantPool::new()
    }
}

impl ConstantPool {
    /// Make a fresh empty constants pool
    pub fn new() -> ConstantPool {
        ConstantPool {
            entries: vec![None],
            lookup: HashMap::new(),
        }
    }

    /// Value of `constant_pool_count` (one more than the largest index)
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over all usable constants along with their indices
    pub fn iter(&self) -> impl Iterator<Item = (ConstantIndex, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| Some((ConstantIndex(idx as u16), entry.as_ref()?)))
    }

    pub fn get(&self, index: impl Into<ConstantIndex>) -> Result<&Constant, Error> {
        let index = index.into();
        self.entries
            .get(index.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::MissingConstant(index))
    }

    /// Push a constant into the constant pool, provided there is space for it
    ///
    /// Note: the largest valid index is 65535, indexing starts at 1, and some constants take two
    /// spaces.
    fn push_constant(&mut self, constant: Constant) -> Result<ConstantIndex, Error> {
        let offset = self.entries.len();
        if offset + constant.width() > u16::MAX as usize {
            return Err(Error::ConstantPoolOverflow { constant, offset });
        }

        let index = ConstantIndex(offset as u16);
        let wide = constant.width() == 2;
        self.lookup.entry(constant.clone()).or_insert(index);
        self.entries.push(Some(constant));
        if wide {
            self.entries.push(None);
        }
        Ok(index)
    }

    /// Get or insert a constant
    pub fn intern(&mut self, constant: Constant) -> Result<ConstantIndex, Error> {
        match self.lookup.get(&constant) {
            Some(idx) => Ok(*idx),
            None => self.push_constant(constant),
        }
    }

    /// Get or insert a utf8 constant from the constant pool
    pub fn get_utf8(&mut self, utf8: &str) -> Result<Utf8ConstantIndex, Error> {
        self.get_utf8_bytes(encode_modified_utf8(utf8))
    }

    /// Get or insert a utf8 constant that is already in modified UTF-8
    pub fn get_utf8_bytes(&mut self, bytes: Vec<u8>) -> Result<Utf8ConstantIndex, Error> {
        if bytes.len() > u16::MAX as usize {
            let offset = self.entries.len();
            return Err(Error::ConstantPoolOverflow {
                constant: Constant::Utf8(bytes),
                offset,
            });
        }
        self.intern(Constant::Utf8(bytes)).map(Utf8ConstantIndex)
    }

    /// Get or insert a class constant
    pub fn get_class(&mut self, name: &str) -> Result<ClassConstantIndex, Error> {
        let name = self.get_utf8(name)?;
        self.intern(Constant::Class(name)).map(ClassConstantIndex)
    }

    /// Get or insert a string constant from the constant pool
    pub fn get_string(&mut self, string: &str) -> Result<ConstantIndex, Error> {
        let utf8 = self.get_utf8(string)?;
        self.intern(Constant::String(utf8))
    }

    pub fn get_integer(&mut self, integer: i32) -> Result<ConstantIndex, Error> {
        self.intern(Constant::Integer(integer))
    }

    pub fn get_long(&mut self, long: i64) -> Result<ConstantIndex, Error> {
        self.intern(Constant::Long(long))
    }

    /// Get or insert a name & type constant from the constant pool
    pub fn get_name_and_type(
        &mut self,
        name: &str,
        descriptor: &str,
    ) -> Result<NameAndTypeConstantIndex, Error> {
        let name = self.get_utf8(name)?;
        let descriptor = self.get_utf8(descriptor)?;
        self.intern(Constant::NameAndType { name, descriptor })
            .map(NameAndTypeConstantIndex)
    }

    pub fn get_field_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<ConstantIndex, Error> {
        let class = self.get_class(class)?;
        let name_and_type = self.get_name_and_type(name, descriptor)?;
        self.intern(Constant::FieldRef {
            class,
            name_and_type,
        })
    }

    pub fn get_method_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) -> Result<ConstantIndex, Error> {
        let class = self.get_class(class)?;
        let name_and_type = self.get_name_and_type(name, descriptor)?;
        self.intern(Constant::MethodRef {
            class,
            name_and_type,
            is_interface,
        })
    }

    pub fn get_method_type(&mut self, descriptor: &str) -> Result<ConstantIndex, Error> {
        let descriptor = self.get_utf8(descriptor)?;
        self.intern(Constant::MethodType { descriptor })
    }

    pub fn get_method_handle(
        &mut self,
        handle_kind: HandleKind,
        member: ConstantIndex,
    ) -> Result<ConstantIndex, Error> {
        self.intern(Constant::MethodHandle {
            handle_kind,
            member,
        })
    }

    pub fn get_invoke_dynamic(
        &mut self,
        bootstrap_method: u16,
        name: &str,
        descriptor: &str,
    ) -> Result<ConstantIndex, Error> {
        let name_and_type = self.get_name_and_type(name, descriptor)?;
        self.intern(Constant::InvokeDynamic {
            bootstrap_method,
            name_and_type,
        })
    }

    /// Add an attribute to the constant pool
    pub fn get_attribute<A: AttributeLike>(&mut self, attribute: A) -> Result<Attribute, Error> {
        let name_index = self.get_utf8(A::NAME)?;
        let mut info = vec![];
        attribute.serialize(&mut info)?;
        Ok(Attribute { name_index, info })
    }

    /// Raw modified UTF-8 bytes of a utf8 constant
    pub fn utf8_bytes(&self, index: Utf8ConstantIndex) -> Result<&[u8], Error> {
        match self.get(index)? {
            Constant::Utf8(bytes) => Ok(bytes),
            _ => Err(unexpected(index, "Utf8")),
        }
    }

    /// Decoded string of a utf8 constant
    pub fn utf8(&self, index: Utf8ConstantIndex) -> Result<String, Error> {
        decode_modified_utf8(self.utf8_bytes(index)?).map_err(Error::MalformedClass)
    }

    /// Internal name (or array descriptor) referenced by a class constant
    pub fn class_name(&self, index: ClassConstantIndex) -> Result<String, Error> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(unexpected(index, "Class")),
        }
    }

    pub fn name_and_type(
        &self,
        index: NameAndTypeConstantIndex,
    ) -> Result<(String, String), Error> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(unexpected(index, "NameAndType")),
        }
    }

    /// Owner, name, and descriptor of a field or method reference
    pub fn member_ref(&self, index: ConstantIndex) -> Result<MemberRef, Error> {
        let (class, name_and_type) = match self.get(index)? {
            Constant::FieldRef {
                class,
                name_and_type,
            }
            | Constant::MethodRef {
                class,
                name_and_type,
                ..
            } => (*class, *name_and_type),
            _ => return Err(unexpected(index, "FieldRef or MethodRef")),
        };
        let (name, descriptor) = self.name_and_type(name_and_type)?;
        Ok(MemberRef {
            owner: self.class_name(class)?,
            name,
            descriptor,
        })
    }

    /// Read the pool (starting at `constant_pool_count`) and check that every index stored in a
    /// constant points at a constant of the right kind
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<ConstantPool, Error> {
        let count = u16::deserialize(reader).map_err(malformed)?;
        if count == 0 {
            return Err(Error::MalformedClass(String::from(
                "constant_pool_count must be at least 1",
            )));
        }

        let mut pool = ConstantPool::new();
        while pool.entries.len() < count as usize {
            let constant = Constant::deserialize(reader).map_err(malformed)?;
            if pool.entries.len() + constant.width() > count as usize {
                return Err(Error::MalformedClass(String::from(
                    "wide constant in the last constant pool slot",
                )));
            }
            pool.push_constant(constant)?;
        }

        pool.validate()?;
        Ok(pool)
    }

    fn validate(&self) -> Result<(), Error> {
        let check = |index: ConstantIndex, expected: &'static str, ok: fn(&Constant) -> bool| {
            match self.get(index) {
                Ok(constant) if ok(constant) => Ok(()),
                Ok(_) => Err(unexpected(index, expected)),
                Err(_) => Err(Error::MalformedClass(format!(
                    "dangling constant pool index #{}",
                    index.0
                ))),
            }
        };
        let utf8 = |c: &Constant| matches!(c, Constant::Utf8(_));
        let class = |c: &Constant| matches!(c, Constant::Class(_));
        let name_and_type = |c: &Constant| matches!(c, Constant::NameAndType { .. });
        let field = |c: &Constant| matches!(c, Constant::FieldRef { .. });
        let method = |c: &Constant| matches!(c, Constant::MethodRef { .. });

        for (_, constant) in self.iter() {
            match constant {
                Constant::Class(name)
                | Constant::String(name)
                | Constant::Module(name)
                | Constant::Package(name)
                | Constant::MethodType { descriptor: name } => check(name.0, "Utf8", utf8)?,
                Constant::FieldRef {
                    class: owner,
                    name_and_type: nat,
                }
                | Constant::MethodRef {
                    class: owner,
                    name_and_type: nat,
                    ..
                } => {
                    check(owner.0, "Class", class)?;
                    check(nat.0, "NameAndType", name_and_type)?;
                }
                Constant::NameAndType { name, descriptor } => {
                    check(name.0, "Utf8", utf8)?;
                    check(descriptor.0, "Utf8", utf8)?;
                }
                Constant::MethodHandle {
                    handle_kind,
                    member,
                } => {
                    if handle_kind.is_field() {
                        check(*member, "FieldRef", field)?
                    } else {
                        check(*member, "MethodRef", method)?
                    }
                }
                Constant::Dynamic { name_and_type: nat, .. }
                | Constant::InvokeDynamic { name_and_type: nat, .. } => {
                    check(nat.0, "NameAndType", name_and_type)?
                }
                Constant::Integer(_)
                | Constant::Float(_)
                | Constant::Long(_)
                | Constant::Double(_)
                | Constant::Utf8(_) => (),
            }
        }
        Ok(())
    }
}

impl Serialize for ConstantPool {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        (self.entries.len() as u16).serialize(writer)?;
        for constant in self.entries.iter().flatten() {
            constant.serialize(writer)?;
        }
        Ok(())
    }
}

fn unexpected(index: impl Into<ConstantIndex>, expected: &'static str) -> Error {
    Error::UnexpectedConstant {
        index: index.into(),
        expected,
    }
}

/// Symbolic reference to a field or method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// Constants as in the constant pool
///
/// Floating point constants are kept as raw bits so that every constant (including `NaN`
/// payloads) can be compared, hashed, and written back unchanged. Likewise, `Utf8` keeps the
/// modified UTF-8 bytes since Java strings may contain unpaired surrogates.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Field
    FieldRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Method (this combines `Methodref` and `InterfaceMethodref`
    MethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
        is_interface: bool,
    },

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`
    Float(u32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(u64),

    /// Name and a type (eg. for a field or a method)
    NameAndType {
        name: Utf8ConstantIndex,
        descriptor: Utf8ConstantIndex,
    },

    /// Constant modified UTF-8 encoded raw string value
    Utf8(Vec<u8>),

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle {
        handle_kind: HandleKind,

        /// Depending on the method kind, this points to different things:
        ///
        ///   - `FieldRef` for `GetField`, `GetStatic`, `PutField`, `PutStatic`
        ///   - `MethodRef` for the rest
        member: ConstantIndex,
    },

    /// Method type
    MethodType { descriptor: Utf8ConstantIndex },

    /// Dynamically-computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    Module(Utf8ConstantIndex),

    Package(Utf8ConstantIndex),
}

impl Constant {
    /// Almost all constants have width 1, except for `Constant::Long` and `Constant::Double`.
    /// Quoting the JVM spec:
    ///
    /// > In retrospect, making 8-byte constants take two constant pool entries was a poor choice.
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

impl Serialize for Constant {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            Constant::Utf8(bytes) => {
                1u8.serialize(writer)?;
                (bytes.len() as u16).serialize(writer)?;
                writer.write_all(bytes)?;
            }
            Constant::Integer(integer) => {
                3u8.serialize(writer)?;
                integer.serialize(writer)?;
            }
            Constant::Float(bits) => {
                4u8.serialize(writer)?;
                bits.serialize(writer)?;
            }
            Constant::Long(long) => {
                5u8.serialize(writer)?;
                long.serialize(writer)?;
            }
            Constant::Double(bits) => {
                6u8.serialize(writer)?;
                bits.serialize(writer)?;
            }
            Constant::Class(name) => {
                7u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::String(utf8) => {
                8u8.serialize(writer)?;
                utf8.serialize(writer)?;
            }
            Constant::FieldRef {
                class,
                name_and_type,
            } => {
                9u8.serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            } => {
                (if !is_interface { 10u8 } else { 11u8 }).serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::NameAndType { name, descriptor } => {
                12u8.serialize(writer)?;
                name.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::MethodHandle {
                handle_kind,
                member,
            } => {
                15u8.serialize(writer)?;
                (*handle_kind as u8).serialize(writer)?;
                member.serialize(writer)?;
            }
            Constant::MethodType { descriptor } => {
                16u8.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::Dynamic {
                bootstrap_method,
                name_and_type,
            } => {
                17u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => {
                18u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::Module(name) => {
                19u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::Package(name) => {
                20u8.serialize(writer)?;
                name.serialize(writer)?;
            }
        };
        Ok(())
    }
}

impl Deserialize for Constant {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        let tag = u8::deserialize(reader)?;
        let constant = match tag {
            1 => {
                let len = u16::deserialize(reader)?;
                Constant::Utf8(read_bytes(reader, len as usize)?)
            }
            3 => Constant::Integer(i32::deserialize(reader)?),
            4 => Constant::Float(u32::deserialize(reader)?),
            5 => Constant::Long(i64::deserialize(reader)?),
            6 => Constant::Double(u64::deserialize(reader)?),
            7 => Constant::Class(Utf8ConstantIndex::deserialize(reader)?),
            8 => Constant::String(Utf8ConstantIndex::deserialize(reader)?),
            9 => Constant::FieldRef {
                class: ClassConstantIndex::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            10 | 11 => Constant::MethodRef {
                class: ClassConstantIndex::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
                is_interface: tag == 11,
            },
            12 => Constant::NameAndType {
                name: Utf8ConstantIndex::deserialize(reader)?,
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            15 => Constant::MethodHandle {
                handle_kind: HandleKind::deserialize(reader)?,
                member: ConstantIndex::deserialize(reader)?,
            },
            16 => Constant::MethodType {
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            17 => Constant::Dynamic {
                bootstrap_method: u16::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            18 => Constant::InvokeDynamic {
                bootstrap_method: u16::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            19 => Constant::Module(Utf8ConstantIndex::deserialize(reader)?),
            20 => Constant::Package(Utf8ConstantIndex::deserialize(reader)?),
            _ => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unknown constant pool tag {}", tag),
                ))
            }
        };
        Ok(constant)
    }
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn encode_modified_utf8(string: &str) -> Vec<u8> {
    let mut buffer: Vec<u8> = Vec::with_capacity(string.len());
    for unit in string.encode_utf16() {
        let code = unit as u32;
        match code {
            0x0001..=0x007F => buffer.push(code as u8),
            0x0000 | 0x0080..=0x07FF => {
                buffer.push((code >> 6 & 0x1F) as u8 | 0b1100_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
            _ => {
                buffer.push((code >> 12 & 0x0F) as u8 | 0b1110_0000);
                buffer.push((code >> 6 & 0x3F) as u8 | 0b1000_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
        }
    }
    buffer
}

/// Inverse of [`encode_modified_utf8`]
///
/// Fails on malformed byte sequences and on surrogates that do not pair up (those are legal in
/// Java strings, but have no `String` representation).
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String, String> {
    let continuation = |idx: usize| -> Result<u16, String> {
        match bytes.get(idx) {
            Some(b) if b & 0b1100_0000 == 0b1000_0000 => Ok((b & 0x3F) as u16),
            _ => Err(format!("bad modified UTF-8 continuation byte at {}", idx)),
        }
    };

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        let lead = bytes[idx];
        if lead != 0 && lead & 0b1000_0000 == 0 {
            units.push(lead as u16);
            idx += 1;
        } else if lead & 0b1110_0000 == 0b1100_0000 {
            units.push(((lead & 0x1F) as u16) << 6 | continuation(idx + 1)?);
            idx += 2;
        } else if lead & 0b1111_0000 == 0b1110_0000 {
            let high = continuation(idx + 1)?;
            let low = continuation(idx + 2)?;
            units.push(((lead & 0x0F) as u16) << 12 | high << 6 | low);
            idx += 3;
        } else {
            return Err(format!("bad modified UTF-8 lead byte {:#x} at {}", lead, idx));
        }
    }
    String::from_utf16(&units).map_err(|_| String::from("unpaired surrogate in modified UTF-8"))
}


#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ConstantIndex(pub u16);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Utf8ConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ClassConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct NameAndTypeConstantIndex(pub ConstantIndex);

impl ConstantIndex {
    /// Index `0`, used for optional references (eg. `catch_type` of a `finally` handler)
    pub const NONE: ConstantIndex = ConstantIndex(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl Serialize for ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for ConstantIndex {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        u16::deserialize(reader).map(ConstantIndex)
    }
}

macro_rules! typed_index {
    ($($index:ident),*) => {
        $(
            impl From<$index> for ConstantIndex {
                fn from(index: $index) -> ConstantIndex {
                    index.0
                }
            }

            impl Serialize for $index {
                fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
                    self.0.serialize(writer)
                }
            }

            impl Deserialize for $index {
                fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
                    ConstantIndex::deserialize(reader).map($index)
                }
            }
        )*
    };
}

typed_index!(Utf8ConstantIndex, ClassConstantIndex, NameAndTypeConstantIndex);

/// Type of method handle
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-5.html#jvms-5.4.3.5
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum HandleKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl HandleKind {
    pub fn is_field(self) -> bool {
        (self as u8) <= 4
    }
}

impl Deserialize for HandleKind {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        let kind = match u8::deserialize(reader)? {
            1 => HandleKind::GetField,
            2 => HandleKind::GetStatic,
            3 => HandleKind::PutField,
            4 => HandleKind::PutStatic,
            5 => HandleKind::InvokeVirtual,
            6 => HandleKind::InvokeStatic,
            7 => HandleKind::InvokeSpecial,
            8 => HandleKind::NewInvokeSpecial,
            9 => HandleKind::InvokeInterface,
            other => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unknown method handle kind {}", other),
                ))
            }
        };
        Ok(kind)
    }
}
