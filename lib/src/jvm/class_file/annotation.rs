use super::{Attribute, AttributeLike, ConstantIndex, ConstantPool, Utf8ConstantIndex};
use crate::jvm::{Deserialize, Error, Serialize};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{Error as IoError, ErrorKind};

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.16
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface (`Lnet/minecraftforge/api/distmarker/OnlyIn;`)
    pub type_index: Utf8ConstantIndex,
    pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementValuePair {
    pub element_name: Utf8ConstantIndex,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// Primitive or string constant, `tag` being one of `BCDFIJSZs`
    Const { tag: u8, value: ConstantIndex },
    Enum {
        type_name: Utf8ConstantIndex,
        const_name: Utf8ConstantIndex,
    },
    /// Return descriptor of the class literal
    Class(Utf8ConstantIndex),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

impl Annotation {
    /// Value of the element named `name`, if present
    pub fn element<'a>(
        &'a self,
        constants: &ConstantPool,
        name: &str,
    ) -> Result<Option<&'a ElementValue>, Error> {
        for pair in &self.element_value_pairs {
            if constants.utf8_bytes(pair.element_name)? == name.as_bytes() {
                return Ok(Some(&pair.value));
            }
        }
        Ok(None)
    }
}

impl Serialize for Annotation {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.type_index.serialize(writer)?;
        self.element_value_pairs.serialize(writer)
    }
}

impl Deserialize for Annotation {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Annotation {
            type_index: Utf8ConstantIndex::deserialize(reader)?,
            element_value_pairs: Vec::deserialize(reader)?,
        })
    }
}

impl Serialize for ElementValuePair {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.element_name.serialize(writer)?;
        self.value.serialize(writer)
    }
}

impl Deserialize for ElementValuePair {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(ElementValuePair {
            element_name: Utf8ConstantIndex::deserialize(reader)?,
            value: ElementValue::deserialize(reader)?,
        })
    }
}

impl Serialize for ElementValue {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            ElementValue::Const { tag, value } => {
                tag.serialize(writer)?;
                value.serialize(writer)?;
            }
            ElementValue::Enum {
                type_name,
                const_name,
            } => {
                b'e'.serialize(writer)?;
                type_name.serialize(writer)?;
                const_name.serialize(writer)?;
            }
            ElementValue::Class(class) => {
                b'c'.serialize(writer)?;
                class.serialize(writer)?;
            }
            ElementValue::Annotation(annotation) => {
                b'@'.serialize(writer)?;
                annotation.serialize(writer)?;
            }
            ElementValue::Array(values) => {
                b'['.serialize(writer)?;
                values.serialize(writer)?;
            }
        }
        Ok(())
    }
}

impl Deserialize for ElementValue {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        let tag = u8::deserialize(reader)?;
        let value = match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
                tag,
                value: ConstantIndex::deserialize(reader)?,
            },
            b'e' => ElementValue::Enum {
                type_name: Utf8ConstantIndex::deserialize(reader)?,
                const_name: Utf8ConstantIndex::deserialize(reader)?,
            },
            b'c' => ElementValue::Class(Utf8ConstantIndex::deserialize(reader)?),
            b'@' => ElementValue::Annotation(Annotation::deserialize(reader)?),
            b'[' => ElementValue::Array(Vec::deserialize(reader)?),
            other => {
                let msg = format!("unknown element value tag {:?}", other as char);
                return Err(IoError::new(ErrorKind::InvalidData, msg));
            }
        };
        Ok(value)
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.16
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeVisibleAnnotations(pub Vec<Annotation>);

/// Same layout as [`RuntimeVisibleAnnotations`], but not exposed through reflection
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.17
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeInvisibleAnnotations(pub Vec<Annotation>);

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.18
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVisibleParameterAnnotations(pub Vec<Vec<Annotation>>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInvisibleParameterAnnotations(pub Vec<Vec<Annotation>>);

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.22
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationDefault(pub ElementValue);

impl AttributeLike for RuntimeVisibleAnnotations {
    const NAME: &'static str = "RuntimeVisibleAnnotations";
}

impl AttributeLike for RuntimeInvisibleAnnotations {
    const NAME: &'static str = "RuntimeInvisibleAnnotations";
}

impl AttributeLike for RuntimeVisibleParameterAnnotations {
    const NAME: &'static str = "RuntimeVisibleParameterAnnotations";
}

impl AttributeLike for RuntimeInvisibleParameterAnnotations {
    const NAME: &'static str = "RuntimeInvisibleParameterAnnotations";
}

impl AttributeLike for AnnotationDefault {
    const NAME: &'static str = "AnnotationDefault";
}

impl Serialize for RuntimeVisibleAnnotations {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for RuntimeVisibleAnnotations {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Vec::deserialize(reader).map(RuntimeVisibleAnnotations)
    }
}

impl Serialize for RuntimeInvisibleAnnotations {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for RuntimeInvisibleAnnotations {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Vec::deserialize(reader).map(RuntimeInvisibleAnnotations)
    }
}

/// Parameter annotation tables are counted by a `u8`
fn serialize_parameters<W: WriteBytesExt>(
    parameters: &[Vec<Annotation>],
    writer: &mut W,
) -> std::io::Result<()> {
    (parameters.len() as u8).serialize(writer)?;
    for annotations in parameters {
        annotations.serialize(writer)?;
    }
    Ok(())
}

fn deserialize_parameters<R: ReadBytesExt>(
    reader: &mut R,
) -> std::io::Result<Vec<Vec<Annotation>>> {
    let count = u8::deserialize(reader)?;
    let mut parameters = Vec::with_capacity(count as usize);
    for _ in 0..count {
        parameters.push(Vec::deserialize(reader)?);
    }
    Ok(parameters)
}

impl Serialize for RuntimeVisibleParameterAnnotations {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        serialize_parameters(&self.0, writer)
    }
}

impl Deserialize for RuntimeVisibleParameterAnnotations {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        deserialize_parameters(reader).map(RuntimeVisibleParameterAnnotations)
    }
}

impl Serialize for RuntimeInvisibleParameterAnnotations {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        serialize_parameters(&self.0, writer)
    }
}

impl Deserialize for RuntimeInvisibleParameterAnnotations {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        deserialize_parameters(reader).map(RuntimeInvisibleParameterAnnotations)
    }
}

impl Serialize for AnnotationDefault {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for AnnotationDefault {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        ElementValue::deserialize(reader).map(AnnotationDefault)
    }
}

/// Attach a marker annotation (no elements) with the given descriptor to an attribute list,
/// reusing an existing `RuntimeInvisibleAnnotations` attribute when there is one
///
/// Adding the same marker twice is a no-op.
pub fn add_invisible_annotation(
    attributes: &mut Vec<Attribute>,
    constants: &mut ConstantPool,
    descriptor: &str,
) -> Result<(), Error> {
    let type_index = constants.get_utf8(descriptor)?;
    let marker = Annotation {
        type_index,
        element_value_pairs: vec![],
    };

    let name = RuntimeInvisibleAnnotations::NAME.as_bytes();
    let mut existing = None;
    for (idx, attribute) in attributes.iter().enumerate() {
        if constants.utf8_bytes(attribute.name_index)? == name {
            existing = Some(idx);
            break;
        }
    }

    match existing {
        Some(idx) => {
            let mut annotations: RuntimeInvisibleAnnotations = attributes[idx].decode()?;
            if annotations.0.iter().any(|a| a.type_index == type_index) {
                return Ok(());
            }
            annotations.0.push(marker);
            attributes[idx] = constants.get_attribute(annotations)?;
        }
        None => {
            let annotations = RuntimeInvisibleAnnotations(vec![marker]);
            attributes.push(constants.get_attribute(annotations)?);
        }
    }
    Ok(())
}

/// Descriptors of the annotations in the visible and invisible annotation attributes
pub fn annotation_types(
    attributes: &[Attribute],
    constants: &ConstantPool,
) -> Result<Vec<String>, Error> {
    let mut types = vec![];
    for annotation in annotations(attributes, constants)? {
        types.push(constants.utf8(annotation.type_index)?);
    }
    Ok(types)
}

/// Decoded annotations from both the visible and invisible annotation attributes
pub fn annotations(
    attributes: &[Attribute],
    constants: &ConstantPool,
) -> Result<Vec<Annotation>, Error> {
    let mut found = vec![];
    for attribute in attributes {
        let name = constants.utf8_bytes(attribute.name_index)?;
        if name == RuntimeVisibleAnnotations::NAME.as_bytes() {
            found.extend(attribute.decode::<RuntimeVisibleAnnotations>()?.0);
        } else if name == RuntimeInvisibleAnnotations::NAME.as_bytes() {
            found.extend(attribute.decode::<RuntimeInvisibleAnnotations>()?.0);
        }
    }
    Ok(found)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adding_markers() {
        let mut constants = ConstantPool::new();
        let mut attributes = vec![];
        add_invisible_annotation(&mut attributes, &mut constants, "LClientOnly;").unwrap();
        add_invisible_annotation(&mut attributes, &mut constants, "LClientOnly;").unwrap();
        add_invisible_annotation(&mut attributes, &mut constants, "LOther;").unwrap();

        assert_eq!(attributes.len(), 1);
        assert_eq!(
            annotation_types(&attributes, &constants).unwrap(),
            vec![String::from("LClientOnly;"), String::from("LOther;")]
        );
    }

    #[test]
    fn enum_element_lookup() {
        let mut constants = ConstantPool::new();
        let annotation = Annotation {
            type_index: constants.get_utf8("LOnlyIn;").unwrap(),
            element_value_pairs: vec![ElementValuePair {
                element_name: constants.get_utf8("value").unwrap(),
                value: ElementValue::Enum {
                    type_name: constants.get_utf8("LDist;").unwrap(),
                    const_name: constants.get_utf8("CLIENT").unwrap(),
                },
            }],
        };
        let attributes = vec![constants
            .get_attribute(RuntimeVisibleAnnotations(vec![annotation]))
            .unwrap()];

        let decoded = annotations(&attributes, &constants).unwrap();
        let value = decoded[0].element(&constants, "value").unwrap();
        match value {
            Some(ElementValue::Enum { const_name, .. }) => {
                assert_eq!(constants.utf8(*const_name).unwrap(), "CLIENT")
            }
            other => panic!("unexpected element {:?}", other),
        }
        assert_eq!(decoded[0].element(&constants, "missing").unwrap(), None);
    }
}
