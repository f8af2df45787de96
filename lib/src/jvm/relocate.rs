//! Copy members from one class into another
//!
//! Members refer to everything (names, descriptors, referenced classes, string literals) through
//! their class' constant pool, so a field or method cannot simply be moved between two classes.
//! [`MemberImporter`] deep-copies every constant a member uses into the target pool, reusing equal
//! constants that are already there, and rewrites the member to use the new indices. Method bodies
//! are re-encoded since a relocated `ldc` operand may no longer fit in a byte.

use crate::jvm::class_file::*;
use crate::jvm::code::{assemble, decode, OffsetMap};
use crate::jvm::errors::malformed;
use crate::jvm::Error;
use std::collections::{HashMap, HashSet};

pub struct MemberImporter<'a> {
    source: &'a ClassFile,
    source_bootstrap: Vec<BootstrapMethod>,
    target: &'a mut ConstantPool,
    target_bootstrap: &'a mut Vec<BootstrapMethod>,

    /// Source index to target index, for everything imported so far
    imported: HashMap<ConstantIndex, ConstantIndex>,
    in_progress: HashSet<ConstantIndex>,
}

impl<'a> MemberImporter<'a> {
    /// Prepare to import members of `source` into a class owning `target` and the bootstrap
    /// method table `target_bootstrap`
    pub fn new(
        source: &'a ClassFile,
        target: &'a mut ConstantPool,
        target_bootstrap: &'a mut Vec<BootstrapMethod>,
    ) -> Result<MemberImporter<'a>, Error> {
        Ok(MemberImporter {
            source,
            source_bootstrap: source.bootstrap_methods()?,
            target,
            target_bootstrap,
            imported: HashMap::new(),
            in_progress: HashSet::new(),
        })
    }

    /// Import a single constant (and, transitively, the constants it refers to)
    pub fn import_constant(&mut self, index: ConstantIndex) -> Result<ConstantIndex, Error> {
        if let Some(imported) = self.imported.get(&index) {
            return Ok(*imported);
        }
        if !self.in_progress.insert(index) {
            return Err(Error::MalformedClass(format!(
                "constant #{} refers back to itself",
                index.0
            )));
        }

        let constant = match self.source.constants.get(index)?.clone() {
            constant @ (Constant::Utf8(_)
            | Constant::Integer(_)
            | Constant::Float(_)
            | Constant::Long(_)
            | Constant::Double(_)) => constant,
            Constant::Class(name) => Constant::Class(self.import_utf8(name)?),
            Constant::String(utf8) => Constant::String(self.import_utf8(utf8)?),
            Constant::Module(name) => Constant::Module(self.import_utf8(name)?),
            Constant::Package(name) => Constant::Package(self.import_utf8(name)?),
            Constant::MethodType { descriptor } => Constant::MethodType {
                descriptor: self.import_utf8(descriptor)?,
            },
            Constant::FieldRef {
                class,
                name_and_type,
            } => Constant::FieldRef {
                class: self.import_class(class)?,
                name_and_type: self.import_name_and_type(name_and_type)?,
            },
            Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            } => Constant::MethodRef {
                class: self.import_class(class)?,
                name_and_type: self.import_name_and_type(name_and_type)?,
                is_interface,
            },
            Constant::NameAndType { name, descriptor } => Constant::NameAndType {
                name: self.import_utf8(name)?,
                descriptor: self.import_utf8(descriptor)?,
            },
            Constant::MethodHandle {
                handle_kind,
                member,
            } => Constant::MethodHandle {
                handle_kind,
                member: self.import_constant(member)?,
            },
            Constant::Dynamic {
                bootstrap_method,
                name_and_type,
            } => Constant::Dynamic {
                bootstrap_method: self.import_bootstrap_method(bootstrap_method)?,
                name_and_type: self.import_name_and_type(name_and_type)?,
            },
            Constant::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => Constant::InvokeDynamic {
                bootstrap_method: self.import_bootstrap_method(bootstrap_method)?,
                name_and_type: self.import_name_and_type(name_and_type)?,
            },
        };

        let imported = self.target.intern(constant)?;
        self.in_progress.remove(&index);
        self.imported.insert(index, imported);
        Ok(imported)
    }

    fn import_utf8(&mut self, index: Utf8ConstantIndex) -> Result<Utf8ConstantIndex, Error> {
        self.import_constant(index.0).map(Utf8ConstantIndex)
    }

    /// Import a class constant, for instance an interface of the source class
    pub fn import_class(&mut self, index: ClassConstantIndex) -> Result<ClassConstantIndex, Error> {
        self.import_constant(index.0).map(ClassConstantIndex)
    }

    fn import_name_and_type(
        &mut self,
        index: NameAndTypeConstantIndex,
    ) -> Result<NameAndTypeConstantIndex, Error> {
        self.import_constant(index.0).map(NameAndTypeConstantIndex)
    }

    fn import_optional(&mut self, index: ConstantIndex) -> Result<ConstantIndex, Error> {
        if index.is_none() {
            Ok(ConstantIndex::NONE)
        } else {
            self.import_constant(index)
        }
    }

    /// Bootstrap methods live in a class attribute, so they get copied over (and deduplicated)
    /// alongside the dynamic constants using them
    fn import_bootstrap_method(&mut self, index: u16) -> Result<u16, Error> {
        let source = self
            .source_bootstrap
            .get(index as usize)
            .cloned()
            .ok_or_else(|| {
                Error::MalformedClass(format!("missing bootstrap method {}", index))
            })?;
        let mut imported = BootstrapMethod {
            bootstrap_method: self.import_constant(source.bootstrap_method)?,
            bootstrap_arguments: vec![],
        };
        for argument in source.bootstrap_arguments {
            imported
                .bootstrap_arguments
                .push(self.import_constant(argument)?);
        }

        if let Some(existing) = self.target_bootstrap.iter().position(|m| *m == imported) {
            return Ok(existing as u16);
        }
        let position = self.target_bootstrap.len();
        if position > u16::MAX as usize {
            return Err(Error::MalformedClass(String::from(
                "too many bootstrap methods",
            )));
        }
        self.target_bootstrap.push(imported);
        Ok(position as u16)
    }

    pub fn import_field(&mut self, field: &Field) -> Result<Field, Error> {
        Ok(Field {
            access_flags: field.access_flags,
            name_index: self.import_utf8(field.name_index)?,
            descriptor_index: self.import_utf8(field.descriptor_index)?,
            attributes: self.import_attributes(&field.attributes)?,
        })
    }

    pub fn import_method(&mut self, method: &Method) -> Result<Method, Error> {
        Ok(Method {
            access_flags: method.access_flags,
            name_index: self.import_utf8(method.name_index)?,
            descriptor_index: self.import_utf8(method.descriptor_index)?,
            attributes: self.import_attributes(&method.attributes)?,
        })
    }

    fn import_attributes(&mut self, attributes: &[Attribute]) -> Result<Vec<Attribute>, Error> {
        let mut imported = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            if let Some(attribute) = self.import_attribute(attribute)? {
                imported.push(attribute);
            }
        }
        Ok(imported)
    }

    /// Attributes with unknown layouts cannot be relocated and are dropped
    fn import_attribute(&mut self, attribute: &Attribute) -> Result<Option<Attribute>, Error> {
        let name = attribute.name(&self.source.constants)?;
        let imported = match name.as_str() {
            Code::NAME => {
                let code = self.import_code(attribute.decode()?)?;
                self.target.get_attribute(code)?
            }
            ConstantValue::NAME => {
                let ConstantValue(value) = attribute.decode::<ConstantValue>()?;
                let value = self.import_constant(value)?;
                self.target.get_attribute(ConstantValue(value))?
            }
            Exceptions::NAME => {
                let Exceptions(classes) = attribute.decode::<Exceptions>()?;
                let classes = classes
                    .into_iter()
                    .map(|class| self.import_class(class))
                    .collect::<Result<_, _>>()?;
                self.target.get_attribute(Exceptions(classes))?
            }
            Signature::NAME => {
                let Signature { signature } = attribute.decode::<Signature>()?;
                let signature = self.import_utf8(signature)?;
                self.target.get_attribute(Signature { signature })?
            }
            RuntimeVisibleAnnotations::NAME => {
                let RuntimeVisibleAnnotations(annotations) =
                    attribute.decode::<RuntimeVisibleAnnotations>()?;
                let annotations = self.import_annotations(annotations)?;
                self.target
                    .get_attribute(RuntimeVisibleAnnotations(annotations))?
            }
            RuntimeInvisibleAnnotations::NAME => {
                let RuntimeInvisibleAnnotations(annotations) =
                    attribute.decode::<RuntimeInvisibleAnnotations>()?;
                let annotations = self.import_annotations(annotations)?;
                self.target
                    .get_attribute(RuntimeInvisibleAnnotations(annotations))?
            }
            RuntimeVisibleParameterAnnotations::NAME => {
                let RuntimeVisibleParameterAnnotations(parameters) =
                    attribute.decode::<RuntimeVisibleParameterAnnotations>()?;
                let parameters = self.import_parameter_annotations(parameters)?;
                self.target
                    .get_attribute(RuntimeVisibleParameterAnnotations(parameters))?
            }
            RuntimeInvisibleParameterAnnotations::NAME => {
                let RuntimeInvisibleParameterAnnotations(parameters) =
                    attribute.decode::<RuntimeInvisibleParameterAnnotations>()?;
                let parameters = self.import_parameter_annotations(parameters)?;
                self.target
                    .get_attribute(RuntimeInvisibleParameterAnnotations(parameters))?
            }
            AnnotationDefault::NAME => {
                let AnnotationDefault(value) = attribute.decode::<AnnotationDefault>()?;
                let value = self.import_element_value(value)?;
                self.target.get_attribute(AnnotationDefault(value))?
            }
            MethodParameters::NAME => {
                let MethodParameters(parameters) = attribute.decode::<MethodParameters>()?;
                let mut imported = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    imported.push(MethodParameter {
                        name: self.import_optional(parameter.name)?,
                        access_flags: parameter.access_flags,
                    });
                }
                self.target.get_attribute(MethodParameters(imported))?
            }
            "Synthetic" | "Deprecated" => Attribute {
                name_index: self.target.get_utf8(&name)?,
                info: attribute.info.clone(),
            },
            _ => {
                log::warn!(
                    "Dropping {} attribute from member imported out of {}",
                    name,
                    self.source.name()?
                );
                return Ok(None);
            }
        };
        Ok(Some(imported))
    }

    fn import_annotations(
        &mut self,
        annotations: Vec<Annotation>,
    ) -> Result<Vec<Annotation>, Error> {
        annotations
            .into_iter()
            .map(|annotation| self.import_annotation(annotation))
            .collect()
    }

    fn import_parameter_annotations(
        &mut self,
        parameters: Vec<Vec<Annotation>>,
    ) -> Result<Vec<Vec<Annotation>>, Error> {
        parameters
            .into_iter()
            .map(|annotations| self.import_annotations(annotations))
            .collect()
    }

    fn import_annotation(&mut self, annotation: Annotation) -> Result<Annotation, Error> {
        let mut element_value_pairs = Vec::with_capacity(annotation.element_value_pairs.len());
        for pair in annotation.element_value_pairs {
            element_value_pairs.push(ElementValuePair {
                element_name: self.import_utf8(pair.element_name)?,
                value: self.import_element_value(pair.value)?,
            });
        }
        Ok(Annotation {
            type_index: self.import_utf8(annotation.type_index)?,
            element_value_pairs,
        })
    }

    fn import_element_value(&mut self, value: ElementValue) -> Result<ElementValue, Error> {
        Ok(match value {
            ElementValue::Const { tag, value } => ElementValue::Const {
                tag,
                value: self.import_constant(value)?,
            },
            ElementValue::Enum {
                type_name,
                const_name,
            } => ElementValue::Enum {
                type_name: self.import_utf8(type_name)?,
                const_name: self.import_utf8(const_name)?,
            },
            ElementValue::Class(class) => ElementValue::Class(self.import_utf8(class)?),
            ElementValue::Annotation(annotation) => {
                ElementValue::Annotation(self.import_annotation(annotation)?)
            }
            ElementValue::Array(values) => ElementValue::Array(
                values
                    .into_iter()
                    .map(|value| self.import_element_value(value))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Relocate every constant operand, then re-encode the body and shift whatever refers to
    /// bytecode offsets
    fn import_code(&mut self, code: Code) -> Result<Code, Error> {
        let mut instructions = decode(&code.code_array)?;
        for instruction in &mut instructions {
            if let Some(index) = instruction.constant_mut() {
                *index = self.import_constant(*index)?;
            }
        }
        let (code_array, offsets) = assemble(&mut instructions, code.code_array.len() as u32)?;

        let mut exception_table = Vec::with_capacity(code.exception_table.len());
        for handler in &code.exception_table {
            exception_table.push(ExceptionHandler {
                start_pc: offsets.get_u16(handler.start_pc)?,
                end_pc: offsets.get_u16(handler.end_pc)?,
                handler_pc: offsets.get_u16(handler.handler_pc)?,
                catch_type: self.import_optional(handler.catch_type)?,
            });
        }

        let mut attributes = Vec::with_capacity(code.attributes.len());
        for attribute in &code.attributes {
            let name = attribute.name(&self.source.constants)?;
            let imported = match name.as_str() {
                StackMapTable::NAME => {
                    let table = self.import_stack_map(attribute.decode()?, &offsets)?;
                    self.target.get_attribute(table)?
                }
                LineNumberTable::NAME => {
                    let LineNumberTable(mut lines) = attribute.decode::<LineNumberTable>()?;
                    for line in &mut lines {
                        line.start_pc = offsets.get_u16(line.start_pc)?;
                    }
                    self.target.get_attribute(LineNumberTable(lines))?
                }
                LocalVariableTable::NAME => {
                    let LocalVariableTable(variables) = attribute.decode::<LocalVariableTable>()?;
                    let variables = self.import_local_variables(variables, &offsets)?;
                    self.target.get_attribute(LocalVariableTable(variables))?
                }
                LocalVariableTypeTable::NAME => {
                    let LocalVariableTypeTable(variables) =
                        attribute.decode::<LocalVariableTypeTable>()?;
                    let variables = self.import_local_variables(variables, &offsets)?;
                    self.target
                        .get_attribute(LocalVariableTypeTable(variables))?
                }
                _ => {
                    log::warn!(
                        "Dropping {} code attribute from method imported out of {}",
                        name,
                        self.source.name()?
                    );
                    continue;
                }
            };
            attributes.push(imported);
        }

        Ok(Code {
            max_stack: code.max_stack,
            max_locals: code.max_locals,
            code_array,
            exception_table,
            attributes,
        })
    }

    fn import_stack_map(
        &mut self,
        mut table: StackMapTable,
        offsets: &OffsetMap,
    ) -> Result<StackMapTable, Error> {
        let mut frame_offsets = Vec::with_capacity(table.0.len());
        for offset in table.absolute_offsets() {
            frame_offsets.push(offsets.get(offset)?);
        }
        for frame in &mut table.0 {
            for verification_type in frame.verification_types_mut() {
                match verification_type {
                    VerificationType::Object(class) => *class = self.import_class(*class)?,
                    VerificationType::Uninitialized(new_at) => {
                        *new_at = offsets.get_u16(*new_at)?
                    }
                    _ => (),
                }
            }
        }
        table
            .set_absolute_offsets(&frame_offsets)
            .map_err(malformed)?;
        Ok(table)
    }

    fn import_local_variables(
        &mut self,
        variables: Vec<LocalVariable>,
        offsets: &OffsetMap,
    ) -> Result<Vec<LocalVariable>, Error> {
        let mut imported = Vec::with_capacity(variables.len());
        for variable in variables {
            let start_pc = offsets.get_u16(variable.start_pc)?;
            let end_pc = offsets.get_u16(variable.start_pc.saturating_add(variable.length))?;
            imported.push(LocalVariable {
                start_pc,
                length: end_pc - start_pc,
                name: self.import_utf8(variable.name)?,
                descriptor: self.import_utf8(variable.descriptor)?,
                index: variable.index,
            });
        }
        Ok(imported)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::opcodes::*;
    use crate::jvm::code::{Instruction, Operand};
    use crate::jvm::{ClassAccessFlags, MethodAccessFlags};

    fn class(name: &str) -> ClassFile {
        ClassFile::new(
            Version::JAVA17,
            ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            name,
            Some("java/lang/Object"),
        )
        .unwrap()
    }

    /// Source method `m` loads a string, reads field `a.f` and branches to `L` (offset 11), with a
    /// stack map frame at `L` and a line number table
    fn source_class() -> ClassFile {
        let mut source = class("a");
        let hello = source.constants.get_string("hello").unwrap();
        let field = source.constants.get_field_ref("a", "f", "Lb;").unwrap();
        let object = source.constants.get_class("b").unwrap();
        assert!(hello.0 <= 255);

        let table = StackMapTable(vec![StackMapFrame::AppendLocalsNoStack {
            offset_delta: 11,
            locals: vec![VerificationType::Object(object)],
        }]);
        let lines = LineNumberTable(vec![LineNumber {
            start_pc: 3,
            line_number: 42,
        }]);
        let code_attributes = vec![
            source.constants.get_attribute(table).unwrap(),
            source.constants.get_attribute(lines).unwrap(),
        ];
        let [f_hi, f_lo] = field.0.to_be_bytes();
        let code = Code {
            max_stack: 1,
            max_locals: 2,
            code_array: vec![
                LDC, hello.0 as u8,     // 0
                ASTORE_1,               // 2
                ALOAD_0,                // 3
                GETFIELD, f_hi, f_lo,   // 4
                IFNULL, 0, 4,           // 7 -> 11
                RETURN,                 // 10
                RETURN,                 // 11
            ],
            exception_table: vec![ExceptionHandler {
                start_pc: 3,
                end_pc: 10,
                handler_pc: 11,
                catch_type: ConstantIndex::NONE,
            }],
            attributes: code_attributes,
        };
        source
            .add_method(MethodAccessFlags::PUBLIC, "m", "()V", Some(code))
            .unwrap();
        source
    }

    #[test]
    fn imported_method_resolves_to_the_same_symbols() {
        let source = source_class();
        let mut target = class("a");
        let mut bootstrap = vec![];

        // Push the target pool past 255 entries so the relocated `ldc` has to widen
        for i in 0..300 {
            target.constants.get_integer(i).unwrap();
        }

        let method = MemberImporter::new(&source, &mut target.constants, &mut bootstrap)
            .unwrap()
            .import_method(&source.methods[0])
            .unwrap();
        assert!(bootstrap.is_empty());
        assert_eq!(method.name(&target.constants).unwrap(), "m");

        let code = method.code(&target.constants).unwrap().unwrap();
        let instructions = decode(&code.code_array).unwrap();
        assert_eq!(instructions[0].opcode, LDC_W);
        match target.constants.get(instructions[0].constant().unwrap()).unwrap() {
            Constant::String(utf8) => assert_eq!(target.constants.utf8(*utf8).unwrap(), "hello"),
            other => panic!("unexpected constant {:?}", other),
        }
        let field = target
            .constants
            .member_ref(instructions[3].constant().unwrap())
            .unwrap();
        assert_eq!((field.owner.as_str(), field.name.as_str()), ("a", "f"));

        // Everything after the `ldc` moved by one byte
        assert_eq!(
            instructions[4],
            Instruction {
                offset: 8,
                opcode: IFNULL,
                operand: Operand::Branch(4),
            }
        );
        assert_eq!(
            code.exception_table[0],
            ExceptionHandler {
                start_pc: 4,
                end_pc: 11,
                handler_pc: 12,
                catch_type: ConstantIndex::NONE,
            }
        );

        let table: StackMapTable = decode_attribute(&code.attributes, &target.constants)
            .unwrap()
            .unwrap();
        assert_eq!(table.absolute_offsets(), vec![12]);
        match &table.0[0] {
            StackMapFrame::AppendLocalsNoStack { locals, .. } => match locals[0] {
                VerificationType::Object(class) => {
                    assert_eq!(target.constants.class_name(class).unwrap(), "b")
                }
                other => panic!("unexpected local {:?}", other),
            },
            other => panic!("unexpected frame {:?}", other),
        }

        let lines: LineNumberTable = decode_attribute(&code.attributes, &target.constants)
            .unwrap()
            .unwrap();
        assert_eq!(lines.0[0].start_pc, 4);
    }

    #[test]
    fn constants_are_shared_with_the_target() {
        let source = source_class();
        let mut target = class("a");
        let existing = target.constants.get_field_ref("a", "f", "Lb;").unwrap();
        let mut bootstrap = vec![];

        let method = MemberImporter::new(&source, &mut target.constants, &mut bootstrap)
            .unwrap()
            .import_method(&source.methods[0])
            .unwrap();
        let code = method.code(&target.constants).unwrap().unwrap();
        let instructions = decode(&code.code_array).unwrap();
        assert_eq!(instructions[0].opcode, LDC);
        assert_eq!(instructions[3].constant(), Some(existing));
    }

    #[test]
    fn invokedynamic_brings_its_bootstrap_method() {
        let mut source = class("a");
        let factory = source
            .constants
            .get_method_ref(
                "java/lang/invoke/LambdaMetafactory",
                "metafactory",
                "(Ljava/lang/invoke/MethodHandles$Lookup;)Ljava/lang/invoke/CallSite;",
                false,
            )
            .unwrap();
        let handle = source
            .constants
            .get_method_handle(HandleKind::InvokeStatic, factory)
            .unwrap();
        let argument = source.constants.get_method_type("()V").unwrap();
        source
            .set_bootstrap_methods(vec![BootstrapMethod {
                bootstrap_method: handle,
                bootstrap_arguments: vec![argument],
            }])
            .unwrap();
        let indy = source
            .constants
            .get_invoke_dynamic(0, "run", "()Ljava/lang/Runnable;")
            .unwrap();
        let [hi, lo] = indy.0.to_be_bytes();
        let code = Code {
            max_stack: 1,
            max_locals: 0,
            code_array: vec![INVOKEDYNAMIC, hi, lo, 0, 0, POP, RETURN],
            exception_table: vec![],
            attributes: vec![],
        };
        source
            .add_method(MethodAccessFlags::STATIC, "lambda", "()V", Some(code))
            .unwrap();

        let mut target = class("a");
        let unrelated = BootstrapMethod {
            bootstrap_method: ConstantIndex(1),
            bootstrap_arguments: vec![],
        };
        let mut bootstrap = vec![unrelated];
        let mut importer =
            MemberImporter::new(&source, &mut target.constants, &mut bootstrap).unwrap();
        let first = importer.import_method(&source.methods[0]).unwrap();
        let second = importer.import_method(&source.methods[0]).unwrap();
        assert_eq!(first, second);
        assert_eq!(bootstrap.len(), 2);

        let code = first.code(&target.constants).unwrap().unwrap();
        let instructions = decode(&code.code_array).unwrap();
        match target.constants.get(instructions[0].constant().unwrap()).unwrap() {
            Constant::InvokeDynamic {
                bootstrap_method, ..
            } => assert_eq!(*bootstrap_method, 1),
            other => panic!("unexpected constant {:?}", other),
        }
        let imported = &bootstrap[1];
        match target.constants.get(imported.bootstrap_method).unwrap() {
            Constant::MethodHandle { member, .. } => {
                let member = target.constants.member_ref(*member).unwrap();
                assert_eq!(member.name, "metafactory");
            }
            other => panic!("unexpected constant {:?}", other),
        }
    }

    #[test]
    fn unknown_attributes_are_dropped() {
        let mut source = class("a");
        let custom = Attribute {
            name_index: source.constants.get_utf8("CustomThing").unwrap(),
            info: vec![1, 2, 3],
        };
        let signature = Signature {
            signature: source.constants.get_utf8("Ljava/util/List<La;>;").unwrap(),
        };
        let signature = source.constants.get_attribute(signature).unwrap();
        let field = source
            .add_field(crate::jvm::FieldAccessFlags::PUBLIC, "x", "Ljava/util/List;")
            .unwrap();
        field.attributes = vec![custom, signature];

        let mut target = class("a");
        let mut bootstrap = vec![];
        let field = MemberImporter::new(&source, &mut target.constants, &mut bootstrap)
            .unwrap()
            .import_field(&source.fields[0])
            .unwrap();
        assert_eq!(field.attributes.len(), 1);
        assert_eq!(field.attributes[0].name(&target.constants).unwrap(), "Signature");
        let Signature { signature } = field.attributes[0].decode::<Signature>().unwrap();
        assert_eq!(
            target.constants.utf8(signature).unwrap(),
            "Ljava/util/List<La;>;"
        );
    }
}
