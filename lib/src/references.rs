//! Collect the classes a method or class refers to
//!
//! These sets are the edges of the class graph walked by both splitters. Array types always
//! contribute their element class and primitive types contribute nothing, since neither can be
//! assigned to one side or the other on their own.

use crate::jvm::class_file::{
    annotations, decode_attribute, Attribute, BootstrapMethod, ClassFile, Constant, ConstantIndex,
    ConstantPool, ElementValue, LocalVariableTable, Method, StackMapTable, VerificationType,
};
use crate::jvm::code::decode;
use crate::jvm::{
    class_constant_element, BinaryName, Error, FieldType, MethodDescriptor, ParseDescriptor,
};
use std::collections::{BTreeSet, HashSet};

/// Outgoing references of a whole class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassReferences {
    /// Classes used by the supertypes, fields, and methods
    pub used: BTreeSet<BinaryName>,

    /// The enclosing class and nested classes, which always end up next to this one
    pub associated: BTreeSet<BinaryName>,
}

/// Every class referenced from a method: its descriptor, the operands of its instructions
/// (including dynamic call sites and their bootstrap methods), caught exception types, stack map
/// frames, and local variable types
pub fn collect_method_references(
    class: &ClassFile,
    method: &Method,
) -> Result<BTreeSet<BinaryName>, Error> {
    let bootstrap_methods = class.bootstrap_methods()?;
    let mut collector = Collector::new(&class.constants, &bootstrap_methods);
    collector.method(method)?;
    Ok(collector.found)
}

/// References of a class, as used for reachability
///
/// Fields and methods marked client-only by one of `side_only_annotations` are skipped, unless
/// their name contains an `_` (intermediary vanilla names always do, so those members are real
/// vanilla code regardless of the annotation).
pub fn collect_class_references(
    class: &ClassFile,
    side_only_annotations: &[String],
) -> Result<ClassReferences, Error> {
    let bootstrap_methods = class.bootstrap_methods()?;
    let mut collector = Collector::new(&class.constants, &bootstrap_methods);

    if let Some(super_class) = class.super_class {
        collector.constant(super_class.0)?;
    }
    for interface in &class.interfaces {
        collector.constant(interface.0)?;
    }
    for field in &class.fields {
        let name = field.name(&class.constants)?;
        if !is_client_only(&name, &field.attributes, &class.constants, side_only_annotations)? {
            collector.field_descriptor(&field.descriptor(&class.constants)?)?;
        }
    }
    for method in &class.methods {
        let name = method.name(&class.constants)?;
        if !is_client_only(&name, &method.attributes, &class.constants, side_only_annotations)? {
            collector.method(method)?;
        }
    }

    let this_name = class.name()?;
    let mut associated = BTreeSet::new();
    for entry in class.inner_classes()? {
        if entry.inner_class != this_name && entry.inner_class.starts_with(&this_name) {
            associated.extend(class_name(&entry.inner_class)?);
        }
    }
    if let Some((outer, _)) = this_name.rsplit_once('$') {
        associated.extend(class_name(outer)?);
    }

    Ok(ClassReferences {
        used: collector.found,
        associated,
    })
}

/// References from a field descriptor (empty for primitives)
pub fn collect_field_references(descriptor: &str) -> Result<BTreeSet<BinaryName>, Error> {
    let mut found = BTreeSet::new();
    let field_type = FieldType::<BinaryName>::parse(descriptor).map_err(bad_descriptor)?;
    found.extend(field_type.element_class().cloned());
    Ok(found)
}

fn is_client_only(
    name: &str,
    attributes: &[Attribute],
    constants: &ConstantPool,
    side_only_annotations: &[String],
) -> Result<bool, Error> {
    if name.contains('_') {
        return Ok(false);
    }
    for annotation in annotations(attributes, constants)? {
        let descriptor = constants.utf8(annotation.type_index)?;
        if !side_only_annotations.contains(&descriptor) {
            continue;
        }
        if let Some(ElementValue::Enum { const_name, .. }) =
            annotation.element(constants, "value")?
        {
            if constants.utf8(*const_name)? == "CLIENT" {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn bad_descriptor(err: std::io::Error) -> Error {
    Error::BadDescriptor(err.to_string())
}

/// Name from a class constant (or array descriptor), reduced to the element class
fn class_name(name: &str) -> Result<Option<BinaryName>, Error> {
    class_constant_element(name).map_err(bad_descriptor)
}

struct Collector<'a> {
    constants: &'a ConstantPool,
    bootstrap_methods: &'a [BootstrapMethod],
    visited: HashSet<ConstantIndex>,
    found: BTreeSet<BinaryName>,
}

impl<'a> Collector<'a> {
    fn new(constants: &'a ConstantPool, bootstrap_methods: &'a [BootstrapMethod]) -> Self {
        Collector {
            constants,
            bootstrap_methods,
            visited: HashSet::new(),
            found: BTreeSet::new(),
        }
    }

    fn field_descriptor(&mut self, descriptor: &str) -> Result<(), Error> {
        let field_type = FieldType::<BinaryName>::parse(descriptor).map_err(bad_descriptor)?;
        self.found.extend(field_type.element_class().cloned());
        Ok(())
    }

    fn method_descriptor(&mut self, descriptor: &str) -> Result<(), Error> {
        let method_type =
            MethodDescriptor::<BinaryName>::parse(descriptor).map_err(bad_descriptor)?;
        self.found.extend(method_type.element_classes().cloned());
        Ok(())
    }

    /// Member descriptors are method descriptors for methods and field descriptors for fields
    fn member_descriptor(&mut self, descriptor: &str) -> Result<(), Error> {
        if descriptor.starts_with('(') {
            self.method_descriptor(descriptor)
        } else {
            self.field_descriptor(descriptor)
        }
    }

    fn constant(&mut self, index: ConstantIndex) -> Result<(), Error> {
        if !self.visited.insert(index) {
            return Ok(());
        }
        let constants = self.constants;
        match constants.get(index)? {
            Constant::Class(name) => {
                let name = constants.utf8(*name)?;
                self.found.extend(class_name(&name)?);
            }
            Constant::FieldRef { .. } | Constant::MethodRef { .. } => {
                let member = constants.member_ref(index)?;
                self.found.extend(class_name(&member.owner)?);
                self.member_descriptor(&member.descriptor)?;
            }
            Constant::MethodType { descriptor } => {
                let descriptor = constants.utf8(*descriptor)?;
                self.method_descriptor(&descriptor)?;
            }
            Constant::MethodHandle { member, .. } => self.constant(*member)?,
            Constant::Dynamic {
                bootstrap_method,
                name_and_type,
            } => {
                let (_, descriptor) = constants.name_and_type(*name_and_type)?;
                self.field_descriptor(&descriptor)?;
                self.bootstrap_method(*bootstrap_method)?;
            }
            Constant::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => {
                let (_, descriptor) = constants.name_and_type(*name_and_type)?;
                self.method_descriptor(&descriptor)?;
                self.bootstrap_method(*bootstrap_method)?;
            }
            Constant::Utf8(_)
            | Constant::String(_)
            | Constant::Integer(_)
            | Constant::Float(_)
            | Constant::Long(_)
            | Constant::Double(_)
            | Constant::NameAndType { .. }
            | Constant::Module(_)
            | Constant::Package(_) => (),
        }
        Ok(())
    }

    fn bootstrap_method(&mut self, index: u16) -> Result<(), Error> {
        let bootstrap_methods = self.bootstrap_methods;
        let method = bootstrap_methods.get(index as usize).ok_or_else(|| {
            Error::MalformedClass(format!("missing bootstrap method {}", index))
        })?;
        self.constant(method.bootstrap_method)?;
        for argument in &method.bootstrap_arguments {
            self.constant(*argument)?;
        }
        Ok(())
    }

    fn method(&mut self, method: &Method) -> Result<(), Error> {
        self.method_descriptor(&method.descriptor(self.constants)?)?;

        let code = match method.code(self.constants)? {
            Some(code) => code,
            None => return Ok(()),
        };
        for instruction in decode(&code.code_array)? {
            if let Some(index) = instruction.constant() {
                self.constant(index)?;
            }
        }
        for handler in &code.exception_table {
            if !handler.catch_type.is_none() {
                self.constant(handler.catch_type)?;
            }
        }

        let stack_map: Option<StackMapTable> =
            decode_attribute(&code.attributes, self.constants)?;
        for frame in stack_map.iter().flat_map(|table| &table.0) {
            for verification_type in frame.verification_types() {
                if let VerificationType::Object(class) = verification_type {
                    self.constant(class.0)?;
                }
            }
        }

        let local_variables: Option<LocalVariableTable> =
            decode_attribute(&code.attributes, self.constants)?;
        for variable in local_variables.iter().flat_map(|table| &table.0) {
            let descriptor = self.constants.utf8(variable.descriptor)?;
            self.field_descriptor(&descriptor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::*;
    use crate::jvm::code::opcodes::*;
    use crate::jvm::{ClassAccessFlags, FieldAccessFlags, InnerClassAccessFlags, MethodAccessFlags};

    const ONLY_IN: &str = "Lnet/minecraftforge/api/distmarker/OnlyIn;";

    fn names(names: &[&str]) -> BTreeSet<BinaryName> {
        names
            .iter()
            .map(|name| BinaryName::from_string(name.to_string()).unwrap())
            .collect()
    }

    fn class(name: &str) -> ClassFile {
        ClassFile::new(
            Version::JAVA17,
            ClassAccessFlags::PUBLIC,
            name,
            Some("java/lang/Object"),
        )
        .unwrap()
    }

    #[test]
    fn every_operand_kind() {
        let mut class = class("a/Subject");
        let constants = &mut class.constants;

        let field = constants.get_field_ref("a/Owner", "f", "La/FieldType;").unwrap();
        let bootstrap = constants
            .get_method_ref(
                "a/Bootstrap",
                "make",
                "(Ljava/lang/invoke/MethodHandles$Lookup;)La/BsmReturn;",
                false,
            )
            .unwrap();
        let handle = constants
            .get_method_handle(HandleKind::InvokeStatic, bootstrap)
            .unwrap();
        let method_type = constants.get_method_type("(La/ArgType;)V").unwrap();
        let class_argument = constants.get_class("a/ClassArg").unwrap();
        let indy = constants.get_invoke_dynamic(0, "site", "()La/Site;").unwrap();
        let literal = constants.get_class("[[La/Literal;").unwrap();
        let cast = constants.get_class("a/Cast").unwrap();
        let multi = constants.get_class("[[La/Multi;").unwrap();
        let caught = constants.get_class("a/Caught").unwrap();
        let frame = constants.get_class("a/Frame").unwrap();
        let local_name = constants.get_utf8("x").unwrap();
        let local_descriptor = constants.get_utf8("[La/Local;").unwrap();
        assert!(literal.0 .0 <= 255);

        let stack_map = StackMapTable(vec![StackMapFrame::SameLocalsOneStack {
            offset_delta: 18,
            stack: VerificationType::Object(frame),
        }]);
        let locals = LocalVariableTable(vec![LocalVariable {
            start_pc: 0,
            length: 19,
            name: local_name,
            descriptor: local_descriptor,
            index: 1,
        }]);
        let code_attributes = vec![
            constants.get_attribute(stack_map).unwrap(),
            constants.get_attribute(locals).unwrap(),
        ];

        let [field_hi, field_lo] = field.0.to_be_bytes();
        let [indy_hi, indy_lo] = indy.0.to_be_bytes();
        let [cast_hi, cast_lo] = cast.0 .0.to_be_bytes();
        let [multi_hi, multi_lo] = multi.0 .0.to_be_bytes();
        let code = Code {
            max_stack: 2,
            max_locals: 2,
            code_array: vec![
                ALOAD_0,
                GETFIELD, field_hi, field_lo,
                INVOKEDYNAMIC, indy_hi, indy_lo, 0, 0,
                LDC, literal.0 .0 as u8,
                CHECKCAST, cast_hi, cast_lo,
                MULTIANEWARRAY, multi_hi, multi_lo, 2,
                RETURN,
            ],
            exception_table: vec![ExceptionHandler {
                start_pc: 0,
                end_pc: 18,
                handler_pc: 18,
                catch_type: caught.0,
            }],
            attributes: code_attributes,
        };
        class
            .set_bootstrap_methods(vec![BootstrapMethod {
                bootstrap_method: handle,
                bootstrap_arguments: vec![method_type, class_argument.0],
            }])
            .unwrap();
        class
            .add_method(MethodAccessFlags::STATIC, "run", "([La/Param;I)V", Some(code))
            .unwrap();

        let references = collect_method_references(&class, &class.methods[0]).unwrap();
        assert_eq!(
            references,
            names(&[
                "a/ArgType",
                "a/Bootstrap",
                "a/BsmReturn",
                "a/Cast",
                "a/Caught",
                "a/ClassArg",
                "a/FieldType",
                "a/Frame",
                "a/Literal",
                "a/Local",
                "a/Multi",
                "a/Owner",
                "a/Param",
                "a/Site",
                "java/lang/invoke/MethodHandles$Lookup",
            ])
        );
    }

    #[test]
    fn primitives_are_not_references() {
        let mut class = class("a/Subject");
        class
            .add_method(MethodAccessFlags::ABSTRACT, "m", "([IJ)[[Z", None)
            .unwrap();
        let references = collect_method_references(&class, &class.methods[0]).unwrap();
        assert!(references.is_empty());
        assert!(collect_field_references("[D").unwrap().is_empty());
        assert_eq!(collect_field_references("[La/B;").unwrap(), names(&["a/B"]));
    }

    fn only_in_client(constants: &mut ConstantPool) -> Attribute {
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
        constants
            .get_attribute(RuntimeVisibleAnnotations(vec![annotation]))
            .unwrap()
    }

    #[test]
    fn class_references_skip_client_members() {
        let mut class = class("a/Outer$Inner");
        class.add_interface("a/Iface").unwrap();
        class
            .add_field(FieldAccessFlags::PRIVATE, "value", "[La/FieldType;")
            .unwrap();

        let client_annotation = only_in_client(&mut class.constants);
        class
            .add_method(MethodAccessFlags::ABSTRACT, "render", "(La/ClientThing;)V", None)
            .unwrap()
            .attributes
            .push(client_annotation.clone());
        class
            .add_method(MethodAccessFlags::ABSTRACT, "m_1234_", "()La/Vanilla;", None)
            .unwrap()
            .attributes
            .push(client_annotation.clone());
        class
            .add_field(FieldAccessFlags::PRIVATE, "screen", "La/Screen;")
            .unwrap()
            .attributes
            .push(client_annotation);

        let inner_classes = InnerClasses(vec![
            InnerClass {
                inner_class: class.constants.get_class("a/Outer$Inner").unwrap(),
                outer_class: class.constants.get_class("a/Outer").unwrap().0,
                inner_name: class.constants.get_utf8("Inner").unwrap().0,
                access_flags: InnerClassAccessFlags::PUBLIC,
            },
            InnerClass {
                inner_class: class.constants.get_class("a/Outer$Inner$1").unwrap(),
                outer_class: ConstantIndex::NONE,
                inner_name: ConstantIndex::NONE,
                access_flags: InnerClassAccessFlags::empty(),
            },
            InnerClass {
                inner_class: class.constants.get_class("a/Other$Nested").unwrap(),
                outer_class: class.constants.get_class("a/Other").unwrap().0,
                inner_name: class.constants.get_utf8("Nested").unwrap().0,
                access_flags: InnerClassAccessFlags::STATIC,
            },
        ]);
        let attribute = class.constants.get_attribute(inner_classes).unwrap();
        class.attributes.push(attribute);

        let references = collect_class_references(&class, &[String::from(ONLY_IN)]).unwrap();
        assert_eq!(
            references.used,
            names(&["a/FieldType", "a/Iface", "a/Vanilla", "java/lang/Object"])
        );
        assert_eq!(references.associated, names(&["a/Outer", "a/Outer$Inner$1"]));

        // Without any side annotations configured, nothing is skipped
        let references = collect_class_references(&class, &[]).unwrap();
        assert!(references.used.is_superset(&names(&["a/ClientThing", "a/Screen"])));
    }
}
