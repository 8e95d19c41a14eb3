//! Type descriptors
//!
//! The dataflow engine only needs a thin view of the program's type system:
//! primitive types, nominal class types (with their type arguments) and array
//! types. Subtyping and the "is this an optional / a wrapper" questions are
//! answered by a [`TypeResolver`], which lets the engine plug in whatever
//! inheritance resolution the front-end provides. [`TypeHierarchy`] is the
//! stock resolver built from declared supertypes.
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use strum::{EnumIter, IntoEnumIterator};

use crate::member::{MemberOwner, MethodMember, Modifiers};

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";
pub const JAVA_LANG_STRING: &str = "java.lang.String";
pub const JAVA_LANG_CHAR_SEQUENCE: &str = "java.lang.CharSequence";
pub const JAVA_LANG_COMPARABLE: &str = "java.lang.Comparable";
pub const JAVA_LANG_ITERABLE: &str = "java.lang.Iterable";
pub const JAVA_UTIL_COLLECTION: &str = "java.util.Collection";
pub const JAVA_UTIL_MAP: &str = "java.util.Map";
pub const JAVA_UTIL_OPTIONAL: &str = "java.util.Optional";
pub const JAVA_UTIL_OPTIONAL_INT: &str = "java.util.OptionalInt";
pub const JAVA_UTIL_OPTIONAL_LONG: &str = "java.util.OptionalLong";
pub const JAVA_UTIL_OPTIONAL_DOUBLE: &str = "java.util.OptionalDouble";
pub const GUAVA_OPTIONAL: &str = "com.google.common.base.Optional";

/// Primitive types of the analysed language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    /// Source keyword of the primitive type.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Fully qualified name of the boxing class.
    pub fn wrapper_class(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    /// Name of the argument-less instance method unwrapping the boxing class.
    pub fn unwrap_method(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "booleanValue",
            PrimitiveType::Byte => "byteValue",
            PrimitiveType::Char => "charValue",
            PrimitiveType::Short => "shortValue",
            PrimitiveType::Int => "intValue",
            PrimitiveType::Long => "longValue",
            PrimitiveType::Float => "floatValue",
            PrimitiveType::Double => "doubleValue",
        }
    }

    /// Primitive type boxed by the given class, if any.
    pub fn from_wrapper_class(class_name: &str) -> Option<Self> {
        PrimitiveType::iter().find(|p| p.wrapper_class() == class_name)
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A nominal class type with its (possibly empty) list of type arguments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassType {
    pub name: Arc<str>,
    pub parameters: Vec<Type>,
}

/// A static type as seen by the dataflow engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
}

impl Type {
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);

    /// Raw class type (no type arguments).
    pub fn class(name: impl Into<Arc<str>>) -> Self {
        Type::Class(ClassType {
            name: name.into(),
            parameters: Vec::new(),
        })
    }

    /// Parameterized class type, e.g. `java.util.List<java.lang.String>`.
    pub fn generic(name: impl Into<Arc<str>>, parameters: impl IntoIterator<Item = Type>) -> Self {
        Type::Class(ClassType {
            name: name.into(),
            parameters: parameters.into_iter().collect(),
        })
    }

    pub fn array_of(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(class) => Some(&class.name),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Primitive(value)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p),
            Type::Class(class) => {
                write!(f, "{}", class.name)?;
                if !class.parameters.is_empty() {
                    write!(
                        f,
                        "<{}>",
                        class
                            .parameters
                            .iter()
                            .map(|x| x.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )?;
                }
                Ok(())
            }
            Type::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// Element of an optional-like container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionalPayload {
    /// The payload type is the first type argument.
    Generic,
    /// The container is specialized for a primitive payload.
    Primitive(PrimitiveType),
}

/// Optional-like containers recognized by name, together with their payload accessors.
const OPTIONAL_TYPES: &[(&str, &[&str], OptionalPayload)] = &[
    (
        JAVA_UTIL_OPTIONAL,
        &["get", "orElseThrow"],
        OptionalPayload::Generic,
    ),
    (
        JAVA_UTIL_OPTIONAL_INT,
        &["getAsInt", "orElseThrow"],
        OptionalPayload::Primitive(PrimitiveType::Int),
    ),
    (
        JAVA_UTIL_OPTIONAL_LONG,
        &["getAsLong", "orElseThrow"],
        OptionalPayload::Primitive(PrimitiveType::Long),
    ),
    (
        JAVA_UTIL_OPTIONAL_DOUBLE,
        &["getAsDouble", "orElseThrow"],
        OptionalPayload::Primitive(PrimitiveType::Double),
    ),
    (GUAVA_OPTIONAL, &["get"], OptionalPayload::Generic),
];

fn optional_entry(ty: &Type) -> Option<&'static (&'static str, &'static [&'static str], OptionalPayload)> {
    let name = ty.class_name()?;
    OPTIONAL_TYPES.iter().find(|(class, _, _)| *class == name)
}

/// Type-descriptor service consulted by the virtual-field registry.
///
/// Only [`TypeResolver::is_inheritor`] depends on the program being analysed;
/// the remaining queries have structural defaults that implementors may refine.
pub trait TypeResolver: Send + Sync {
    /// Returns `true` if `ty` is the class `class_name` or one of its subtypes.
    fn is_inheritor(&self, ty: &Type, class_name: &str) -> bool;

    fn is_array(&self, ty: &Type) -> bool {
        ty.is_array()
    }

    /// Returns `true` if `ty` is one of the eight primitive boxing classes.
    fn is_primitive_wrapper(&self, ty: &Type) -> bool {
        self.unboxed_type(ty).is_some()
    }

    /// Primitive type obtained by unboxing `ty`.
    fn unboxed_type(&self, ty: &Type) -> Option<PrimitiveType> {
        ty.class_name().and_then(PrimitiveType::from_wrapper_class)
    }

    /// Returns `true` if `ty` is an optional-like container.
    fn is_optional(&self, ty: &Type) -> bool {
        optional_entry(ty).is_some()
    }

    /// Type of the payload of an optional-like container.
    ///
    /// A raw generic optional yields `java.lang.Object`.
    fn optional_element_type(&self, ty: &Type) -> Option<Type> {
        let (_, _, payload) = optional_entry(ty)?;
        match payload {
            OptionalPayload::Primitive(p) => Some(Type::Primitive(*p)),
            OptionalPayload::Generic => match ty {
                Type::Class(class) => Some(
                    class
                        .parameters
                        .first()
                        .cloned()
                        .unwrap_or_else(|| Type::class(JAVA_LANG_OBJECT)),
                ),
                _ => None,
            },
        }
    }

    /// Returns `true` if `method` reads the payload of an optional-like container.
    fn is_optional_get(&self, method: &MethodMember) -> bool {
        let MemberOwner::Class(owner) = &method.owner else {
            return false;
        };
        if !method.parameters.is_empty() || method.modifiers.contains(Modifiers::STATIC) {
            return false;
        }
        OPTIONAL_TYPES.iter().any(|(class, getters, _)| {
            **class == **owner && getters.contains(&&*method.name)
        })
    }
}

/// Class hierarchy built from declared direct supertypes.
///
/// Every class type is considered an inheritor of `java.lang.Object`, even when
/// it was never declared. Cycles in the declarations are tolerated.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: BTreeMap<Arc<str>, Vec<Arc<str>>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hierarchy pre-populated with the JDK strings, collections and maps.
    pub fn with_jdk_defaults() -> Self {
        let mut hierarchy = Self::new();
        hierarchy
            .declare(JAVA_LANG_STRING, [JAVA_LANG_CHAR_SEQUENCE, JAVA_LANG_COMPARABLE])
            .declare(JAVA_UTIL_COLLECTION, [JAVA_LANG_ITERABLE])
            .declare("java.util.List", [JAVA_UTIL_COLLECTION])
            .declare("java.util.Set", [JAVA_UTIL_COLLECTION])
            .declare("java.util.SortedSet", ["java.util.Set"])
            .declare("java.util.NavigableSet", ["java.util.SortedSet"])
            .declare("java.util.Queue", [JAVA_UTIL_COLLECTION])
            .declare("java.util.Deque", ["java.util.Queue"])
            .declare("java.util.AbstractCollection", [JAVA_UTIL_COLLECTION])
            .declare(
                "java.util.AbstractList",
                ["java.util.AbstractCollection", "java.util.List"],
            )
            .declare("java.util.ArrayList", ["java.util.AbstractList"])
            .declare(
                "java.util.LinkedList",
                ["java.util.AbstractList", "java.util.Deque"],
            )
            .declare("java.util.ArrayDeque", ["java.util.Deque"])
            .declare(
                "java.util.AbstractSet",
                ["java.util.AbstractCollection", "java.util.Set"],
            )
            .declare("java.util.HashSet", ["java.util.AbstractSet"])
            .declare("java.util.LinkedHashSet", ["java.util.HashSet"])
            .declare(
                "java.util.TreeSet",
                ["java.util.AbstractSet", "java.util.NavigableSet"],
            )
            .declare("java.util.SortedMap", [JAVA_UTIL_MAP])
            .declare("java.util.NavigableMap", ["java.util.SortedMap"])
            .declare("java.util.AbstractMap", [JAVA_UTIL_MAP])
            .declare("java.util.HashMap", ["java.util.AbstractMap"])
            .declare("java.util.LinkedHashMap", ["java.util.HashMap"])
            .declare(
                "java.util.TreeMap",
                ["java.util.AbstractMap", "java.util.NavigableMap"],
            );
        for primitive in PrimitiveType::iter() {
            hierarchy.declare(primitive.wrapper_class(), [JAVA_LANG_COMPARABLE]);
        }
        hierarchy
    }

    /// Declare the direct supertypes of `class_name`, appending to any
    /// previous declaration.
    pub fn declare<S, I>(&mut self, class_name: impl Into<Arc<str>>, supertypes: I) -> &mut Self
    where
        S: Into<Arc<str>>,
        I: IntoIterator<Item = S>,
    {
        self.supertypes
            .entry(class_name.into())
            .or_default()
            .extend(supertypes.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if `class_name` is `ancestor` or (transitively) extends it.
    pub fn is_subclass(&self, class_name: &str, ancestor: &str) -> bool {
        if class_name == ancestor || ancestor == JAVA_LANG_OBJECT {
            return true;
        }

        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut stack = vec![class_name];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(supers) = self.supertypes.get(current) {
                for sup in supers {
                    if &**sup == ancestor {
                        return true;
                    }
                    stack.push(sup);
                }
            }
        }
        false
    }
}

impl TypeResolver for TypeHierarchy {
    fn is_inheritor(&self, ty: &Type, class_name: &str) -> bool {
        match ty {
            Type::Class(class) => self.is_subclass(&class.name, class_name),
            Type::Primitive(_) | Type::Array(_) => false,
        }
    }
}
