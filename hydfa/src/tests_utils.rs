//! Representative accessors and qualifiers shared by the test suites.
use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::{
    expr::Expr,
    factory::ValueFactory,
    member::{FieldMember, Member, MemberOwner, MethodMember, Modifiers, ProgramElement},
    types::{
        GUAVA_OPTIONAL, JAVA_LANG_STRING, JAVA_UTIL_COLLECTION, JAVA_UTIL_MAP, JAVA_UTIL_OPTIONAL,
        JAVA_UTIL_OPTIONAL_INT, PrimitiveType, Type,
    },
    value::{Descriptor, SymbolicValue},
};

pub const FIXTURE_CLASS: &str = "com.example.Constants";

/// One accessor per way of reading a special field.
pub fn accessor_fixtures() -> Vec<Member> {
    let mut accessors: Vec<Member> = vec![
        FieldMember::array_length().into(),
        MethodMember::getter(JAVA_LANG_STRING, "length", Type::INT).into(),
        MethodMember::getter(JAVA_UTIL_COLLECTION, "size", Type::INT).into(),
        MethodMember::getter("java.util.ArrayList", "size", Type::INT).into(),
        MethodMember::getter(JAVA_UTIL_MAP, "size", Type::INT).into(),
        MethodMember::getter("java.util.HashMap", "size", Type::INT).into(),
        MethodMember::getter(JAVA_UTIL_OPTIONAL, "get", Type::class("java.lang.Object")).into(),
        MethodMember::getter(JAVA_UTIL_OPTIONAL_INT, "getAsInt", Type::INT).into(),
        MethodMember::getter(GUAVA_OPTIONAL, "get", Type::class("java.lang.Object")).into(),
    ];
    accessors.extend(PrimitiveType::iter().map(|p| {
        Member::from(MethodMember::getter(
            p.wrapper_class(),
            p.unwrap_method(),
            Type::Primitive(p),
        ))
    }));
    accessors
}

/// Accessors that look like special-field accessors but are not.
pub fn non_accessor_fixtures() -> Vec<Member> {
    vec![
        FieldMember::new(MemberOwner::Class(FIXTURE_CLASS.into()), "length", Type::INT).into(),
        MethodMember::getter("com.example.Ruler", "length", Type::INT).into(),
        MethodMember::getter(JAVA_LANG_STRING, "length", Type::INT)
            .with_parameters([Type::INT])
            .into(),
        MethodMember::getter(JAVA_UTIL_COLLECTION, "isEmpty", Type::Primitive(PrimitiveType::Boolean))
            .into(),
        MethodMember::getter("java.lang.Integer", "longValue", Type::Primitive(PrimitiveType::Long))
            .into(),
        MethodMember::getter("java.lang.Integer", "intValue", Type::INT)
            .with_modifiers(Modifiers::STATIC)
            .into(),
        MethodMember::getter(JAVA_UTIL_OPTIONAL, "isPresent", Type::Primitive(PrimitiveType::Boolean))
            .into(),
    ]
}

/// One qualifier type per special field, plus subtypes.
pub fn qualifier_type_fixtures() -> Vec<Type> {
    let mut types = vec![
        Type::array_of(Type::INT),
        Type::array_of(Type::class(JAVA_LANG_STRING)),
        Type::class(JAVA_LANG_STRING),
        Type::generic(JAVA_UTIL_COLLECTION, [Type::class(JAVA_LANG_STRING)]),
        Type::generic("java.util.ArrayList", [Type::class(JAVA_LANG_STRING)]),
        Type::generic("java.util.TreeSet", [Type::class(JAVA_LANG_STRING)]),
        Type::generic(
            JAVA_UTIL_MAP,
            [Type::class(JAVA_LANG_STRING), Type::class("java.lang.Integer")],
        ),
        Type::class("java.util.LinkedHashMap"),
        Type::generic(JAVA_UTIL_OPTIONAL, [Type::class(JAVA_LANG_STRING)]),
        Type::class(JAVA_UTIL_OPTIONAL_INT),
    ];
    types.extend(PrimitiveType::iter().map(|p| Type::class(p.wrapper_class())));
    types
}

/// `static final <ty> <name> = <initializer>;` declared on [`FIXTURE_CLASS`].
pub fn static_final_field(name: &str, ty: Type, initializer: Expr) -> FieldMember {
    FieldMember::new(MemberOwner::Class(FIXTURE_CLASS.into()), name, ty)
        .with_modifiers(Modifiers::STATIC | Modifiers::FINAL)
        .with_initializer(initializer)
}

/// The variable value reading `field`.
pub fn field_qualifier(factory: &ValueFactory, field: FieldMember) -> SymbolicValue {
    let ty = field.ty.clone();
    SymbolicValue::Variable(factory.variable(
        Descriptor::Element(ProgramElement::Member(Member::Field(Arc::new(field)))),
        None,
        Some(ty),
    ))
}

/// The variable value of a local variable named `name`.
pub fn local_qualifier(factory: &ValueFactory, name: &str, ty: Type) -> SymbolicValue {
    SymbolicValue::Variable(factory.variable(
        Descriptor::Element(ProgramElement::Local {
            name: name.into(),
            ty: ty.clone(),
        }),
        None,
        Some(ty),
    ))
}
