use std::sync::Arc;

use hydfa::{
    SpecialField,
    config::DfaConfig,
    expr::{BinaryOp, Constant, Expr},
    factory::ValueFactory,
    member::{FieldMember, MemberOwner, Modifiers},
    tests_utils::{field_qualifier, local_qualifier, static_final_field},
    types::{JAVA_LANG_STRING, JAVA_UTIL_OPTIONAL, PrimitiveType, Type},
    value::{Descriptor, FactMap, LongRange, Nullability, SymbolicValue},
};
use strum::IntoEnumIterator;

fn int_array() -> Type {
    Type::array_of(Type::INT)
}

#[test]
fn array_literal_initializer_folds_to_its_length() {
    let factory = ValueFactory::default();
    let field = static_final_field(
        "A",
        int_array(),
        Expr::ArrayInitializer(vec![Expr::int(1), Expr::int(2), Expr::int(3)]),
    );
    let qualifier = field_qualifier(&factory, field);

    assert_eq!(
        SpecialField::ArrayLength.create_value(&factory, Some(&qualifier)),
        factory.int(3)
    );
}

#[test]
fn new_array_with_initializer_block_folds_to_block_length() {
    let factory = ValueFactory::default();
    let field = static_final_field(
        "A",
        int_array(),
        Expr::NewArray {
            element_type: Type::INT,
            dimensions: Vec::new(),
            initializer: Some(vec![Expr::int(4), Expr::int(5)]),
        },
    );
    let qualifier = field_qualifier(&factory, field);

    assert_eq!(
        SpecialField::ArrayLength.create_value(&factory, Some(&qualifier)),
        factory.int(2)
    );
}

#[test]
fn new_array_dimension_folds_through_constant_expressions() {
    let factory = ValueFactory::default();
    let plain = static_final_field("A", int_array(), Expr::new_array(Type::INT, Expr::int(5)));
    assert_eq!(
        SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, plain))),
        factory.int(5)
    );

    let size = Arc::new(static_final_field("SIZE", Type::INT, Expr::int(4)));
    let computed = static_final_field(
        "B",
        int_array(),
        Expr::new_array(
            Type::INT,
            Expr::binary(BinaryOp::Mul, Expr::FieldRef(size), Expr::int(2)),
        ),
    );
    assert_eq!(
        SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, computed))),
        factory.int(8)
    );
}

#[test]
fn non_constant_dimension_falls_back_to_field_access() {
    let factory = ValueFactory::default();
    let field = static_final_field(
        "A",
        int_array(),
        Expr::new_array(Type::INT, Expr::Opaque("computeSize()".into())),
    );
    let qualifier = field_qualifier(&factory, field);

    let value = SpecialField::ArrayLength.create_value(&factory, Some(&qualifier));
    let SymbolicValue::Variable(variable) = &value else {
        panic!("expected a field access, got {}", value);
    };
    assert_eq!(
        variable.descriptor(),
        &Descriptor::SpecialField(SpecialField::ArrayLength)
    );
    assert_eq!(variable.ty(), Some(&Type::INT));
    assert_eq!(value.to_string(), "A.length");
}

#[test]
fn string_initializer_folds_to_utf16_length() {
    let factory = ValueFactory::default();
    let field = static_final_field(
        "GREETING",
        Type::class(JAVA_LANG_STRING),
        Expr::binary(BinaryOp::Add, Expr::str("h\u{e9}llo "), Expr::str("\u{1f600}")),
    );
    let qualifier = field_qualifier(&factory, field);

    // 6 BMP characters plus one surrogate pair
    assert_eq!(
        SpecialField::StringLength.create_value(&factory, Some(&qualifier)),
        factory.int(8)
    );
}

#[test]
fn string_literal_qualifier_folds_to_length() {
    let factory = ValueFactory::default();
    let qualifier = factory.constant(Constant::str("abc"));
    assert_eq!(
        SpecialField::StringLength.create_value(&factory, Some(&qualifier)),
        factory.int(3)
    );
}

#[test]
fn untrusted_initializers_are_not_folded() {
    let config = DfaConfig {
        untrusted_classes: vec![hydfa::tests_utils::FIXTURE_CLASS.to_string()],
        ..DfaConfig::default()
    };
    let factory = ValueFactory::from_config(&config);
    let field = static_final_field(
        "A",
        int_array(),
        Expr::ArrayInitializer(vec![Expr::int(1)]),
    );
    let value = SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, field)));
    assert!(value.is_variable(), "expected field access, got {}", value);

    let factory = ValueFactory::default();
    let injected = static_final_field("B", int_array(), Expr::ArrayInitializer(vec![Expr::int(1)]))
        .with_annotation("javax.inject.Inject");
    let value =
        SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, injected)));
    assert!(value.is_variable(), "expected field access, got {}", value);
}

#[test]
fn disabled_trust_is_not_folded() {
    let config = DfaConfig {
        trust_field_initializers: false,
        ..DfaConfig::default()
    };
    let factory = ValueFactory::from_config(&config);
    let field = static_final_field("A", int_array(), Expr::ArrayInitializer(vec![Expr::int(1)]));
    let value = SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, field)));
    assert!(value.is_variable(), "expected field access, got {}", value);
    assert_eq!(value.to_string(), "A.length");
}

#[test]
fn volatile_field_is_not_folded() {
    let factory = ValueFactory::default();
    let field = static_final_field("A", int_array(), Expr::ArrayInitializer(vec![Expr::int(1)]))
        .with_modifiers(Modifiers::VOLATILE);
    let value = SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, field)));
    assert!(value.is_variable(), "expected field access, got {}", value);
    assert_eq!(value.to_string(), "A.length");
}

#[test]
fn only_static_final_fields_are_folded() {
    let factory = ValueFactory::default();
    let field = FieldMember::new(
        MemberOwner::Class("com.example.Holder".into()),
        "values",
        int_array(),
    )
    .with_modifiers(Modifiers::FINAL)
    .with_initializer(Expr::ArrayInitializer(vec![Expr::int(1), Expr::int(2)]));

    let value = SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, field)));
    assert!(value.is_variable(), "expected field access, got {}", value);
}

#[test]
fn field_access_is_interned_and_typed() {
    let factory = ValueFactory::default();
    let list = local_qualifier(
        &factory,
        "list",
        Type::generic("java.util.List", [Type::class(JAVA_LANG_STRING)]),
    );

    let first = SpecialField::CollectionSize.create_value(&factory, Some(&list));
    let second = SpecialField::CollectionSize.create_value(&factory, Some(&list));
    assert!(first.same_variable(&second));

    let SymbolicValue::Variable(variable) = &first else {
        panic!("expected a field access, got {}", first);
    };
    assert_eq!(variable.ty(), Some(&Type::INT));
    assert!(!variable.descriptor().is_stable());
}

#[test]
fn target_type_overrides_field_type() {
    let factory = ValueFactory::default();
    let boxed = local_qualifier(&factory, "boxed", Type::class("java.lang.Integer"));
    let long = Type::Primitive(PrimitiveType::Long);

    let value = SpecialField::Unbox.create_value_with_type(&factory, Some(&boxed), Some(&long));
    let SymbolicValue::Variable(variable) = &value else {
        panic!("expected a field access, got {}", value);
    };
    assert_eq!(variable.ty(), Some(&long));
}

#[test]
fn target_type_applies_after_untyped_request() {
    let factory = ValueFactory::default();
    let boxed = local_qualifier(&factory, "boxed", Type::class("java.lang.Integer"));
    let long = Type::Primitive(PrimitiveType::Long);

    let first = SpecialField::Unbox.create_value(&factory, Some(&boxed));
    let second = SpecialField::Unbox.create_value_with_type(&factory, Some(&boxed), Some(&long));
    let again = SpecialField::Unbox.create_value_with_type(&factory, Some(&boxed), Some(&long));

    let (SymbolicValue::Variable(a), SymbolicValue::Variable(b)) = (&first, &second) else {
        panic!("expected field accesses, got {} and {}", first, second);
    };
    assert_eq!(a.ty(), Some(&Type::INT));
    assert_eq!(b.ty(), Some(&long));
    assert!(!first.same_variable(&second));
    assert!(second.same_variable(&again));
}

#[test]
fn unbox_and_optional_field_types_follow_the_qualifier() {
    let factory = ValueFactory::default();

    let boxed = local_qualifier(&factory, "flag", Type::class("java.lang.Boolean"));
    let SymbolicValue::Variable(qualifier) = &boxed else {
        unreachable!()
    };
    assert_eq!(
        SpecialField::Unbox.field_type(&factory, qualifier),
        Some(Type::Primitive(PrimitiveType::Boolean))
    );

    let optional = local_qualifier(
        &factory,
        "name",
        Type::generic(JAVA_UTIL_OPTIONAL, [Type::class(JAVA_LANG_STRING)]),
    );
    let SymbolicValue::Variable(qualifier) = &optional else {
        unreachable!()
    };
    assert_eq!(
        SpecialField::OptionalValue.field_type(&factory, qualifier),
        Some(Type::class(JAVA_LANG_STRING))
    );

    let raw = local_qualifier(&factory, "raw", Type::class(JAVA_UTIL_OPTIONAL));
    let SymbolicValue::Variable(qualifier) = &raw else {
        unreachable!()
    };
    assert_eq!(
        SpecialField::OptionalValue.field_type(&factory, qualifier),
        Some(Type::class("java.lang.Object"))
    );
}

#[test]
fn tagged_value_is_reused() {
    let factory = ValueFactory::default();
    let size = factory.range(LongRange::new(1, 10).unwrap());
    let qualifier: SymbolicValue = FactMap::new()
        .with_nullability(Nullability::NotNull)
        .with_special_field(SpecialField::CollectionSize.with_value(size.clone()))
        .into();

    assert_eq!(
        SpecialField::CollectionSize.create_value(&factory, Some(&qualifier)),
        size
    );
    // A tag for another field is ignored
    assert_eq!(
        SpecialField::MapSize.create_value(&factory, Some(&qualifier)),
        SpecialField::MapSize.default_value(&factory)
    );
}

#[test]
fn boxed_qualifier_short_circuits_unbox() {
    let factory = ValueFactory::default();
    let qualifier = factory.boxed(factory.int(7));
    let before = factory.variable_count();

    assert_eq!(
        SpecialField::Unbox.create_value(&factory, Some(&qualifier)),
        factory.int(7)
    );
    assert_eq!(factory.variable_count(), before);

    // Other fields see no special meaning in the box
    assert_eq!(
        SpecialField::StringLength.create_value(&factory, Some(&qualifier)),
        SpecialField::StringLength.default_value(&factory)
    );
}

#[test]
fn default_values_per_field() {
    let factory = ValueFactory::default();
    let index = factory.range(LongRange::index_range());

    for sf in SpecialField::iter() {
        let expected = match sf {
            SpecialField::Unbox => SymbolicValue::Unknown,
            SpecialField::OptionalValue => factory.nullability(Nullability::Nullable),
            _ => index.clone(),
        };
        assert_eq!(sf.default_value(&factory), expected, "default of {:?}", sf);

        assert_eq!(sf.create_value(&factory, None), expected, "no qualifier, {:?}", sf);
        assert_eq!(
            sf.create_value(&factory, Some(&SymbolicValue::Unknown)),
            expected,
            "unknown qualifier, {:?}",
            sf
        );
        assert_eq!(
            sf.create_value(&factory, Some(&factory.null())),
            expected,
            "null qualifier, {:?}",
            sf
        );
    }
}

#[test]
fn non_text_constant_falls_back_to_default() {
    let factory = ValueFactory::default();
    let qualifier = factory.int(42);
    assert_eq!(
        SpecialField::StringLength.create_value(&factory, Some(&qualifier)),
        factory.range(LongRange::index_range())
    );
}

#[test]
fn optional_presentation_text() {
    let factory = ValueFactory::default();
    let sf = SpecialField::OptionalValue;

    assert_eq!(sf.presentation_text(&factory.null()), "empty Optional");
    assert_eq!(
        sf.presentation_text(&factory.nullability(Nullability::NotNull)),
        "present Optional"
    );
    assert_eq!(sf.presentation_text(&factory.nullability(Nullability::Nullable)), "");
    assert_eq!(
        sf.presentation_text(&factory.constant(Constant::str("x"))),
        "\"x\""
    );
    assert_eq!(
        SpecialField::StringLength.presentation_text(&factory.int(3)),
        "3"
    );
    assert_eq!(
        SpecialField::ArrayLength.presentation_text(&factory.range(LongRange::index_range())),
        "{0..2147483647}"
    );
}
