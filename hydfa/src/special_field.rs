//! Virtual ("special") fields
//!
//! A special field is an accessor the dataflow engine handles as if it read a
//! plain field of its qualifier: the length of an array or a string, the size
//! of a collection or a map, the primitive inside a boxing class and the payload
//! of an optional. Tracking these as fields lets the engine carry precise
//! information (`a.length == 3`, `list.size > 0`) without modeling arrays,
//! strings or collections themselves.
//!
//! The set of special fields is closed. Accessor and qualifier-type matching
//! are mutually exclusive across variants, so the ordered scans performed by
//! [`SpecialField::find_by_accessor`] and [`SpecialField::find_by_qualifier_type`]
//! never have to break a tie.
use log::trace;
use strum::{EnumIs, EnumIter, IntoEnumIterator};

use crate::{
    contract::{ContractReturnValue, ContractValue, MethodContract, RelationType, ValueConstraint},
    expr::{Constant, Expr},
    factory::ValueFactory,
    member::{Member, MemberOwner, Modifiers, ProgramElement},
    types::{JAVA_LANG_STRING, JAVA_UTIL_COLLECTION, JAVA_UTIL_MAP, PrimitiveType, Type, TypeResolver},
    value::{LongRange, Nullability, SymbolicValue, VariableValue},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumIs)]
pub enum SpecialField {
    /// `length` field of any array.
    ArrayLength,
    /// `String.length()`.
    StringLength,
    /// `Collection.size()` and its overrides.
    CollectionSize,
    /// `Map.size()` and its overrides.
    MapSize,
    /// The primitive held by a boxing class (`Integer.intValue()`, ...).
    Unbox,
    /// The payload of an optional-like container (`Optional.get()`, ...).
    OptionalValue,
}

impl SpecialField {
    /// Nominal type the qualifier must extend, `None` when matching is structural.
    pub fn owner_class(self) -> Option<&'static str> {
        match self {
            SpecialField::StringLength => Some(JAVA_LANG_STRING),
            SpecialField::CollectionSize => Some(JAVA_UTIL_COLLECTION),
            SpecialField::MapSize => Some(JAVA_UTIL_MAP),
            SpecialField::ArrayLength | SpecialField::Unbox | SpecialField::OptionalValue => None,
        }
    }

    /// Name of the field, also the name of the accessor method when matching nominally.
    pub fn display_name(self) -> &'static str {
        match self {
            SpecialField::ArrayLength | SpecialField::StringLength => "length",
            SpecialField::CollectionSize | SpecialField::MapSize => "size",
            SpecialField::Unbox | SpecialField::OptionalValue => "value",
        }
    }

    /// Returns `true` if the field cannot change while its qualifier stays the same object.
    ///
    /// Collections and maps are mutable, so their size is not stable.
    pub fn is_stable(self) -> bool {
        !matches!(self, SpecialField::CollectionSize | SpecialField::MapSize)
    }

    /// Returns `true` if values of type `ty` expose this field.
    pub fn is_my_qualifier_type(self, types: &dyn TypeResolver, ty: &Type) -> bool {
        match self {
            SpecialField::ArrayLength => types.is_array(ty),
            SpecialField::Unbox => types.is_primitive_wrapper(ty),
            SpecialField::OptionalValue => types.is_optional(ty),
            SpecialField::StringLength | SpecialField::CollectionSize | SpecialField::MapSize => self
                .owner_class()
                .is_some_and(|class_name| types.is_inheritor(ty, class_name)),
        }
    }

    /// Returns `true` if `accessor` (a field or a method) reads this field.
    pub fn is_my_accessor(self, types: &dyn TypeResolver, accessor: &Member) -> bool {
        match (self, accessor) {
            (SpecialField::ArrayLength, Member::Field(field)) => {
                &*field.name == "length" && field.owner.is_array_class()
            }
            (SpecialField::Unbox, Member::Method(method)) => {
                let MemberOwner::Class(owner) = &method.owner else {
                    return false;
                };
                method.parameters.is_empty()
                    && !method.modifiers.contains(Modifiers::STATIC)
                    && PrimitiveType::iter().any(|p| {
                        p.wrapper_class() == &**owner && p.unwrap_method() == &*method.name
                    })
            }
            (SpecialField::OptionalValue, Member::Method(method)) => types.is_optional_get(method),
            (
                SpecialField::StringLength | SpecialField::CollectionSize | SpecialField::MapSize,
                Member::Method(method),
            ) => {
                let MemberOwner::Class(owner) = &method.owner else {
                    return false;
                };
                &*method.name == self.display_name()
                    && method.parameters.is_empty()
                    && self
                        .owner_class()
                        .is_some_and(|class_name| types.is_inheritor(&Type::class(owner.clone()), class_name))
            }
            _ => false,
        }
    }

    /// Finds the special field read by `accessor`.
    ///
    /// Returns `None` when `accessor` is not a field or a method, or when it
    /// reads no special field.
    pub fn find_by_accessor(types: &dyn TypeResolver, accessor: &ProgramElement) -> Option<Self> {
        let member = accessor.as_member()?;
        SpecialField::iter().find(|sf| sf.is_my_accessor(types, member))
    }

    /// Finds the special field exposed by qualifiers of type `ty`.
    pub fn find_by_qualifier_type(types: &dyn TypeResolver, ty: &Type) -> Option<Self> {
        SpecialField::iter().find(|sf| sf.is_my_qualifier_type(types, ty))
    }

    /// Value of this field read on `qualifier`. See [`SpecialField::create_value_with_type`].
    pub fn create_value(self, factory: &ValueFactory, qualifier: Option<&SymbolicValue>) -> SymbolicValue {
        self.create_value_with_type(factory, qualifier, None)
    }

    /// Value of this field read on `qualifier`.
    ///
    /// The most precise source wins, in this order:
    /// 1. a variable qualifier bound to a trusted `static final` field whose
    ///    initializer determines the value; any other variable qualifier yields
    ///    the variable `qualifier.field`, typed by `target_type` when given;
    /// 2. the value already tagged on the qualifier for this field;
    /// 3. the value derived from a literal qualifier;
    /// 4. [`SpecialField::default_value`].
    ///
    /// Unboxing a boxed representation returns the boxed value itself before
    /// any of the above.
    pub fn create_value_with_type(
        self,
        factory: &ValueFactory,
        qualifier: Option<&SymbolicValue>,
        target_type: Option<&Type>,
    ) -> SymbolicValue {
        if let (SpecialField::Unbox, Some(SymbolicValue::Boxed(inner))) = (self, qualifier) {
            trace!("{}: unboxing boxed representation {}", self, inner);
            return (**inner).clone();
        }

        match qualifier {
            Some(SymbolicValue::Variable(variable)) => {
                if let Some(value) = self.from_trusted_initializer(factory, variable) {
                    trace!("{}: folded initializer of {} to {}", self, variable, value);
                    return value;
                }
                let ty = target_type
                    .cloned()
                    .or_else(|| self.field_type(factory, variable));
                return factory.field_access(self, variable, ty);
            }
            Some(SymbolicValue::Facts(facts)) => {
                if let Some(value) = self.extract(facts.special_field()) {
                    trace!("{}: reusing tagged value {}", self, value);
                    return value.clone();
                }
            }
            Some(SymbolicValue::Constant(constant)) if !constant.is_null() => {
                if let Some(value) = self.from_constant(factory, constant) {
                    return value;
                }
            }
            _ => {}
        }

        self.default_value(factory)
    }

    /// Any value this field may take when nothing more is known.
    pub fn default_value(self, factory: &ValueFactory) -> SymbolicValue {
        match self {
            SpecialField::Unbox => factory.unknown(),
            SpecialField::OptionalValue => factory.nullability(Nullability::Nullable),
            SpecialField::ArrayLength
            | SpecialField::StringLength
            | SpecialField::CollectionSize
            | SpecialField::MapSize => factory.range(LongRange::index_range()),
        }
    }

    /// Static type of this field read on `qualifier`, when it can be resolved.
    pub fn field_type(self, factory: &ValueFactory, qualifier: &VariableValue) -> Option<Type> {
        match self {
            SpecialField::Unbox => qualifier
                .ty()
                .and_then(|ty| factory.types().unboxed_type(ty))
                .map(Type::Primitive),
            SpecialField::OptionalValue => qualifier
                .ty()
                .and_then(|ty| factory.types().optional_element_type(ty)),
            _ => Some(Type::INT),
        }
    }

    fn from_trusted_initializer(
        self,
        factory: &ValueFactory,
        variable: &VariableValue,
    ) -> Option<SymbolicValue> {
        let field = variable.program_element()?.as_field()?;
        if !field.is_static_final() || !factory.can_trust_field_initializer(field) {
            return None;
        }
        self.from_initializer(factory, field.initializer.as_ref()?)
    }

    /// Value of this field on the object built by `initializer`, when statically known.
    pub fn from_initializer(self, factory: &ValueFactory, initializer: &Expr) -> Option<SymbolicValue> {
        match self {
            SpecialField::ArrayLength => match initializer {
                Expr::ArrayInitializer(elements)
                | Expr::NewArray {
                    initializer: Some(elements),
                    ..
                } => length_value(factory, elements.len()),
                Expr::NewArray { dimensions, .. } => {
                    match factory.evaluator().compute_constant(dimensions.first()?)? {
                        Constant::Int(length) => Some(factory.int(length)),
                        _ => None,
                    }
                }
                _ => None,
            },
            SpecialField::StringLength => {
                let constant = factory.evaluator().compute_constant(initializer)?;
                self.from_constant(factory, &constant)
            }
            _ => None,
        }
    }

    /// Value of this field on the literal `constant`, when defined.
    pub fn from_constant(self, factory: &ValueFactory, constant: &Constant) -> Option<SymbolicValue> {
        match (self, constant) {
            // Lengths count UTF-16 code units
            (SpecialField::StringLength, Constant::Str(text)) => {
                length_value(factory, text.encode_utf16().count())
            }
            _ => None,
        }
    }

    /// Human-readable rendering of `value` as a value of this field, for diagnostics.
    pub fn presentation_text(self, value: &SymbolicValue) -> String {
        if self == SpecialField::OptionalValue {
            match value {
                SymbolicValue::Constant(Constant::Null) => return "empty Optional".to_string(),
                SymbolicValue::Facts(facts) => {
                    return if facts.nullability() == Some(Nullability::NotNull) {
                        "present Optional".to_string()
                    } else {
                        String::new()
                    };
                }
                _ => {}
            }
        }
        value.to_string()
    }

    /// Contracts equivalent to checking this field for zero (`isEmpty()`-like methods).
    pub fn empty_contracts(self) -> [MethodContract; 2] {
        let this_value = ContractValue::qualifier().special_field(self);
        [
            MethodContract::single_condition(
                this_value,
                RelationType::Eq,
                ContractValue::zero(),
                ContractReturnValue::ReturnTrue,
            ),
            MethodContract::trivial(ContractReturnValue::ReturnFalse),
        ]
    }

    /// Contracts of an `equals(Object)` whose result depends on this field.
    pub fn equals_contracts(self) -> [MethodContract; 2] {
        [
            MethodContract::standard([ValueConstraint::Null], ContractReturnValue::ReturnFalse),
            MethodContract::single_condition(
                ContractValue::qualifier().special_field(self),
                RelationType::Ne,
                ContractValue::argument(0).special_field(self),
                ContractReturnValue::ReturnFalse,
            ),
        ]
    }

    /// Tag `value` as the value of this field.
    pub fn with_value(self, value: SymbolicValue) -> SpecialFieldValue {
        SpecialFieldValue { field: self, value }
    }

    /// Value held by `sf_value` when it is tagged with this very field.
    pub fn extract(self, sf_value: Option<&SpecialFieldValue>) -> Option<&SymbolicValue> {
        sf_value
            .filter(|sf_value| sf_value.field == self)
            .map(|sf_value| &sf_value.value)
    }
}

fn length_value(factory: &ValueFactory, length: usize) -> Option<SymbolicValue> {
    i32::try_from(length).ok().map(|length| factory.int(length))
}

impl std::fmt::Display for SpecialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A symbolic value tagged with the special field it is the value of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecialFieldValue {
    field: SpecialField,
    value: SymbolicValue,
}

impl SpecialFieldValue {
    pub fn field(&self) -> SpecialField {
        self.field
    }

    pub fn value(&self) -> &SymbolicValue {
        &self.value
    }
}

impl std::fmt::Display for SpecialFieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        let names: Vec<_> = SpecialField::iter().map(|sf| sf.to_string()).collect();
        assert_eq!(names, ["length", "length", "size", "size", "value", "value"]);
    }

    #[test]
    fn test_stability() {
        let unstable: Vec<_> = SpecialField::iter().filter(|sf| !sf.is_stable()).collect();
        assert_eq!(unstable, [SpecialField::CollectionSize, SpecialField::MapSize]);
    }

    #[test]
    fn test_only_nominal_fields_have_owner() {
        for sf in SpecialField::iter() {
            assert_eq!(
                sf.owner_class().is_some(),
                matches!(
                    sf,
                    SpecialField::StringLength | SpecialField::CollectionSize | SpecialField::MapSize
                ),
                "unexpected owner for {:?}",
                sf
            );
        }
    }
}
