//! Symbolic values
//!
//! A [`SymbolicValue`] is the engine's abstract representation of a runtime
//! value: a literal, a named variable, a bundle of facts, a boxed wrapper around
//! another value, or nothing known at all. Values are immutable and cheap to
//! clone (shared parts are reference counted), so they may cross threads freely.
use std::sync::Arc;

use strum::{EnumIs, EnumTryAs};

use crate::{
    expr::Constant,
    member::{Member, Modifiers, ProgramElement},
    special_field::{SpecialField, SpecialFieldValue},
    types::Type,
};

/// Inclusive range of 64-bit integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LongRange {
    min: i64,
    max: i64,
}

impl LongRange {
    /// Creates the range `[min, max]`, `None` when empty.
    #[inline]
    pub const fn new(min: i64, max: i64) -> Option<Self> {
        if min <= max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    #[inline]
    pub const fn point(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[inline]
    pub const fn all() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// Values an array index, a length or a size may take: `[0, i32::MAX]`.
    #[inline]
    pub const fn index_range() -> Self {
        Self {
            min: 0,
            max: i32::MAX as i64,
        }
    }

    #[inline]
    pub const fn min(&self) -> i64 {
        self.min
    }

    #[inline]
    pub const fn max(&self) -> i64 {
        self.max
    }

    #[inline]
    pub const fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// The single value of the range, if it has exactly one.
    #[inline]
    pub const fn as_point(&self) -> Option<i64> {
        if self.min == self.max {
            Some(self.min)
        } else {
            None
        }
    }
}

impl std::fmt::Display for LongRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_point() {
            Some(value) => write!(f, "{{{}}}", value),
            None => write!(f, "{{{}..{}}}", self.min, self.max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum Nullability {
    /// The value is definitely `null`.
    Null,
    /// The value may be `null` and callers must check it.
    Nullable,
    NotNull,
    Unknown,
}

impl std::fmt::Display for Nullability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Nullability::Null => "null",
            Nullability::Nullable => "Nullable",
            Nullability::NotNull => "non-null",
            Nullability::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Facts known about a value without a more precise representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FactMap {
    range: Option<LongRange>,
    nullability: Option<Nullability>,
    special_field: Option<SpecialFieldValue>,
}

impl FactMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: LongRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = Some(nullability);
        self
    }

    /// Attach the value of a virtual field, replacing any previous one.
    pub fn with_special_field(mut self, value: SpecialFieldValue) -> Self {
        self.special_field = Some(value);
        self
    }

    pub fn range(&self) -> Option<LongRange> {
        self.range
    }

    pub fn nullability(&self) -> Option<Nullability> {
        self.nullability
    }

    pub fn special_field(&self) -> Option<&SpecialFieldValue> {
        self.special_field.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none() && self.nullability.is_none() && self.special_field.is_none()
    }
}

impl std::fmt::Display for FactMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(nullability) = self.nullability {
            parts.push(nullability.to_string());
        }
        if let Some(range) = self.range {
            parts.push(range.to_string());
        }
        if let Some(sf) = &self.special_field {
            parts.push(sf.to_string());
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// What a [`VariableValue`] names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum Descriptor {
    /// A declared program element (field, local variable, ...).
    Element(ProgramElement),
    /// A virtual field of the qualifier.
    SpecialField(SpecialField),
}

impl Descriptor {
    /// Returns `true` if the value cannot change for a fixed qualifier.
    pub fn is_stable(&self) -> bool {
        match self {
            Descriptor::SpecialField(field) => field.is_stable(),
            Descriptor::Element(ProgramElement::Member(Member::Field(field))) => {
                field.modifiers.contains(Modifiers::FINAL)
            }
            Descriptor::Element(ProgramElement::Class(_)) => true,
            Descriptor::Element(_) => false,
        }
    }
}

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Descriptor::Element(element) => write!(f, "{}", element.name()),
            Descriptor::SpecialField(field) => write!(f, "{}", field),
        }
    }
}

/// A named composite variable, possibly qualified (e.g. `a.length`).
///
/// Instances are handed out by [`crate::factory::ValueFactory`], which interns
/// them: two requests for the same descriptor, qualifier and type share one instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableValue {
    descriptor: Descriptor,
    qualifier: Option<Arc<VariableValue>>,
    ty: Option<Type>,
}

impl VariableValue {
    pub(crate) fn new(
        descriptor: Descriptor,
        qualifier: Option<Arc<VariableValue>>,
        ty: Option<Type>,
    ) -> Self {
        Self {
            descriptor,
            qualifier,
            ty,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn qualifier(&self) -> Option<&Arc<VariableValue>> {
        self.qualifier.as_ref()
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// The declared program element this variable is bound to.
    pub fn program_element(&self) -> Option<&ProgramElement> {
        match &self.descriptor {
            Descriptor::Element(element) => Some(element),
            Descriptor::SpecialField(_) => None,
        }
    }
}

impl std::fmt::Display for VariableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{}.", qualifier)?;
        }
        write!(f, "{}", self.descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum SymbolicValue {
    /// A literal, including the `null` constant.
    Constant(Constant),
    Variable(Arc<VariableValue>),
    Facts(Arc<FactMap>),
    /// The boxed representation of the inner value.
    Boxed(Arc<SymbolicValue>),
    Unknown,
}

impl SymbolicValue {
    pub fn constant(&self) -> Option<&Constant> {
        match self {
            SymbolicValue::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn facts(&self) -> Option<&FactMap> {
        match self {
            SymbolicValue::Facts(facts) => Some(facts),
            _ => None,
        }
    }

    /// The virtual-field value tagged on this value, if any.
    pub fn special_field_value(&self) -> Option<&SpecialFieldValue> {
        self.facts().and_then(FactMap::special_field)
    }

    /// Returns `true` if both values are the very same interned variable.
    pub fn same_variable(&self, other: &SymbolicValue) -> bool {
        match (self, other) {
            (SymbolicValue::Variable(a), SymbolicValue::Variable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Constant> for SymbolicValue {
    fn from(value: Constant) -> Self {
        SymbolicValue::Constant(value)
    }
}

impl From<FactMap> for SymbolicValue {
    fn from(value: FactMap) -> Self {
        SymbolicValue::Facts(Arc::new(value))
    }
}

impl std::fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolicValue::Constant(constant) => write!(f, "{}", constant),
            SymbolicValue::Variable(variable) => write!(f, "{}", variable),
            SymbolicValue::Facts(facts) => write!(f, "{}", facts),
            SymbolicValue::Boxed(inner) => write!(f, "box({})", inner),
            SymbolicValue::Unknown => write!(f, "<unknown>"),
        }
    }
}
