//! Program members
//!
//! Accessors are matched structurally: a virtual field is read either through
//! a field (the synthetic `length` of arrays) or through an argument-less
//! method. This module carries just enough of a member's declaration for that
//! matching and for deciding whether a static initializer may be folded.
use std::sync::Arc;

use bitflags::bitflags;
use strum::{EnumIs, EnumTryAs};

use crate::{expr::Expr, types::Type};

bitflags! {
    /// Declaration modifiers of a field or method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const VOLATILE = 1 << 5;
        const TRANSIENT = 1 << 6;
    }
}

/// Declaring type of a member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs)]
pub enum MemberOwner {
    /// A named class, interface or enum.
    Class(Arc<str>),
    /// The synthetic class every array type pretends to extend.
    ArrayClass,
}

impl std::fmt::Display for MemberOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberOwner::Class(name) => write!(f, "{}", name),
            MemberOwner::ArrayClass => write!(f, "_Array_"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldMember {
    pub name: Arc<str>,
    pub owner: MemberOwner,
    pub ty: Type,
    pub modifiers: Modifiers,
    /// Qualified names of the annotations present on the declaration.
    pub annotations: Vec<Arc<str>>,
    pub initializer: Option<Expr>,
}

impl FieldMember {
    pub fn new(owner: MemberOwner, name: impl Into<Arc<str>>, ty: Type) -> Self {
        Self {
            name: name.into(),
            owner,
            ty,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            initializer: None,
        }
    }

    /// The `length` field declared on the synthetic array class.
    pub fn array_length() -> Self {
        Self::new(MemberOwner::ArrayClass, "length", Type::INT)
            .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<Arc<str>>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_initializer(mut self, initializer: Expr) -> Self {
        self.initializer = Some(initializer);
        self
    }

    #[inline]
    pub fn is_static_final(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC | Modifiers::FINAL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodMember {
    pub name: Arc<str>,
    pub owner: MemberOwner,
    pub parameters: Vec<Type>,
    pub return_type: Type,
    pub modifiers: Modifiers,
}

impl MethodMember {
    /// Public instance method without parameters.
    pub fn getter(owner: impl Into<Arc<str>>, name: impl Into<Arc<str>>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            owner: MemberOwner::Class(owner.into()),
            parameters: Vec::new(),
            return_type,
            modifiers: Modifiers::PUBLIC,
        }
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = Type>) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }
}

/// A field or a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum Member {
    Field(Arc<FieldMember>),
    Method(Arc<MethodMember>),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field(field) => &field.name,
            Member::Method(method) => &method.name,
        }
    }

    pub fn owner(&self) -> &MemberOwner {
        match self {
            Member::Field(field) => &field.owner,
            Member::Method(method) => &method.owner,
        }
    }
}

impl From<FieldMember> for Member {
    fn from(value: FieldMember) -> Self {
        Member::Field(Arc::new(value))
    }
}

impl From<MethodMember> for Member {
    fn from(value: MethodMember) -> Self {
        Member::Method(Arc::new(value))
    }
}

/// A declared program element a variable value may be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum ProgramElement {
    Member(Member),
    /// A local variable or parameter.
    Local { name: Arc<str>, ty: Type },
    /// A class used as an element (e.g. a qualifier of a static access).
    Class(Arc<str>),
}

impl ProgramElement {
    /// Returns the member when this element is a field or a method.
    pub fn as_member(&self) -> Option<&Member> {
        match self {
            ProgramElement::Member(member) => Some(member),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldMember> {
        match self {
            ProgramElement::Member(Member::Field(field)) => Some(field),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProgramElement::Member(member) => member.name(),
            ProgramElement::Local { name, .. } => name,
            ProgramElement::Class(name) => name,
        }
    }
}

impl From<Member> for ProgramElement {
    fn from(value: Member) -> Self {
        ProgramElement::Member(value)
    }
}

impl From<FieldMember> for ProgramElement {
    fn from(value: FieldMember) -> Self {
        ProgramElement::Member(value.into())
    }
}

impl From<MethodMember> for ProgramElement {
    fn from(value: MethodMember) -> Self {
        ProgramElement::Member(value.into())
    }
}
