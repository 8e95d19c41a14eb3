//! Method contracts
//!
//! A contract summarizes what a method returns under stated conditions on its
//! receiver and arguments. The contracts built here describe the *shape* of a
//! method; the contract-inference pass instantiates them per call site.
use smallvec::SmallVec;
use strum::{EnumIs, EnumTryAs};

use crate::{expr::Constant, special_field::SpecialField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum ContractReturnValue {
    ReturnAny,
    ReturnTrue,
    ReturnFalse,
    ReturnNull,
    ReturnNotNull,
    Fail,
}

impl std::fmt::Display for ContractReturnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContractReturnValue::ReturnAny => "_",
            ContractReturnValue::ReturnTrue => "true",
            ContractReturnValue::ReturnFalse => "false",
            ContractReturnValue::ReturnNull => "null",
            ContractReturnValue::ReturnNotNull => "!null",
            ContractReturnValue::Fail => "fail",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelationType {
    /// The relation holding exactly when `self` does not.
    pub fn negated(self) -> Self {
        match self {
            RelationType::Eq => RelationType::Ne,
            RelationType::Ne => RelationType::Eq,
            RelationType::Lt => RelationType::Ge,
            RelationType::Le => RelationType::Gt,
            RelationType::Gt => RelationType::Le,
            RelationType::Ge => RelationType::Lt,
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelationType::Eq => "==",
            RelationType::Ne => "!=",
            RelationType::Lt => "<",
            RelationType::Le => "<=",
            RelationType::Gt => ">",
            RelationType::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// Constraint on a single argument of a standard contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueConstraint {
    Any,
    Null,
    NotNull,
    True,
    False,
}

impl std::fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueConstraint::Any => "_",
            ValueConstraint::Null => "null",
            ValueConstraint::NotNull => "!null",
            ValueConstraint::True => "true",
            ValueConstraint::False => "false",
        };
        write!(f, "{}", s)
    }
}

/// A value a contract condition may refer to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum ContractValue {
    /// The receiver of the call.
    Qualifier,
    /// The zero-based call argument.
    Argument(u32),
    Constant(Constant),
    /// A virtual field read on another contract value.
    SpecialField(Box<ContractValue>, SpecialField),
}

impl ContractValue {
    pub fn qualifier() -> Self {
        ContractValue::Qualifier
    }

    pub fn argument(index: u32) -> Self {
        ContractValue::Argument(index)
    }

    pub fn zero() -> Self {
        ContractValue::Constant(Constant::Int(0))
    }

    pub fn null() -> Self {
        ContractValue::Constant(Constant::Null)
    }

    /// The virtual field `field` of this value.
    pub fn special_field(self, field: SpecialField) -> Self {
        ContractValue::SpecialField(Box::new(self), field)
    }
}

impl std::fmt::Display for ContractValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractValue::Qualifier => write!(f, "this"),
            ContractValue::Argument(index) => write!(f, "arg{}", index),
            ContractValue::Constant(constant) => write!(f, "{}", constant),
            ContractValue::SpecialField(base, field) => write!(f, "{}.{}", base, field),
        }
    }
}

/// A single condition `left REL right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractCondition {
    pub left: ContractValue,
    pub relation: RelationType,
    pub right: ContractValue,
}

impl std::fmt::Display for ContractCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.relation, self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum MethodContract {
    /// One constraint per argument, e.g. `null, _ -> false`.
    Standard {
        constraints: SmallVec<[ValueConstraint; 4]>,
        return_value: ContractReturnValue,
    },
    /// Holds when the condition holds.
    SingleCondition {
        condition: ContractCondition,
        return_value: ContractReturnValue,
    },
    /// Holds unconditionally; used as the fallback of a contract list.
    Trivial { return_value: ContractReturnValue },
}

impl MethodContract {
    pub fn standard(
        constraints: impl IntoIterator<Item = ValueConstraint>,
        return_value: ContractReturnValue,
    ) -> Self {
        MethodContract::Standard {
            constraints: constraints.into_iter().collect(),
            return_value,
        }
    }

    pub fn single_condition(
        left: ContractValue,
        relation: RelationType,
        right: ContractValue,
        return_value: ContractReturnValue,
    ) -> Self {
        MethodContract::SingleCondition {
            condition: ContractCondition {
                left,
                relation,
                right,
            },
            return_value,
        }
    }

    pub fn trivial(return_value: ContractReturnValue) -> Self {
        MethodContract::Trivial { return_value }
    }

    pub fn return_value(&self) -> ContractReturnValue {
        match self {
            MethodContract::Standard { return_value, .. }
            | MethodContract::SingleCondition { return_value, .. }
            | MethodContract::Trivial { return_value } => *return_value,
        }
    }
}

impl std::fmt::Display for MethodContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodContract::Standard {
                constraints,
                return_value,
            } => write!(
                f,
                "{} -> {}",
                constraints
                    .iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                return_value
            ),
            MethodContract::SingleCondition {
                condition,
                return_value,
            } => write!(f, "{} -> {}", condition, return_value),
            MethodContract::Trivial { return_value } => write!(f, "-> {}", return_value),
        }
    }
}
