//! Value factory
//!
//! The [`ValueFactory`] is the single place symbolic values are built. It owns
//! the collaborators the virtual-field registry consults (type resolution,
//! constant evaluation, field trust) and interns [`VariableValue`]s so that the
//! same variable read twice yields the same shared instance.
use std::{collections::HashMap, sync::Arc};

use log::debug;
use parking_lot::RwLock;

use crate::{
    config::DfaConfig,
    expr::{Constant, ConstantEvaluator, ConstantFolder},
    member::{FieldMember, MemberOwner, Modifiers},
    special_field::SpecialField,
    types::{Type, TypeHierarchy, TypeResolver},
    value::{Descriptor, FactMap, LongRange, Nullability, SymbolicValue, VariableValue},
};

/// Decides whether a field's declared initializer may be assumed to be its value.
///
/// Reflection, injection frameworks or subclassing may replace the value of an
/// otherwise final field; an implementation answering `true` takes
/// responsibility for excluding those cases.
pub trait FieldTrustPolicy: Send + Sync {
    fn can_trust_field_initializer(&self, field: &FieldMember) -> bool;
}

/// Trust policy driven by a [`DfaConfig`].
#[derive(Debug, Clone)]
pub struct ConfiguredTrustPolicy {
    enabled: bool,
    untrusted_classes: Vec<String>,
    implicit_write_annotations: Vec<String>,
}

impl ConfiguredTrustPolicy {
    pub fn new(config: &DfaConfig) -> Self {
        Self {
            enabled: config.trust_field_initializers,
            untrusted_classes: config.untrusted_classes.clone(),
            implicit_write_annotations: config.implicit_write_annotations.clone(),
        }
    }
}

impl FieldTrustPolicy for ConfiguredTrustPolicy {
    fn can_trust_field_initializer(&self, field: &FieldMember) -> bool {
        if !self.enabled
            || !field.modifiers.contains(Modifiers::FINAL)
            || field.modifiers.contains(Modifiers::VOLATILE)
        {
            return false;
        }
        if let MemberOwner::Class(owner) = &field.owner {
            if self.untrusted_classes.iter().any(|c| **c == **owner) {
                return false;
            }
        }
        !field.annotations.iter().any(|annotation| {
            self.implicit_write_annotations
                .iter()
                .any(|a| **a == **annotation)
        })
    }
}

/// Key of the variable intern table. Variables differing only by type are distinct.
type VariableKey = (Descriptor, Option<Arc<VariableValue>>, Option<Type>);

pub struct ValueFactory {
    types: Arc<dyn TypeResolver>,
    evaluator: Arc<dyn ConstantEvaluator>,
    trust: Arc<dyn FieldTrustPolicy>,
    variables: RwLock<HashMap<VariableKey, Arc<VariableValue>>>,
}

impl ValueFactory {
    pub fn new(
        types: Arc<dyn TypeResolver>,
        evaluator: Arc<dyn ConstantEvaluator>,
        trust: Arc<dyn FieldTrustPolicy>,
    ) -> Self {
        Self {
            types,
            evaluator,
            trust,
            variables: RwLock::new(HashMap::new()),
        }
    }

    /// Factory over the JDK hierarchy, the stock constant folder and a
    /// trust policy built from `config`.
    pub fn from_config(config: &DfaConfig) -> Self {
        Self::new(
            Arc::new(TypeHierarchy::with_jdk_defaults()),
            Arc::new(ConstantFolder::default()),
            Arc::new(ConfiguredTrustPolicy::new(config)),
        )
    }

    pub fn types(&self) -> &dyn TypeResolver {
        self.types.as_ref()
    }

    pub fn evaluator(&self) -> &dyn ConstantEvaluator {
        self.evaluator.as_ref()
    }

    pub fn can_trust_field_initializer(&self, field: &FieldMember) -> bool {
        self.trust.can_trust_field_initializer(field)
    }

    #[inline]
    pub fn int(&self, value: i32) -> SymbolicValue {
        SymbolicValue::Constant(Constant::Int(value))
    }

    #[inline]
    pub fn constant(&self, constant: Constant) -> SymbolicValue {
        SymbolicValue::Constant(constant)
    }

    #[inline]
    pub fn null(&self) -> SymbolicValue {
        SymbolicValue::Constant(Constant::Null)
    }

    #[inline]
    pub fn unknown(&self) -> SymbolicValue {
        SymbolicValue::Unknown
    }

    /// A value only known to lie within `range`.
    pub fn range(&self, range: LongRange) -> SymbolicValue {
        FactMap::new().with_range(range).into()
    }

    pub fn nullability(&self, nullability: Nullability) -> SymbolicValue {
        FactMap::new().with_nullability(nullability).into()
    }

    pub fn boxed(&self, inner: SymbolicValue) -> SymbolicValue {
        SymbolicValue::Boxed(Arc::new(inner))
    }

    /// Interned variable value for `descriptor` read on `qualifier` with type `ty`.
    ///
    /// Requests agreeing on descriptor, qualifier and type share one instance;
    /// a different type yields a distinct variable.
    pub fn variable(
        &self,
        descriptor: Descriptor,
        qualifier: Option<Arc<VariableValue>>,
        ty: Option<Type>,
    ) -> Arc<VariableValue> {
        let key = (descriptor, qualifier, ty);
        if let Some(existing) = self.variables.read().get(&key) {
            return Arc::clone(existing);
        }

        let mut variables = self.variables.write();
        if let Some(existing) = variables.get(&key) {
            return Arc::clone(existing);
        }

        let variable = Arc::new(VariableValue::new(key.0.clone(), key.1.clone(), key.2.clone()));
        variables.insert(key, Arc::clone(&variable));
        debug!(
            "New variable value {} (type {}). {} variables interned.",
            variable,
            variable
                .ty()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string()),
            variables.len()
        );
        variable
    }

    /// The generic "virtual field `field` of `qualifier`" value.
    pub fn field_access(
        &self,
        field: SpecialField,
        qualifier: &Arc<VariableValue>,
        ty: Option<Type>,
    ) -> SymbolicValue {
        SymbolicValue::Variable(self.variable(
            Descriptor::SpecialField(field),
            Some(Arc::clone(qualifier)),
            ty,
        ))
    }

    /// Number of variable values interned so far.
    pub fn variable_count(&self) -> usize {
        self.variables.read().len()
    }
}

impl Default for ValueFactory {
    fn default() -> Self {
        Self::from_config(&DfaConfig::default())
    }
}

impl std::fmt::Debug for ValueFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueFactory")
            .field("variables", &self.variable_count())
            .finish_non_exhaustive()
    }
}
