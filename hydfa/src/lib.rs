//! Virtual fields for the hyperion dataflow engine.
//!
//! The dataflow engine tracks a handful of well-known scalar attributes of
//! objects (array length, string length, collection and map size, unboxed
//! primitive value, optional payload) as if they were ordinary fields. This
//! crate owns that closed registry ([`special_field::SpecialField`]) together
//! with the value model it needs:
//!
//! - [`types`]: type descriptors and the [`types::TypeResolver`] seam.
//! - [`member`]: program members (fields, methods) used to match accessors.
//! - [`expr`]: initializer expressions and the constant evaluator.
//! - [`value`]: symbolic values, facts and variable values.
//! - [`factory`]: the value factory and the field-trust policy.
//! - [`contract`]: method contracts derived from virtual fields.
//!
//! Nothing in here traverses control flow. Given an accessor and what is known
//! about its qualifier, the registry answers which symbolic value results and
//! which logical facts follow.

pub mod config;
pub mod contract;
pub mod error;
pub mod expr;
pub mod factory;
pub mod member;
pub mod special_field;
pub mod types;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod tests_utils;

pub use special_field::{SpecialField, SpecialFieldValue};
