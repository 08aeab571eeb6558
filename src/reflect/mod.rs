//! Concrete reflectors.
//!
//! Each submodule registers the reflectors for one family of domain types.
//! The helpers here cover what most of them share: userdata wrapping, exact
//! type checks and slot assignment.

pub mod containers;
mod desc;
mod geometry;
mod http;
mod primitives;
mod selector;

use typebridge_types::{ConversionError, DomainType, Value};

use crate::dump::OperatorSchema;
use crate::dynamic::{Dynamic, UserData};
use crate::engine::{Context, Reflector};
use crate::error::{ReflectError, Result};

/// Extract a concrete type from a domain value.
pub fn cast<T>(value: &Value) -> Result<T>
where
    T: TryFrom<Value, Error = ConversionError>,
{
    T::try_from(value.clone()).map_err(ReflectError::from)
}

/// Wrap a domain value as userdata tagged with its type name.
pub fn userdata<T: DomainType + Into<Value>>(value: T) -> Dynamic {
    Dynamic::UserData(UserData::new(T::TYPE_NAME, value.into()))
}

/// Domain value carried by a userdata of type `T`.
pub fn from_userdata<T>(value: &Dynamic) -> Result<T>
where
    T: DomainType + TryFrom<Value, Error = ConversionError>,
{
    match value {
        Dynamic::UserData(u) if u.type_name() == T::TYPE_NAME => cast(&u.value()),
        other => Err(ReflectError::mismatch(T::TYPE_NAME, other.type_of())),
    }
}

pub(crate) fn push_userdata<T: DomainType>(_: &Context<'_>, value: Value) -> Result<Dynamic> {
    if value.type_name() != T::TYPE_NAME {
        return Err(ReflectError::mismatch(T::TYPE_NAME, value.type_name()));
    }
    Ok(Dynamic::UserData(UserData::new(T::TYPE_NAME, value)))
}

pub(crate) fn pull_userdata<T: DomainType>(_: &Context<'_>, value: &Dynamic) -> Result<Value> {
    match value {
        Dynamic::UserData(u) if u.type_name() == T::TYPE_NAME => Ok(u.get()),
        other => Err(ReflectError::mismatch(T::TYPE_NAME, other.type_of())),
    }
}

/// Replace the slot if the value has the slot's type.
pub(crate) fn set_exact(slot: &mut Value, value: Value) -> Result<()> {
    if slot.type_name() != value.type_name() {
        return Err(ReflectError::mismatch(slot.type_name(), value.type_name()));
    }
    *slot = value;
    Ok(())
}

/// Reflector skeleton for a type that lives in the runtime as userdata.
pub(crate) fn userdata_reflector<T: DomainType>() -> Reflector {
    Reflector::new(T::TYPE_NAME)
        .push(push_userdata::<T>)
        .pull(pull_userdata::<T>)
        .set(set_exact)
}

pub(crate) fn number(n: impl Into<f64>) -> Dynamic {
    Dynamic::Number(n.into())
}

/// Operand an operator implementation does not handle.
pub(crate) fn bad_operand(op: &str, operand: &Dynamic) -> ReflectError {
    ReflectError::UnsupportedOperator {
        op: op.to_string(),
        type_name: operand.type_of(),
    }
}

/// `__eq` for any userdata type with value equality.
pub(crate) fn eq_by_value<T>(_: &Context<'_>, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic>
where
    T: DomainType + PartialEq + TryFrom<Value, Error = ConversionError>,
{
    match (from_userdata::<T>(lhs), from_userdata::<T>(rhs)) {
        (Ok(a), Ok(b)) => Ok(Dynamic::Bool(a == b)),
        _ => Ok(Dynamic::Bool(false)),
    }
}

pub(crate) fn eq_schema() -> OperatorSchema {
    OperatorSchema::binary(crate::dump::TypeRef::Any, crate::dump::TypeRef::Bool)
}

pub(crate) fn tostring_schema() -> OperatorSchema {
    OperatorSchema::unary(crate::dump::TypeRef::String)
}
