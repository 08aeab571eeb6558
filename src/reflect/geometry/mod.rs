//! Geometric userdata types.

mod cframe;
mod color;
mod rect;
mod udim;
mod vector;

use std::ops::{Add, Div, Mul, Neg, Sub};

use typebridge_types::{ConversionError, DomainType, Value};

use crate::dump::{OperatorSchema, TypeRef};
use crate::dynamic::Dynamic;
use crate::engine::Context;
use crate::error::Result;

use super::{bad_operand, from_userdata, userdata};

/// A userdata type that carries the usual arithmetic.
pub(crate) trait Arithmetic:
    DomainType
    + Copy
    + Into<Value>
    + TryFrom<Value, Error = ConversionError>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
{
}

impl<T> Arithmetic for T where
    T: DomainType
        + Copy
        + Into<Value>
        + TryFrom<Value, Error = ConversionError>
        + Add<Output = T>
        + Sub<Output = T>
        + Neg<Output = T>
{
}

/// Arithmetic that also scales by a number.
pub(crate) trait Scalable:
    Arithmetic + Mul<Output = Self> + Mul<f32, Output = Self> + Div<Output = Self> + Div<f32, Output = Self>
{
}

impl<T> Scalable for T where
    T: Arithmetic + Mul<Output = T> + Mul<f32, Output = T> + Div<Output = T> + Div<f32, Output = T>
{
}

pub(crate) fn add<T: Arithmetic>(_: &Context<'_>, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic> {
    let a = from_userdata::<T>(lhs).map_err(|_| bad_operand("__add", lhs))?;
    let b = from_userdata::<T>(rhs).map_err(|_| bad_operand("__add", rhs))?;
    Ok(userdata(a + b))
}

pub(crate) fn sub<T: Arithmetic>(_: &Context<'_>, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic> {
    let a = from_userdata::<T>(lhs).map_err(|_| bad_operand("__sub", lhs))?;
    let b = from_userdata::<T>(rhs).map_err(|_| bad_operand("__sub", rhs))?;
    Ok(userdata(a - b))
}

pub(crate) fn unm<T: Arithmetic>(_: &Context<'_>, operand: &Dynamic, _: &Dynamic) -> Result<Dynamic> {
    let a = from_userdata::<T>(operand).map_err(|_| bad_operand("__unm", operand))?;
    Ok(userdata(-a))
}

/// Component-wise product, or scaling when one side is a number.
pub(crate) fn mul<T: Scalable>(_: &Context<'_>, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic> {
    let result = match (from_userdata::<T>(lhs), from_userdata::<T>(rhs)) {
        (Ok(a), Ok(b)) => a * b,
        (Ok(a), Err(_)) => a * scalar("__mul", rhs)?,
        (Err(_), Ok(b)) => b * scalar("__mul", lhs)?,
        (Err(_), Err(_)) => return Err(bad_operand("__mul", lhs)),
    };
    Ok(userdata(result))
}

/// Component-wise quotient, or division by a number on the right.
pub(crate) fn div<T: Scalable>(_: &Context<'_>, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic> {
    let a = from_userdata::<T>(lhs).map_err(|_| bad_operand("__div", lhs))?;
    let result = match from_userdata::<T>(rhs) {
        Ok(b) => a / b,
        Err(_) => a / scalar("__div", rhs)?,
    };
    Ok(userdata(result))
}

fn scalar(op: &str, operand: &Dynamic) -> Result<f32> {
    operand
        .as_number()
        .map(|n| n as f32)
        .ok_or_else(|| bad_operand(op, operand))
}

pub(crate) fn same_type(name: &'static str) -> OperatorSchema {
    OperatorSchema::binary(TypeRef::named(name), TypeRef::named(name))
}

pub(crate) fn scaled(name: &'static str) -> OperatorSchema {
    OperatorSchema::binary(
        TypeRef::or([TypeRef::named(name), TypeRef::Number]),
        TypeRef::named(name),
    )
}

pub(crate) fn negated(name: &'static str) -> OperatorSchema {
    OperatorSchema::unary(TypeRef::named(name))
}
