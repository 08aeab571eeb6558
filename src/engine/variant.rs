//! Conversion of values whose type is not known in advance.

use tracing::trace;
use typebridge_types::Value;

use crate::dump::{TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Context, Reflector, Registration};
use crate::error::{Direction, ReflectError, Result};
use crate::reflect::containers;

/// Type name accepted by restricted pulls to mean "any value".
pub const VARIANT: &str = "Variant";

impl Context<'_> {
    /// Push a domain value of any type.
    pub fn push_variant(&self, value: Value) -> Result<Dynamic> {
        trace!(type_name = value.type_name(), "push variant");
        match value {
            Value::Nil => Ok(Dynamic::Nil),
            Value::Bool(b) => Ok(Dynamic::Bool(b)),
            Value::Float(n) => Ok(Dynamic::Number(n as f64)),
            Value::Double(n) => Ok(Dynamic::Number(n)),
            Value::Int(n) => Ok(Dynamic::Number(n as f64)),
            Value::Int64(n) => Ok(Dynamic::Number(n as f64)),
            Value::String(s) | Value::Content(s) | Value::ProtectedString(s) => {
                Ok(Dynamic::string(s))
            }
            Value::BinaryString(b) | Value::SharedString(b) => Ok(Dynamic::string(b)),
            v @ Value::Array(_) => containers::push_array(self, v),
            v @ Value::Dictionary(_) => containers::push_dictionary(self, v),
            other => {
                let reflector = self.registry().get(other.type_name())?;
                let push = reflector
                    .push_to
                    .ok_or_else(|| ReflectError::UnsupportedDirection {
                        type_name: reflector.name.to_string(),
                        direction: Direction::Push,
                    })?;
                push(self, other)
            }
        }
    }

    /// Pull a dynamic value into the richest matching domain type.
    ///
    /// Numbers become `double`. Strings become `string` when they are valid
    /// UTF-8 and `BinaryString` otherwise. A table is read as an `Array`
    /// first and as a `Dictionary` if it is not array shaped, so an empty
    /// table is an `Array`.
    pub fn pull_variant(&self, value: &Dynamic) -> Result<Value> {
        trace!(kind = value.kind(), "pull variant");
        match value {
            Dynamic::Nil => Ok(Value::Nil),
            Dynamic::Bool(b) => Ok(Value::Bool(*b)),
            Dynamic::Number(n) => Ok(Value::Double(*n)),
            Dynamic::String(s) => Ok(match std::str::from_utf8(s) {
                Ok(text) => Value::String(text.to_string()),
                Err(_) => Value::BinaryString(s.to_vec()),
            }),
            Dynamic::Table(_) => match self.attempt(|ctx| containers::pull_array(ctx, value)) {
                Ok(v) => Ok(v),
                // Only a shape failure falls back; a failing element is
                // reported as is.
                Err(ReflectError::TypeMismatch { .. }) => {
                    containers::pull_dictionary(self, value)
                }
                Err(e) => Err(e),
            },
            Dynamic::UserData(u) => {
                let reflector = self.registry().get(u.type_name())?;
                let pull = reflector
                    .pull_from
                    .ok_or_else(|| ReflectError::UnsupportedDirection {
                        type_name: reflector.name.to_string(),
                        direction: Direction::Pull,
                    })?;
                pull(self, value)
            }
        }
    }

    /// Pull a dynamic value restricted to the named types.
    ///
    /// Each accepted type is tried in order; if none accepts the value
    /// directly, the value is pulled as a variant and offered to each
    /// accepted type's coercion.
    pub fn pull_any_of(&self, value: &Dynamic, types: &[&str]) -> Result<Value> {
        if types.contains(&VARIANT) {
            return self.pull_variant(value);
        }

        let mut reported = None;
        for name in types {
            let reflector = self.registry().get(name)?;
            let Some(pull) = reflector.pull_from else {
                continue;
            };
            match self.attempt(|ctx| pull(ctx, value)) {
                Ok(v) => return Ok(v),
                Err(ReflectError::TypeMismatch { .. }) => {}
                Err(e) => {
                    reported.get_or_insert(e);
                }
            }
        }
        if let Some(e) = reported {
            return Err(e);
        }

        if let Ok(pulled) = self.attempt(|ctx| ctx.pull_variant(value)) {
            for name in types {
                let reflector = self.registry().get(name)?;
                if let Some(coerced) = reflector.convert_from.and_then(|convert| convert(&pulled)) {
                    return Ok(coerced);
                }
            }
        }

        Err(ReflectError::mismatch(types.join(" or "), value.type_of()))
    }

    /// Store `value` into `slot`, using the slot type's setter and falling
    /// back to its coercion when the setter rejects the value.
    pub fn assign(&self, slot: &mut Value, value: Value) -> Result<()> {
        let reflector = self.registry().get(slot.type_name())?;
        let expected = reflector.name;
        let convert = |v: &Value| reflector.convert_from.and_then(|f| f(v));

        match reflector.set_to {
            Some(set) => match set(slot, value.clone()) {
                Ok(()) => Ok(()),
                Err(e) => match convert(&value) {
                    Some(coerced) => set(slot, coerced),
                    None => Err(e),
                },
            },
            None if value.type_name() == expected => {
                *slot = value;
                Ok(())
            }
            None => match convert(&value) {
                Some(coerced) => {
                    *slot = coerced;
                    Ok(())
                }
                None => Err(ReflectError::mismatch(expected, value.type_name())),
            },
        }
    }
}

fn push(ctx: &Context<'_>, value: Value) -> Result<Dynamic> {
    ctx.push_variant(value)
}

fn pull(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    ctx.pull_variant(value)
}

fn dump() -> TypeSchema {
    TypeSchema::new(VARIANT)
        .category("Variant")
        .underlying(TypeRef::Any)
        .summary("Any value. Dispatches on the concrete type of the value.")
}

fn variant() -> Reflector {
    Reflector::new(VARIANT).push(push).pull(pull).with_dump(dump)
}

inventory::submit!(Registration(variant));
