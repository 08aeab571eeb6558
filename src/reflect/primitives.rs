//! Scalar types: nil, booleans, numbers and the string family.

use typebridge_types::Value;

use crate::dump::{TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Reflector, Registration};
use crate::error::ReflectError;

use super::set_exact;

fn nil() -> Reflector {
    Reflector::new("nil")
        .push(|_, v| match v {
            Value::Nil => Ok(Dynamic::Nil),
            other => Err(ReflectError::mismatch("nil", other.type_name())),
        })
        .pull(|_, d| match d {
            Dynamic::Nil => Ok(Value::Nil),
            other => Err(ReflectError::mismatch("nil", other.type_of())),
        })
        .set(set_exact)
        .with_dump(|| {
            TypeSchema::new("nil")
                .category("Primitive")
                .underlying(TypeRef::Nil)
        })
}

inventory::submit!(Registration(nil));

fn boolean() -> Reflector {
    Reflector::new("bool")
        .push(|_, v| match v {
            Value::Bool(b) => Ok(Dynamic::Bool(b)),
            other => Err(ReflectError::mismatch("bool", other.type_name())),
        })
        .pull(|_, d| match d {
            Dynamic::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(ReflectError::mismatch("bool", other.type_of())),
        })
        .set(set_exact)
        .with_dump(|| {
            TypeSchema::new("bool")
                .category("Primitive")
                .underlying(TypeRef::Bool)
        })
}

inventory::submit!(Registration(boolean));

/// Numeric types. Every numeric type pulls from a runtime number and
/// coerces from any other numeric type.
macro_rules! number_reflectors {
    ($($factory:ident => $name:literal, $variant:ident, $ty:ty;)*) => {
        $(
            fn $factory() -> Reflector {
                Reflector::new($name)
                    .push(|_, v| match v {
                        Value::$variant(n) => Ok(Dynamic::Number(n as f64)),
                        other => Err(ReflectError::mismatch($name, other.type_name())),
                    })
                    .pull(|_, d| match d {
                        Dynamic::Number(n) => Ok(Value::$variant(*n as $ty)),
                        other => Err(ReflectError::mismatch($name, other.type_of())),
                    })
                    .convert(|v| v.as_f64().map(|n| Value::$variant(n as $ty)))
                    .set(set_exact)
                    .with_dump(|| {
                        TypeSchema::new($name)
                            .category("Primitive")
                            .underlying(TypeRef::Number)
                    })
            }

            inventory::submit!(Registration($factory));
        )*
    };
}

number_reflectors! {
    int => "int", Int, i32;
    int64 => "int64", Int64, i64;
    float => "float", Float, f32;
    double => "double", Double, f64;
}

/// String types that must hold UTF-8 text.
macro_rules! text_reflectors {
    ($($factory:ident => $name:literal, $variant:ident, $summary:literal;)*) => {
        $(
            fn $factory() -> Reflector {
                Reflector::new($name)
                    .push(|_, v| match v {
                        Value::$variant(s) => Ok(Dynamic::string(s)),
                        other => Err(ReflectError::mismatch($name, other.type_name())),
                    })
                    .pull(|_, d| match d {
                        Dynamic::String(_) => d
                            .as_str()
                            .map(|s| Value::$variant(s.to_string()))
                            .ok_or_else(|| ReflectError::invalid($name, "not valid UTF-8")),
                        other => Err(ReflectError::mismatch($name, other.type_of())),
                    })
                    .convert(|v| v.as_str().map(|s| Value::$variant(s.to_string())))
                    .set(set_exact)
                    .with_dump(|| {
                        TypeSchema::new($name)
                            .category("Primitive")
                            .underlying(TypeRef::String)
                            .summary($summary)
                    })
            }

            inventory::submit!(Registration($factory));
        )*
    };
}

text_reflectors! {
    string => "string", String, "";
    content => "Content", Content, "A reference to an asset.";
    protected_string => "ProtectedString", ProtectedString, "Source text of a script.";
}

/// String types holding arbitrary bytes.
macro_rules! bytes_reflectors {
    ($($factory:ident => $name:literal, $variant:ident, $summary:literal;)*) => {
        $(
            fn $factory() -> Reflector {
                Reflector::new($name)
                    .push(|_, v| match v {
                        Value::$variant(b) => Ok(Dynamic::string(b)),
                        other => Err(ReflectError::mismatch($name, other.type_name())),
                    })
                    .pull(|_, d| match d.as_bytes() {
                        Some(b) => Ok(Value::$variant(b.to_vec())),
                        None => Err(ReflectError::mismatch($name, d.type_of())),
                    })
                    .convert(|v| v.as_bytes().map(|b| Value::$variant(b.to_vec())))
                    .set(set_exact)
                    .with_dump(|| {
                        TypeSchema::new($name)
                            .category("Primitive")
                            .underlying(TypeRef::String)
                            .summary($summary)
                    })
            }

            inventory::submit!(Registration($factory));
        )*
    };
}

bytes_reflectors! {
    binary_string => "BinaryString", BinaryString, "A string of arbitrary bytes.";
    shared_string => "SharedString", SharedString, "Bytes shared between values by content.";
}
