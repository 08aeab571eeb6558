//! Array, Dictionary, Optional and Tuple.
//!
//! Arrays and dictionaries convert element-wise through the variant
//! dispatcher and are the only values that can form cycles, so both sides
//! of each conversion run under the context's cycle guard.

use std::collections::BTreeMap;

use typebridge_types::{Array, Dictionary, DomainType, Optional, Tuple, Value};

use crate::dump::{TypeRef, TypeSchema};
use crate::dynamic::{Dynamic, Table};
use crate::engine::{Context, Reflector, Registration, VARIANT};
use crate::error::{ReflectError, Result};

// ============================================================================
// Array
// ============================================================================

pub fn push_array(ctx: &Context<'_>, value: Value) -> Result<Dynamic> {
    let Value::Array(array) = value else {
        return Err(ReflectError::mismatch(Array::TYPE_NAME, value.type_name()));
    };
    let guard = ctx.guard();
    guard.visit(array.id(), Array::TYPE_NAME)?;
    let _depth = ctx.descend()?;

    let table = Table::new();
    for (i, item) in array.to_vec().into_iter().enumerate() {
        let pushed = ctx.push_variant(item).map_err(|e| e.at_index(i + 1))?;
        table.push(pushed);
    }
    Ok(Dynamic::Table(table))
}

/// Pull a table's sequence part. A table with named fields is not an
/// array.
pub fn pull_array(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    let Dynamic::Table(table) = value else {
        return Err(ReflectError::mismatch(Array::TYPE_NAME, value.type_of()));
    };
    if table.has_fields() {
        return Err(ReflectError::mismatch(Array::TYPE_NAME, "table with named fields"));
    }
    let guard = ctx.guard();
    guard.visit(table.id(), Array::TYPE_NAME)?;
    let _depth = ctx.descend()?;

    let items = table.borrow().seq.clone();
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        out.push(ctx.pull_variant(item).map_err(|e| e.at_index(i + 1))?);
    }
    Ok(Value::Array(Array::from_vec(out)))
}

fn array() -> Reflector {
    Reflector::new(Array::TYPE_NAME)
        .push(push_array)
        .pull(pull_array)
        .convert(|v| match v {
            Value::Tuple(Tuple(items)) => Some(Value::Array(Array::from_vec(items.clone()))),
            _ => None,
        })
        .with_dump(|| {
            TypeSchema::new(Array::TYPE_NAME)
                .category("Container")
                .underlying(TypeRef::array(TypeRef::named(VARIANT)))
                .summary("An ordered list of values.")
        })
}

inventory::submit!(Registration(array));

// ============================================================================
// Dictionary
// ============================================================================

/// Push a Dictionary as a keyed table. A table cannot hold nil, so
/// entries whose value is `Nil` are dropped.
pub fn push_dictionary(ctx: &Context<'_>, value: Value) -> Result<Dynamic> {
    let Value::Dictionary(dict) = value else {
        return Err(ReflectError::mismatch(Dictionary::TYPE_NAME, value.type_name()));
    };
    let guard = ctx.guard();
    guard.visit(dict.id(), Dictionary::TYPE_NAME)?;
    let _depth = ctx.descend()?;

    let table = Table::new();
    for (key, item) in dict.to_map() {
        let pushed = ctx.push_variant(item).map_err(|e| e.at_key(&key))?;
        table.set(key, pushed);
    }
    Ok(Dynamic::Table(table))
}

/// Pull a table's named fields. Sequence entries have number keys and are
/// rejected.
pub fn pull_dictionary(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    let Dynamic::Table(table) = value else {
        return Err(ReflectError::mismatch(Dictionary::TYPE_NAME, value.type_of()));
    };
    if table.len() > 0 {
        return Err(ReflectError::mismatch("string", "number").at_key("1"));
    }
    let guard = ctx.guard();
    guard.visit(table.id(), Dictionary::TYPE_NAME)?;
    let _depth = ctx.descend()?;

    let fields = table.borrow().fields.clone();
    let mut out = BTreeMap::new();
    for (key, item) in fields {
        let pulled = ctx.pull_variant(&item).map_err(|e| e.at_key(&key))?;
        out.insert(key, pulled);
    }
    Ok(Value::Dictionary(Dictionary::from_map(out)))
}

fn dictionary() -> Reflector {
    Reflector::new(Dictionary::TYPE_NAME)
        .push(push_dictionary)
        .pull(pull_dictionary)
        .with_dump(|| {
            TypeSchema::new(Dictionary::TYPE_NAME)
                .category("Container")
                .underlying(TypeRef::dictionary(TypeRef::named(VARIANT)))
                .summary("A collection of values keyed by string.")
        })
}

inventory::submit!(Registration(dictionary));

// ============================================================================
// Optional
// ============================================================================

fn push_optional(ctx: &Context<'_>, value: Value) -> Result<Dynamic> {
    let Value::Optional(optional) = value else {
        return Err(ReflectError::mismatch(Optional::TYPE_NAME, value.type_name()));
    };
    match optional.into_value() {
        Some(inner) => ctx.push_variant(inner),
        None => Ok(Dynamic::Nil),
    }
}

fn pull_optional(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    Ok(Value::Optional(match value {
        Dynamic::Nil => Optional::none(VARIANT),
        other => Optional::some(ctx.pull_variant(other)?),
    }))
}

/// Promote a bare value to a present optional.
fn convert_optional(value: &Value) -> Option<Value> {
    Some(Value::Optional(match value {
        Value::Optional(o) => o.clone(),
        Value::Nil => Optional::none(VARIANT),
        other => Optional::some(other.clone()),
    }))
}

/// Store into an optional slot, keeping the slot's declared inner type.
fn set_optional(slot: &mut Value, value: Value) -> Result<()> {
    let slot_type = slot.type_name();
    let Value::Optional(current) = slot else {
        return Err(ReflectError::mismatch(Optional::TYPE_NAME, slot_type));
    };
    let inner = current.inner.clone();
    let accepts = |name: &str| inner == VARIANT || inner == name;

    let next = match value {
        Value::Nil => None,
        Value::Optional(o) => match o.into_value() {
            None => None,
            Some(v) if accepts(v.type_name()) => Some(v),
            Some(v) => return Err(ReflectError::mismatch(inner.as_str(), v.type_name())),
        },
        v if accepts(v.type_name()) => Some(v),
        v => return Err(ReflectError::mismatch(inner.as_str(), v.type_name())),
    };
    current.value = next.map(Box::new);
    Ok(())
}

fn optional() -> Reflector {
    Reflector::new(Optional::TYPE_NAME)
        .push(push_optional)
        .pull(pull_optional)
        .convert(convert_optional)
        .set(set_optional)
        .with_dump(|| {
            TypeSchema::new(Optional::TYPE_NAME)
                .category("Container")
                .underlying(TypeRef::optional(TypeRef::named(VARIANT)))
                .summary("A value that may be nil.")
        })
}

inventory::submit!(Registration(optional));

/// Pull an optional field restricted to the accepted types. Nil is absent.
pub fn pull_optional_of(ctx: &Context<'_>, value: &Dynamic, types: &[&str]) -> Result<Option<Value>> {
    match value {
        Dynamic::Nil => Ok(None),
        other => ctx.pull_any_of(other, types).map(Some),
    }
}

// ============================================================================
// Tuple
// ============================================================================

fn push_tuple_directly(_: &Context<'_>, _: Value) -> Result<Dynamic> {
    panic!("a Tuple is several values; push it with Context::push_tuple")
}

fn pull_tuple_directly(_: &Context<'_>, _: &Dynamic) -> Result<Value> {
    panic!("a Tuple is several values; pull it with Context::pull_tuple")
}

fn tuple() -> Reflector {
    Reflector::new(Tuple::TYPE_NAME)
        .push(push_tuple_directly)
        .pull(pull_tuple_directly)
        .with_dump(|| {
            TypeSchema::new(Tuple::TYPE_NAME)
                .category("Container")
                .underlying(TypeRef::Tuple {
                    elements: vec![TypeRef::named(VARIANT)],
                })
                .summary("Zero or more values returned from one call.")
        })
}

inventory::submit!(Registration(tuple));

impl Context<'_> {
    /// Push each element of a tuple as a separate runtime value.
    pub fn push_tuple(&self, tuple: Tuple) -> Result<Vec<Dynamic>> {
        tuple
            .0
            .into_iter()
            .enumerate()
            .map(|(i, v)| self.push_variant(v).map_err(|e| e.at_index(i + 1)))
            .collect()
    }

    /// Gather several runtime values into one tuple.
    pub fn pull_tuple(&self, values: &[Dynamic]) -> Result<Tuple> {
        values
            .iter()
            .enumerate()
            .map(|(i, d)| self.pull_variant(d).map_err(|e| e.at_index(i + 1)))
            .collect::<Result<Vec<_>>>()
            .map(Tuple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_roundtrip() {
        let ctx = Context::global();
        let array = Array::from_vec(vec![Value::Bool(true), Value::from("x"), Value::Double(1.5)]);
        let d = ctx.push_variant(Value::Array(array.clone())).unwrap();
        assert_eq!(d.as_table().map(Table::len), Some(3));
        assert_eq!(ctx.pull_variant(&d).unwrap(), Value::Array(array));
    }

    #[test]
    fn test_nested_element_error_has_breadcrumb() {
        let ctx = Context::global();
        let inner = Table::from_seq(vec![Dynamic::Number(1.0)]);
        inner.set("oops", Dynamic::Bool(true));
        let outer = Table::from_fields([("list", Dynamic::Table(Table::from_seq(vec![
            Dynamic::Nil,
            Dynamic::Table(inner),
        ])))]);
        let err = ctx.pull_variant(&Dynamic::Table(outer)).unwrap_err();
        assert_eq!(err.to_string(), "key list: index 2: key 1: expected string, got number");
    }

    #[test]
    fn test_array_cycle_rejected_both_ways() {
        let ctx = Context::global();
        let array = Array::new();
        array.push(Value::Array(array.clone()));
        let err = ctx.push_variant(Value::Array(array)).unwrap_err();
        assert_eq!(err.root_cause(), &ReflectError::CyclicStructure("Array".into()));

        let table = Table::new();
        table.push(Dynamic::Table(table.clone()));
        let err = ctx.pull_variant(&Dynamic::Table(table)).unwrap_err();
        assert_eq!(err.root_cause(), &ReflectError::CyclicStructure("Array".into()));
    }

    #[test]
    fn test_dictionary_cycle_rejected() {
        let ctx = Context::global();
        let dict = Dictionary::new();
        dict.insert("self", Value::Dictionary(dict.clone()));
        let err = ctx.push_variant(Value::Dictionary(dict)).unwrap_err();
        assert_eq!(err.to_string(), "key self: Dictionary is cyclic");

        let table = Table::new();
        table.set("self", Dynamic::Table(table.clone()));
        let err = ctx.pull_variant(&Dynamic::Table(table)).unwrap_err();
        assert_eq!(err.root_cause(), &ReflectError::CyclicStructure("Dictionary".into()));
    }

    #[test]
    fn test_dictionary_nil_entry_dropped() {
        let ctx = Context::global();
        let dict = Dictionary::new();
        dict.insert("a", Value::Nil);
        dict.insert("b", Value::Bool(true));
        let pushed = ctx.push_variant(Value::Dictionary(dict)).unwrap();
        let table = pushed.as_table().unwrap();
        assert!(table.get("a").is_nil());
        assert!(!table.borrow().fields.contains_key("a"));

        let Value::Dictionary(back) = ctx.pull_variant(&pushed).unwrap() else {
            panic!("expected Dictionary")
        };
        assert_eq!(back.len(), 1);
        assert_eq!(back.get("a"), None);
        assert_eq!(back.get("b"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_guard_released_after_error() {
        let ctx = Context::global();
        let array = Array::new();
        array.push(Value::Array(array.clone()));
        assert!(ctx.push_variant(Value::Array(array)).is_err());
        assert!(!ctx.is_guarded());

        let shared = Array::from_vec(vec![Value::Int(1)]);
        let d = ctx.push_variant(Value::Array(shared.clone())).unwrap();
        assert!(d.as_table().is_some());
        assert!(ctx.push_variant(Value::Array(shared)).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        use crate::config::Limits;

        let ctx = Context::global().with_limits(Limits {
            max_depth: 3,
            ..Limits::default()
        });
        let mut value = Value::Array(Array::new());
        for _ in 0..3 {
            value = Value::Array(Array::from_vec(vec![value]));
        }
        let err = ctx.push_variant(value).unwrap_err();
        assert_eq!(err.root_cause(), &ReflectError::DepthExceeded(3));
    }

    #[test]
    fn test_optional_conversions() {
        let ctx = Context::global();
        let some = Value::Optional(Optional::some(Value::Double(2.0)));
        let d = ctx.push_variant(some.clone()).unwrap();
        assert_eq!(d.as_number(), Some(2.0));
        let Value::Optional(pulled) = ctx.pull("Optional", &d).unwrap() else {
            panic!("expected Optional")
        };
        assert_eq!(pulled.into_value(), Some(Value::Double(2.0)));
        assert!(ctx.push_variant(Value::Optional(Optional::none("int"))).unwrap().is_nil());
    }

    #[test]
    fn test_optional_slot_keeps_inner_type() {
        let ctx = Context::global();
        let mut slot = Value::Optional(Optional::none("int"));
        ctx.assign(&mut slot, Value::Int(3)).unwrap();
        assert_eq!(
            slot,
            Value::Optional(Optional {
                inner: "int".into(),
                value: Some(Box::new(Value::Int(3))),
            })
        );
        assert!(ctx.assign(&mut slot, Value::from("no")).is_err());
        ctx.assign(&mut slot, Value::Nil).unwrap();
        assert_eq!(slot, Value::Optional(Optional::none("int")));
    }

    #[test]
    fn test_tuple_path() {
        let ctx = Context::global();
        let values = ctx
            .push_tuple(Tuple(vec![Value::Int(1), Value::Nil, Value::from("z")]))
            .unwrap();
        assert_eq!(values.len(), 3);
        let tuple = ctx.pull_tuple(&values).unwrap();
        assert_eq!(tuple.0[0], Value::Double(1.0));
        assert_eq!(tuple.0[2], Value::from("z"));
    }

    #[test]
    #[should_panic(expected = "push_tuple")]
    fn test_direct_tuple_push_panics() {
        let ctx = Context::global();
        let _ = ctx.push_variant(Value::Tuple(Tuple(vec![])));
    }
}
