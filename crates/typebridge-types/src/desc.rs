//! File-format descriptors.
//!
//! Descriptors describe the classes, properties and enums that a file format
//! understands. Each descriptor can be flattened into a [`DescFields`]
//! dictionary, which is what diff/patch tooling operates on.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Reference to a value type by category and name, e.g. `Class:Part`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeDesc {
    pub category: String,
    pub name: String,
}

impl TypeDesc {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassDesc {
    pub name: String,
    pub superclass: String,
    pub memory_category: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyDesc {
    pub name: String,
    pub value_type: TypeDesc,
    pub category: String,
    pub read_security: String,
    pub write_security: String,
    pub can_load: bool,
    pub can_save: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumDesc {
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumItemDesc {
    pub name: String,
    pub value: i32,
    pub index: i32,
    pub tags: Vec<String>,
}

/// Flattened field dictionary of a descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescFields(pub BTreeMap<String, Value>);

impl DescFields {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }
}

fn tags_value(tags: &[String]) -> Value {
    Value::Array(
        tags.iter()
            .map(|t| Value::String(t.clone()))
            .collect::<Vec<_>>()
            .into(),
    )
}

/// Conversion between a descriptor and its field dictionary.
///
/// `set_fields` only touches fields present in the dictionary; it reports
/// the name of the first field whose value has the wrong type.
pub trait Fields {
    fn fields(&self) -> DescFields;
    fn set_fields(&mut self, fields: &DescFields) -> Result<(), FieldTypeError>;
}

/// A field in a [`DescFields`] dictionary held the wrong type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeError {
    pub field: String,
    pub expected: &'static str,
    pub got: &'static str,
}

impl std::fmt::Display for FieldTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "field {}: expected {}, got {}",
            self.field, self.expected, self.got
        )
    }
}

impl std::error::Error for FieldTypeError {}

fn field_string(fields: &DescFields, name: &str, slot: &mut String) -> Result<(), FieldTypeError> {
    match fields.get(name) {
        None => Ok(()),
        Some(v) => match v.as_str() {
            Some(s) => {
                *slot = s.to_string();
                Ok(())
            }
            None => Err(FieldTypeError {
                field: name.to_string(),
                expected: "string",
                got: v.type_name(),
            }),
        },
    }
}

fn field_bool(fields: &DescFields, name: &str, slot: &mut bool) -> Result<(), FieldTypeError> {
    match fields.get(name) {
        None => Ok(()),
        Some(Value::Bool(b)) => {
            *slot = *b;
            Ok(())
        }
        Some(v) => Err(FieldTypeError {
            field: name.to_string(),
            expected: "bool",
            got: v.type_name(),
        }),
    }
}

fn field_int(fields: &DescFields, name: &str, slot: &mut i32) -> Result<(), FieldTypeError> {
    match fields.get(name) {
        None => Ok(()),
        Some(v) => match v.as_f64() {
            Some(n) if n.fract() == 0.0 => {
                *slot = n as i32;
                Ok(())
            }
            _ => Err(FieldTypeError {
                field: name.to_string(),
                expected: "int",
                got: v.type_name(),
            }),
        },
    }
}

fn field_tags(fields: &DescFields, slot: &mut Vec<String>) -> Result<(), FieldTypeError> {
    let Some(v) = fields.get("Tags") else {
        return Ok(());
    };
    let Value::Array(items) = v else {
        return Err(FieldTypeError {
            field: "Tags".to_string(),
            expected: "Array",
            got: v.type_name(),
        });
    };
    let mut tags = Vec::with_capacity(items.len());
    for item in items.borrow().iter() {
        match item.as_str() {
            Some(s) => tags.push(s.to_string()),
            None => {
                return Err(FieldTypeError {
                    field: "Tags".to_string(),
                    expected: "string",
                    got: item.type_name(),
                })
            }
        }
    }
    *slot = tags;
    Ok(())
}

impl Fields for ClassDesc {
    fn fields(&self) -> DescFields {
        let mut f = DescFields::default();
        f.insert("Name", self.name.as_str());
        f.insert("Superclass", self.superclass.as_str());
        f.insert("MemoryCategory", self.memory_category.as_str());
        f.0.insert("Tags".to_string(), tags_value(&self.tags));
        f
    }

    fn set_fields(&mut self, fields: &DescFields) -> Result<(), FieldTypeError> {
        field_string(fields, "Name", &mut self.name)?;
        field_string(fields, "Superclass", &mut self.superclass)?;
        field_string(fields, "MemoryCategory", &mut self.memory_category)?;
        field_tags(fields, &mut self.tags)
    }
}

impl Fields for PropertyDesc {
    fn fields(&self) -> DescFields {
        let mut f = DescFields::default();
        f.insert("Name", self.name.as_str());
        f.insert("ValueTypeCategory", self.value_type.category.as_str());
        f.insert("ValueTypeName", self.value_type.name.as_str());
        f.insert("Category", self.category.as_str());
        f.insert("ReadSecurity", self.read_security.as_str());
        f.insert("WriteSecurity", self.write_security.as_str());
        f.insert("CanLoad", self.can_load);
        f.insert("CanSave", self.can_save);
        f.0.insert("Tags".to_string(), tags_value(&self.tags));
        f
    }

    fn set_fields(&mut self, fields: &DescFields) -> Result<(), FieldTypeError> {
        field_string(fields, "Name", &mut self.name)?;
        field_string(fields, "ValueTypeCategory", &mut self.value_type.category)?;
        field_string(fields, "ValueTypeName", &mut self.value_type.name)?;
        field_string(fields, "Category", &mut self.category)?;
        field_string(fields, "ReadSecurity", &mut self.read_security)?;
        field_string(fields, "WriteSecurity", &mut self.write_security)?;
        field_bool(fields, "CanLoad", &mut self.can_load)?;
        field_bool(fields, "CanSave", &mut self.can_save)?;
        field_tags(fields, &mut self.tags)
    }
}

impl Fields for EnumDesc {
    fn fields(&self) -> DescFields {
        let mut f = DescFields::default();
        f.insert("Name", self.name.as_str());
        f.0.insert("Tags".to_string(), tags_value(&self.tags));
        f
    }

    fn set_fields(&mut self, fields: &DescFields) -> Result<(), FieldTypeError> {
        field_string(fields, "Name", &mut self.name)?;
        field_tags(fields, &mut self.tags)
    }
}

impl Fields for EnumItemDesc {
    fn fields(&self) -> DescFields {
        let mut f = DescFields::default();
        f.insert("Name", self.name.as_str());
        f.insert("Value", self.value);
        f.insert("Index", self.index);
        f.0.insert("Tags".to_string(), tags_value(&self.tags));
        f
    }

    fn set_fields(&mut self, fields: &DescFields) -> Result<(), FieldTypeError> {
        field_string(fields, "Name", &mut self.name)?;
        field_int(fields, "Value", &mut self.value)?;
        field_int(fields, "Index", &mut self.index)?;
        field_tags(fields, &mut self.tags)
    }
}
