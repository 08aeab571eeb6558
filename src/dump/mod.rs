//! Schema metadata for reflectors.
//!
//! A [`TypeSchema`] is a descriptive, serializable picture of one reflector:
//! what it looks like underneath, which members and operators it exposes,
//! and which constructors build it. Schemas feed documentation output and
//! are never converted back into reflectors.

mod hash;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use hash::{SchemaHash, SchemaHasher};

/// Reference to a type inside a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Any,
    Nil,
    Bool,
    Number,
    String,
    /// A registered type, by name.
    Named { name: String },
    Array { element: Box<TypeRef> },
    Dictionary { value: Box<TypeRef> },
    Optional { inner: Box<TypeRef> },
    /// Any one of several types.
    Or { options: Vec<TypeRef> },
    /// A table with known fields.
    Struct { fields: Vec<FieldSchema> },
    Tuple { elements: Vec<TypeRef> },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named { name: name.into() }
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
        }
    }

    pub fn dictionary(value: TypeRef) -> Self {
        TypeRef::Dictionary {
            value: Box::new(value),
        }
    }

    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn or(options: impl IntoIterator<Item = TypeRef>) -> Self {
        TypeRef::Or {
            options: options.into_iter().collect(),
        }
    }

    pub fn structure(fields: impl IntoIterator<Item = FieldSchema>) -> Self {
        TypeRef::Struct {
            fields: fields.into_iter().collect(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Any => write!(f, "any"),
            TypeRef::Nil => write!(f, "nil"),
            TypeRef::Bool => write!(f, "boolean"),
            TypeRef::Number => write!(f, "number"),
            TypeRef::String => write!(f, "string"),
            TypeRef::Named { name } => write!(f, "{name}"),
            TypeRef::Array { element } => write!(f, "{{{element}}}"),
            TypeRef::Dictionary { value } => write!(f, "{{[string]: {value}}}"),
            TypeRef::Optional { inner } => write!(f, "{inner}?"),
            TypeRef::Or { options } => {
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{option}")?;
                }
                Ok(())
            }
            TypeRef::Struct { fields } => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", field.name, field.ty)?;
                }
                write!(f, " }}")
            }
            TypeRef::Tuple { elements } => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub ty: TypeRef,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub name: String,
    pub ty: TypeRef,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSchema {
    pub name: String,
    pub ty: TypeRef,
}

/// Signature of a method or one constructor overload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub params: Vec<ParamSchema>,
    pub returns: Vec<TypeRef>,
}

impl FunctionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ParamSchema {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns.push(ty);
        self
    }
}

impl fmt::Display for FunctionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", p.name, p.ty)?;
        }
        write!(f, ")")?;
        match self.returns.as_slice() {
            [] => Ok(()),
            [one] => write!(f, ": {one}"),
            many => {
                write!(f, ": (")?;
                for (i, r) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{r}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSchema {
    pub name: String,
    pub overloads: Vec<FunctionSchema>,
}

/// An operator entry. `operand` is absent for unary operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSchema {
    pub op: String,
    pub operand: Option<TypeRef>,
    pub result: TypeRef,
}

impl OperatorSchema {
    pub fn binary(operand: TypeRef, result: TypeRef) -> Self {
        Self {
            op: String::new(),
            operand: Some(operand),
            result,
        }
    }

    pub fn unary(result: TypeRef) -> Self {
        Self {
            op: String::new(),
            operand: None,
            result,
        }
    }
}

/// Descriptive shape of one reflector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub name: String,
    pub category: String,
    /// What the value looks like on the dynamic side, for types that are
    /// not userdata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying: Option<TypeRef>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<OperatorSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<FunctionSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorSchema>,
}

impl TypeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn underlying(mut self, ty: TypeRef) -> Self {
        self.underlying = Some(ty);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Multi-line text rendering used by the documentation tool.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        if !self.category.is_empty() {
            out.push_str(&format!(" [{}]", self.category));
        }
        if let Some(ty) = &self.underlying {
            out.push_str(&format!(" = {ty}"));
        }
        out.push('\n');
        if !self.summary.is_empty() {
            out.push_str(&format!("  {}\n", self.summary));
        }
        for ctor in &self.constructors {
            for overload in &ctor.overloads {
                out.push_str(&format!("  {}.{}\n", self.name, overload));
            }
        }
        for prop in &self.properties {
            let access = if prop.read_only { " (read-only)" } else { "" };
            out.push_str(&format!("  .{}: {}{}\n", prop.name, prop.ty, access));
        }
        for method in &self.methods {
            out.push_str(&format!("  :{}\n", method));
        }
        for op in &self.operators {
            match &op.operand {
                Some(rhs) => out.push_str(&format!("  {} {}: {}\n", op.op, rhs, op.result)),
                None => out.push_str(&format!("  {}: {}\n", op.op, op.result)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typeref_display() {
        let ty = TypeRef::optional(TypeRef::or([
            TypeRef::String,
            TypeRef::array(TypeRef::named("Cookie")),
        ]));
        assert_eq!(ty.to_string(), "string | {Cookie}?");

        let record = TypeRef::structure([
            FieldSchema::new("URL", TypeRef::String),
            FieldSchema::new("Body", TypeRef::optional(TypeRef::Any)),
        ]);
        assert_eq!(record.to_string(), "{ URL: string, Body: any? }");
    }

    #[test]
    fn test_function_display() {
        let mut f = FunctionSchema::new()
            .param("x", TypeRef::Number)
            .param("y", TypeRef::Number)
            .returns(TypeRef::named("Vector2"));
        f.name = "new".into();
        assert_eq!(f.to_string(), "new(x: number, y: number): Vector2");
    }

    #[test]
    fn test_schema_serializes_without_empty_tables() {
        let schema = TypeSchema::new("bool").category("Primitive").underlying(TypeRef::Bool);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["underlying"]["kind"], "bool");
        assert!(json.get("methods").is_none());
    }
}
