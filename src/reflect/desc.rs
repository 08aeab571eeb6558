//! File-format descriptors and their field dictionaries.

use typebridge_types::{
    ClassDesc, ConversionError, DescFields, Dictionary, DomainType, EnumDesc, EnumItemDesc,
    Fields, PropertyDesc, Value,
};

use crate::dump::{FunctionSchema, TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Args, Context, Property, Reflector, Registration};
use crate::error::{ReflectError, Result};

use super::containers::pull_dictionary;
use super::{cast, eq_by_value, eq_schema, tostring_schema, userdata, userdata_reflector};

/// Read-write string property backed by a descriptor field.
macro_rules! text {
    ($ty:ty, $($path:ident).+) => {
        Property::read_write(
            |_, v| Ok(Dynamic::string(&cast::<$ty>(v)?.$($path).+)),
            |_, slot, d| {
                let text = d
                    .as_str()
                    .ok_or_else(|| ReflectError::mismatch("string", d.type_of()))?;
                let mut desc = cast::<$ty>(slot)?;
                desc.$($path).+ = text.to_string();
                *slot = desc.into();
                Ok(())
            },
            || TypeRef::String,
        )
    };
}

macro_rules! flag {
    ($ty:ty, $field:ident) => {
        Property::read_write(
            |_, v| Ok(Dynamic::Bool(cast::<$ty>(v)?.$field)),
            |_, slot, d| {
                let flag = d
                    .as_bool()
                    .ok_or_else(|| ReflectError::mismatch("boolean", d.type_of()))?;
                let mut desc = cast::<$ty>(slot)?;
                desc.$field = flag;
                *slot = desc.into();
                Ok(())
            },
            || TypeRef::Bool,
        )
    };
}

macro_rules! integer {
    ($ty:ty, $field:ident) => {
        Property::read_write(
            |_, v| Ok(Dynamic::Number(cast::<$ty>(v)?.$field as f64)),
            |_, slot, d| {
                let n = d
                    .as_number()
                    .ok_or_else(|| ReflectError::mismatch("number", d.type_of()))?;
                let mut desc = cast::<$ty>(slot)?;
                desc.$field = n as i32;
                *slot = desc.into();
                Ok(())
            },
            || TypeRef::Number,
        )
    };
}

fn fields_ref() -> TypeRef {
    TypeRef::named(DescFields::TYPE_NAME)
}

/// `Fields()`: flatten the receiver into a field dictionary.
fn get_fields<T>(ctx: &Context<'_>, value: &mut Value, _: &[Dynamic]) -> Result<Vec<Dynamic>>
where
    T: Fields + TryFrom<Value, Error = ConversionError>,
{
    let fields = cast::<T>(value)?.fields();
    Ok(vec![ctx.push(DescFields::TYPE_NAME, Value::DescFields(fields))?])
}

/// `SetFields(table)`: overwrite the fields present in the table.
fn set_fields<T>(ctx: &Context<'_>, value: &mut Value, args: &[Dynamic]) -> Result<Vec<Dynamic>>
where
    T: DomainType + Fields + Into<Value> + TryFrom<Value, Error = ConversionError>,
{
    let function = format!("{}.SetFields", T::TYPE_NAME);
    let args = Args::new(&function, args);
    let fields = cast::<DescFields>(&args.pull(ctx, 0, &[DescFields::TYPE_NAME])?)?;
    let mut desc = cast::<T>(value)?;
    desc.set_fields(&fields)?;
    *value = desc.into();
    Ok(Vec::new())
}

fn fields_schema() -> FunctionSchema {
    FunctionSchema::new().returns(fields_ref())
}

fn set_fields_schema() -> FunctionSchema {
    FunctionSchema::new().param("fields", fields_ref())
}

fn name_constructor(type_name: &'static str) -> Vec<FunctionSchema> {
    vec![FunctionSchema::new()
        .param("name", TypeRef::optional(TypeRef::String))
        .returns(TypeRef::named(type_name))]
}

/// Optional first argument naming the descriptor.
fn name_arg(function: &str, args: &[Dynamic]) -> Result<String> {
    let args = Args::new(function, args);
    args.expect_count(&[0, 1])?;
    match args.get(0) {
        Dynamic::Nil => Ok(String::new()),
        _ => args.string(0),
    }
}

fn class_desc() -> Reflector {
    userdata_reflector::<ClassDesc>()
        .property("Name", text!(ClassDesc, name))
        .property("Superclass", text!(ClassDesc, superclass))
        .property("MemoryCategory", text!(ClassDesc, memory_category))
        .method("Fields", get_fields::<ClassDesc>, fields_schema)
        .method("SetFields", set_fields::<ClassDesc>, set_fields_schema)
        .constructor(
            "new",
            |_, args| {
                let name = name_arg("ClassDesc.new", args)?;
                Ok(vec![userdata(ClassDesc {
                    name,
                    ..ClassDesc::default()
                })])
            },
            || name_constructor("ClassDesc"),
        )
        .operator("__eq", eq_by_value::<ClassDesc>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| Ok(Dynamic::string(super::from_userdata::<ClassDesc>(v)?.name)),
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("ClassDesc")
                .category("Descriptor")
                .summary("Describes a class known to a file format.")
        })
}

inventory::submit!(Registration(class_desc));

fn property_desc() -> Reflector {
    userdata_reflector::<PropertyDesc>()
        .property("Name", text!(PropertyDesc, name))
        .property("ValueTypeCategory", text!(PropertyDesc, value_type.category))
        .property("ValueTypeName", text!(PropertyDesc, value_type.name))
        .property("Category", text!(PropertyDesc, category))
        .property("ReadSecurity", text!(PropertyDesc, read_security))
        .property("WriteSecurity", text!(PropertyDesc, write_security))
        .property("CanLoad", flag!(PropertyDesc, can_load))
        .property("CanSave", flag!(PropertyDesc, can_save))
        .method("Fields", get_fields::<PropertyDesc>, fields_schema)
        .method("SetFields", set_fields::<PropertyDesc>, set_fields_schema)
        .constructor(
            "new",
            |_, args| {
                let name = name_arg("PropertyDesc.new", args)?;
                Ok(vec![userdata(PropertyDesc {
                    name,
                    ..PropertyDesc::default()
                })])
            },
            || name_constructor("PropertyDesc"),
        )
        .operator("__eq", eq_by_value::<PropertyDesc>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| Ok(Dynamic::string(super::from_userdata::<PropertyDesc>(v)?.name)),
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("PropertyDesc")
                .category("Descriptor")
                .summary("Describes a property of a class.")
        })
}

inventory::submit!(Registration(property_desc));

fn enum_desc() -> Reflector {
    userdata_reflector::<EnumDesc>()
        .property("Name", text!(EnumDesc, name))
        .method("Fields", get_fields::<EnumDesc>, fields_schema)
        .method("SetFields", set_fields::<EnumDesc>, set_fields_schema)
        .constructor(
            "new",
            |_, args| {
                let name = name_arg("EnumDesc.new", args)?;
                Ok(vec![userdata(EnumDesc {
                    name,
                    ..EnumDesc::default()
                })])
            },
            || name_constructor("EnumDesc"),
        )
        .operator("__eq", eq_by_value::<EnumDesc>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| Ok(Dynamic::string(super::from_userdata::<EnumDesc>(v)?.name)),
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("EnumDesc")
                .category("Descriptor")
                .summary("Describes an enum.")
        })
}

inventory::submit!(Registration(enum_desc));

fn enum_item_desc() -> Reflector {
    userdata_reflector::<EnumItemDesc>()
        .property("Name", text!(EnumItemDesc, name))
        .property("Value", integer!(EnumItemDesc, value))
        .property("Index", integer!(EnumItemDesc, index))
        .method("Fields", get_fields::<EnumItemDesc>, fields_schema)
        .method("SetFields", set_fields::<EnumItemDesc>, set_fields_schema)
        .constructor(
            "new",
            |_, args| {
                let name = name_arg("EnumItemDesc.new", args)?;
                Ok(vec![userdata(EnumItemDesc {
                    name,
                    ..EnumItemDesc::default()
                })])
            },
            || name_constructor("EnumItemDesc"),
        )
        .operator("__eq", eq_by_value::<EnumItemDesc>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| Ok(Dynamic::string(super::from_userdata::<EnumItemDesc>(v)?.name)),
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("EnumItemDesc")
                .category("Descriptor")
                .summary("Describes one item of an enum.")
        })
}

inventory::submit!(Registration(enum_item_desc));

/// Field dictionaries live in the runtime as plain tables.
fn desc_fields() -> Reflector {
    Reflector::new(DescFields::TYPE_NAME)
        .push(|ctx, v| {
            let fields = cast::<DescFields>(&v)?;
            ctx.push_variant(Value::Dictionary(Dictionary::from_map(fields.0)))
        })
        .pull(|ctx, d| {
            let map = cast::<Dictionary>(&pull_dictionary(ctx, d)?)?.to_map();
            Ok(Value::DescFields(DescFields(map)))
        })
        .set(super::set_exact)
        .with_dump(|| {
            TypeSchema::new(DescFields::TYPE_NAME)
                .category("Descriptor")
                .underlying(TypeRef::dictionary(TypeRef::Any))
                .summary("Flattened fields of a descriptor, keyed by field name.")
        })
}

inventory::submit!(Registration(desc_fields));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::Table;

    fn new_class(ctx: &Context<'_>, name: &str) -> Dynamic {
        ctx.construct("ClassDesc", "new", &[Dynamic::from(name)])
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_string_properties() {
        let ctx = Context::global();
        let class = new_class(&ctx, "Part");
        assert_eq!(ctx.get_property(&class, "Name").unwrap().as_str(), Some("Part"));

        ctx.set_property(&class, "Superclass", &Dynamic::from("BasePart"))
            .unwrap();
        let desc = super::super::from_userdata::<ClassDesc>(&class).unwrap();
        assert_eq!(desc.superclass, "BasePart");

        let err = ctx
            .set_property(&class, "Name", &Dynamic::Number(1.0))
            .unwrap_err();
        assert_eq!(err.to_string(), "expected string, got number");
    }

    #[test]
    fn test_fields_roundtrip() {
        let ctx = Context::global();
        let class = new_class(&ctx, "Part");
        let fields = ctx.call_method(&class, "Fields", &[]).unwrap().remove(0);
        let table = fields.as_table().unwrap();
        assert_eq!(table.get("Name").as_str(), Some("Part"));
        assert_eq!(table.get("Tags").as_table().map(Table::len), Some(0));

        let other = new_class(&ctx, "Model");
        ctx.call_method(&other, "SetFields", &[fields]).unwrap();
        assert!(ctx.equals(&class, &other).unwrap());
    }

    #[test]
    fn test_set_fields_reports_field() {
        let ctx = Context::global();
        let item = ctx
            .construct("EnumItemDesc", "new", &[Dynamic::from("Neon")])
            .unwrap()
            .remove(0);
        let patch = Table::from_fields([("Value", Dynamic::from("x"))]);
        let err = ctx
            .call_method(&item, "SetFields", &[Dynamic::Table(patch)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "field Value for DescFields: expected int, got string"
        );

        let patch = Table::from_fields([("Value", Dynamic::Number(288.0))]);
        ctx.call_method(&item, "SetFields", &[Dynamic::Table(patch)])
            .unwrap();
        assert_eq!(ctx.get_property(&item, "Value").unwrap().as_number(), Some(288.0));
        assert_eq!(ctx.get_property(&item, "Name").unwrap().as_str(), Some("Neon"));
    }

    #[test]
    fn test_set_fields_rejects_non_table() {
        let ctx = Context::global();
        let class = new_class(&ctx, "Part");
        let err = ctx
            .call_method(&class, "SetFields", &[Dynamic::Number(1.0)])
            .unwrap_err();
        assert!(matches!(err, ReflectError::Argument { position: 1, .. }));
    }
}
