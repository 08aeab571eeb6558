use typebridge::reflect::containers::{pull_array, push_array};
use typebridge::{Context, Dynamic, Formats, ReflectError, Reflector, Registry, Table};
use typebridge_types::{
    Array, CFrame, Color3, Dictionary, Optional, Value, Vector2int16, Vector3,
};

fn bool_reflector() -> Reflector {
    Reflector::new("bool")
        .push(|_, v| match v {
            Value::Bool(b) => Ok(Dynamic::Bool(b)),
            other => Err(ReflectError::mismatch("bool", other.type_name())),
        })
        .pull(|_, d| d.as_bool().map(Value::Bool).ok_or_else(|| ReflectError::mismatch("bool", d.type_of())))
}

fn string_reflector() -> Reflector {
    Reflector::new("string")
        .push(|_, v| match v {
            Value::String(s) => Ok(Dynamic::string(s)),
            other => Err(ReflectError::mismatch("string", other.type_name())),
        })
        .pull(|_, d| {
            d.as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| ReflectError::mismatch("string", d.type_of()))
        })
}

fn array_reflector() -> Reflector {
    Reflector::new("Array").push(push_array).pull(pull_array)
}

#[test]
fn scenario_a_minimal_registry() {
    let registry = Registry::builder()
        .register(bool_reflector)
        .register(string_reflector)
        .register(array_reflector)
        .build()
        .expect("build registry");
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Array", "bool", "string"]);

    let ctx = Context::new(&registry, Formats::global());
    let value = Value::Array(Array::from_vec(vec![
        Value::Bool(true),
        Value::String("hello".into()),
        Value::Array(Array::from_vec(vec![Value::Bool(false)])),
    ]));

    let pushed = ctx.push("Array", value.clone()).expect("push");
    let table = pushed.as_table().expect("table");
    assert_eq!(table.len(), 3);
    assert_eq!(table.index(2).as_str(), Some("hello"));

    let pulled = ctx.pull("Array", &pushed).expect("pull");
    assert_eq!(pulled, value);

    // Geometry is not registered here.
    let err = ctx
        .push_variant(Value::Vector3(Vector3::new(1.0, 2.0, 3.0)))
        .unwrap_err();
    assert_eq!(err, ReflectError::UnknownType("Vector3".into()));
}

#[test]
fn scenario_c_array_containing_itself() {
    let ctx = Context::global();
    let array = Array::new();
    array.push(Value::Array(array.clone()));

    let err = ctx.push_variant(Value::Array(array)).unwrap_err();
    assert!(matches!(err.root_cause(), ReflectError::CyclicStructure(_)));
    assert!(!ctx.is_guarded());

    let table = Table::new();
    table.push(Dynamic::Table(table.clone()));
    let err = ctx.pull_variant(&Dynamic::Table(table)).unwrap_err();
    assert!(matches!(err.root_cause(), ReflectError::CyclicStructure(_)));
}

#[test]
fn dictionary_containing_itself() {
    let ctx = Context::global();
    let dict = Dictionary::new();
    dict.insert("self", Value::Dictionary(dict.clone()));

    let err = ctx.push_variant(Value::Dictionary(dict)).unwrap_err();
    assert_eq!(err.to_string(), "key self: Dictionary is cyclic");
}

#[test]
fn roundtrip_userdata_types() {
    let ctx = Context::global();
    let values = vec![
        Value::Vector3(Vector3::new(1.0, -2.0, 3.5)),
        Value::Vector2int16(Vector2int16::new(-4, 9)),
        Value::CFrame(CFrame::look_at(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0))),
        Value::Color3(Color3::from_rgb(10, 20, 30)),
    ];

    for value in values {
        let pushed = ctx.push_variant(value.clone()).expect("push");
        assert_eq!(pushed.type_of(), value.type_name());
        assert_eq!(ctx.pull_variant(&pushed).expect("pull"), value);
    }
}

#[test]
fn roundtrip_nested_containers() {
    let ctx = Context::global();
    let inner = Dictionary::new();
    inner.insert("position", Value::Vector3(Vector3::new(0.0, 5.0, 0.0)));
    inner.insert("name", Value::String("spawn".into()));
    let value = Value::Array(Array::from_vec(vec![
        Value::Dictionary(inner),
        Value::Double(4.5),
        Value::Bool(false),
    ]));

    let pushed = ctx.push_variant(value.clone()).expect("push");
    assert_eq!(ctx.pull_variant(&pushed).expect("pull"), value);
}

#[test]
fn empty_table_defaults_to_array() {
    let ctx = Context::global();
    let pulled = ctx.pull_variant(&Dynamic::Table(Table::new())).expect("pull");
    assert_eq!(pulled, Value::Array(Array::new()));
}

#[test]
fn mixed_table_is_rejected() {
    let ctx = Context::global();
    let table = Table::from_seq(vec![Dynamic::Bool(true)]);
    table.set("name", Dynamic::from("x"));
    let err = ctx.pull_variant(&Dynamic::Table(table)).unwrap_err();
    assert!(matches!(err.root_cause(), ReflectError::TypeMismatch { .. }));
}

#[test]
fn unknown_userdata_tag() {
    let ctx = Context::global();
    let odd = Dynamic::UserData(typebridge::UserData::new("Instance", Value::Nil));
    assert_eq!(
        ctx.pull_variant(&odd).unwrap_err(),
        ReflectError::UnknownType("Instance".into())
    );
}

#[test]
fn optional_through_restricted_pull() {
    let ctx = Context::global();
    let pulled = ctx
        .pull_any_of(&Dynamic::Number(3.0), &["Optional"])
        .expect("pull");
    assert_eq!(pulled, Value::Optional(Optional::some(Value::Double(3.0))));
}

#[test]
fn tuple_multi_value_path() {
    let ctx = Context::global();
    let tuple = typebridge_types::Tuple(vec![Value::Bool(true), Value::Int(2)]);
    let pushed = ctx.push_tuple(tuple).expect("push");
    assert_eq!(pushed.len(), 2);
    let pulled = ctx.pull_tuple(&pushed).expect("pull");
    assert_eq!(pulled.0, vec![Value::Bool(true), Value::Double(2.0)]);
}
