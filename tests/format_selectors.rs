use typebridge::format::{resolve, serialize};
use typebridge::{Context, Dynamic, Format, Formats, Limits, ReflectError, Registry, Table};
use typebridge_types::{Array, FormatSelector, Value};

fn selector_table(fields: Vec<(&str, Dynamic)>) -> Dynamic {
    Dynamic::Table(Table::from_fields(fields))
}

fn tagged() -> Format {
    Format {
        options: &[("Meta", &["Variant"]), ("Level", &["int"])],
        ..Format::new("tagged")
    }
}

fn lenient() -> Format {
    Format {
        allow_extra: true,
        ..Format::new("lenient")
    }
}

fn custom_formats() -> Formats {
    Formats::builder()
        .register(tagged)
        .register(lenient)
        .build()
        .expect("build formats")
}

#[test]
fn scenario_b_bare_format_name() {
    let ctx = Context::global();
    let selector = resolve(&ctx, &Dynamic::from("json")).expect("resolve");
    assert_eq!(selector, FormatSelector::new("json"));
    assert!(selector.options.is_empty());
}

#[test]
fn table_selector_with_options() {
    let ctx = Context::global();
    let selector = resolve(
        &ctx,
        &selector_table(vec![
            ("Format", Dynamic::from("csv")),
            ("Delimiter", Dynamic::from(";")),
            ("Header", Dynamic::Bool(true)),
        ]),
    )
    .expect("resolve");
    assert_eq!(selector.format, "csv");
    assert_eq!(selector.option("Delimiter"), Some(&Value::String(";".into())));
    assert_eq!(selector.option("Header"), Some(&Value::Bool(true)));
}

#[test]
fn option_type_error_names_field_and_format() {
    let ctx = Context::global();
    let err = resolve(
        &ctx,
        &selector_table(vec![
            ("Format", Dynamic::from("csv")),
            ("Delimiter", Dynamic::Number(9.0)),
        ]),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "field Delimiter for format csv: expected string, got number"
    );
}

#[test]
fn missing_format_field() {
    let ctx = Context::global();
    let err = resolve(&ctx, &selector_table(vec![("Header", Dynamic::Bool(true))])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "field Format for FormatSelector: expected string, got nil"
    );
}

#[test]
fn unknown_format_and_option() {
    let ctx = Context::global();
    assert_eq!(
        resolve(&ctx, &Dynamic::from("xml")).unwrap_err(),
        ReflectError::UnknownFormat("xml".into())
    );

    let err = resolve(
        &ctx,
        &selector_table(vec![
            ("Format", Dynamic::from("json")),
            ("Indent", Dynamic::Number(2.0)),
        ]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ReflectError::UnknownOption {
            option: "Indent".into(),
            format: "json".into(),
        }
    );
}

#[test]
fn extra_options_ignored_when_allowed() {
    let formats = custom_formats();
    let ctx = Context::new(Registry::global(), &formats);
    let selector = resolve(
        &ctx,
        &selector_table(vec![
            ("Format", Dynamic::from("lenient")),
            ("Anything", Dynamic::Bool(true)),
        ]),
    )
    .expect("resolve");
    assert!(selector.options.is_empty());

    let limits = Limits {
        allow_extra_options: true,
        ..Limits::default()
    };
    let ctx = Context::global().with_limits(limits);
    let selector = resolve(
        &ctx,
        &selector_table(vec![
            ("Format", Dynamic::from("json")),
            ("Indent", Dynamic::Number(2.0)),
        ]),
    )
    .expect("resolve");
    assert_eq!(selector, FormatSelector::new("json"));
}

#[test]
fn restricted_option_coerces() {
    let formats = custom_formats();
    let ctx = Context::new(Registry::global(), &formats);
    let selector = resolve(
        &ctx,
        &selector_table(vec![
            ("Format", Dynamic::from("tagged")),
            ("Level", Dynamic::Number(3.0)),
        ]),
    )
    .expect("resolve");
    assert_eq!(selector.option("Level"), Some(&Value::Int(3)));
}

#[test]
fn selector_containing_itself() {
    let formats = custom_formats();
    let ctx = Context::new(Registry::global(), &formats);
    let table = Table::new();
    table.set("Format", Dynamic::from("tagged"));
    table.set("Meta", Dynamic::Table(table.clone()));

    let err = resolve(&ctx, &Dynamic::Table(table)).unwrap_err();
    assert!(matches!(err.root_cause(), ReflectError::CyclicStructure(_)));
    assert!(err.to_string().starts_with("field Meta for format tagged: "));
    assert!(!ctx.is_guarded());
}

#[test]
fn serialize_checks_option_types() {
    let ctx = Context::global();
    let bad = FormatSelector::new("csv").with_option("Header", "yes");
    assert_eq!(
        serialize(&ctx, &bad).unwrap_err().to_string(),
        "field Header for format csv: expected bool, got string"
    );

    let unknown = FormatSelector::new("txt").with_option("Encoding", "latin1");
    assert!(matches!(
        serialize(&ctx, &unknown),
        Err(ReflectError::UnknownOption { .. })
    ));
}

#[test]
fn csv_encode_and_decode_under_selector() {
    let ctx = Context::global();
    let selector = resolve(
        &ctx,
        &selector_table(vec![
            ("Format", Dynamic::from("csv")),
            ("Delimiter", Dynamic::from(";")),
        ]),
    )
    .expect("resolve");
    let format = ctx.formats().get(&selector.format).expect("format");

    let rows = Value::Array(Array::from_vec(vec![
        Value::Array(Array::from_vec(vec![Value::from("a"), Value::from("b;c")])),
        Value::Array(Array::from_vec(vec![Value::from("1"), Value::from("2")])),
    ]));
    let bytes = format.encode(&ctx, &selector, &rows).expect("encode");
    assert_eq!(String::from_utf8(bytes.clone()).expect("utf8"), "a;\"b;c\"\n1;2\n");

    let decoded = format.decode(&ctx, &selector, &bytes).expect("decode");
    assert_eq!(decoded, rows);
}

#[test]
fn json_decode_under_bare_selector() {
    let ctx = Context::global();
    let selector = resolve(&ctx, &Dynamic::from("json")).expect("resolve");
    let format = ctx.formats().get(&selector.format).expect("format");
    let value = format
        .decode(&ctx, &selector, br#"{"ids": [1, 2], "ok": true}"#)
        .expect("decode");
    let Value::Dictionary(dict) = value else {
        panic!("expected a Dictionary");
    };
    assert_eq!(dict.get("ok"), Some(Value::Bool(true)));
    assert_eq!(
        dict.get("ids"),
        Some(Value::Array(Array::from_vec(vec![
            Value::Double(1.0),
            Value::Double(2.0)
        ])))
    );
}
