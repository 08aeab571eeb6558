//! Script-style sessions driving userdata through the member tables.

use typebridge::reflect::from_userdata;
use typebridge::{Context, Dynamic, ReflectError, Table};
use typebridge_types::{CFrame, Cookie, HttpOptions, Value, Vector3};

fn num(n: f64) -> Dynamic {
    Dynamic::Number(n)
}

fn first(mut results: Vec<Dynamic>) -> Dynamic {
    assert_eq!(results.len(), 1);
    results.remove(0)
}

#[test]
fn cframe_moves_a_point() {
    let ctx = Context::global();
    let origin = first(ctx.construct("Vector3", "new", &[]).unwrap());
    let target = first(ctx.construct("Vector3", "new", &[num(0.0), num(0.0), num(-5.0)]).unwrap());
    let cf = first(ctx.construct("CFrame", "new", &[origin, target]).unwrap());

    let look = ctx.get_property(&cf, "LookVector").unwrap();
    let look = from_userdata::<Vector3>(&look).unwrap();
    assert!((look.z + 1.0).abs() < 1e-5);

    let offset = first(ctx.construct("Vector3", "new", &[num(0.0), num(2.0)]).unwrap());
    let moved = ctx.operate("__add", &cf, &offset).unwrap();
    assert_eq!(
        from_userdata::<CFrame>(&moved).unwrap().position,
        Vector3::new(0.0, 2.0, 0.0)
    );
    assert_eq!(ctx.tostring(&offset).unwrap(), "0, 2, 0");
}

#[test]
fn arithmetic_mixes_numbers_and_vectors() {
    let ctx = Context::global();
    let v = first(ctx.construct("Vector2", "new", &[num(3.0), num(4.0)]).unwrap());

    let doubled = ctx.operate("__mul", &num(2.0), &v).unwrap();
    assert_eq!(ctx.tostring(&doubled).unwrap(), "6, 8");

    let halved = ctx.operate("__div", &v, &num(2.0)).unwrap();
    assert_eq!(ctx.get_property(&halved, "X").unwrap().as_number(), Some(1.5));

    let negated = ctx.unary("__unm", &v).unwrap();
    assert_eq!(ctx.get_property(&negated, "Y").unwrap().as_number(), Some(-4.0));

    let err = ctx.operate("__mul", &v, &Dynamic::from("two")).unwrap_err();
    assert_eq!(err.to_string(), "attempt to perform __mul on string");
}

#[test]
fn equality_is_identity_then_value() {
    let ctx = Context::global();
    let a = first(ctx.construct("Vector3", "new", &[num(1.0)]).unwrap());
    let b = first(ctx.construct("Vector3", "new", &[num(1.0)]).unwrap());
    let c = first(ctx.construct("Vector2", "new", &[num(1.0)]).unwrap());

    assert!(ctx.equals(&a, &a.clone()).unwrap());
    assert!(ctx.equals(&a, &b).unwrap());
    assert!(!ctx.equals(&a, &c).unwrap());
    assert!(!ctx.equals(&a, &num(1.0)).unwrap());
}

#[test]
fn property_writes_are_shared_between_handles() {
    let ctx = Context::global();
    let cookie = first(
        ctx.construct("Cookie", "new", &[Dynamic::from("session"), Dynamic::from("abc")])
            .unwrap(),
    );
    let alias = cookie.clone();

    ctx.set_property(&alias, "Value", &Dynamic::from("xyz")).unwrap();
    ctx.set_property(&alias, "Domain", &Dynamic::from("example.com")).unwrap();
    assert_eq!(ctx.tostring(&cookie).unwrap(), "session=xyz");
    assert_eq!(
        ctx.get_property(&cookie, "Domain").unwrap().as_str(),
        Some("example.com")
    );

    ctx.set_property(&cookie, "Domain", &Dynamic::Nil).unwrap();
    assert!(ctx.get_property(&alias, "Domain").unwrap().is_nil());
}

#[test]
fn constructed_userdata_flows_into_records() {
    let ctx = Context::global();
    let cookie = first(
        ctx.construct("Cookie", "new", &[Dynamic::from("id"), Dynamic::from("7")])
            .unwrap(),
    );
    let options = Table::from_fields([
        ("URL", Dynamic::from("https://example.com/api")),
        ("Method", Dynamic::from("POST")),
        ("Cookies", Dynamic::Table(Table::from_seq(vec![cookie]))),
        ("ResponseFormat", Dynamic::from("json")),
    ]);

    let value = ctx.pull("HttpOptions", &Dynamic::Table(options)).unwrap();
    let Value::HttpOptions(options) = value else {
        panic!("expected HttpOptions");
    };
    assert_eq!(options.method, "POST");
    assert_eq!(
        options.cookies.map(|c| c.0),
        Some(vec![Cookie::new("id", "7")])
    );
    assert_eq!(
        options.response_format.map(|s| s.format),
        Some("json".to_string())
    );
}

#[test]
fn record_rejects_wrong_userdata_in_list() {
    let ctx = Context::global();
    let stray = first(ctx.construct("Vector3", "new", &[]).unwrap());
    let options = Table::from_fields([
        ("URL", Dynamic::from("https://example.com")),
        ("Cookies", Dynamic::Table(Table::from_seq(vec![stray]))),
    ]);
    let err = ctx.pull("HttpOptions", &Dynamic::Table(options)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "field Cookies for HttpOptions: index 1: expected Cookie, got Vector3"
    );
    assert!(!ctx.is_guarded());
}

#[test]
fn pushed_options_read_back_as_a_table() {
    let ctx = Context::global();
    let pushed = ctx
        .push_variant(Value::HttpOptions(HttpOptions::get("https://example.com")))
        .unwrap();
    let table = pushed.as_table().unwrap();
    assert_eq!(table.get("Method").as_str(), Some("GET"));
    assert!(table.get("Headers").is_nil());
    assert!(table.get("Body").is_nil());
}

#[test]
fn member_lookup_errors() {
    let ctx = Context::global();
    let v = first(ctx.construct("Vector3", "new", &[]).unwrap());

    assert_eq!(
        ctx.get_property(&v, "W").unwrap_err(),
        ReflectError::UnknownMember {
            type_name: "Vector3".into(),
            member: "W".into(),
        }
    );
    assert!(matches!(
        ctx.set_property(&v, "X", &num(1.0)),
        Err(ReflectError::ReadOnly { .. })
    ));
    assert!(matches!(
        ctx.call_method(&num(1.0), "Dot", &[]),
        Err(ReflectError::UnsupportedOperator { .. })
    ));
    assert_eq!(
        ctx.construct("Part", "new", &[]).unwrap_err(),
        ReflectError::UnknownType("Part".into())
    );
    assert_eq!(
        ctx.call_method(&v, "Dot", &[]).unwrap_err().to_string(),
        "bad argument #1 to Vector3.Dot: expected Vector3, got nil"
    );
}
