use typebridge_types::{Vector2, Vector2int16, Vector3, Vector3int16};

use crate::dump::{FunctionSchema, TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Args, Context, Property, Reflector, Registration};
use crate::error::Result;
use crate::reflect::{
    cast, eq_by_value, eq_schema, from_userdata, number, tostring_schema, userdata,
    userdata_reflector,
};

use super::{add, div, mul, negated, same_type, scaled, sub, unm};

fn vector2() -> Reflector {
    userdata_reflector::<Vector2>()
        .property(
            "X",
            Property::read_only(|_, v| Ok(number(cast::<Vector2>(v)?.x)), || TypeRef::Number),
        )
        .property(
            "Y",
            Property::read_only(|_, v| Ok(number(cast::<Vector2>(v)?.y)), || TypeRef::Number),
        )
        .property(
            "Magnitude",
            Property::read_only(
                |_, v| Ok(number(cast::<Vector2>(v)?.magnitude())),
                || TypeRef::Number,
            ),
        )
        .property(
            "Unit",
            Property::read_only(
                |_, v| Ok(userdata(cast::<Vector2>(v)?.unit())),
                || TypeRef::named("Vector2"),
            ),
        )
        .method(
            "Dot",
            |_, v, args| {
                let other = Args::new("Vector2.Dot", args).userdata::<Vector2>(0)?;
                Ok(vec![number(cast::<Vector2>(v)?.dot(other))])
            },
            || {
                FunctionSchema::new()
                    .param("other", TypeRef::named("Vector2"))
                    .returns(TypeRef::Number)
            },
        )
        .method(
            "Lerp",
            |_, v, args| {
                let args = Args::new("Vector2.Lerp", args);
                let goal = args.userdata::<Vector2>(0)?;
                let alpha = args.float(1)?;
                Ok(vec![userdata(cast::<Vector2>(v)?.lerp(goal, alpha))])
            },
            || {
                FunctionSchema::new()
                    .param("goal", TypeRef::named("Vector2"))
                    .param("alpha", TypeRef::Number)
                    .returns(TypeRef::named("Vector2"))
            },
        )
        .constructor("new", new_vector2, || {
            vec![FunctionSchema::new()
                .param("x", TypeRef::optional(TypeRef::Number))
                .param("y", TypeRef::optional(TypeRef::Number))
                .returns(TypeRef::named("Vector2"))]
        })
        .operator("__add", add::<Vector2>, || same_type("Vector2"))
        .operator("__sub", sub::<Vector2>, || same_type("Vector2"))
        .operator("__mul", mul::<Vector2>, || scaled("Vector2"))
        .operator("__div", div::<Vector2>, || scaled("Vector2"))
        .operator("__unm", unm::<Vector2>, || negated("Vector2"))
        .operator("__eq", eq_by_value::<Vector2>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let p = from_userdata::<Vector2>(v)?;
                Ok(Dynamic::string(format!("{}, {}", p.x, p.y)))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("Vector2")
                .category("Geometry")
                .summary("A two-dimensional vector.")
        })
}

inventory::submit!(Registration(vector2));

fn new_vector2(_: &Context<'_>, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
    let args = Args::new("Vector2.new", args);
    args.expect_count(&[0, 1, 2])?;
    let x = args.number_or(0, 0.0)? as f32;
    let y = args.number_or(1, 0.0)? as f32;
    Ok(vec![userdata(Vector2::new(x, y))])
}

fn vector3() -> Reflector {
    userdata_reflector::<Vector3>()
        .property(
            "X",
            Property::read_only(|_, v| Ok(number(cast::<Vector3>(v)?.x)), || TypeRef::Number),
        )
        .property(
            "Y",
            Property::read_only(|_, v| Ok(number(cast::<Vector3>(v)?.y)), || TypeRef::Number),
        )
        .property(
            "Z",
            Property::read_only(|_, v| Ok(number(cast::<Vector3>(v)?.z)), || TypeRef::Number),
        )
        .property(
            "Magnitude",
            Property::read_only(
                |_, v| Ok(number(cast::<Vector3>(v)?.magnitude())),
                || TypeRef::Number,
            ),
        )
        .property(
            "Unit",
            Property::read_only(
                |_, v| Ok(userdata(cast::<Vector3>(v)?.unit())),
                || TypeRef::named("Vector3"),
            ),
        )
        .method(
            "Dot",
            |_, v, args| {
                let other = Args::new("Vector3.Dot", args).userdata::<Vector3>(0)?;
                Ok(vec![number(cast::<Vector3>(v)?.dot(other))])
            },
            || {
                FunctionSchema::new()
                    .param("other", TypeRef::named("Vector3"))
                    .returns(TypeRef::Number)
            },
        )
        .method(
            "Cross",
            |_, v, args| {
                let other = Args::new("Vector3.Cross", args).userdata::<Vector3>(0)?;
                Ok(vec![userdata(cast::<Vector3>(v)?.cross(other))])
            },
            || {
                FunctionSchema::new()
                    .param("other", TypeRef::named("Vector3"))
                    .returns(TypeRef::named("Vector3"))
            },
        )
        .method(
            "Lerp",
            |_, v, args| {
                let args = Args::new("Vector3.Lerp", args);
                let goal = args.userdata::<Vector3>(0)?;
                let alpha = args.float(1)?;
                Ok(vec![userdata(cast::<Vector3>(v)?.lerp(goal, alpha))])
            },
            || {
                FunctionSchema::new()
                    .param("goal", TypeRef::named("Vector3"))
                    .param("alpha", TypeRef::Number)
                    .returns(TypeRef::named("Vector3"))
            },
        )
        .constructor("new", new_vector3, || {
            vec![FunctionSchema::new()
                .param("x", TypeRef::optional(TypeRef::Number))
                .param("y", TypeRef::optional(TypeRef::Number))
                .param("z", TypeRef::optional(TypeRef::Number))
                .returns(TypeRef::named("Vector3"))]
        })
        .operator("__add", add::<Vector3>, || same_type("Vector3"))
        .operator("__sub", sub::<Vector3>, || same_type("Vector3"))
        .operator("__mul", mul::<Vector3>, || scaled("Vector3"))
        .operator("__div", div::<Vector3>, || scaled("Vector3"))
        .operator("__unm", unm::<Vector3>, || negated("Vector3"))
        .operator("__eq", eq_by_value::<Vector3>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let p = from_userdata::<Vector3>(v)?;
                Ok(Dynamic::string(format!("{}, {}, {}", p.x, p.y, p.z)))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("Vector3")
                .category("Geometry")
                .summary("A three-dimensional vector.")
        })
}

inventory::submit!(Registration(vector3));

fn new_vector3(_: &Context<'_>, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
    let args = Args::new("Vector3.new", args);
    args.expect_count(&[0, 1, 2, 3])?;
    let x = args.number_or(0, 0.0)? as f32;
    let y = args.number_or(1, 0.0)? as f32;
    let z = args.number_or(2, 0.0)? as f32;
    Ok(vec![userdata(Vector3::new(x, y, z))])
}

fn vector2int16() -> Reflector {
    userdata_reflector::<Vector2int16>()
        .property(
            "X",
            Property::read_only(|_, v| Ok(number(cast::<Vector2int16>(v)?.x)), || TypeRef::Number),
        )
        .property(
            "Y",
            Property::read_only(|_, v| Ok(number(cast::<Vector2int16>(v)?.y)), || TypeRef::Number),
        )
        .constructor(
            "new",
            |_, args| {
                let args = Args::new("Vector2int16.new", args);
                args.expect_count(&[0, 1, 2])?;
                let x = args.number_or(0, 0.0)? as i16;
                let y = args.number_or(1, 0.0)? as i16;
                Ok(vec![userdata(Vector2int16::new(x, y))])
            },
            || {
                vec![FunctionSchema::new()
                    .param("x", TypeRef::optional(TypeRef::Number))
                    .param("y", TypeRef::optional(TypeRef::Number))
                    .returns(TypeRef::named("Vector2int16"))]
            },
        )
        .operator("__add", add::<Vector2int16>, || same_type("Vector2int16"))
        .operator("__sub", sub::<Vector2int16>, || same_type("Vector2int16"))
        .operator("__unm", unm::<Vector2int16>, || negated("Vector2int16"))
        .operator("__eq", eq_by_value::<Vector2int16>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let p = from_userdata::<Vector2int16>(v)?;
                Ok(Dynamic::string(format!("{}, {}", p.x, p.y)))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("Vector2int16")
                .category("Geometry")
                .summary("A two-dimensional vector of 16-bit integers.")
        })
}

inventory::submit!(Registration(vector2int16));

fn vector3int16() -> Reflector {
    userdata_reflector::<Vector3int16>()
        .property(
            "X",
            Property::read_only(|_, v| Ok(number(cast::<Vector3int16>(v)?.x)), || TypeRef::Number),
        )
        .property(
            "Y",
            Property::read_only(|_, v| Ok(number(cast::<Vector3int16>(v)?.y)), || TypeRef::Number),
        )
        .property(
            "Z",
            Property::read_only(|_, v| Ok(number(cast::<Vector3int16>(v)?.z)), || TypeRef::Number),
        )
        .constructor(
            "new",
            |_, args| {
                let args = Args::new("Vector3int16.new", args);
                args.expect_count(&[0, 1, 2, 3])?;
                let x = args.number_or(0, 0.0)? as i16;
                let y = args.number_or(1, 0.0)? as i16;
                let z = args.number_or(2, 0.0)? as i16;
                Ok(vec![userdata(Vector3int16::new(x, y, z))])
            },
            || {
                vec![FunctionSchema::new()
                    .param("x", TypeRef::optional(TypeRef::Number))
                    .param("y", TypeRef::optional(TypeRef::Number))
                    .param("z", TypeRef::optional(TypeRef::Number))
                    .returns(TypeRef::named("Vector3int16"))]
            },
        )
        .operator("__add", add::<Vector3int16>, || same_type("Vector3int16"))
        .operator("__sub", sub::<Vector3int16>, || same_type("Vector3int16"))
        .operator("__unm", unm::<Vector3int16>, || negated("Vector3int16"))
        .operator("__eq", eq_by_value::<Vector3int16>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let p = from_userdata::<Vector3int16>(v)?;
                Ok(Dynamic::string(format!("{}, {}, {}", p.x, p.y, p.z)))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("Vector3int16")
                .category("Geometry")
                .summary("A three-dimensional vector of 16-bit integers.")
        })
}

inventory::submit!(Registration(vector3int16));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReflectError;

    fn v3(ctx: &Context<'_>, x: f64, y: f64, z: f64) -> Dynamic {
        ctx.construct(
            "Vector3",
            "new",
            &[Dynamic::Number(x), Dynamic::Number(y), Dynamic::Number(z)],
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn test_constructor_defaults() {
        let ctx = Context::global();
        let v = ctx.construct("Vector3", "new", &[Dynamic::Number(1.0)]).unwrap();
        assert_eq!(from_userdata::<Vector3>(&v[0]).unwrap(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_constructor_rejects_bad_argument() {
        let ctx = Context::global();
        let err = ctx
            .construct("Vector3", "new", &[Dynamic::Number(1.0), Dynamic::from("y")])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad argument #2 to Vector3.new: expected number, got string"
        );
    }

    #[test]
    fn test_properties_and_methods() {
        let ctx = Context::global();
        let a = v3(&ctx, 3.0, 4.0, 0.0);
        assert_eq!(ctx.get_property(&a, "Magnitude").unwrap().as_number(), Some(5.0));
        assert_eq!(ctx.get_property(&a, "Y").unwrap().as_number(), Some(4.0));

        let b = v3(&ctx, 0.0, 0.0, 1.0);
        let cross = ctx.call_method(&a, "Cross", &[b]).unwrap();
        assert_eq!(
            from_userdata::<Vector3>(&cross[0]).unwrap(),
            Vector3::new(4.0, -3.0, 0.0)
        );

        assert_eq!(
            ctx.get_property(&a, "W").unwrap_err(),
            ReflectError::UnknownMember {
                type_name: "Vector3".into(),
                member: "W".into(),
            }
        );
        assert!(matches!(
            ctx.set_property(&a, "X", &Dynamic::Number(1.0)),
            Err(ReflectError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_operators() {
        let ctx = Context::global();
        let a = v3(&ctx, 1.0, 2.0, 3.0);
        let b = v3(&ctx, 1.0, 1.0, 1.0);

        let sum = ctx.operate("__add", &a, &b).unwrap();
        assert_eq!(from_userdata::<Vector3>(&sum).unwrap(), Vector3::new(2.0, 3.0, 4.0));

        let scaled = ctx.operate("__mul", &Dynamic::Number(2.0), &a).unwrap();
        assert_eq!(from_userdata::<Vector3>(&scaled).unwrap(), Vector3::new(2.0, 4.0, 6.0));

        let neg = ctx.unary("__unm", &b).unwrap();
        assert_eq!(from_userdata::<Vector3>(&neg).unwrap(), Vector3::new(-1.0, -1.0, -1.0));

        assert!(ctx.equals(&b, &v3(&ctx, 1.0, 1.0, 1.0)).unwrap());
        assert_eq!(ctx.tostring(&a).unwrap(), "1, 2, 3");

        let err = ctx.operate("__add", &a, &Dynamic::Bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "attempt to perform __add on boolean");
    }

    #[test]
    fn test_int16_wraps() {
        let ctx = Context::global();
        let a = ctx
            .construct("Vector2int16", "new", &[Dynamic::Number(32767.0), Dynamic::Number(0.0)])
            .unwrap()
            .remove(0);
        let b = ctx
            .construct("Vector2int16", "new", &[Dynamic::Number(1.0), Dynamic::Number(0.0)])
            .unwrap()
            .remove(0);
        let sum = ctx.operate("__add", &a, &b).unwrap();
        assert_eq!(from_userdata::<Vector2int16>(&sum).unwrap().x, i16::MIN);
    }
}
