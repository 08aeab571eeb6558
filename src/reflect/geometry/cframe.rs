use typebridge_types::{CFrame, Vector3};

use crate::dump::{FunctionSchema, OperatorSchema, TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Args, Context, Property, Reflector, Registration};
use crate::error::Result;
use crate::reflect::{
    bad_operand, cast, eq_by_value, eq_schema, from_userdata, number, tostring_schema, userdata,
    userdata_reflector,
};

fn vector3_ref() -> TypeRef {
    TypeRef::named("Vector3")
}

fn cframe() -> Reflector {
    userdata_reflector::<CFrame>()
        .property(
            "Position",
            Property::read_only(
                |_, v| Ok(userdata(cast::<CFrame>(v)?.position)),
                vector3_ref,
            ),
        )
        .property(
            "X",
            Property::read_only(|_, v| Ok(number(cast::<CFrame>(v)?.position.x)), || TypeRef::Number),
        )
        .property(
            "Y",
            Property::read_only(|_, v| Ok(number(cast::<CFrame>(v)?.position.y)), || TypeRef::Number),
        )
        .property(
            "Z",
            Property::read_only(|_, v| Ok(number(cast::<CFrame>(v)?.position.z)), || TypeRef::Number),
        )
        .property(
            "LookVector",
            Property::read_only(
                |_, v| Ok(userdata(cast::<CFrame>(v)?.look_vector())),
                vector3_ref,
            ),
        )
        .property(
            "RightVector",
            Property::read_only(
                |_, v| Ok(userdata(cast::<CFrame>(v)?.right_vector())),
                vector3_ref,
            ),
        )
        .property(
            "UpVector",
            Property::read_only(
                |_, v| Ok(userdata(cast::<CFrame>(v)?.up_vector())),
                vector3_ref,
            ),
        )
        .method(
            "Inverse",
            |_, v, _| Ok(vec![userdata(cast::<CFrame>(v)?.inverse())]),
            || FunctionSchema::new().returns(TypeRef::named("CFrame")),
        )
        .method(
            "PointToWorldSpace",
            |_, v, args| {
                let p = Args::new("CFrame.PointToWorldSpace", args).userdata::<Vector3>(0)?;
                Ok(vec![userdata(cast::<CFrame>(v)?.point_to_world_space(p))])
            },
            point_schema,
        )
        .method(
            "PointToObjectSpace",
            |_, v, args| {
                let p = Args::new("CFrame.PointToObjectSpace", args).userdata::<Vector3>(0)?;
                Ok(vec![userdata(cast::<CFrame>(v)?.point_to_object_space(p))])
            },
            point_schema,
        )
        .method(
            "GetComponents",
            |_, v, _| {
                let c = cast::<CFrame>(v)?.components();
                Ok(c.iter().map(|&n| number(n)).collect())
            },
            || {
                (0..12).fold(FunctionSchema::new(), |f, _| f.returns(TypeRef::Number))
            },
        )
        .constructor("new", new_cframe, || {
            let num = || TypeRef::Number;
            let v3 = || TypeRef::named("Vector3");
            let out = || TypeRef::named("CFrame");
            let numbers = |names: &[&'static str]| {
                names
                    .iter()
                    .fold(FunctionSchema::new(), |f, n| f.param(*n, num()))
                    .returns(out())
            };
            vec![
                FunctionSchema::new().returns(out()),
                FunctionSchema::new().param("position", v3()).returns(out()),
                FunctionSchema::new()
                    .param("position", v3())
                    .param("lookAt", v3())
                    .returns(out()),
                numbers(&["x", "y", "z"]),
                numbers(&["x", "y", "z", "qx", "qy", "qz", "qw"]),
                numbers(&[
                    "x", "y", "z", "r00", "r01", "r02", "r10", "r11", "r12", "r20", "r21", "r22",
                ]),
            ]
        })
        .operator("__mul", mul, || {
            OperatorSchema::binary(
                TypeRef::or([TypeRef::named("CFrame"), TypeRef::named("Vector3")]),
                TypeRef::or([TypeRef::named("CFrame"), TypeRef::named("Vector3")]),
            )
        })
        .operator("__add", |_, lhs, rhs| translate("__add", lhs, rhs, 1.0), || {
            OperatorSchema::binary(TypeRef::named("Vector3"), TypeRef::named("CFrame"))
        })
        .operator("__sub", |_, lhs, rhs| translate("__sub", lhs, rhs, -1.0), || {
            OperatorSchema::binary(TypeRef::named("Vector3"), TypeRef::named("CFrame"))
        })
        .operator("__eq", eq_by_value::<CFrame>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let text = from_userdata::<CFrame>(v)?
                    .components()
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(Dynamic::string(text))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("CFrame")
                .category("Geometry")
                .summary("A position and rotation in 3D space.")
        })
}

inventory::submit!(Registration(cframe));

fn point_schema() -> FunctionSchema {
    FunctionSchema::new()
        .param("point", TypeRef::named("Vector3"))
        .returns(TypeRef::named("Vector3"))
}

/// Overloads are chosen by argument count and, for one or two arguments,
/// by argument type.
fn new_cframe(_: &Context<'_>, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
    let args = Args::new("CFrame.new", args);
    let cf = match args.len() {
        0 => CFrame::IDENTITY,
        1 => CFrame::from_position(args.userdata::<Vector3>(0)?),
        2 => CFrame::look_at(args.userdata::<Vector3>(0)?, args.userdata::<Vector3>(1)?),
        3 => CFrame::from_position(position(&args)?),
        7 => CFrame::from_quaternion(
            position(&args)?,
            args.float(3)?,
            args.float(4)?,
            args.float(5)?,
            args.float(6)?,
        ),
        12 => {
            let mut c = [0.0f32; 12];
            for (i, slot) in c.iter_mut().enumerate() {
                *slot = args.float(i)?;
            }
            CFrame::from_components(c)
        }
        _ => return Err(args.count_error("0, 1, 2, 3, 7 or 12")),
    };
    Ok(vec![userdata(cf)])
}

fn position(args: &Args<'_>) -> Result<Vector3> {
    Ok(Vector3::new(args.float(0)?, args.float(1)?, args.float(2)?))
}

/// `CFrame * CFrame` composes, `CFrame * Vector3` transforms a point.
fn mul(_: &Context<'_>, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic> {
    let a = from_userdata::<CFrame>(lhs).map_err(|_| bad_operand("__mul", lhs))?;
    if let Ok(b) = from_userdata::<CFrame>(rhs) {
        return Ok(userdata(a * b));
    }
    match from_userdata::<Vector3>(rhs) {
        Ok(p) => Ok(userdata(a * p)),
        Err(_) => Err(bad_operand("__mul", rhs)),
    }
}

fn translate(op: &str, lhs: &Dynamic, rhs: &Dynamic, sign: f32) -> Result<Dynamic> {
    let a = from_userdata::<CFrame>(lhs).map_err(|_| bad_operand(op, lhs))?;
    let offset = from_userdata::<Vector3>(rhs).map_err(|_| bad_operand(op, rhs))?;
    Ok(userdata(a + offset * sign))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReflectError;

    fn n(values: &[f64]) -> Vec<Dynamic> {
        values.iter().map(|&v| Dynamic::Number(v)).collect()
    }

    fn v3(x: f32, y: f32, z: f32) -> Dynamic {
        userdata(Vector3::new(x, y, z))
    }

    fn construct(args: &[Dynamic]) -> Result<CFrame> {
        let ctx = Context::global();
        let out = ctx.construct("CFrame", "new", args)?;
        from_userdata::<CFrame>(&out[0])
    }

    #[test]
    fn test_overloads() {
        assert_eq!(construct(&[]).unwrap(), CFrame::IDENTITY);
        assert_eq!(
            construct(&n(&[1.0, 2.0, 3.0])).unwrap(),
            CFrame::from_position(Vector3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            construct(&[v3(1.0, 2.0, 3.0)]).unwrap(),
            CFrame::from_position(Vector3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            construct(&n(&[1.0, 2.0, 3.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])).unwrap(),
            CFrame::from_position(Vector3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            construct(&n(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0])).unwrap(),
            CFrame::IDENTITY
        );

        let look = construct(&[v3(0.0, 0.0, 0.0), v3(0.0, 0.0, -5.0)]).unwrap();
        assert!((look.look_vector() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_overload_errors() {
        assert_eq!(
            construct(&n(&[1.0, 2.0, 3.0, 4.0])).unwrap_err().to_string(),
            "wrong number of arguments to CFrame.new: expected 0, 1, 2, 3, 7 or 12, got 4"
        );
        assert_eq!(
            construct(&n(&[1.0])).unwrap_err().to_string(),
            "bad argument #1 to CFrame.new: expected Vector3, got number"
        );
    }

    #[test]
    fn test_operators() {
        let ctx = Context::global();
        let cf = ctx.construct("CFrame", "new", &n(&[1.0, 2.0, 3.0])).unwrap().remove(0);

        let moved = ctx.operate("__mul", &cf, &v3(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(from_userdata::<Vector3>(&moved).unwrap(), Vector3::new(2.0, 2.0, 3.0));

        let twice = ctx.operate("__mul", &cf, &cf).unwrap();
        assert_eq!(
            from_userdata::<CFrame>(&twice).unwrap().position,
            Vector3::new(2.0, 4.0, 6.0)
        );

        let back = ctx.operate("__sub", &cf, &v3(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(from_userdata::<CFrame>(&back).unwrap(), CFrame::IDENTITY);

        assert!(matches!(
            ctx.operate("__mul", &cf, &Dynamic::Number(2.0)),
            Err(ReflectError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_members() {
        let ctx = Context::global();
        let cf = ctx.construct("CFrame", "new", &n(&[1.0, 2.0, 3.0])).unwrap().remove(0);
        assert_eq!(ctx.get_property(&cf, "Y").unwrap().as_number(), Some(2.0));

        let parts = ctx.call_method(&cf, "GetComponents", &[]).unwrap();
        assert_eq!(parts.len(), 12);
        assert_eq!(parts[2].as_number(), Some(3.0));

        let local = ctx
            .call_method(&cf, "PointToObjectSpace", &[v3(1.0, 2.0, 3.0)])
            .unwrap();
        assert_eq!(from_userdata::<Vector3>(&local[0]).unwrap(), Vector3::ZERO);
    }
}
