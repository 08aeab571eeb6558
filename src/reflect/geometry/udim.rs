use typebridge_types::{UDim, UDim2};

use crate::dump::{FunctionSchema, TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Args, Context, Property, Reflector, Registration};
use crate::error::Result;
use crate::reflect::{
    cast, eq_by_value, eq_schema, from_userdata, number, tostring_schema, userdata,
    userdata_reflector,
};

use super::{add, negated, same_type, sub, unm};

fn udim() -> Reflector {
    userdata_reflector::<UDim>()
        .property(
            "Scale",
            Property::read_only(|_, v| Ok(number(cast::<UDim>(v)?.scale)), || TypeRef::Number),
        )
        .property(
            "Offset",
            Property::read_only(|_, v| Ok(number(cast::<UDim>(v)?.offset)), || TypeRef::Number),
        )
        .constructor(
            "new",
            |_, args| {
                let args = Args::new("UDim.new", args);
                args.expect_count(&[0, 1, 2])?;
                let scale = args.number_or(0, 0.0)? as f32;
                let offset = args.number_or(1, 0.0)? as i32;
                Ok(vec![userdata(UDim::new(scale, offset))])
            },
            || {
                vec![FunctionSchema::new()
                    .param("scale", TypeRef::optional(TypeRef::Number))
                    .param("offset", TypeRef::optional(TypeRef::Number))
                    .returns(TypeRef::named("UDim"))]
            },
        )
        .operator("__add", add::<UDim>, || same_type("UDim"))
        .operator("__sub", sub::<UDim>, || same_type("UDim"))
        .operator("__unm", unm::<UDim>, || negated("UDim"))
        .operator("__eq", eq_by_value::<UDim>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let u = from_userdata::<UDim>(v)?;
                Ok(Dynamic::string(format!("{}, {}", u.scale, u.offset)))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("UDim")
                .category("Geometry")
                .summary("One dimension of a layout position: a scale and a pixel offset.")
        })
}

inventory::submit!(Registration(udim));

fn udim_ref() -> TypeRef {
    TypeRef::named("UDim")
}

fn udim2_ref() -> TypeRef {
    TypeRef::named("UDim2")
}

fn udim2() -> Reflector {
    userdata_reflector::<UDim2>()
        .property(
            "X",
            Property::read_only(|_, v| Ok(userdata(cast::<UDim2>(v)?.x)), udim_ref),
        )
        .property(
            "Y",
            Property::read_only(|_, v| Ok(userdata(cast::<UDim2>(v)?.y)), udim_ref),
        )
        .property(
            "Width",
            Property::read_only(|_, v| Ok(userdata(cast::<UDim2>(v)?.x)), udim_ref),
        )
        .property(
            "Height",
            Property::read_only(|_, v| Ok(userdata(cast::<UDim2>(v)?.y)), udim_ref),
        )
        .method(
            "Lerp",
            |_, v, args| {
                let args = Args::new("UDim2.Lerp", args);
                let goal = args.userdata::<UDim2>(0)?;
                let alpha = args.float(1)?;
                Ok(vec![userdata(cast::<UDim2>(v)?.lerp(goal, alpha))])
            },
            || {
                FunctionSchema::new()
                    .param("goal", udim2_ref())
                    .param("alpha", TypeRef::Number)
                    .returns(udim2_ref())
            },
        )
        .constructor("new", new_udim2, || {
            vec![
                FunctionSchema::new().returns(udim2_ref()),
                FunctionSchema::new()
                    .param("x", udim_ref())
                    .param("y", udim_ref())
                    .returns(udim2_ref()),
                FunctionSchema::new()
                    .param("xScale", TypeRef::Number)
                    .param("xOffset", TypeRef::Number)
                    .param("yScale", TypeRef::Number)
                    .param("yOffset", TypeRef::Number)
                    .returns(udim2_ref()),
            ]
        })
        .constructor(
            "fromScale",
            |_, args| {
                let args = Args::new("UDim2.fromScale", args);
                let x = args.number_or(0, 0.0)? as f32;
                let y = args.number_or(1, 0.0)? as f32;
                Ok(vec![userdata(UDim2::from_scale(x, y))])
            },
            || {
                vec![FunctionSchema::new()
                    .param("x", TypeRef::Number)
                    .param("y", TypeRef::Number)
                    .returns(udim2_ref())]
            },
        )
        .constructor(
            "fromOffset",
            |_, args| {
                let args = Args::new("UDim2.fromOffset", args);
                let x = args.number_or(0, 0.0)? as i32;
                let y = args.number_or(1, 0.0)? as i32;
                Ok(vec![userdata(UDim2::from_offset(x, y))])
            },
            || {
                vec![FunctionSchema::new()
                    .param("x", TypeRef::Number)
                    .param("y", TypeRef::Number)
                    .returns(udim2_ref())]
            },
        )
        .operator("__add", add::<UDim2>, || same_type("UDim2"))
        .operator("__sub", sub::<UDim2>, || same_type("UDim2"))
        .operator("__unm", unm::<UDim2>, || negated("UDim2"))
        .operator("__eq", eq_by_value::<UDim2>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let u = from_userdata::<UDim2>(v)?;
                Ok(Dynamic::string(format!(
                    "{{{}, {}}}, {{{}, {}}}",
                    u.x.scale, u.x.offset, u.y.scale, u.y.offset
                )))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("UDim2")
                .category("Geometry")
                .summary("A two-dimensional layout position.")
        })
}

inventory::submit!(Registration(udim2));

fn new_udim2(_: &Context<'_>, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
    let args = Args::new("UDim2.new", args);
    let value = match args.len() {
        0 => UDim2::default(),
        2 => UDim2::new(args.userdata::<UDim>(0)?, args.userdata::<UDim>(1)?),
        4 => UDim2::new(
            UDim::new(args.float(0)?, args.int(1)?),
            UDim::new(args.float(2)?, args.int(3)?),
        ),
        _ => return Err(args.count_error("0, 2 or 4")),
    };
    Ok(vec![userdata(value)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udim2_overloads() {
        let ctx = Context::global();
        let from_numbers = ctx
            .construct(
                "UDim2",
                "new",
                &[
                    Dynamic::Number(0.5),
                    Dynamic::Number(10.0),
                    Dynamic::Number(1.0),
                    Dynamic::Number(-4.0),
                ],
            )
            .unwrap()
            .remove(0);
        let from_parts = ctx
            .construct(
                "UDim2",
                "new",
                &[userdata(UDim::new(0.5, 10)), userdata(UDim::new(1.0, -4))],
            )
            .unwrap()
            .remove(0);
        assert!(ctx.equals(&from_numbers, &from_parts).unwrap());
        assert_eq!(ctx.tostring(&from_parts).unwrap(), "{0.5, 10}, {1, -4}");

        let width = ctx.get_property(&from_parts, "Width").unwrap();
        assert_eq!(from_userdata::<UDim>(&width).unwrap(), UDim::new(0.5, 10));

        assert!(ctx.construct("UDim2", "new", &[Dynamic::Number(1.0)]).is_err());
    }

    #[test]
    fn test_udim_arithmetic() {
        let ctx = Context::global();
        let a = userdata(UDim::new(0.25, 5));
        let b = userdata(UDim::new(0.25, -10));
        let sum = ctx.operate("__add", &a, &b).unwrap();
        assert_eq!(from_userdata::<UDim>(&sum).unwrap(), UDim::new(0.5, -5));
    }
}
