use typebridge_types::Color3;

use crate::dump::{FunctionSchema, TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Args, Property, Reflector, Registration};
use crate::reflect::{
    cast, eq_by_value, eq_schema, from_userdata, number, tostring_schema, userdata,
    userdata_reflector,
};

fn color_ref() -> TypeRef {
    TypeRef::named("Color3")
}

fn three_numbers(a: &'static str, b: &'static str, c: &'static str) -> FunctionSchema {
    FunctionSchema::new()
        .param(a, TypeRef::optional(TypeRef::Number))
        .param(b, TypeRef::optional(TypeRef::Number))
        .param(c, TypeRef::optional(TypeRef::Number))
        .returns(color_ref())
}

fn color3() -> Reflector {
    userdata_reflector::<Color3>()
        .property(
            "R",
            Property::read_only(|_, v| Ok(number(cast::<Color3>(v)?.r)), || TypeRef::Number),
        )
        .property(
            "G",
            Property::read_only(|_, v| Ok(number(cast::<Color3>(v)?.g)), || TypeRef::Number),
        )
        .property(
            "B",
            Property::read_only(|_, v| Ok(number(cast::<Color3>(v)?.b)), || TypeRef::Number),
        )
        .method(
            "Lerp",
            |_, v, args| {
                let args = Args::new("Color3.Lerp", args);
                let goal = args.userdata::<Color3>(0)?;
                let alpha = args.float(1)?;
                Ok(vec![userdata(cast::<Color3>(v)?.lerp(goal, alpha))])
            },
            || {
                FunctionSchema::new()
                    .param("goal", color_ref())
                    .param("alpha", TypeRef::Number)
                    .returns(color_ref())
            },
        )
        .method(
            "ToHSV",
            |_, v, _| {
                let (h, s, val) = cast::<Color3>(v)?.to_hsv();
                Ok(vec![number(h), number(s), number(val)])
            },
            || {
                FunctionSchema::new()
                    .returns(TypeRef::Number)
                    .returns(TypeRef::Number)
                    .returns(TypeRef::Number)
            },
        )
        .constructor(
            "new",
            |_, args| {
                let args = Args::new("Color3.new", args);
                args.expect_count(&[0, 3])?;
                let r = args.number_or(0, 0.0)? as f32;
                let g = args.number_or(1, 0.0)? as f32;
                let b = args.number_or(2, 0.0)? as f32;
                Ok(vec![userdata(Color3::new(r, g, b))])
            },
            || vec![three_numbers("r", "g", "b")],
        )
        .constructor(
            "fromRGB",
            |_, args| {
                let args = Args::new("Color3.fromRGB", args);
                let channel = |i| args.number_or(i, 0.0).map(|n| n.clamp(0.0, 255.0) as u8);
                Ok(vec![userdata(Color3::from_rgb(channel(0)?, channel(1)?, channel(2)?))])
            },
            || vec![three_numbers("r", "g", "b")],
        )
        .constructor(
            "fromHSV",
            |_, args| {
                let args = Args::new("Color3.fromHSV", args);
                args.expect_count(&[3])?;
                let color = Color3::from_hsv(args.float(0)?, args.float(1)?, args.float(2)?);
                Ok(vec![userdata(color)])
            },
            || vec![three_numbers("h", "s", "v")],
        )
        .operator("__eq", eq_by_value::<Color3>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let c = from_userdata::<Color3>(v)?;
                Ok(Dynamic::string(format!("{}, {}, {}", c.r, c.g, c.b)))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("Color3")
                .category("Geometry")
                .summary("An RGB color with channels in [0, 1].")
        })
}

inventory::submit!(Registration(color3));
