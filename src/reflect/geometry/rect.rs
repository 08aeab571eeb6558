use typebridge_types::{NumberRange, Rect, Vector2};

use crate::dump::{FunctionSchema, TypeRef, TypeSchema};
use crate::dynamic::Dynamic;
use crate::engine::{Args, Context, Property, Reflector, Registration};
use crate::error::Result;
use crate::reflect::{
    cast, eq_by_value, eq_schema, from_userdata, number, tostring_schema, userdata,
    userdata_reflector,
};

fn vector2_ref() -> TypeRef {
    TypeRef::named("Vector2")
}

fn rect() -> Reflector {
    userdata_reflector::<Rect>()
        .property(
            "Min",
            Property::read_only(|_, v| Ok(userdata(cast::<Rect>(v)?.min)), vector2_ref),
        )
        .property(
            "Max",
            Property::read_only(|_, v| Ok(userdata(cast::<Rect>(v)?.max)), vector2_ref),
        )
        .property(
            "Width",
            Property::read_only(|_, v| Ok(number(cast::<Rect>(v)?.width())), || TypeRef::Number),
        )
        .property(
            "Height",
            Property::read_only(|_, v| Ok(number(cast::<Rect>(v)?.height())), || TypeRef::Number),
        )
        .constructor("new", new_rect, || {
            vec![
                FunctionSchema::new().returns(TypeRef::named("Rect")),
                FunctionSchema::new()
                    .param("min", vector2_ref())
                    .param("max", vector2_ref())
                    .returns(TypeRef::named("Rect")),
                FunctionSchema::new()
                    .param("minX", TypeRef::Number)
                    .param("minY", TypeRef::Number)
                    .param("maxX", TypeRef::Number)
                    .param("maxY", TypeRef::Number)
                    .returns(TypeRef::named("Rect")),
            ]
        })
        .operator("__eq", eq_by_value::<Rect>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let r = from_userdata::<Rect>(v)?;
                Ok(Dynamic::string(format!(
                    "{}, {}, {}, {}",
                    r.min.x, r.min.y, r.max.x, r.max.y
                )))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("Rect")
                .category("Geometry")
                .summary("An axis-aligned rectangle.")
        })
}

inventory::submit!(Registration(rect));

fn new_rect(_: &Context<'_>, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
    let args = Args::new("Rect.new", args);
    let value = match args.len() {
        0 => Rect::default(),
        2 => Rect::new(args.userdata::<Vector2>(0)?, args.userdata::<Vector2>(1)?),
        4 => Rect::new(
            Vector2::new(args.float(0)?, args.float(1)?),
            Vector2::new(args.float(2)?, args.float(3)?),
        ),
        _ => return Err(args.count_error("0, 2 or 4")),
    };
    Ok(vec![userdata(value)])
}

fn number_range() -> Reflector {
    userdata_reflector::<NumberRange>()
        .property(
            "Min",
            Property::read_only(|_, v| Ok(number(cast::<NumberRange>(v)?.min)), || TypeRef::Number),
        )
        .property(
            "Max",
            Property::read_only(|_, v| Ok(number(cast::<NumberRange>(v)?.max)), || TypeRef::Number),
        )
        .constructor("new", new_number_range, || {
            vec![
                FunctionSchema::new()
                    .param("value", TypeRef::Number)
                    .returns(TypeRef::named("NumberRange")),
                FunctionSchema::new()
                    .param("min", TypeRef::Number)
                    .param("max", TypeRef::Number)
                    .returns(TypeRef::named("NumberRange")),
            ]
        })
        .operator("__eq", eq_by_value::<NumberRange>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let r = from_userdata::<NumberRange>(v)?;
                Ok(Dynamic::string(format!("{} {}", r.min, r.max)))
            },
            tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new("NumberRange")
                .category("Geometry")
                .summary("A closed interval of numbers.")
        })
}

inventory::submit!(Registration(number_range));

fn new_number_range(_: &Context<'_>, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
    let args = Args::new("NumberRange.new", args);
    args.expect_count(&[1, 2])?;
    let min = args.float(0)?;
    if args.len() == 1 {
        return Ok(vec![userdata(NumberRange::point(min))]);
    }
    let max = args.float(1)?;
    let range = NumberRange::new(min, max)
        .ok_or_else(|| args.error(1, "maximum must not be less than minimum"))?;
    Ok(vec![userdata(range)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReflectError;

    #[test]
    fn test_rect() {
        let ctx = Context::global();
        let r = ctx
            .construct(
                "Rect",
                "new",
                &[userdata(Vector2::new(1.0, 1.0)), userdata(Vector2::new(4.0, 3.0))],
            )
            .unwrap()
            .remove(0);
        assert_eq!(ctx.get_property(&r, "Width").unwrap().as_number(), Some(3.0));
        assert_eq!(ctx.get_property(&r, "Height").unwrap().as_number(), Some(2.0));
        assert_eq!(ctx.tostring(&r).unwrap(), "1, 1, 4, 3");
    }

    #[test]
    fn test_number_range() {
        let ctx = Context::global();
        let point = ctx
            .construct("NumberRange", "new", &[Dynamic::Number(2.0)])
            .unwrap()
            .remove(0);
        assert_eq!(from_userdata::<NumberRange>(&point).unwrap(), NumberRange::point(2.0));

        let err = ctx
            .construct("NumberRange", "new", &[Dynamic::Number(2.0), Dynamic::Number(1.0)])
            .unwrap_err();
        assert!(matches!(err, ReflectError::Argument { position: 2, .. }));
    }
}
