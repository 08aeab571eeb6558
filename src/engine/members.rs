//! Member dispatch for userdata values: properties, methods, constructors
//! and operators.

use typebridge_types::{ConversionError, DomainType, Value};

use crate::dynamic::{Dynamic, UserData};
use crate::engine::{Context, Reflector};
use crate::error::{ReflectError, Result};

impl Context<'_> {
    fn receiver<'d>(&self, object: &'d Dynamic, op: &str) -> Result<(&'d UserData, &Reflector)> {
        let Dynamic::UserData(u) = object else {
            return Err(ReflectError::UnsupportedOperator {
                op: op.to_string(),
                type_name: object.type_of(),
            });
        };
        Ok((u, self.registry().get(u.type_name())?))
    }

    /// Read a property of a userdata value. Names without a property entry
    /// go to the type's `__index` operator when it declares one.
    pub fn get_property(&self, object: &Dynamic, name: &str) -> Result<Dynamic> {
        let (u, reflector) = self.receiver(object, "index")?;
        match reflector.properties.get(name) {
            Some(prop) => (prop.get)(self, &u.get()),
            None => match reflector.metatable.get("__index") {
                Some(op) => (op.call)(self, object, &Dynamic::string(name)),
                None => Err(unknown_member(reflector, name)),
            },
        }
    }

    /// Write a property of a userdata value. The change is visible through
    /// every handle to the object.
    pub fn set_property(&self, object: &Dynamic, name: &str, value: &Dynamic) -> Result<()> {
        let (u, reflector) = self.receiver(object, "newindex")?;
        let prop = reflector
            .properties
            .get(name)
            .ok_or_else(|| unknown_member(reflector, name))?;
        let set = prop.set.ok_or_else(|| ReflectError::ReadOnly {
            type_name: reflector.name.to_string(),
            member: name.to_string(),
        })?;
        // Work on a copy: the setter may pull arguments that refer back to
        // the same object.
        let mut current = u.get();
        set(self, &mut current, value)?;
        u.replace(current);
        Ok(())
    }

    /// Call a method with the object as receiver.
    pub fn call_method(&self, object: &Dynamic, name: &str, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
        let (u, reflector) = self.receiver(object, "call")?;
        let method = reflector
            .methods
            .get(name)
            .ok_or_else(|| unknown_member(reflector, name))?;
        let mut current = u.get();
        let results = (method.call)(self, &mut current, args)?;
        u.replace(current);
        Ok(results)
    }

    /// Call a static constructor such as `Vector3.new`.
    pub fn construct(&self, type_name: &str, name: &str, args: &[Dynamic]) -> Result<Vec<Dynamic>> {
        let reflector = self.registry().get(type_name)?;
        let ctor = reflector
            .constructors
            .get(name)
            .ok_or_else(|| unknown_member(reflector, name))?;
        (ctor.call)(self, args)
    }

    /// Apply a binary operator. The left operand's table is consulted first,
    /// then the right operand's.
    pub fn operate(&self, symbol: &str, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic> {
        for operand in [lhs, rhs] {
            if let Some(op) = self.operator(operand, symbol)? {
                return (op)(self, lhs, rhs);
            }
        }
        Err(ReflectError::UnsupportedOperator {
            op: symbol.to_string(),
            type_name: match lhs {
                Dynamic::UserData(_) => lhs.type_of(),
                _ => rhs.type_of(),
            },
        })
    }

    pub fn unary(&self, symbol: &str, operand: &Dynamic) -> Result<Dynamic> {
        self.operate(symbol, operand, operand)
    }

    /// Equality as the runtime sees it: identity first, then `__eq` when both
    /// sides are userdata of the same type.
    pub fn equals(&self, lhs: &Dynamic, rhs: &Dynamic) -> Result<bool> {
        if lhs.raw_equal(rhs) {
            return Ok(true);
        }
        match (lhs, rhs) {
            (Dynamic::UserData(a), Dynamic::UserData(b)) if a.type_name() == b.type_name() => {
                match self.operator(lhs, "__eq")? {
                    Some(op) => Ok(matches!(op(self, lhs, rhs)?, Dynamic::Bool(true))),
                    None => Ok(false),
                }
            }
            _ => Ok(false),
        }
    }

    /// Length as the `#` operator sees it: byte length of strings, sequence
    /// length of tables, `__len` for userdata.
    pub fn length(&self, value: &Dynamic) -> Result<usize> {
        match value {
            Dynamic::String(s) => Ok(s.len()),
            Dynamic::Table(t) => Ok(t.len()),
            other => {
                let op = self.operator(other, "__len")?.ok_or_else(|| {
                    ReflectError::UnsupportedOperator {
                        op: "__len".to_string(),
                        type_name: other.type_of(),
                    }
                })?;
                let n = op(self, other, other)?;
                match n.as_number() {
                    Some(n) if n >= 0.0 => Ok(n as usize),
                    _ => Err(ReflectError::mismatch("number", n.type_of())),
                }
            }
        }
    }

    /// Text form of a value, using `__tostring` where one is declared.
    pub fn tostring(&self, value: &Dynamic) -> Result<String> {
        if let Some(op) = self.operator(value, "__tostring")? {
            let text = op(self, value, value)?;
            return text
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ReflectError::mismatch("string", text.type_of()));
        }
        Ok(match value {
            Dynamic::Nil => "nil".to_string(),
            Dynamic::Bool(b) => b.to_string(),
            Dynamic::Number(n) => format_number(*n),
            Dynamic::String(s) => String::from_utf8_lossy(s).into_owned(),
            other => format!("{:?}", other),
        })
    }

    fn operator(&self, operand: &Dynamic, symbol: &str) -> Result<Option<crate::engine::OperatorFn>> {
        let Dynamic::UserData(u) = operand else {
            return Ok(None);
        };
        let reflector = self.registry().get(u.type_name())?;
        Ok(reflector.metatable.get(symbol).map(|op| op.call))
    }
}

fn unknown_member(reflector: &Reflector, name: &str) -> ReflectError {
    ReflectError::UnknownMember {
        type_name: reflector.name.to_string(),
        member: name.to_string(),
    }
}

/// Numbers print without a fractional part when they are integral.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Positional arguments of a method or constructor call.
///
/// Positions in errors are 1-based, as the script author counts them.
/// Methods are called without the receiver in `values`.
pub struct Args<'a> {
    function: &'a str,
    values: &'a [Dynamic],
}

impl<'a> Args<'a> {
    pub fn new(function: &'a str, values: &'a [Dynamic]) -> Self {
        Self { function, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail unless the call has one of the accepted argument counts.
    pub fn expect_count(&self, accepted: &[usize]) -> Result<()> {
        if accepted.contains(&self.values.len()) {
            return Ok(());
        }
        let expected = accepted
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        Err(self.count_error(expected))
    }

    pub fn count_error(&self, expected: impl Into<String>) -> ReflectError {
        ReflectError::ArgumentCount {
            function: self.function.to_string(),
            expected: expected.into(),
            got: self.values.len(),
        }
    }

    /// Argument at a 0-based index; missing arguments read as nil.
    pub fn get(&self, index: usize) -> Dynamic {
        self.values.get(index).cloned().unwrap_or_default()
    }

    pub fn error(&self, index: usize, reason: impl ToString) -> ReflectError {
        ReflectError::argument(index + 1, self.function, reason)
    }

    fn mismatch(&self, index: usize, expected: &str) -> ReflectError {
        let got = self.get(index).type_of();
        self.error(index, ReflectError::mismatch(expected, got))
    }

    pub fn number(&self, index: usize) -> Result<f64> {
        self.get(index)
            .as_number()
            .ok_or_else(|| self.mismatch(index, "number"))
    }

    pub fn number_or(&self, index: usize, default: f64) -> Result<f64> {
        match self.get(index) {
            Dynamic::Nil => Ok(default),
            _ => self.number(index),
        }
    }

    pub fn float(&self, index: usize) -> Result<f32> {
        self.number(index).map(|n| n as f32)
    }

    pub fn int(&self, index: usize) -> Result<i32> {
        self.number(index).map(|n| n as i32)
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        self.get(index)
            .as_bool()
            .ok_or_else(|| self.mismatch(index, "boolean"))
    }

    pub fn string(&self, index: usize) -> Result<String> {
        self.get(index)
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(index, "string"))
    }

    /// Domain value carried by a userdata argument of type `T`.
    pub fn userdata<T>(&self, index: usize) -> Result<T>
    where
        T: DomainType + TryFrom<Value, Error = ConversionError>,
    {
        match self.get(index) {
            Dynamic::UserData(u) if u.type_name() == T::TYPE_NAME => {
                T::try_from(u.get()).map_err(|e| self.error(index, e))
            }
            _ => Err(self.mismatch(index, T::TYPE_NAME)),
        }
    }

    /// Pull an argument restricted to the accepted types.
    pub fn pull(&self, ctx: &Context<'_>, index: usize, types: &[&str]) -> Result<Value> {
        ctx.pull_any_of(&self.get(index), types)
            .map_err(|e| self.error(index, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::{OperatorSchema, TypeRef};
    use crate::engine::Registry;
    use crate::format::Formats;
    use typebridge_types::Vector3;

    #[test]
    fn test_args_positions_are_one_based() {
        let values = [Dynamic::Number(1.0), Dynamic::from("x")];
        let args = Args::new("Vector3.new", &values);
        assert_eq!(args.number(0).unwrap(), 1.0);
        assert_eq!(
            args.number(1).unwrap_err().to_string(),
            "bad argument #2 to Vector3.new: expected number, got string"
        );
        assert_eq!(args.number_or(2, 0.5).unwrap(), 0.5);
    }

    #[test]
    fn test_expect_count() {
        let values = [Dynamic::Nil];
        let args = Args::new("CFrame.new", &values);
        assert!(args.expect_count(&[0, 1]).is_ok());
        assert_eq!(
            args.expect_count(&[0, 3]).unwrap_err().to_string(),
            "wrong number of arguments to CFrame.new: expected 0 or 3, got 1"
        );
    }

    #[test]
    fn test_userdata_argument() {
        let values = [Dynamic::UserData(UserData::new(
            "Vector3",
            Value::Vector3(Vector3::new(1.0, 2.0, 3.0)),
        ))];
        let args = Args::new("f", &values);
        assert_eq!(args.userdata::<Vector3>(0).unwrap().z, 3.0);
    }

    fn bag() -> Reflector {
        Reflector::new("Bag")
            .operator(
                "__index",
                |_, _, key| Ok(Dynamic::string(format!("item {}", key.as_str().unwrap_or("?")))),
                || OperatorSchema::binary(TypeRef::String, TypeRef::String),
            )
            .operator(
                "__len",
                |_, _, _| Ok(Dynamic::Number(3.0)),
                || OperatorSchema::unary(TypeRef::Number),
            )
    }

    #[test]
    fn test_index_and_len_fallbacks() {
        let registry = Registry::builder().register(bag).build().unwrap();
        let ctx = Context::new(&registry, Formats::global());
        let bag = Dynamic::UserData(UserData::new("Bag", Value::Nil));

        assert_eq!(ctx.get_property(&bag, "apple").unwrap().as_str(), Some("item apple"));
        assert_eq!(ctx.length(&bag).unwrap(), 3);
        assert_eq!(ctx.length(&Dynamic::from("abc")).unwrap(), 3);
        assert_eq!(
            ctx.length(&Dynamic::Bool(true)).unwrap_err().to_string(),
            "attempt to perform __len on boolean"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.5), "0.5");
    }
}
