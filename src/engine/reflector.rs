//! The per-type conversion contract.
//!
//! A [`Reflector`] is an explicit table of function pointers. There is no
//! runtime introspection: every type that crosses the boundary names its own
//! push, pull, coercion and member functions, and the engine only ever
//! dispatches through these tables.

use std::collections::BTreeMap;

use typebridge_types::Value;

use crate::dump::{
    ConstructorSchema, FunctionSchema, OperatorSchema, PropertySchema, TypeRef, TypeSchema,
};
use crate::dynamic::Dynamic;
use crate::engine::Context;
use crate::error::Result;

/// Domain value into a dynamic value.
pub type PushFn = fn(&Context<'_>, Value) -> Result<Dynamic>;
/// Dynamic value into a domain value of the reflector's type.
pub type PullFn = fn(&Context<'_>, &Dynamic) -> Result<Value>;
/// Coerce a domain value of another type into the reflector's type.
pub type ConvertFn = fn(&Value) -> Option<Value>;
/// Store a value into an existing slot of the reflector's type.
pub type SetFn = fn(&mut Value, Value) -> Result<()>;
/// Describe the reflector's shape.
pub type DumpFn = fn() -> TypeSchema;

pub type GetterFn = fn(&Context<'_>, &Value) -> Result<Dynamic>;
pub type SetterFn = fn(&Context<'_>, &mut Value, &Dynamic) -> Result<()>;
/// Method body: receiver plus arguments, returning any number of results.
pub type MethodFn = fn(&Context<'_>, &mut Value, &[Dynamic]) -> Result<Vec<Dynamic>>;
pub type ConstructorFn = fn(&Context<'_>, &[Dynamic]) -> Result<Vec<Dynamic>>;
/// Operator body. Unary operators receive the operand twice.
pub type OperatorFn = fn(&Context<'_>, &Dynamic, &Dynamic) -> Result<Dynamic>;

/// A readable, and optionally writable, member of a userdata value.
#[derive(Clone, Copy)]
pub struct Property {
    pub get: GetterFn,
    pub set: Option<SetterFn>,
    pub ty: fn() -> TypeRef,
}

impl Property {
    pub fn read_only(get: GetterFn, ty: fn() -> TypeRef) -> Self {
        Self { get, set: None, ty }
    }

    pub fn read_write(get: GetterFn, set: SetterFn, ty: fn() -> TypeRef) -> Self {
        Self {
            get,
            set: Some(set),
            ty,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Method {
    pub call: MethodFn,
    pub dump: fn() -> FunctionSchema,
}

/// A static factory. Overloads are resolved by the function body from the
/// argument count; `dump` lists every accepted signature.
#[derive(Clone, Copy)]
pub struct Constructor {
    pub call: ConstructorFn,
    pub dump: fn() -> Vec<FunctionSchema>,
}

#[derive(Clone, Copy)]
pub struct Operator {
    pub call: OperatorFn,
    pub dump: fn() -> OperatorSchema,
}

/// Named bundle of conversion functions for one domain type.
#[derive(Clone)]
pub struct Reflector {
    pub name: &'static str,
    pub push_to: Option<PushFn>,
    pub pull_from: Option<PullFn>,
    pub convert_from: Option<ConvertFn>,
    pub set_to: Option<SetFn>,
    pub properties: BTreeMap<&'static str, Property>,
    pub methods: BTreeMap<&'static str, Method>,
    pub constructors: BTreeMap<&'static str, Constructor>,
    /// Operators keyed by symbol, e.g. `__add`.
    pub metatable: BTreeMap<&'static str, Operator>,
    pub dump: Option<DumpFn>,
}

impl Reflector {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            push_to: None,
            pull_from: None,
            convert_from: None,
            set_to: None,
            properties: BTreeMap::new(),
            methods: BTreeMap::new(),
            constructors: BTreeMap::new(),
            metatable: BTreeMap::new(),
            dump: None,
        }
    }

    pub fn push(mut self, f: PushFn) -> Self {
        self.push_to = Some(f);
        self
    }

    pub fn pull(mut self, f: PullFn) -> Self {
        self.pull_from = Some(f);
        self
    }

    pub fn convert(mut self, f: ConvertFn) -> Self {
        self.convert_from = Some(f);
        self
    }

    pub fn set(mut self, f: SetFn) -> Self {
        self.set_to = Some(f);
        self
    }

    pub fn property(mut self, name: &'static str, property: Property) -> Self {
        self.properties.insert(name, property);
        self
    }

    pub fn method(mut self, name: &'static str, call: MethodFn, dump: fn() -> FunctionSchema) -> Self {
        self.methods.insert(name, Method { call, dump });
        self
    }

    pub fn constructor(
        mut self,
        name: &'static str,
        call: ConstructorFn,
        dump: fn() -> Vec<FunctionSchema>,
    ) -> Self {
        self.constructors.insert(name, Constructor { call, dump });
        self
    }

    pub fn operator(
        mut self,
        symbol: &'static str,
        call: OperatorFn,
        dump: fn() -> OperatorSchema,
    ) -> Self {
        self.metatable.insert(symbol, Operator { call, dump });
        self
    }

    pub fn with_dump(mut self, f: DumpFn) -> Self {
        self.dump = Some(f);
        self
    }

    /// Full schema: the reflector's own description merged with its
    /// member tables.
    pub fn schema(&self) -> TypeSchema {
        let mut schema = match self.dump {
            Some(dump) => dump(),
            None => TypeSchema::new(self.name),
        };
        schema.name = self.name.to_string();

        for (name, prop) in &self.properties {
            schema.properties.push(PropertySchema {
                name: name.to_string(),
                ty: (prop.ty)(),
                read_only: prop.set.is_none(),
            });
        }
        for (name, method) in &self.methods {
            let mut f = (method.dump)();
            f.name = name.to_string();
            schema.methods.push(f);
        }
        for (name, ctor) in &self.constructors {
            let overloads = (ctor.dump)()
                .into_iter()
                .map(|mut f| {
                    f.name = name.to_string();
                    f
                })
                .collect();
            schema.constructors.push(ConstructorSchema {
                name: name.to_string(),
                overloads,
            });
        }
        for (symbol, op) in &self.metatable {
            let mut o = (op.dump)();
            o.op = symbol.to_string();
            schema.operators.push(o);
        }
        schema
    }
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("name", &self.name)
            .field("push", &self.push_to.is_some())
            .field("pull", &self.pull_from.is_some())
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .field("metatable", &self.metatable.keys().collect::<Vec<_>>())
            .finish()
    }
}
