//! Reflection engine
//!
//! The registry of reflectors, the conversion context and the generic
//! dispatch built on them.

mod context;
mod cycle;
mod members;
mod reflector;
mod registry;
mod variant;

pub use context::{Context, DepthScope, GuardScope};
pub use cycle::CycleGuard;
pub use members::{format_number, Args};
pub use reflector::{
    Constructor, ConstructorFn, ConvertFn, DumpFn, GetterFn, Method, MethodFn, Operator,
    OperatorFn, Property, PullFn, PushFn, Reflector, SetFn, SetterFn,
};
pub use registry::{Registration, Registry, RegistryBuilder};
pub use variant::VARIANT;
