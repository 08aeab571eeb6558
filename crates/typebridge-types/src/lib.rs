//! Domain value model for typebridge.
//!
//! This crate holds the strongly-typed side of the boundary: primitives,
//! shared containers, geometry, file-format descriptors, IO option records
//! and format selectors. It knows nothing about the scripting runtime; the
//! `typebridge` crate owns conversion.

pub mod desc;
pub mod geometry;
pub mod http;
pub mod selector;
pub mod value;

pub use desc::{
    ClassDesc, DescFields, EnumDesc, EnumItemDesc, FieldTypeError, Fields, PropertyDesc, TypeDesc,
};
pub use geometry::{
    CFrame, Color3, NumberRange, Rect, UDim, UDim2, Vector2, Vector2int16, Vector3, Vector3int16,
};
pub use http::{Cookie, Cookies, HttpHeaders, HttpOptions, HttpResponse};
pub use selector::FormatSelector;
pub use value::{Array, ConversionError, Dictionary, DomainType, Optional, Tuple, Value};
