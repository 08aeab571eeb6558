//! Domain values

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::desc::{ClassDesc, DescFields, EnumDesc, EnumItemDesc, PropertyDesc};
use crate::geometry::{
    CFrame, Color3, NumberRange, Rect, UDim, UDim2, Vector2, Vector2int16, Vector3, Vector3int16,
};
use crate::http::{Cookie, Cookies, HttpHeaders, HttpOptions, HttpResponse};
use crate::selector::FormatSelector;

/// A strongly-typed value owned by the host.
///
/// Composite values (`Array`, `Dictionary`) are shared handles: cloning a
/// `Value` that holds one clones the handle, not the elements, so scripts can
/// build structures that refer back to themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Primitives
    Nil,
    Bool(bool),
    Int(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(String),
    BinaryString(Vec<u8>),
    Content(String),
    ProtectedString(String),
    SharedString(Vec<u8>),

    // Containers
    Array(Array),
    Dictionary(Dictionary),
    Optional(Optional),
    Tuple(Tuple),

    // Geometry
    Vector2(Vector2),
    Vector3(Vector3),
    Vector2int16(Vector2int16),
    Vector3int16(Vector3int16),
    CFrame(CFrame),
    Color3(Color3),
    UDim(UDim),
    UDim2(UDim2),
    Rect(Rect),
    NumberRange(NumberRange),

    // Descriptors
    ClassDesc(ClassDesc),
    PropertyDesc(PropertyDesc),
    EnumDesc(EnumDesc),
    EnumItemDesc(EnumItemDesc),
    DescFields(DescFields),

    // IO options
    HttpOptions(HttpOptions),
    HttpResponse(HttpResponse),
    HttpHeaders(HttpHeaders),
    Cookie(Cookie),
    Cookies(Cookies),
    FormatSelector(FormatSelector),
}

/// Implemented by every concrete domain type.
pub trait DomainType: Sized {
    /// Registry name of the type.
    const TYPE_NAME: &'static str;
}

impl Value {
    /// Name of the concrete type, used to find its reflector.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Int64(_) => "int64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::BinaryString(_) => "BinaryString",
            Value::Content(_) => "Content",
            Value::ProtectedString(_) => "ProtectedString",
            Value::SharedString(_) => "SharedString",
            Value::Array(_) => Array::TYPE_NAME,
            Value::Dictionary(_) => Dictionary::TYPE_NAME,
            Value::Optional(_) => Optional::TYPE_NAME,
            Value::Tuple(_) => Tuple::TYPE_NAME,
            Value::Vector2(_) => Vector2::TYPE_NAME,
            Value::Vector3(_) => Vector3::TYPE_NAME,
            Value::Vector2int16(_) => Vector2int16::TYPE_NAME,
            Value::Vector3int16(_) => Vector3int16::TYPE_NAME,
            Value::CFrame(_) => CFrame::TYPE_NAME,
            Value::Color3(_) => Color3::TYPE_NAME,
            Value::UDim(_) => UDim::TYPE_NAME,
            Value::UDim2(_) => UDim2::TYPE_NAME,
            Value::Rect(_) => Rect::TYPE_NAME,
            Value::NumberRange(_) => NumberRange::TYPE_NAME,
            Value::ClassDesc(_) => ClassDesc::TYPE_NAME,
            Value::PropertyDesc(_) => PropertyDesc::TYPE_NAME,
            Value::EnumDesc(_) => EnumDesc::TYPE_NAME,
            Value::EnumItemDesc(_) => EnumItemDesc::TYPE_NAME,
            Value::DescFields(_) => DescFields::TYPE_NAME,
            Value::HttpOptions(_) => HttpOptions::TYPE_NAME,
            Value::HttpResponse(_) => HttpResponse::TYPE_NAME,
            Value::HttpHeaders(_) => HttpHeaders::TYPE_NAME,
            Value::Cookie(_) => Cookie::TYPE_NAME,
            Value::Cookies(_) => Cookies::TYPE_NAME,
            Value::FormatSelector(_) => FormatSelector::TYPE_NAME,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Numeric value of a number-like or integer-like variant.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Int64(v) => Some(v as f64),
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Text of a string-like variant. Binary variants must be valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Content(s) | Value::ProtectedString(s) => Some(s),
            Value::BinaryString(b) | Value::SharedString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Raw bytes of a string-like variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) | Value::Content(s) | Value::ProtectedString(s) => Some(s.as_bytes()),
            Value::BinaryString(b) | Value::SharedString(b) => Some(b),
            _ => None,
        }
    }
}

// ============================================================================
// Array
// ============================================================================

/// Ordered sequence of values behind a shared handle.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl DomainType for Array {
    const TYPE_NAME: &'static str = "Array";
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    /// Replace the element at `index`, growing with `Nil` if needed.
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Nil);
        }
        items[index] = value;
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    /// Shallow copy of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Identity of the underlying storage.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.borrow().iter().map(Shallow))
            .finish()
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array::from_vec(items)
    }
}

// ============================================================================
// Dictionary
// ============================================================================

/// String-keyed map of values behind a shared handle.
#[derive(Clone, Default)]
pub struct Dictionary(Rc<RefCell<BTreeMap<String, Value>>>);

impl DomainType for Dictionary {
    const TYPE_NAME: &'static str = "Dictionary";
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<String, Value>) -> Self {
        Self(Rc::new(RefCell::new(map)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().remove(key)
    }

    pub fn borrow(&self) -> Ref<'_, BTreeMap<String, Value>> {
        self.0.borrow()
    }

    /// Shallow copy of the entries.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.0.borrow().clone()
    }

    /// Identity of the underlying storage.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Dictionary) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.borrow().iter().map(|(k, v)| (k, Shallow(v))))
            .finish()
    }
}

impl FromIterator<(String, Value)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Dictionary::from_map(iter.into_iter().collect())
    }
}

/// Debug view that does not descend into nested containers, so printing a
/// self-referential structure terminates.
struct Shallow<'a>(&'a Value);

impl fmt::Debug for Shallow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Array(a) => write!(f, "Array(#{:x}, len {})", a.id(), a.len()),
            Value::Dictionary(d) => write!(f, "Dictionary(#{:x}, len {})", d.id(), d.len()),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

// ============================================================================
// Optional and Tuple
// ============================================================================

/// A value that may be absent. `inner` names the type of the wrapped value
/// so that an empty optional still documents what it would hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Optional {
    pub inner: String,
    pub value: Option<Box<Value>>,
}

impl DomainType for Optional {
    const TYPE_NAME: &'static str = "Optional";
}

impl Optional {
    pub fn some(value: Value) -> Self {
        Self {
            inner: value.type_name().to_string(),
            value: Some(Box::new(value)),
        }
    }

    pub fn none(inner: impl Into<String>) -> Self {
        Self {
            inner: inner.into(),
            value: None,
        }
    }

    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value.map(|v| *v)
    }
}

/// Multiple values returned from a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tuple(pub Vec<Value>);

impl DomainType for Tuple {
    const TYPE_NAME: &'static str = "Tuple";
}

// ============================================================================
// Conversion errors
// ============================================================================

/// Error returned when extracting a concrete type from a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub expected: &'static str,
    pub got: &'static str,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.got)
    }
}

impl std::error::Error for ConversionError {}

// ============================================================================
// From / TryFrom implementations
// ============================================================================

macro_rules! primitive_conversions {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ConversionError;
                fn try_from(v: Value) -> Result<Self, Self::Error> {
                    match v {
                        Value::$variant(x) => Ok(x),
                        other => Err(ConversionError {
                            expected: $name,
                            got: other.type_name(),
                        }),
                    }
                }
            }
        )*
    };
}

primitive_conversions! {
    bool => Bool, "bool";
    i32 => Int, "int";
    i64 => Int64, "int64";
    f32 => Float, "float";
    f64 => Double, "double";
    String => String, "string";
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(x) => Value::Optional(Optional::some(x.into())),
            None => Value::Optional(Optional::none("nil")),
        }
    }
}

/// Wires a record type into [`Value`]: `DomainType`, `From` and `TryFrom`.
macro_rules! domain_types {
    ($($ty:ident => $name:literal;)*) => {
        $(
            impl DomainType for $ty {
                const TYPE_NAME: &'static str = $name;
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$ty(v)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ConversionError;
                fn try_from(v: Value) -> Result<Self, Self::Error> {
                    match v {
                        Value::$ty(x) => Ok(x),
                        other => Err(ConversionError {
                            expected: $name,
                            got: other.type_name(),
                        }),
                    }
                }
            }
        )*
    };
}

domain_types! {
    Vector2 => "Vector2";
    Vector3 => "Vector3";
    Vector2int16 => "Vector2int16";
    Vector3int16 => "Vector3int16";
    CFrame => "CFrame";
    Color3 => "Color3";
    UDim => "UDim";
    UDim2 => "UDim2";
    Rect => "Rect";
    NumberRange => "NumberRange";
    ClassDesc => "ClassDesc";
    PropertyDesc => "PropertyDesc";
    EnumDesc => "EnumDesc";
    EnumItemDesc => "EnumItemDesc";
    DescFields => "DescFields";
    HttpOptions => "HttpOptions";
    HttpResponse => "HttpResponse";
    HttpHeaders => "HttpHeaders";
    Cookie => "Cookie";
    Cookies => "Cookies";
    FormatSelector => "FormatSelector";
}

macro_rules! container_conversions {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$ty(v)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ConversionError;
                fn try_from(v: Value) -> Result<Self, Self::Error> {
                    match v {
                        Value::$ty(x) => Ok(x),
                        other => Err(ConversionError {
                            expected: $ty::TYPE_NAME,
                            got: other.type_name(),
                        }),
                    }
                }
            }
        )*
    };
}

container_conversions!(Array, Dictionary, Optional, Tuple);
