//! Dynamic values
//!
//! The scripting runtime's own value kinds. Tables and userdata are shared
//! handles owned by the runtime's heap; the engine only borrows them for the
//! duration of a single conversion.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use typebridge_types::Value;

/// A value native to the scripting runtime.
#[derive(Clone, Default)]
pub enum Dynamic {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    /// Runtime strings are byte strings.
    String(Rc<[u8]>),
    Table(Table),
    UserData(UserData),
}

impl Dynamic {
    pub fn string(s: impl AsRef<[u8]>) -> Self {
        Dynamic::String(Rc::from(s.as_ref()))
    }

    /// Name of the dynamic kind as the runtime reports it.
    pub fn kind(&self) -> &'static str {
        match self {
            Dynamic::Nil => "nil",
            Dynamic::Bool(_) => "boolean",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::Table(_) => "table",
            Dynamic::UserData(_) => "userdata",
        }
    }

    /// Kind, with userdata reported by its type tag.
    pub fn type_of(&self) -> String {
        match self {
            Dynamic::UserData(u) => u.type_name().to_string(),
            other => other.kind().to_string(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Dynamic::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Dynamic::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_userdata(&self) -> Option<&UserData> {
        match self {
            Dynamic::UserData(u) => Some(u),
            _ => None,
        }
    }

    /// Raw equality: by value for scalars, by identity for tables and
    /// userdata.
    pub fn raw_equal(&self, other: &Dynamic) -> bool {
        match (self, other) {
            (Dynamic::Nil, Dynamic::Nil) => true,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
            (Dynamic::Number(a), Dynamic::Number(b)) => a == b,
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            (Dynamic::Table(a), Dynamic::Table(b)) => a.ptr_eq(b),
            (Dynamic::UserData(a), Dynamic::UserData(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Nil => write!(f, "nil"),
            Dynamic::Bool(b) => write!(f, "{b}"),
            Dynamic::Number(n) => write!(f, "{n}"),
            Dynamic::String(s) => write!(f, "{:?}", String::from_utf8_lossy(s)),
            Dynamic::Table(t) => write!(f, "table: 0x{:x}", t.id()),
            Dynamic::UserData(u) => write!(f, "{}: 0x{:x}", u.type_name(), u.id()),
        }
    }
}

impl From<bool> for Dynamic {
    fn from(v: bool) -> Self {
        Dynamic::Bool(v)
    }
}

impl From<f64> for Dynamic {
    fn from(v: f64) -> Self {
        Dynamic::Number(v)
    }
}

impl From<&str> for Dynamic {
    fn from(v: &str) -> Self {
        Dynamic::string(v)
    }
}

impl From<String> for Dynamic {
    fn from(v: String) -> Self {
        Dynamic::string(v)
    }
}

impl From<Table> for Dynamic {
    fn from(v: Table) -> Self {
        Dynamic::Table(v)
    }
}

impl From<UserData> for Dynamic {
    fn from(v: UserData) -> Self {
        Dynamic::UserData(v)
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Contents of a table: a 1-based sequence part and a string-keyed part.
#[derive(Default)]
pub struct TableData {
    pub seq: Vec<Dynamic>,
    pub fields: BTreeMap<String, Dynamic>,
}

/// A composite runtime value acting as both array and map.
#[derive(Clone, Default)]
pub struct Table(Rc<RefCell<TableData>>);

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seq(seq: Vec<Dynamic>) -> Self {
        Self(Rc::new(RefCell::new(TableData {
            seq,
            fields: BTreeMap::new(),
        })))
    }

    pub fn from_fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, Dynamic)>) -> Self {
        let t = Table::new();
        for (k, v) in fields {
            t.set(k, v);
        }
        t
    }

    /// Length of the sequence part.
    pub fn len(&self) -> usize {
        self.0.borrow().seq.len()
    }

    /// True when neither part holds anything.
    pub fn is_empty(&self) -> bool {
        let data = self.0.borrow();
        data.seq.is_empty() && data.fields.is_empty()
    }

    pub fn push(&self, value: Dynamic) {
        self.0.borrow_mut().seq.push(value);
    }

    /// Read the sequence part at a 1-based index.
    pub fn index(&self, i: usize) -> Dynamic {
        if i == 0 {
            return Dynamic::Nil;
        }
        self.0.borrow().seq.get(i - 1).cloned().unwrap_or_default()
    }

    /// Write the sequence part at a 1-based index. Writing nil at the end
    /// shrinks the sequence; writing past the end fills with nil.
    pub fn set_index(&self, i: usize, value: Dynamic) {
        if i == 0 {
            return;
        }
        let mut data = self.0.borrow_mut();
        if value.is_nil() && i == data.seq.len() {
            data.seq.pop();
            while matches!(data.seq.last(), Some(Dynamic::Nil)) {
                data.seq.pop();
            }
            return;
        }
        if i > data.seq.len() {
            data.seq.resize(i, Dynamic::Nil);
        }
        data.seq[i - 1] = value;
    }

    pub fn get(&self, key: &str) -> Dynamic {
        self.0.borrow().fields.get(key).cloned().unwrap_or_default()
    }

    /// Setting nil removes the key.
    pub fn set(&self, key: impl Into<String>, value: Dynamic) {
        let key = key.into();
        let mut data = self.0.borrow_mut();
        if value.is_nil() {
            data.fields.remove(&key);
        } else {
            data.fields.insert(key, value);
        }
    }

    pub fn has_fields(&self) -> bool {
        !self.0.borrow().fields.is_empty()
    }

    pub fn borrow(&self) -> Ref<'_, TableData> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, TableData> {
        self.0.borrow_mut()
    }

    /// Identity of the underlying storage.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// ============================================================================
// Userdata
// ============================================================================

struct UserDataInner {
    tag: String,
    value: RefCell<Value>,
}

/// An opaque object carrying a domain value and the type tag used to find
/// its reflector. Mutations through property setters are visible through
/// every handle.
#[derive(Clone)]
pub struct UserData(Rc<UserDataInner>);

impl UserData {
    pub fn new(tag: impl Into<String>, value: Value) -> Self {
        Self(Rc::new(UserDataInner {
            tag: tag.into(),
            value: RefCell::new(value),
        }))
    }

    /// The type tag.
    pub fn type_name(&self) -> &str {
        &self.0.tag
    }

    pub fn value(&self) -> Ref<'_, Value> {
        self.0.value.borrow()
    }

    pub fn value_mut(&self) -> RefMut<'_, Value> {
        self.0.value.borrow_mut()
    }

    pub fn get(&self) -> Value {
        self.0.value.borrow().clone()
    }

    pub fn replace(&self, value: Value) -> Value {
        self.0.value.replace(value)
    }

    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &UserData) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sequence_indexing() {
        let t = Table::new();
        t.set_index(1, Dynamic::Number(1.0));
        t.set_index(3, Dynamic::Number(3.0));
        assert_eq!(t.len(), 3);
        assert!(t.index(2).is_nil());
        t.set_index(3, Dynamic::Nil);
        assert_eq!(t.len(), 1);
        assert!(t.index(0).is_nil());
    }

    #[test]
    fn test_table_nil_removes_field() {
        let t = Table::from_fields([("a", Dynamic::Bool(true))]);
        assert!(t.has_fields());
        t.set("a", Dynamic::Nil);
        assert!(t.is_empty());
    }

    #[test]
    fn test_raw_equal() {
        let t = Table::new();
        assert!(Dynamic::Table(t.clone()).raw_equal(&Dynamic::Table(t)));
        assert!(!Dynamic::Table(Table::new()).raw_equal(&Dynamic::Table(Table::new())));
        assert!(Dynamic::from("x").raw_equal(&Dynamic::string(b"x")));
    }

    #[test]
    fn test_userdata_shared_mutation() {
        let u = UserData::new("int", Value::Int(1));
        let v = u.clone();
        v.replace(Value::Int(2));
        assert_eq!(u.get(), Value::Int(2));
        assert_eq!(u.type_name(), "int");
    }
}
