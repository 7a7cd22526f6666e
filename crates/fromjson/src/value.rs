//! Runtime values produced from JSON.
//!
//! This module defines the [`Value`] enum, its attribute-set and string
//! payloads, and the compact JSON rendering used by its `Display` impl.
//!
use core::{
    fmt::{self, Write as _},
    str::Utf8Error,
};
use std::collections::BTreeMap;

use bstr::{BStr, ByteSlice};
use bytes::Bytes;

use crate::symbol::Symbol;

/// String payload of a [`Value`].
///
/// Strings produced by the converter usually share the parsed document's
/// string buffer: cloning or dropping one only touches a reference count, and
/// the buffer is freed once the last string referring to it goes away.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonStr(Bytes);

impl JsonStr {
    /// Wrap a handle that may share its storage with other values.
    #[must_use]
    pub fn from_shared(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Copy `bytes` into fresh storage owned by this string alone.
    #[must_use]
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    /// # Errors
    ///
    /// Fails if the bytes are not UTF-8, which never happens for strings
    /// decoded from JSON text.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        core::str::from_utf8(&self.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for JsonStr {
    fn from(s: &str) -> Self {
        Self::copy_from(s.as_bytes())
    }
}

impl From<String> for JsonStr {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl PartialEq<str> for JsonStr {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for JsonStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for JsonStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_bstr(), f)
    }
}

impl fmt::Display for JsonStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_bstr(), f)
    }
}

/// An attribute set: bindings kept sorted by [`Symbol`] order so lookups are
/// a binary search.
#[derive(Clone, Default, PartialEq)]
pub struct Attrs(Vec<(Symbol, Value)>);

impl Attrs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .binary_search_by(|(symbol, _)| symbol.as_str().cmp(name))
            .ok()
            .map(|i| &self.0[i].1)
    }

    /// The binding for `name`, including the interned key.
    #[must_use]
    pub fn get_key_value(&self, name: &str) -> Option<(&Symbol, &Value)> {
        self.0
            .binary_search_by(|(symbol, _)| symbol.as_str().cmp(name))
            .ok()
            .map(|i| (&self.0[i].0, &self.0[i].1))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings in canonical order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Symbol, &Value)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Symbol> {
        self.0.iter().map(|(k, _)| k)
    }
}

impl From<BTreeMap<Symbol, Value>> for Attrs {
    fn from(map: BTreeMap<Symbol, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl fmt::Debug for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A runtime value.
///
/// The `Value` enum mirrors the shapes JSON text can take:
///
/// - Null
/// - Bool
/// - Int (integers that fit `i64`)
/// - Float
/// - String
/// - List
/// - Attrs (objects)
///
/// # Examples
///
/// ```
/// use fromjson::Runtime;
///
/// let mut runtime = Runtime::new();
/// let v = runtime.parse_json(r#"{"b":[1,2.5],"a":"x"}"#).unwrap();
/// assert_eq!(v.to_string(), r#"{"a":"x","b":[1,2.5]}"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(JsonStr),
    List(Vec<Value>),
    Attrs(Attrs),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Attrs> for Value {
    fn from(v: Attrs) -> Self {
        Self::Attrs(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    ///
    /// # Examples
    ///
    /// ```
    /// use fromjson::Value;
    ///
    /// assert!(Value::Null.is_null());
    /// assert!(!Value::Bool(false).is_null());
    /// ```
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Self::Int(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Self::Float(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_string(&self) -> Option<&JsonStr> {
        if let Self::String(v) = self {
            Some(v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        if let Self::List(v) = self {
            Some(v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_attrs(&self) -> Option<&Attrs> {
        if let Self::Attrs(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Looks up an attribute when the value is an attribute set.
    ///
    /// # Examples
    ///
    /// ```
    /// use fromjson::{Runtime, Value};
    ///
    /// let v = Runtime::new().parse_json(r#"{"n":1}"#).unwrap();
    /// assert_eq!(v.get("n"), Some(&Value::Int(1)));
    /// assert_eq!(v.get("m"), None);
    /// ```
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_attrs()?.get(name)
    }
}

/// Escapes a string for inclusion in a JSON string literal.
///
/// Quotes, backslashes, control characters (<= U+001F and the other C0/C1
/// controls) and the Unicode line separators become escape sequences. Bytes
/// that are not UTF-8 are written as U+FFFD.
pub(crate) fn write_escaped_string<W: fmt::Write>(src: &[u8], f: &mut W) -> fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            // Pre-2019 JSON parsers may not handle the raw separators.
            '\u{2028}' | '\u{2029}' => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            // JSON escapes carry exactly four hex digits, so only BMP controls
            // are escaped.
            c if c.is_ascii_control() || c.is_control() && c as u32 <= 0xFFFF => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Int(n) => write!(f, "{n}"),
            // `Debug` always keeps a '.' or an exponent, so the text reads
            // back as a float rather than an integer.
            Value::Float(n) if n.is_finite() => write!(f, "{n:?}"),
            Value::Float(_) => f.write_str("null"),
            Value::String(s) => {
                f.write_char('"')?;
                write_escaped_string(s.as_bytes(), f)?;
                f.write_char('"')
            }
            Value::List(items) => {
                f.write_str("[")?;
                let mut first = true;
                for v in items {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Attrs(attrs) => {
                f.write_str("{")?;
                let mut first = true;
                for (k, v) in attrs.iter() {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    f.write_char('"')?;
                    write_escaped_string(k.as_str().as_bytes(), f)?;
                    write!(f, "\":{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}
