use std::collections::BTreeMap;

use crate::{
    convert::{parse_json_into_with, parse_json_with},
    error::ConvertError,
    options::ConvertOptions,
    symbol::{Symbol, SymbolTable},
    value::{JsonStr, Value},
};

/// Abstraction over the host's value construction and symbol interning.
///
/// The converter never builds values itself: every node of the output tree
/// comes from one of these constructors, and every object key goes through
/// [`intern`](Self::intern) (possibly memoized by a
/// [`SymbolCache`](crate::SymbolCache)).
pub trait ValueFactory {
    type Value;
    /// Attribute names; the `Ord` impl is the canonical attribute order.
    type Symbol: Clone + Ord;

    fn intern(&mut self, name: &str) -> Self::Symbol;

    fn new_null(&mut self) -> Self::Value;
    fn new_bool(&mut self, b: bool) -> Self::Value;
    fn new_int(&mut self, n: i64) -> Self::Value;
    fn new_float(&mut self, n: f64) -> Self::Value;
    fn new_string(&mut self, s: JsonStr) -> Self::Value;
    /// `items` are in document order.
    fn new_list(&mut self, items: Vec<Self::Value>) -> Self::Value;
    /// `attrs` iterates in canonical symbol order.
    fn new_attrs(&mut self, attrs: BTreeMap<Self::Symbol, Self::Value>) -> Self::Value;
}

/// The built-in host: a [`SymbolTable`] plus constructors for [`Value`].
#[derive(Debug, Default)]
pub struct Runtime {
    symbols: SymbolTable,
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Convert JSON text with default options.
    ///
    /// # Errors
    ///
    /// See [`parse_json_with`].
    pub fn parse_json(&mut self, text: impl AsRef<[u8]>) -> Result<Value, ConvertError> {
        parse_json_with(self, text, &ConvertOptions::default())
    }

    /// Convert JSON text.
    ///
    /// # Errors
    ///
    /// See [`parse_json_with`].
    pub fn parse_json_with(
        &mut self,
        text: impl AsRef<[u8]>,
        options: &ConvertOptions,
    ) -> Result<Value, ConvertError> {
        parse_json_with(self, text, options)
    }

    /// Convert JSON text with default options into `out`, which is left
    /// untouched on failure.
    ///
    /// # Errors
    ///
    /// See [`parse_json_with`].
    pub fn parse_json_into(
        &mut self,
        text: impl AsRef<[u8]>,
        out: &mut Value,
    ) -> Result<(), ConvertError> {
        parse_json_into_with(self, text, out, &ConvertOptions::default())
    }

    /// Convert JSON text into `out`, which is left untouched on failure.
    ///
    /// # Errors
    ///
    /// See [`parse_json_with`].
    pub fn parse_json_into_with(
        &mut self,
        text: impl AsRef<[u8]>,
        out: &mut Value,
        options: &ConvertOptions,
    ) -> Result<(), ConvertError> {
        parse_json_into_with(self, text, out, options)
    }
}

impl ValueFactory for Runtime {
    type Value = Value;
    type Symbol = Symbol;

    #[inline]
    fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    #[inline]
    fn new_null(&mut self) -> Value {
        Value::Null
    }

    #[inline]
    fn new_bool(&mut self, b: bool) -> Value {
        Value::Bool(b)
    }

    #[inline]
    fn new_int(&mut self, n: i64) -> Value {
        Value::Int(n)
    }

    #[inline]
    fn new_float(&mut self, n: f64) -> Value {
        Value::Float(n)
    }

    #[inline]
    fn new_string(&mut self, s: JsonStr) -> Value {
        Value::String(s)
    }

    #[inline]
    fn new_list(&mut self, items: Vec<Value>) -> Value {
        Value::List(items)
    }

    #[inline]
    fn new_attrs(&mut self, attrs: BTreeMap<Symbol, Value>) -> Value {
        Value::Attrs(attrs.into())
    }
}
