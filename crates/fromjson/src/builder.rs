//! Cursor → value tree.
//!
//! The walk is depth-first over the [`Cursor`] with an explicit stack of open
//! containers instead of native recursion, so input nesting never turns into
//! call-stack depth. Each frame collects the children of one container; a
//! frame is turned into a list or attribute set once its last child is built.

use std::collections::{BTreeMap, btree_map::Entry};

use crate::{
    document::{Cursor, NodeType},
    error::ConvertError,
    factory::ValueFactory,
    options::{ConvertOptions, DuplicateKeys, StringStorage},
    symbol_cache::SymbolCache,
    value::JsonStr,
};

enum Frame<'doc, F: ValueFactory + ?Sized> {
    List {
        items: Vec<F::Value>,
    },
    Attrs {
        attrs: BTreeMap<F::Symbol, F::Value>,
        /// Key of the value currently being built.
        pending: Option<(F::Symbol, &'doc str)>,
        depth: usize,
        use_cache: bool,
    },
}

pub(crate) struct ValueBuilder<'a, 'doc, F: ValueFactory + ?Sized> {
    sink: &'a mut F,
    cache: SymbolCache<'doc, F::Symbol>,
    options: &'a ConvertOptions,
}

impl<'a, 'doc, F: ValueFactory + ?Sized> ValueBuilder<'a, 'doc, F> {
    pub fn new(sink: &'a mut F, options: &'a ConvertOptions) -> Self {
        Self {
            sink,
            cache: SymbolCache::new(),
            options,
        }
    }

    /// Build the value under `cursor`, including everything nested in it.
    pub fn build(&mut self, cursor: &mut Cursor<'doc>) -> Result<F::Value, ConvertError> {
        let mut stack: Vec<Frame<'doc, F>> = Vec::new();
        loop {
            let mut value = match cursor.node_type() {
                NodeType::Object => {
                    self.check_depth(stack.len())?;
                    if cursor.descend() {
                        // The cache gate is taken once per object, at the depth
                        // of its keys.
                        let depth = cursor.depth();
                        let use_cache = self.cache.has_been_visited(depth);
                        let key = self.read_key(cursor, depth, use_cache);
                        stack.push(Frame::Attrs {
                            attrs: BTreeMap::new(),
                            pending: Some(key),
                            depth,
                            use_cache,
                        });
                        continue;
                    }
                    self.sink.new_attrs(BTreeMap::new())
                }
                NodeType::Array => {
                    self.check_depth(stack.len())?;
                    if cursor.descend() {
                        stack.push(Frame::List { items: Vec::new() });
                        continue;
                    }
                    self.sink.new_list(Vec::new())
                }
                NodeType::String => self.string(cursor),
                NodeType::SignedInt => {
                    let Some(n) = cursor.integer_value() else {
                        unreachable!("signed-int node without an i64");
                    };
                    self.sink.new_int(n)
                }
                NodeType::UnsignedInt => {
                    let Some(value) = cursor.unsigned_value() else {
                        unreachable!("unsigned-int node without a u64");
                    };
                    return Err(ConvertError::IntegerOutOfRange { value });
                }
                NodeType::Double => {
                    let Some(n) = cursor.double_value() else {
                        unreachable!("double node without an f64");
                    };
                    self.sink.new_float(n)
                }
                NodeType::True | NodeType::False => {
                    let Some(b) = cursor.bool_value() else {
                        unreachable!("boolean node without a bool");
                    };
                    self.sink.new_bool(b)
                }
                NodeType::Null => self.sink.new_null(),
            };

            // Hand the value to its container, closing every container whose
            // last child it was.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Ok(value);
                };
                match frame {
                    Frame::List { items } => {
                        items.push(value);
                        if cursor.advance() {
                            break;
                        }
                    }
                    Frame::Attrs {
                        attrs,
                        pending,
                        depth,
                        use_cache,
                    } => {
                        let Some((symbol, name)) = pending.take() else {
                            unreachable!("object value without a key");
                        };
                        match attrs.entry(symbol) {
                            Entry::Vacant(slot) => {
                                slot.insert(value);
                            }
                            Entry::Occupied(_) if self.options.duplicate_keys == DuplicateKeys::Reject => {
                                return Err(ConvertError::DuplicateKey {
                                    key: name.to_owned(),
                                });
                            }
                            Entry::Occupied(mut slot) => {
                                slot.insert(value);
                            }
                        }
                        if cursor.advance() {
                            *pending = Some(self.read_key(cursor, *depth, *use_cache));
                            break;
                        }
                    }
                }

                cursor.ascend();
                value = match stack.pop() {
                    Some(Frame::List { items }) => self.sink.new_list(items),
                    Some(Frame::Attrs { attrs, .. }) => self.sink.new_attrs(attrs),
                    None => unreachable!("frame vanished while closing it"),
                };
            }
        }
    }

    fn check_depth(&self, open: usize) -> Result<(), ConvertError> {
        if open >= self.options.max_depth {
            return Err(ConvertError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    /// Resolve the key under `cursor` and move on to its value.
    fn read_key(
        &mut self,
        cursor: &mut Cursor<'doc>,
        depth: usize,
        use_cache: bool,
    ) -> (F::Symbol, &'doc str) {
        let Some(name) = cursor.string_view() else {
            unreachable!("object key is not a string");
        };
        let symbol = if use_cache {
            self.cache.intern(depth, &mut *self.sink, name)
        } else {
            self.sink.intern(name)
        };
        let has_value = cursor.advance();
        debug_assert!(has_value, "object key without a value");
        (symbol, name)
    }

    fn string(&mut self, cursor: &Cursor<'doc>) -> F::Value {
        let s = match (self.options.strings, cursor.string_bytes()) {
            (StringStorage::Shared, Some(bytes)) => JsonStr::from_shared(bytes),
            (StringStorage::Copied, Some(bytes)) => JsonStr::copy_from(&bytes),
            (_, None) => unreachable!("string node without bytes"),
        };
        self.sink.new_string(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        Runtime, Symbol, Value,
        document::{Document, Parser},
    };

    /// Counts how often the builder reaches the symbol table.
    #[derive(Default)]
    struct CountingFactory {
        inner: Runtime,
        interned: Vec<String>,
    }

    impl ValueFactory for CountingFactory {
        type Value = Value;
        type Symbol = Symbol;

        fn intern(&mut self, name: &str) -> Symbol {
            self.interned.push(name.to_owned());
            self.inner.intern(name)
        }
        fn new_null(&mut self) -> Value {
            self.inner.new_null()
        }
        fn new_bool(&mut self, b: bool) -> Value {
            self.inner.new_bool(b)
        }
        fn new_int(&mut self, n: i64) -> Value {
            self.inner.new_int(n)
        }
        fn new_float(&mut self, n: f64) -> Value {
            self.inner.new_float(n)
        }
        fn new_string(&mut self, s: JsonStr) -> Value {
            self.inner.new_string(s)
        }
        fn new_list(&mut self, items: Vec<Value>) -> Value {
            self.inner.new_list(items)
        }
        fn new_attrs(&mut self, attrs: BTreeMap<Symbol, Value>) -> Value {
            self.inner.new_attrs(attrs)
        }
    }

    fn document(json: &str) -> Document {
        Parser::default().parse(json.as_bytes()).unwrap()
    }

    fn build_with<F: ValueFactory>(
        sink: &mut F,
        json: &str,
        options: &ConvertOptions,
    ) -> Result<F::Value, ConvertError> {
        let doc = document(json);
        let mut cursor = doc.cursor();
        ValueBuilder::new(sink, options).build(&mut cursor)
    }

    fn inside(buf: &[u8], s: &[u8]) -> bool {
        let range = buf.as_ptr_range();
        range.contains(&s.as_ptr()) && s.as_ptr_range().end <= range.end
    }

    #[test]
    fn string_storage() {
        let doc = document(r#"["alpha","beta"]"#);
        let buffer = doc.string_buffer().clone();
        for (strings, aliased) in [(StringStorage::Shared, true), (StringStorage::Copied, false)] {
            let options = ConvertOptions {
                strings,
                ..Default::default()
            };
            let mut runtime = Runtime::new();
            let v = ValueBuilder::new(&mut runtime, &options)
                .build(&mut doc.cursor())
                .unwrap();
            for (item, expected) in v.as_list().unwrap().iter().zip(["alpha", "beta"]) {
                let s = item.as_string().unwrap();
                assert_eq!(*s, expected);
                assert_eq!(inside(&buffer, s.as_bytes()), aliased, "{strings:?}");
            }
        }
    }

    #[test]
    fn uniform_records_intern_each_key_twice() {
        let mut sink = CountingFactory::default();
        let v = build_with(
            &mut sink,
            r#"[{"id":1,"tag":"a"},{"id":2,"tag":"b"},{"id":3,"tag":"c"},{"id":4,"tag":"d"}]"#,
            &ConvertOptions::default(),
        )
        .unwrap();

        // First object interns directly, the second fills the cache, the rest hit.
        assert_eq!(sink.interned, ["id", "tag", "id", "tag"]);
        assert_eq!(v.as_list().map(<[Value]>::len), Some(4));
    }

    #[test]
    fn nested_records_cache_per_depth() {
        let mut sink = CountingFactory::default();
        build_with(
            &mut sink,
            r#"[{"p":{"x":1}},{"p":{"x":2}},{"p":{"x":3}}]"#,
            &ConvertOptions::default(),
        )
        .unwrap();
        // One direct intern and one cache miss per depth, then hits only.
        assert_eq!(sink.interned, ["p", "x", "p", "x"]);
    }

    #[test]
    fn keys_at_one_depth_share_a_symbol() {
        let mut runtime = Runtime::new();
        let v = build_with(
            &mut runtime,
            r#"[{"k":1},{"k":2},{"k":3}]"#,
            &ConvertOptions::default(),
        )
        .unwrap();
        let keys: Vec<&Symbol> = v
            .as_list()
            .unwrap()
            .iter()
            .map(|item| item.as_attrs().unwrap().keys().next().unwrap())
            .collect();
        assert!(keys.windows(2).all(|w| Symbol::ptr_eq(w[0], w[1])));
    }

    #[test]
    fn depth_limit_counts_containers() {
        let options = ConvertOptions {
            max_depth: 3,
            ..Default::default()
        };
        let mut runtime = Runtime::new();
        assert!(build_with(&mut runtime, "[[[1]]]", &options).is_ok());
        assert!(build_with(&mut runtime, r#"[{"a":[]}]"#, &options).is_ok());
        assert_eq!(
            build_with(&mut runtime, "[[[[]]]]", &options),
            Err(ConvertError::NestingTooDeep { limit: 3 })
        );
        assert_eq!(
            build_with(&mut runtime, "1", &ConvertOptions { max_depth: 0, ..options }),
            Ok(Value::Int(1))
        );
    }

    #[test]
    fn duplicate_keys() {
        let mut runtime = Runtime::new();
        let v = build_with(
            &mut runtime,
            r#"{"x":1,"y":0,"x":2}"#,
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(v.as_attrs().map(crate::Attrs::len), Some(2));
        assert_eq!(v.get("x"), Some(&Value::Int(2)));

        let strict = ConvertOptions {
            duplicate_keys: DuplicateKeys::Reject,
            ..Default::default()
        };
        assert_eq!(
            build_with(&mut runtime, r#"{"x":1,"y":0,"x":2}"#, &strict),
            Err(ConvertError::DuplicateKey { key: "x".into() })
        );
    }

    #[test]
    fn integers_above_i64_are_rejected() {
        let mut runtime = Runtime::new();
        let v = build_with(&mut runtime, "[9223372036854775807,-9223372036854775808]", &ConvertOptions::default())
            .unwrap();
        assert_eq!(v, Value::List(vec![Value::Int(i64::MAX), Value::Int(i64::MIN)]));

        for (json, value) in [
            ("[9223372036854775808]", 9_223_372_036_854_775_808),
            (r#"{"a":[1,9223372036854775809]}"#, 9_223_372_036_854_775_809),
            ("18446744073709551615", u64::MAX),
        ] {
            assert_eq!(
                build_with(&mut runtime, json, &ConvertOptions::default()),
                Err(ConvertError::IntegerOutOfRange { value }),
                "{json}"
            );
        }
    }

    #[test]
    fn booleans_come_from_the_cursor() {
        let mut runtime = Runtime::new();
        let v = build_with(&mut runtime, "[true,false]", &ConvertOptions::default()).unwrap();
        assert_eq!(v, Value::List(vec![Value::Bool(true), Value::Bool(false)]));
    }
}
