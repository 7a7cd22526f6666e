use std::collections::BTreeMap;

use quickcheck::{Arbitrary, Gen};

use crate::{Attrs, SymbolTable, Value};

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct JsonNumber(f64);

impl Arbitrary for JsonNumber {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut value = f64::arbitrary(g);
        while !value.is_finite() {
            value = f64::arbitrary(g);
        }

        Self(value)
    }
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        fn gen_val(g: &mut Gen, symbols: &mut SymbolTable, depth: usize) -> Value {
            let kinds = if depth == 0 { 5 } else { 7 };
            match usize::arbitrary(g) % kinds {
                0 => Value::Null,
                1 => Value::Bool(bool::arbitrary(g)),
                2 => Value::Int(i64::arbitrary(g)),
                3 => Value::Float(JsonNumber::arbitrary(g).0),
                4 => Value::String(String::arbitrary(g).into()),
                5 => {
                    let len = usize::arbitrary(g) % 4;
                    Value::List((0..len).map(|_| gen_val(g, symbols, depth - 1)).collect())
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let mut map = BTreeMap::new();
                    for _ in 0..len {
                        let key = symbols.intern(&String::arbitrary(g));
                        map.insert(key, gen_val(g, symbols, depth - 1));
                    }
                    Value::Attrs(Attrs::from(map))
                }
            }
        }

        let mut symbols = SymbolTable::new();
        let depth = usize::arbitrary(g) % 4;
        gen_val(g, &mut symbols, depth)
    }
}
