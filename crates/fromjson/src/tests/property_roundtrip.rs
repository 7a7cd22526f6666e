use std::collections::BTreeSet;

use quickcheck::{QuickCheck, TestResult};

use crate::{ConvertOptions, Runtime, StringStorage, Value, parse_json_with};

/// Property: rendering a value as JSON and converting it back yields the same
/// value, with either string storage mode.
#[test]
fn display_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value, copied: bool) -> TestResult {
        let json = value.to_string();
        let options = ConvertOptions {
            strings: if copied {
                StringStorage::Copied
            } else {
                StringStorage::Shared
            },
            ..Default::default()
        };

        let converted = match parse_json_with(&mut Runtime::new(), &json, &options) {
            Ok(v) => v,
            Err(err) => {
                dbg!(&json, err);
                return TestResult::failed();
            }
        };
        if converted != value {
            dbg!(&json, &value, &converted);
            return TestResult::failed();
        }
        TestResult::passed()
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Value, bool) -> TestResult);
}

/// Property: one runtime reused across many conversions interns every key
/// exactly once.
#[test]
fn symbol_table_holds_distinct_keys_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(values: Vec<Value>) -> TestResult {
        fn collect_keys(v: &Value, out: &mut BTreeSet<String>) {
            match v {
                Value::List(items) => items.iter().for_each(|item| collect_keys(item, out)),
                Value::Attrs(attrs) => {
                    for (k, item) in attrs.iter() {
                        out.insert(k.as_str().to_owned());
                        collect_keys(item, out);
                    }
                }
                _ => {}
            }
        }

        let mut runtime = Runtime::new();
        let mut keys = BTreeSet::new();
        for value in &values {
            collect_keys(value, &mut keys);
            if runtime.parse_json(value.to_string()).is_err() {
                return TestResult::failed();
            }
        }
        TestResult::from_bool(runtime.symbols().len() == keys.len())
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 2_000 } else { 200 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Vec<Value>) -> TestResult);
}
