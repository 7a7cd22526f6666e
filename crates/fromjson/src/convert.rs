use tracing::{debug, trace_span};

use crate::{
    builder::ValueBuilder,
    document::Parser,
    error::ConvertError,
    factory::ValueFactory,
    options::ConvertOptions,
};

/// Convert JSON text into a value built by `sink`, with default options.
///
/// # Examples
///
/// ```rust
/// use fromjson::{Runtime, Value, parse_json};
///
/// let mut runtime = Runtime::new();
/// let v = parse_json(&mut runtime, r#"{"b":[1,2.5],"a":null}"#).unwrap();
/// assert_eq!(v.to_string(), r#"{"a":null,"b":[1,2.5]}"#);
/// assert_eq!(v.get("b").and_then(Value::as_list).map(<[Value]>::len), Some(2));
/// ```
///
/// # Errors
///
/// See [`parse_json_with`].
pub fn parse_json<F>(sink: &mut F, text: impl AsRef<[u8]>) -> Result<F::Value, ConvertError>
where
    F: ValueFactory + ?Sized,
{
    parse_json_with(sink, text, &ConvertOptions::default())
}

/// Convert JSON text into a value built by `sink`.
///
/// The whole input is parsed before any value is built; on a parse error
/// `sink` is never called.
///
/// # Errors
///
/// - [`ConvertError::Parse`] for malformed JSON, with the 1-based line and
///   column of the offending character.
/// - [`ConvertError::NestingTooDeep`] when containers nest deeper than
///   [`ConvertOptions::max_depth`].
/// - [`ConvertError::IntegerOutOfRange`] for an integer above `i64::MAX`
///   that still fits a `u64`.
/// - [`ConvertError::DuplicateKey`] for a repeated key under
///   [`DuplicateKeys::Reject`](crate::DuplicateKeys::Reject).
pub fn parse_json_with<F>(
    sink: &mut F,
    text: impl AsRef<[u8]>,
    options: &ConvertOptions,
) -> Result<F::Value, ConvertError>
where
    F: ValueFactory + ?Sized,
{
    let text = text.as_ref();
    let span = trace_span!("parse_json", len = text.len());
    let _enter = span.enter();

    let doc = Parser::with_capacity(text.len())
        .parse(text)
        .inspect_err(|err| debug!(%err, "rejected JSON input"))?;
    debug!(
        tape_len = doc.tape_len(),
        string_bytes = doc.string_buffer().len(),
        "parsed JSON document"
    );

    let mut cursor = doc.cursor();
    ValueBuilder::new(sink, options)
        .build(&mut cursor)
        .inspect_err(|err| debug!(%err, "JSON conversion failed"))
}

/// Convert JSON text with default options and store the result in `out`.
///
/// # Errors
///
/// See [`parse_json_with`].
pub fn parse_json_into<F>(
    sink: &mut F,
    text: impl AsRef<[u8]>,
    out: &mut F::Value,
) -> Result<(), ConvertError>
where
    F: ValueFactory + ?Sized,
{
    parse_json_into_with(sink, text, out, &ConvertOptions::default())
}

/// Convert JSON text and store the result in `out`.
///
/// `out` is only written when the conversion succeeds.
///
/// # Errors
///
/// See [`parse_json_with`].
pub fn parse_json_into_with<F>(
    sink: &mut F,
    text: impl AsRef<[u8]>,
    out: &mut F::Value,
    options: &ConvertOptions,
) -> Result<(), ConvertError>
where
    F: ValueFactory + ?Sized,
{
    *out = parse_json_with(sink, text, options)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DuplicateKeys, Runtime, StringStorage, Value};

    #[test]
    fn shared_and_copied_strings_compare_equal() {
        let mut runtime = Runtime::new();
        let options = ConvertOptions {
            strings: StringStorage::Copied,
            ..Default::default()
        };
        let text = r#"{"a":["alpha","\u00e9t\u00e9"],"b":""}"#;
        let shared = parse_json(&mut runtime, text).unwrap();
        let copied = parse_json_with(&mut runtime, text, &options).unwrap();
        assert_eq!(shared, copied);
    }

    #[test]
    fn strings_outlive_the_document() {
        let mut runtime = Runtime::new();
        let s = {
            let v = parse_json(&mut runtime, r#"{"k":"kept"}"#).unwrap();
            v.get("k").and_then(Value::as_string).cloned().unwrap()
        };
        assert_eq!(s, "kept");
    }

    #[test]
    fn into_leaves_out_untouched_on_error() {
        let mut runtime = Runtime::new();
        let mut out = Value::Int(7);
        assert!(parse_json_into(&mut runtime, "[1,", &mut out).is_err());
        assert_eq!(out, Value::Int(7));

        parse_json_into(&mut runtime, "[1]", &mut out).unwrap();
        assert_eq!(out, Value::List(vec![Value::Int(1)]));
    }

    #[test]
    fn into_with_honors_options() {
        let mut runtime = Runtime::new();
        let strict = ConvertOptions {
            max_depth: 1,
            duplicate_keys: DuplicateKeys::Reject,
            ..Default::default()
        };
        let mut out = Value::Null;

        let err = parse_json_into_with(&mut runtime, r#"{"a":1,"a":2}"#, &mut out, &strict);
        assert_eq!(err, Err(ConvertError::DuplicateKey { key: "a".into() }));
        assert_eq!(
            parse_json_into_with(&mut runtime, "[[]]", &mut out, &strict),
            Err(ConvertError::NestingTooDeep { limit: 1 })
        );
        assert!(out.is_null());

        parse_json_into_with(&mut runtime, r#"{"b":1,"a":2}"#, &mut out, &strict).unwrap();
        assert_eq!(out.to_string(), r#"{"a":2,"b":1}"#);
        runtime.parse_json_into(r#"{"a":1,"a":2}"#, &mut out).unwrap();
        assert_eq!(out.get("a"), Some(&Value::Int(2)));
        assert!(runtime
            .parse_json_into_with(r#"{"a":1,"a":2}"#, &mut out, &strict)
            .is_err());
        assert_eq!(out.get("a"), Some(&Value::Int(2)));
    }

    #[test]
    fn accepts_bytes_and_strings() {
        let mut runtime = Runtime::new();
        let from_str = parse_json(&mut runtime, "true").unwrap();
        let from_bytes = parse_json(&mut runtime, b"true".as_slice()).unwrap();
        let from_vec = parse_json(&mut runtime, Vec::from("true")).unwrap();
        assert_eq!(from_str, Value::Bool(true));
        assert_eq!(from_bytes, from_str);
        assert_eq!(from_vec, from_str);
    }

    #[test]
    fn parse_errors_never_reach_the_sink() {
        let mut runtime = Runtime::new();
        assert!(parse_json(&mut runtime, r#"{"a":1,"b":}"#).is_err());
        assert!(runtime.symbols().is_empty());
    }
}
