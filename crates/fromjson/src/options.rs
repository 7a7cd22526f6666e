/// Default bound on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Configuration for one JSON → value conversion.
///
/// # Examples
///
/// ```rust
/// use fromjson::{ConvertOptions, DuplicateKeys, Runtime, parse_json_with};
///
/// let options = ConvertOptions {
///     duplicate_keys: DuplicateKeys::Reject,
///     ..Default::default()
/// };
/// let mut runtime = Runtime::new();
/// assert!(parse_json_with(&mut runtime, r#"{"a":1,"a":2}"#, &options).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Maximum number of nested objects and arrays.
    ///
    /// Deeper input fails with
    /// [`ConvertError::NestingTooDeep`](crate::ConvertError::NestingTooDeep)
    /// instead of producing a tree that is expensive to walk or drop.
    ///
    /// # Default
    ///
    /// [`DEFAULT_MAX_DEPTH`]
    pub max_depth: usize,

    /// What to do when one object names the same key twice.
    ///
    /// # Default
    ///
    /// [`DuplicateKeys::LastWins`]
    pub duplicate_keys: DuplicateKeys,

    /// Whether string values share the parsed document's buffer or get their
    /// own copy.
    ///
    /// # Default
    ///
    /// [`StringStorage::Shared`]
    pub strings: StringStorage,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            duplicate_keys: DuplicateKeys::default(),
            strings: StringStorage::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateKeys {
    /// The value of the last occurrence replaces earlier ones.
    #[default]
    LastWins,
    /// A repeated key fails the conversion.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StringStorage {
    /// Slices of the document buffer; the buffer lives until the last string
    /// referring to it is dropped.
    #[default]
    Shared,
    /// Each string owns a private copy of its bytes, so the document buffer
    /// is freed as soon as the conversion returns.
    Copied,
}
